//! Error types.

use thiserror::Error;

use crate::material::UniformKind;
use crate::shader::ShaderStage;

/// Errors raised while composing or compiling a material program.
///
/// All of these are build-time failures: no partially composed program is
/// ever handed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("base program has no #version directive")]
    MissingVersion,
    #[error("unsupported base program version: {0} (expected 450)")]
    UnsupportedVersion(String),
    #[error("anchor `{anchor}` not found in {stage:?} stage")]
    AnchorNotFound {
        anchor: &'static str,
        stage: ShaderStage,
    },
    #[error("anchor `{anchor}` appears {count} times in {stage:?} stage")]
    DuplicateAnchor {
        anchor: &'static str,
        stage: ShaderStage,
        count: usize,
    },
    #[error("identifier `{identifier}` required by the {stage:?} anchor is not declared")]
    MissingIdentifier {
        identifier: String,
        stage: ShaderStage,
    },
    #[error("uniform `{0}` is not registered with the program's uniform table")]
    UnregisteredUniform(&'static str),
    #[error("uniform `{name}` registered as {found:?}, expected {expected:?}")]
    UniformKindMismatch {
        name: &'static str,
        expected: UniformKind,
        found: UniformKind,
    },
    #[error("include not found: \"{0}\"")]
    IncludeNotFound(String),
    #[error("shader compilation failed: {0}")]
    CompilationFailed(String),
}

/// Errors raised while loading material resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to decode texture `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// Errors raised by the by-name uniform API.
///
/// Out-of-domain values are never an error; only unknown names and
/// value kinds that do not fit the uniform are.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniformError {
    #[error("unknown uniform or parameter: `{0}`")]
    Unknown(String),
    #[error("`{name}` expects a {expected:?} value, got {found:?}")]
    KindMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color `{0}` (expected #rrggbb)")]
pub struct ParseColorError(pub String);
