//! Shader composition.
//!
//! The composer grafts the distortion logic onto a base lighting program
//! without forking it. A base program is multi-stage GLSL 450 source using
//! `#ifdef VERTEX` / `#ifdef FRAGMENT` blocks and exposes two anchor comments:
//!
//! ```glsl
//! // #anchor project_vertex   (vertex: working position not yet projected)
//! // #anchor final_color      (fragment: output color fully shaded)
//! ```
//!
//! # Overview
//!
//! - [`ShaderComposer`] validates a [`BaseProgram`], injects declarations right
//!   after `#version` and code right after each anchor, resolves `#include`
//!   directives and compiles the result to WGSL through naga.
//! - [`ShaderLibrary`] holds the includable modules.
//! - [`ProgramCache`] hands out one [`ComposedProgram`] per
//!   (base source, shader defs, uniform layout).
//!
//! # Example
//!
//! ```ignore
//! use distorted_torus::material::MaterialState;
//! use distorted_torus::shader::{BaseProgram, ShaderComposer};
//!
//! let composer = ShaderComposer::with_standard_library();
//! let material = MaterialState::default();
//! let program = composer.compose(&BaseProgram::standard_pbr(), &material.uniform_table(), &[])?;
//! let compiled = composer.compile(&program)?;
//! ```

pub mod cache;
pub mod library;

use std::collections::{HashMap, HashSet};

use crate::distortion::{
    DESATURATION_CUTOFF, DESATURATION_NOISE_SCALE, DESATURATION_TIME_SCALE, GATE_NOISE_SCALE,
    GATE_TIME_SCALE,
};
use crate::error::ComposeError;
use crate::material::{UniformKind, UniformTable, DISTORTION_UNIFORMS};

pub use cache::{ProgramCache, ProgramKey};
pub use library::{ShaderLibrary, STANDARD_PBR_GLSL};

/// Vertex anchor: the working position is final in local space.
pub const PROJECT_VERTEX_ANCHOR: &str = "project_vertex";
/// Fragment anchor: the output color is fully shaded.
pub const FINAL_COLOR_ANCHOR: &str = "final_color";

/// Only base programs written against this GLSL version are accepted.
pub const SUPPORTED_GLSL_VERSION: &str = "450";

/// Varying carrying the undistorted local position to the fragment stage.
const LOCAL_POSITION_VARYING: &str = "v_local_position";

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Both stages, vertex first.
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    /// Preprocessor define selecting this stage's block.
    pub fn define(self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
        }
    }

    /// Anchor that code for this stage is inserted after.
    pub fn anchor(self) -> &'static str {
        match self {
            Self::Vertex => PROJECT_VERTEX_ANCHOR,
            Self::Fragment => FINAL_COLOR_ANCHOR,
        }
    }

    fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// Identifiers a base program must declare for the injected code to bind to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseContract {
    /// Vertex position attribute (`a_position`).
    pub position_attribute: String,
    /// Mutable local-space position at the vertex anchor (`transformed`).
    pub working_position: String,
    /// Model matrix uniform (`u_model`).
    pub model_matrix: String,
    /// Fragment color output (`out_color`).
    pub fragment_output: String,
}

impl Default for BaseContract {
    fn default() -> Self {
        Self {
            position_attribute: "a_position".into(),
            working_position: "transformed".into(),
            model_matrix: "u_model".into(),
            fragment_output: "out_color".into(),
        }
    }
}

impl BaseContract {
    fn identifiers(&self, stage: ShaderStage) -> Vec<&str> {
        match stage {
            ShaderStage::Vertex => vec![
                self.position_attribute.as_str(),
                self.working_position.as_str(),
                self.model_matrix.as_str(),
            ],
            ShaderStage::Fragment => vec![self.fragment_output.as_str()],
        }
    }
}

/// A base lighting program to compose onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseProgram {
    name: String,
    source: String,
    contract: BaseContract,
}

impl BaseProgram {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            contract: BaseContract::default(),
        }
    }

    /// The standard metallic-roughness program shipped with the crate.
    pub fn standard_pbr() -> Self {
        Self::new("standard_pbr", STANDARD_PBR_GLSL)
    }

    pub fn with_contract(mut self, contract: BaseContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn contract(&self) -> &BaseContract {
        &self.contract
    }
}

/// Where the composer places its injected resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComposerConfig {
    /// Descriptor set of the distortion uniform block.
    pub uniform_set: u32,
    /// Binding of the distortion uniform block within its set.
    pub uniform_binding: u32,
    /// Location of the local-position varying.
    pub local_position_location: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            uniform_set: 2,
            uniform_binding: 7,
            local_position_location: 4,
        }
    }
}

impl ComposerConfig {
    pub fn with_uniform_binding(mut self, set: u32, binding: u32) -> Self {
        self.uniform_set = set;
        self.uniform_binding = binding;
        self
    }

    pub fn with_local_position_location(mut self, location: u32) -> Self {
        self.local_position_location = location;
        self
    }
}

/// A composed program: resolved GLSL per stage. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedProgram {
    name: String,
    vertex_source: String,
    fragment_source: String,
    shader_defs: Vec<(String, ShaderDef)>,
    uniforms: UniformTable,
    key: ProgramKey,
}

impl ComposedProgram {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully resolved GLSL for `stage`. Stage selection happens through defines.
    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex_source,
            ShaderStage::Fragment => &self.fragment_source,
        }
    }

    pub fn shader_defs(&self) -> &[(String, ShaderDef)] {
        &self.shader_defs
    }

    /// The uniform table the program was composed against.
    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn key(&self) -> &ProgramKey {
        &self.key
    }
}

/// WGSL output of [`ShaderComposer::compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub vertex_wgsl: String,
    pub fragment_wgsl: String,
}

impl CompiledProgram {
    pub fn wgsl(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex_wgsl,
            ShaderStage::Fragment => &self.fragment_wgsl,
        }
    }
}

/// Shader composer for injecting distortion logic and resolving includes.
///
/// # Include Syntax
///
/// ```glsl
/// #include "distorted_torus/noise.glsl"
/// ```
///
/// Each path is expanded at most once per stage.
///
/// # Shader Definitions
///
/// [`ShaderDef`]s become preprocessor defines next to the automatic `VERTEX` /
/// `FRAGMENT` stage define. The standard base program understands
/// `HAS_COLOR_MAP`.
pub struct ShaderComposer {
    /// Registered include sources: path -> source text.
    includes: HashMap<String, String>,
    config: ComposerConfig,
}

impl Default for ShaderComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderComposer {
    /// Create a new empty shader composer.
    pub fn new() -> Self {
        Self {
            includes: HashMap::new(),
            config: ComposerConfig::default(),
        }
    }

    /// Create a shader composer with the standard library pre-loaded.
    pub fn with_standard_library() -> Self {
        let mut composer = Self::new();
        composer.add_library(&ShaderLibrary::standard());
        composer
    }

    pub fn with_config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Add a shader library to the composer.
    pub fn add_library(&mut self, library: &ShaderLibrary) {
        for (path, source) in library.modules() {
            self.register_include(path, source);
        }
    }

    /// Register a single include source under the path used in `#include "path"`.
    pub fn register_include(&mut self, path: &str, source: &str) {
        self.includes.insert(path.to_string(), source.to_string());
    }

    /// Resolve `#include` directives in a GLSL source without composing it.
    pub fn resolve_glsl(&self, source: &str) -> Result<String, ComposeError> {
        let mut included = HashSet::new();
        self.resolve_includes(source, &mut included)
    }

    /// Build the defines list for a given stage and user shader defs.
    ///
    /// The stage define is included automatically.
    pub fn build_defines<S: AsRef<str>>(
        stage: ShaderStage,
        shader_defs: &[(S, ShaderDef)],
    ) -> Vec<(String, String)> {
        let mut defines = vec![(stage.define().to_string(), String::new())];

        for (name, def) in shader_defs {
            let name = name.as_ref().to_string();
            match def {
                ShaderDef::Bool(true) => defines.push((name, String::new())),
                ShaderDef::Bool(false) => {}
                ShaderDef::Int(v) => defines.push((name, v.to_string())),
                ShaderDef::UInt(v) => defines.push((name, v.to_string())),
            }
        }

        defines
    }

    /// Compose the distortion material onto `base`.
    ///
    /// Fails without producing anything when the base program breaks its
    /// contract or when `uniforms` lacks one of the distortion uniforms.
    pub fn compose(
        &self,
        base: &BaseProgram,
        uniforms: &UniformTable,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<ComposedProgram, ComposeError> {
        let source = base.source();
        let version_line = find_version_line(source)?;
        validate_distortion_uniforms(uniforms)?;

        let vertex_source = self.compose_stage(base, version_line, ShaderStage::Vertex)?;
        let fragment_source = self.compose_stage(base, version_line, ShaderStage::Fragment)?;

        let key = ProgramKey::new(base, shader_defs, uniforms.layout());
        log::debug!(
            "Composed program `{}` ({} vertex bytes, {} fragment bytes, {} defs)",
            base.name(),
            vertex_source.len(),
            fragment_source.len(),
            shader_defs.len()
        );

        Ok(ComposedProgram {
            name: base.name().to_string(),
            vertex_source,
            fragment_source,
            shader_defs: shader_defs
                .iter()
                .map(|(name, def)| (name.to_string(), def.clone()))
                .collect(),
            uniforms: uniforms.clone(),
            key,
        })
    }

    fn compose_stage(
        &self,
        base: &BaseProgram,
        version_line: usize,
        stage: ShaderStage,
    ) -> Result<String, ComposeError> {
        let source = base.source();
        let anchor_line = find_anchor_line(source, stage)?;
        for identifier in base.contract().identifiers(stage) {
            if !contains_identifier(source, identifier) {
                return Err(ComposeError::MissingIdentifier {
                    identifier: identifier.to_string(),
                    stage,
                });
            }
        }

        let injected = inject(
            source,
            version_line,
            &self.stage_prelude(stage),
            anchor_line,
            &stage_snippet(stage, base.contract()),
        );
        self.resolve_glsl(&injected)
    }

    /// Parse, validate and convert both stages of a composed program to WGSL.
    pub fn compile(&self, program: &ComposedProgram) -> Result<CompiledProgram, ComposeError> {
        let vertex_wgsl = self.compile_stage(program, ShaderStage::Vertex)?;
        let fragment_wgsl = self.compile_stage(program, ShaderStage::Fragment)?;
        log::debug!("Compiled program `{}` to WGSL", program.name());
        Ok(CompiledProgram {
            vertex_wgsl,
            fragment_wgsl,
        })
    }

    fn compile_stage(
        &self,
        program: &ComposedProgram,
        stage: ShaderStage,
    ) -> Result<String, ComposeError> {
        let naga_module = self.compose_to_naga(program, stage)?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        let module_info = validator.validate(&naga_module).map_err(|e| {
            ComposeError::CompilationFailed(format!("{stage:?} validation error: {e}"))
        })?;

        naga::back::wgsl::write_string(
            &naga_module,
            &module_info,
            naga::back::wgsl::WriterFlags::empty(),
        )
        .map_err(|e| ComposeError::CompilationFailed(format!("{stage:?} WGSL generation error: {e}")))
    }

    /// Parse one stage of a composed program into a naga module.
    pub fn compose_to_naga(
        &self,
        program: &ComposedProgram,
        stage: ShaderStage,
    ) -> Result<naga::Module, ComposeError> {
        let mut defines = naga::FastHashMap::default();
        for (name, value) in Self::build_defines(stage, program.shader_defs()) {
            defines.insert(name, value);
        }

        let options = naga::front::glsl::Options {
            stage: stage.to_naga(),
            defines,
        };

        let mut frontend = naga::front::glsl::Frontend::default();
        frontend
            .parse(&options, program.source(stage))
            .map_err(|errors| {
                ComposeError::CompilationFailed(format!("{stage:?} GLSL parse error:\n{errors}"))
            })
    }

    /// Declarations placed right after `#version` for `stage`.
    fn stage_prelude(&self, stage: ShaderStage) -> String {
        let ComposerConfig {
            uniform_set,
            uniform_binding,
            local_position_location,
        } = self.config;

        let mut prelude = format!("layout(set = {uniform_set}, binding = {uniform_binding}) uniform DistortionUniforms {{\n");
        for name in DISTORTION_UNIFORMS {
            prelude.push_str(&format!("    float {name};\n"));
        }
        prelude.push_str("    vec2 u_distortion_padding;\n};\n");

        let (direction, includes) = match stage {
            ShaderStage::Vertex => ("out", [library::NOISE_INCLUDE, library::DISTORTION_INCLUDE]),
            ShaderStage::Fragment => ("in", [library::NOISE_INCLUDE, library::GRAYSCALE_INCLUDE]),
        };
        prelude.push_str(&format!(
            "layout(location = {local_position_location}) {direction} vec3 {LOCAL_POSITION_VARYING};\n"
        ));
        for path in includes {
            prelude.push_str(&format!("#include \"{path}\"\n"));
        }
        prelude
    }

    /// Resolve `#include "path"` directives recursively.
    fn resolve_includes(
        &self,
        source: &str,
        included: &mut HashSet<String>,
    ) -> Result<String, ComposeError> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            if let Some(path) = parse_include_directive(line.trim()) {
                // Skip if already included
                if !included.insert(path.to_string()) {
                    continue;
                }

                let include_source = self
                    .includes
                    .get(path)
                    .ok_or_else(|| ComposeError::IncludeNotFound(path.to_string()))?;

                let resolved = self.resolve_includes(include_source, included)?;
                result.push_str(&resolved);
            } else {
                result.push_str(line);
            }
            result.push('\n');
        }

        Ok(result)
    }
}

/// Code inserted directly after the anchor of `stage`.
fn stage_snippet(stage: ShaderStage, contract: &BaseContract) -> Vec<String> {
    match stage {
        ShaderStage::Vertex => {
            let BaseContract {
                position_attribute: position,
                working_position: working,
                model_matrix: model,
                ..
            } = contract;
            vec![
                format!("{LOCAL_POSITION_VARYING} = {position};"),
                format!("vec4 distort_world_position = {model} * vec4({position}, 1.0);"),
                format!(
                    "float distort_gate = snoise(distort_world_position.xyz / vec3({GATE_NOISE_SCALE:?}) + vec3(u_time * {GATE_TIME_SCALE:?}));"
                ),
                "if (distort_gate > u_threshold) {".to_string(),
                "    float distort_factor = u_distort_amplitude * (distort_gate - u_threshold);"
                    .to_string(),
                format!(
                    "    {working} = distort_torus({working}, u_radius, distort_factor, u_distort_freq, u_distort_speed, u_time);"
                ),
                "}".to_string(),
            ]
        }
        ShaderStage::Fragment => {
            let output = &contract.fragment_output;
            vec![
                format!(
                    "float desaturation_sample = snoise({LOCAL_POSITION_VARYING} / vec3({DESATURATION_NOISE_SCALE:?}) + vec3(u_time * {DESATURATION_TIME_SCALE:?}));"
                ),
                format!("if (desaturation_sample > {DESATURATION_CUTOFF:?}) {{"),
                format!("    {output} = vec4(grayscale({output}.xyz), {output}.w);"),
                "}".to_string(),
            ]
        }
    }
}

/// Splice `prelude` after line `version_line` and `snippet` after line
/// `anchor_line`, keeping the anchor's indentation.
fn inject(
    source: &str,
    version_line: usize,
    prelude: &str,
    anchor_line: usize,
    snippet: &[String],
) -> String {
    let mut out = String::with_capacity(source.len() + prelude.len() + 512);
    for (index, line) in source.lines().enumerate() {
        out.push_str(line);
        out.push('\n');
        if index == version_line {
            out.push_str(prelude);
        }
        if index == anchor_line {
            let indent = &line[..line.len() - line.trim_start().len()];
            for snippet_line in snippet {
                out.push_str(indent);
                out.push_str(snippet_line);
                out.push('\n');
            }
        }
    }
    out
}

/// Index of the `#version` line, checking the version number.
fn find_version_line(source: &str) -> Result<usize, ComposeError> {
    let (index, rest) = source
        .lines()
        .enumerate()
        .find_map(|(i, line)| line.trim().strip_prefix("#version").map(|rest| (i, rest)))
        .ok_or(ComposeError::MissingVersion)?;

    let rest = rest.trim();
    match rest.split_whitespace().next() {
        Some(SUPPORTED_GLSL_VERSION) => Ok(index),
        _ => Err(ComposeError::UnsupportedVersion(rest.to_string())),
    }
}

/// Index of the unique anchor line of `stage`.
fn find_anchor_line(source: &str, stage: ShaderStage) -> Result<usize, ComposeError> {
    let anchor = stage.anchor();
    let matches: Vec<usize> = source
        .lines()
        .enumerate()
        .filter(|(_, line)| parse_anchor(line.trim()) == Some(anchor))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [] => Err(ComposeError::AnchorNotFound { anchor, stage }),
        [index] => Ok(*index),
        _ => Err(ComposeError::DuplicateAnchor {
            anchor,
            stage,
            count: matches.len(),
        }),
    }
}

/// Parse a `// #anchor name` line, returning the name if found.
fn parse_anchor(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("//")?.trim_start();
    let name = rest.strip_prefix("#anchor")?.trim();
    (!name.is_empty()).then_some(name)
}

/// Whether `identifier` occurs in `source` as a whole word.
fn contains_identifier(source: &str, identifier: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    source.match_indices(identifier).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + identifier.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

fn validate_distortion_uniforms(uniforms: &UniformTable) -> Result<(), ComposeError> {
    for name in DISTORTION_UNIFORMS {
        let descriptor = uniforms
            .get_by_shader_name(name)
            .ok_or(ComposeError::UnregisteredUniform(name))?;
        if descriptor.kind != UniformKind::Float {
            return Err(ComposeError::UniformKindMismatch {
                name,
                expected: UniformKind::Float,
                found: descriptor.kind,
            });
        }
    }
    Ok(())
}

/// Parse a `#include "path"` directive, returning the path if found.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?;
    let rest = rest.trim();
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}

/// Shader definition value for compile-time conditionals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShaderDef {
    /// Boolean definition (`#ifdef`, `#ifndef`).
    Bool(bool),
    /// Integer definition (`#if VAR == 5`).
    Int(i32),
    /// Unsigned integer definition.
    UInt(u32),
}

impl From<bool> for ShaderDef {
    fn from(v: bool) -> Self {
        ShaderDef::Bool(v)
    }
}

impl From<i32> for ShaderDef {
    fn from(v: i32) -> Self {
        ShaderDef::Int(v)
    }
}

impl From<u32> for ShaderDef {
    fn from(v: u32) -> Self {
        ShaderDef::UInt(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialState;

    fn compose_standard(defs: &[(&str, ShaderDef)]) -> Result<ComposedProgram, ComposeError> {
        let composer = ShaderComposer::with_standard_library();
        composer.compose(
            &BaseProgram::standard_pbr(),
            &MaterialState::default().uniform_table(),
            defs,
        )
    }

    #[test]
    fn test_prelude_follows_version() {
        let program = compose_standard(&[]).unwrap();
        let vertex = program.source(ShaderStage::Vertex);
        let mut lines = vertex.lines();
        assert_eq!(lines.next(), Some("#version 450"));
        assert_eq!(
            lines.next(),
            Some("layout(set = 2, binding = 7) uniform DistortionUniforms {")
        );
        assert!(vertex.contains("layout(location = 4) out vec3 v_local_position;"));
        assert!(program
            .source(ShaderStage::Fragment)
            .contains("layout(location = 4) in vec3 v_local_position;"));
    }

    #[test]
    fn test_snippets_follow_anchors() {
        let program = compose_standard(&[]).unwrap();
        let vertex = program.source(ShaderStage::Vertex);
        let anchor = vertex.find("// #anchor project_vertex").unwrap();
        let gate = vertex.find("float distort_gate = snoise(").unwrap();
        let projection = vertex.find("vec4 world_position = u_model").unwrap();
        assert!(anchor < gate && gate < projection);
        assert!(vertex.contains("distort_world_position.xyz / vec3(40.0) + vec3(u_time * 0.2)"));

        let fragment = program.source(ShaderStage::Fragment);
        let anchor = fragment.find("// #anchor final_color").unwrap();
        let sample = fragment.find("float desaturation_sample").unwrap();
        assert!(anchor < sample);
        assert!(fragment.contains("snoise(v_local_position / vec3(20.0) + vec3(u_time * 0.1))"));
        assert!(fragment.contains("if (desaturation_sample > 0.5) {"));
    }

    #[test]
    fn test_includes_resolved_once() {
        let program = compose_standard(&[]).unwrap();
        for stage in ShaderStage::ALL {
            let source = program.source(stage);
            assert!(!source.contains("#include"));
            assert_eq!(source.matches("float snoise(vec3 v)").count(), 1);
        }
        assert!(program
            .source(ShaderStage::Vertex)
            .contains("vec3 distort_torus("));
        assert!(program
            .source(ShaderStage::Fragment)
            .contains("vec3 grayscale(vec3 color)"));
    }

    #[test]
    fn test_custom_config() {
        let composer = ShaderComposer::with_standard_library().with_config(
            ComposerConfig::default()
                .with_uniform_binding(3, 0)
                .with_local_position_location(7),
        );
        let program = composer
            .compose(
                &BaseProgram::standard_pbr(),
                &MaterialState::default().uniform_table(),
                &[],
            )
            .unwrap();
        let vertex = program.source(ShaderStage::Vertex);
        assert!(vertex.contains("layout(set = 3, binding = 0) uniform DistortionUniforms"));
        assert!(vertex.contains("layout(location = 7) out vec3 v_local_position;"));
    }

    #[test]
    fn test_missing_version() {
        let base = BaseProgram::new("no_version", STANDARD_PBR_GLSL.replacen("#version 450", "", 1));
        let err = ShaderComposer::with_standard_library()
            .compose(&base, &MaterialState::default().uniform_table(), &[])
            .unwrap_err();
        assert_eq!(err, ComposeError::MissingVersion);
    }

    #[test]
    fn test_unsupported_version() {
        let base = BaseProgram::new("old", STANDARD_PBR_GLSL.replacen("#version 450", "#version 330 core", 1));
        let err = ShaderComposer::with_standard_library()
            .compose(&base, &MaterialState::default().uniform_table(), &[])
            .unwrap_err();
        assert_eq!(err, ComposeError::UnsupportedVersion("330 core".into()));
    }

    #[test]
    fn test_missing_identifier() {
        let contract = BaseContract {
            working_position: "local_pos".into(),
            ..BaseContract::default()
        };
        let base = BaseProgram::standard_pbr().with_contract(contract);
        let err = ShaderComposer::with_standard_library()
            .compose(&base, &MaterialState::default().uniform_table(), &[])
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::MissingIdentifier {
                identifier: "local_pos".into(),
                stage: ShaderStage::Vertex,
            }
        );
    }

    #[test]
    fn test_uniform_kind_mismatch() {
        use crate::material::{UniformDescriptor, UniformGroup};

        let mut table = MaterialState::default().uniform_table();
        table.register(UniformDescriptor::new(
            "radius",
            "u_radius",
            UniformKind::Vec3,
            UniformGroup::Distortion,
        ));
        let err = ShaderComposer::with_standard_library()
            .compose(&BaseProgram::standard_pbr(), &table, &[])
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::UniformKindMismatch {
                name: "u_radius",
                expected: UniformKind::Float,
                found: UniformKind::Vec3,
            }
        );
    }

    #[test]
    fn test_missing_include() {
        let composer = ShaderComposer::new();
        let err = composer
            .compose(
                &BaseProgram::standard_pbr(),
                &MaterialState::default().uniform_table(),
                &[],
            )
            .unwrap_err();
        assert_eq!(
            err,
            ComposeError::IncludeNotFound("distorted_torus/noise.glsl".into())
        );
    }

    #[test]
    fn test_build_defines() {
        let defines = ShaderComposer::build_defines(
            ShaderStage::Fragment,
            &[
                ("HAS_COLOR_MAP", ShaderDef::Bool(true)),
                ("DISABLED", ShaderDef::Bool(false)),
                ("LIGHTS", ShaderDef::UInt(2)),
            ],
        );
        assert_eq!(
            defines,
            vec![
                ("FRAGMENT".to_string(), String::new()),
                ("HAS_COLOR_MAP".to_string(), String::new()),
                ("LIGHTS".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_anchor() {
        assert_eq!(parse_anchor("// #anchor project_vertex"), Some("project_vertex"));
        assert_eq!(parse_anchor("//#anchor final_color"), Some("final_color"));
        assert_eq!(parse_anchor("// #anchor"), None);
        assert_eq!(parse_anchor("//   project_vertex  - note"), None);
    }

    #[test]
    fn test_contains_identifier() {
        let source = "vec3 transformed = a_position;\nfloat u_model_scale;";
        assert!(contains_identifier(source, "transformed"));
        assert!(contains_identifier(source, "a_position"));
        assert!(!contains_identifier(source, "u_model"));
        assert!(!contains_identifier(source, "position"));
    }

    #[test]
    fn test_parse_include_directive() {
        assert_eq!(
            parse_include_directive(r#"#include "foo/bar.glsl""#),
            Some("foo/bar.glsl")
        );
        assert_eq!(
            parse_include_directive(r#"#include <foo/bar.glsl>"#),
            Some("foo/bar.glsl")
        );
        assert_eq!(parse_include_directive("#define FOO"), None);
        assert_eq!(parse_include_directive("// comment"), None);
    }

    #[test]
    fn test_compile_standard_program() {
        let composer = ShaderComposer::with_standard_library();
        let program = composer
            .compose(
                &BaseProgram::standard_pbr(),
                &MaterialState::default().uniform_table(),
                &[],
            )
            .unwrap();
        let compiled = composer.compile(&program);
        assert!(compiled.is_ok(), "Compilation failed: {:?}", compiled.err());
        let compiled = compiled.unwrap();
        assert!(compiled.vertex_wgsl.contains("@vertex"));
        assert!(compiled.fragment_wgsl.contains("@fragment"));
    }
}
