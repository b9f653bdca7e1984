//! Program cache keyed by program shape, never by uniform values.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{BaseProgram, ComposedProgram, ShaderComposer, ShaderDef};
use crate::error::ComposeError;
use crate::material::{UniformLayout, UniformTable};

/// Identity of a composed program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    base_hash: u64,
    shader_defs: Vec<(String, ShaderDef)>,
    layout: UniformLayout,
}

impl ProgramKey {
    /// Shader defs are sorted by name, so their order does not matter.
    pub fn new(base: &BaseProgram, shader_defs: &[(&str, ShaderDef)], layout: UniformLayout) -> Self {
        let mut hasher = DefaultHasher::new();
        base.source().hash(&mut hasher);
        base.contract().hash(&mut hasher);

        let mut shader_defs: Vec<_> = shader_defs
            .iter()
            .map(|(name, def)| (name.to_string(), def.clone()))
            .collect();
        shader_defs.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            base_hash: hasher.finish(),
            shader_defs,
            layout,
        }
    }
}

/// Composes each distinct program once and hands out shared references.
#[derive(Default)]
pub struct ProgramCache {
    programs: HashMap<ProgramKey, Arc<ComposedProgram>>,
    builds: usize,
    hits: usize,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached program for this shape, composing it on first use.
    pub fn get_or_compose(
        &mut self,
        composer: &ShaderComposer,
        base: &BaseProgram,
        uniforms: &UniformTable,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<Arc<ComposedProgram>, ComposeError> {
        let key = ProgramKey::new(base, shader_defs, uniforms.layout());
        if let Some(program) = self.programs.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(program));
        }

        let program = Arc::new(composer.compose(base, uniforms, shader_defs)?);
        self.builds += 1;
        log::debug!(
            "Program cache miss for `{}`, {} program(s) cached",
            base.name(),
            self.programs.len() + 1
        );
        self.programs.insert(key, Arc::clone(&program));
        Ok(program)
    }

    /// Number of programs composed so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn clear(&mut self) {
        self.programs.clear();
    }
}
