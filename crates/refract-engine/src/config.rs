//! Accessor traversal configuration

use std::sync::Arc;

use refract_core::{well_known, ClassDef, ClassId, TypeRegistry};

/// Visibility and traversal flags, fixed at accessor construction.
///
/// The default mirrors the conventional wide-open setup: statics included,
/// ancestors walked, stopping (exclusively) at the universal base class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorConfig {
    /// Index static members.
    pub include_static: bool,
    /// Walk the ancestor chain beyond the requested class.
    pub recurse_ancestors: bool,
    /// Ancestor at which the walk halts, exclusive. `None` walks the
    /// whole chain, universal base included.
    pub stop_class: Option<ClassId>,
}

impl AccessorConfig {
    /// The default configuration, spelled out.
    pub fn new() -> Self {
        Self {
            include_static: true,
            recurse_ancestors: true,
            stop_class: Some(well_known::OBJECT),
        }
    }

    /// Exclude static members.
    pub fn without_statics(mut self) -> Self {
        self.include_static = false;
        self
    }

    /// Index only the requested class's own members.
    pub fn own_members_only(mut self) -> Self {
        self.recurse_ancestors = false;
        self
    }

    /// Halt the ancestor walk at `class`, exclusive.
    pub fn stop_at(mut self, class: ClassId) -> Self {
        self.stop_class = Some(class);
        self
    }

    /// The classes an index build visits, most-derived first.
    ///
    /// The starting class is always included, even when it equals
    /// `stop_class`; the stop boundary only halts the upward walk.
    pub(crate) fn chain(
        &self,
        registry: &TypeRegistry,
        start: Arc<ClassDef>,
    ) -> Vec<Arc<ClassDef>> {
        let mut chain = Vec::new();
        let mut current = start;
        loop {
            let parent = current.parent();
            chain.push(current);
            if !self.recurse_ancestors {
                break;
            }
            match parent {
                None => break,
                Some(p) if Some(p) == self.stop_class => break,
                Some(p) => match registry.get(p) {
                    Some(next) => current = next,
                    None => break,
                },
            }
        }
        chain
    }
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self::new()
    }
}
