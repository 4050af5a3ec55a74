//! Type-keyed accessor cache and facade
//!
//! [`Reflector`] is the entry point generic code talks to: it hands out
//! field/method/constructor accessors for a class, building each one
//! lazily and at most once. It is an explicit, injectable component: a
//! process typically owns one for its registry, and tests construct
//! isolated instances freely.

use std::sync::Arc;

use dashmap::DashMap;

use refract_core::{ClassId, TypeRegistry};

use crate::config::AccessorConfig;
use crate::constructor::ConstructorAccessor;
use crate::error::{ReflectError, ReflectResult};
use crate::field::FieldAccessor;
use crate::method::MethodAccessor;

/// Lazily populated, per-class accessor cache over a type registry.
///
/// Each accessor kind is cached independently, keyed by class id alone.
/// The first request for a `(kind, class)` pair builds the accessor under
/// that key's map entry, so concurrent first requests perform exactly one
/// build and unrelated classes never contend; entries are never evicted.
///
/// Because the key is the class alone, the [`AccessorConfig`] is honored
/// only on the *first* build for a class. A later request for the same
/// class with a different configuration returns the first-built accessor
/// unchanged.
pub struct Reflector {
    registry: Arc<TypeRegistry>,
    fields: DashMap<ClassId, Arc<FieldAccessor>>,
    methods: DashMap<ClassId, Arc<MethodAccessor>>,
    constructors: DashMap<ClassId, Arc<ConstructorAccessor>>,
}

impl Reflector {
    /// A fresh, empty cache over `registry`.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            fields: DashMap::new(),
            methods: DashMap::new(),
            constructors: DashMap::new(),
        }
    }

    /// The registry this cache resolves classes against.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Field accessor for `class` under the default configuration.
    pub fn field_accessor(&self, class: ClassId) -> ReflectResult<Arc<FieldAccessor>> {
        self.field_accessor_with(class, AccessorConfig::default())
    }

    /// Field accessor for `class`; `config` applies only if this is the
    /// first build for the class.
    pub fn field_accessor_with(
        &self,
        class: ClassId,
        config: AccessorConfig,
    ) -> ReflectResult<Arc<FieldAccessor>> {
        if let Some(cached) = self.fields.get(&class) {
            return Ok(cached.clone());
        }
        let def = self
            .registry
            .get(class)
            .ok_or(ReflectError::UnknownClass(class))?;
        let accessor = self
            .fields
            .entry(class)
            .or_insert_with(|| {
                Arc::new(FieldAccessor::build(self.registry.clone(), def, config))
            })
            .clone();
        Ok(accessor)
    }

    /// Method accessor for `class` under the default configuration.
    pub fn method_accessor(&self, class: ClassId) -> ReflectResult<Arc<MethodAccessor>> {
        self.method_accessor_with(class, AccessorConfig::default())
    }

    /// Method accessor for `class`; `config` applies only if this is the
    /// first build for the class.
    pub fn method_accessor_with(
        &self,
        class: ClassId,
        config: AccessorConfig,
    ) -> ReflectResult<Arc<MethodAccessor>> {
        if let Some(cached) = self.methods.get(&class) {
            return Ok(cached.clone());
        }
        let def = self
            .registry
            .get(class)
            .ok_or(ReflectError::UnknownClass(class))?;
        let accessor = self
            .methods
            .entry(class)
            .or_insert_with(|| {
                Arc::new(MethodAccessor::build(self.registry.clone(), def, config))
            })
            .clone();
        Ok(accessor)
    }

    /// Constructor accessor for `class`. Constructors take no traversal
    /// configuration: only the class's own declarations are indexed.
    pub fn constructor_accessor(
        &self,
        class: ClassId,
    ) -> ReflectResult<Arc<ConstructorAccessor>> {
        if let Some(cached) = self.constructors.get(&class) {
            return Ok(cached.clone());
        }
        let def = self
            .registry
            .get(class)
            .ok_or(ReflectError::UnknownClass(class))?;
        let accessor = self
            .constructors
            .entry(class)
            .or_insert_with(|| Arc::new(ConstructorAccessor::build(self.registry.clone(), def)))
            .clone();
        Ok(accessor)
    }
}
