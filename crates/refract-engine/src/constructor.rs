//! Constructor index builder and accessor
//!
//! Restricted form of the method index: constructors are not inherited, so
//! only the class's own declarations are indexed, keyed by the signature
//! codec over the class name and parameter types.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use refract_core::{ClassDef, ConstructorInfo, TypeRef, TypeRegistry, Value};

use crate::error::{ReflectError, ReflectResult};
use crate::signature::{describe, encode, runtime_types, Signature};

/// Signature-indexed view of a class's own constructors.
///
/// Immutable once built; safe for unsynchronized concurrent reads.
pub struct ConstructorAccessor {
    registry: Arc<TypeRegistry>,
    class: Arc<ClassDef>,
    index: FxHashMap<Signature, ConstructorInfo>,
}

impl ConstructorAccessor {
    /// Build the index for `class`. No ancestor walk.
    pub fn build(registry: Arc<TypeRegistry>, class: Arc<ClassDef>) -> Self {
        let mut index = FxHashMap::default();
        for constructor in class.constructors() {
            let signature = encode(Some(class.name().as_ref()), &constructor.params);
            index.entry(signature).or_insert_with(|| constructor.clone());
        }
        Self {
            registry,
            class,
            index,
        }
    }

    /// The class this accessor was built for.
    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    /// Construct a new instance, resolving the constructor from the
    /// argument values' own runtime types.
    ///
    /// Exact signature match, as for methods. Allocation or initialization
    /// failures wrap uniformly as [`ReflectError::Runtime`].
    pub fn construct(&self, args: &[Value]) -> ReflectResult<Value> {
        let types = runtime_types(args)?;
        let signature = encode(Some(self.class.name().as_ref()), &types);
        match self.index.get(&signature) {
            Some(constructor) => Ok(constructor.call(&self.registry, args)?),
            None => Err(ReflectError::ConstructorNotFound {
                signature: describe(&self.registry, self.class.name(), &types),
            }),
        }
    }

    /// Resolve a constructor handle from its declared parameter types.
    pub fn constructor(&self, params: &[TypeRef]) -> ReflectResult<&ConstructorInfo> {
        self.index
            .get(&encode(Some(self.class.name().as_ref()), params))
            .ok_or_else(|| ReflectError::ConstructorNotFound {
                signature: describe(&self.registry, self.class.name(), params),
            })
    }

    /// All indexed constructor handles.
    pub fn handles(&self) -> impl Iterator<Item = &ConstructorInfo> {
        self.index.values()
    }

    /// Number of indexed constructors.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the index holds no constructors.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
