//! Method index builder and accessor
//!
//! Same traversal and shadowing rules as the field index, but keyed by the
//! signature codec over the qualified method name and parameter types, so
//! overloads coexist as distinct entries. Invocation is late-bound: the
//! signature is derived from the argument values' own runtime types at
//! call time and looked up exact-match. There is no subtype-aware
//! fallback: an argument whose runtime type is a strict subtype of a
//! declared parameter type does not resolve.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use refract_core::{ClassDef, MethodInfo, TypeRef, TypeRegistry, Value};

use crate::config::AccessorConfig;
use crate::error::{ReflectError, ReflectResult};
use crate::signature::{describe, encode, runtime_types, Signature};

/// Signature-indexed view of a class's methods, own and inherited.
///
/// Immutable once built; safe for unsynchronized concurrent reads.
pub struct MethodAccessor {
    registry: Arc<TypeRegistry>,
    class: Arc<ClassDef>,
    config: AccessorConfig,
    index: FxHashMap<Signature, MethodInfo>,
}

impl MethodAccessor {
    /// Build the index for `class` under `config`.
    pub fn build(
        registry: Arc<TypeRegistry>,
        class: Arc<ClassDef>,
        config: AccessorConfig,
    ) -> Self {
        let mut index = FxHashMap::default();
        for link in config.chain(&registry, class.clone()) {
            for method in link.methods() {
                if method.is_static && !config.include_static {
                    continue;
                }
                let qualified = qualified(&class, &method.name);
                let signature = encode(Some(qualified.as_str()), &method.params);
                index.entry(signature).or_insert_with(|| method.clone());
            }
        }
        Self {
            registry,
            class,
            config,
            index,
        }
    }

    /// The class this accessor was built for.
    pub fn class(&self) -> &Arc<ClassDef> {
        &self.class
    }

    /// The configuration the index was built with.
    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    /// Invoke a method on `target` by name, resolving the overload from
    /// the argument values' own runtime types.
    ///
    /// Static methods resolve too and ignore the target. Failures raised
    /// by the invoked body, and invocation-step rejections (arity,
    /// null/mismatched target), wrap uniformly as
    /// [`ReflectError::Runtime`].
    pub fn invoke(&self, target: &Value, name: &str, args: &[Value]) -> ReflectResult<Value> {
        self.dispatch(Some(target), name, args)
    }

    /// Invoke a static method by name.
    pub fn invoke_static(&self, name: &str, args: &[Value]) -> ReflectResult<Value> {
        self.dispatch(None, name, args)
    }

    /// Resolve a method handle from its declared parameter types.
    pub fn method(&self, name: &str, params: &[TypeRef]) -> ReflectResult<&MethodInfo> {
        let qualified = qualified(&self.class, name);
        self.index
            .get(&encode(Some(qualified.as_str()), params))
            .ok_or_else(|| ReflectError::MethodNotFound {
                signature: describe(&self.registry, &qualified, params),
            })
    }

    /// All indexed method handles.
    pub fn handles(&self) -> impl Iterator<Item = &MethodInfo> {
        self.index.values()
    }

    /// Number of indexed methods.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the index holds no methods.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn dispatch(
        &self,
        target: Option<&Value>,
        name: &str,
        args: &[Value],
    ) -> ReflectResult<Value> {
        let types = runtime_types(args)?;
        let qualified = qualified(&self.class, name);
        let signature = encode(Some(qualified.as_str()), &types);
        match self.index.get(&signature) {
            Some(method) => Ok(method.call(&self.registry, target, args)?),
            None => Err(ReflectError::MethodNotFound {
                signature: describe(&self.registry, &qualified, &types),
            }),
        }
    }
}

/// Qualified member name. Both index construction and lookup qualify with
/// the requested class's name, so inherited methods resolve under the
/// subclass they were requested through.
fn qualified(class: &ClassDef, name: &str) -> String {
    format!("{}.{}", class.name(), name)
}
