//! Field index builder and accessor
//!
//! Walks a class's declared fields and, per configuration, its ancestor
//! chain up to the stop boundary, building a name-keyed index in which the
//! most-derived declaration wins. Lookups resolve by exact name or by
//! declared type; value operations then read/write the resolved handle's
//! storage, with every storage-level rejection wrapped uniformly as
//! [`ReflectError::Runtime`].

use std::sync::Arc;

use rustc_hash::FxHashMap;

use refract_core::{ClassDef, FieldInfo, ObjectRef, RuntimeError, TypeRef, TypeRegistry, Value};

use crate::config::AccessorConfig;
use crate::error::{ReflectError, ReflectResult};

/// Name-indexed view of a class's fields, own and inherited.
///
/// Immutable once built; safe for unsynchronized concurrent reads.
pub struct FieldAccessor {
    registry: Arc<TypeRegistry>,
    class: Arc<ClassDef>,
    config: AccessorConfig,
    index: FxHashMap<Arc<str>, FieldInfo>,
}

impl std::fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("class", &self.class.name())
            .field("config", &self.config)
            .field("fields", &self.index.len())
            .finish()
    }
}

impl FieldAccessor {
    /// Build the index for `class` under `config`.
    pub fn build(
        registry: Arc<TypeRegistry>,
        class: Arc<ClassDef>,
        config: AccessorConfig,
    ) -> Self {
        let mut index = FxHashMap::default();
        for link in config.chain(&registry, class.clone()) {
            for field in link.fields() {
                if field.is_static && !config.include_static {
                    continue;
                }
                if !index.contains_key(&field.name) {
                    index.insert(field.name.clone(), field.clone());
                }
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

    /// Resolve a field handle by exact name.
    pub fn field(&self, name: &str) -> ReflectResult<&FieldInfo> {
        self.index
            .get(name)
            .ok_or_else(|| ReflectError::FieldNotFound {
                class: self.class.name().clone(),
                query: format!("`{name}`"),
            })
    }

    /// Resolve a field handle by declared type.
    ///
    /// A field matches when its declared type is the queried type's
    /// primitive/boxed equivalent or is assignable from it. Fields
    /// declared with the universal base type never participate. Exactly
    /// one candidate must remain: zero is [`ReflectError::FieldNotFound`],
    /// two or more is [`ReflectError::AmbiguousField`].
    pub fn field_by_type(&self, ty: TypeRef) -> ReflectResult<&FieldInfo> {
        let mut matches = self
            .index
            .values()
            .filter(|field| declared_matches(&self.registry, field.ty, ty));
        let first = matches.next().ok_or_else(|| ReflectError::FieldNotFound {
            class: self.class.name().clone(),
            query: format!("of type {}", self.registry.type_name(ty)),
        })?;
        if matches.next().is_some() {
            return Err(ReflectError::AmbiguousField {
                class: self.class.name().clone(),
                ty: self.registry.type_name(ty),
            });
        }
        Ok(first)
    }

    /// Read an instance field by name. Static handles read static storage
    /// and ignore the target.
    pub fn get(&self, target: &Value, name: &str) -> ReflectResult<Value> {
        self.read(self.field(name)?, Some(target))
    }

    /// Read a static field by name.
    pub fn get_static(&self, name: &str) -> ReflectResult<Value> {
        self.read(self.field(name)?, None)
    }

    /// Read the single field of the given declared type.
    pub fn get_by_type(&self, target: &Value, ty: TypeRef) -> ReflectResult<Value> {
        self.read(self.field_by_type(ty)?, Some(target))
    }

    /// Read the single static field of the given declared type.
    pub fn get_static_by_type(&self, ty: TypeRef) -> ReflectResult<Value> {
        self.read(self.field_by_type(ty)?, None)
    }

    /// Write an instance field by name.
    pub fn set(&self, target: &Value, name: &str, value: Value) -> ReflectResult<()> {
        self.write(self.field(name)?, Some(target), value)
    }

    /// Write a static field by name.
    pub fn set_static(&self, name: &str, value: Value) -> ReflectResult<()> {
        self.write(self.field(name)?, None, value)
    }

    /// Write the single field matching the value's own runtime type.
    pub fn set_by_type(&self, target: &Value, value: Value) -> ReflectResult<()> {
        let ty = value.type_ref().ok_or(ReflectError::NullArgument)?;
        self.write(self.field_by_type(ty)?, Some(target), value)
    }

    /// Write the single static field matching the value's runtime type.
    pub fn set_static_by_type(&self, value: Value) -> ReflectResult<()> {
        let ty = value.type_ref().ok_or(ReflectError::NullArgument)?;
        self.write(self.field_by_type(ty)?, None, value)
    }

    /// All indexed field handles.
    pub fn handles(&self) -> impl Iterator<Item = &FieldInfo> {
        self.index.values()
    }

    /// All indexed field names.
    pub fn names(&self) -> Vec<&str> {
        self.index.keys().map(|name| name.as_ref()).collect()
    }

    /// Whether the named field is static.
    pub fn is_static(&self, name: &str) -> ReflectResult<bool> {
        Ok(self.field(name)?.is_static)
    }

    /// Indexed fields carrying the given attribute tag.
    pub fn with_attribute(&self, attribute: &str) -> Vec<&FieldInfo> {
        self.index
            .values()
            .filter(|field| field.attributes.iter().any(|a| a.as_ref() == attribute))
            .collect()
    }

    /// Number of indexed fields.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the index holds no fields.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn read(&self, field: &FieldInfo, target: Option<&Value>) -> ReflectResult<Value> {
        if field.is_static {
            let class = self.registry.require(field.declaring)?;
            Ok(class.static_value(field.slot)?)
        } else {
            let obj = self.instance_for(field, target)?;
            Ok(obj.get(field.slot)?)
        }
    }

    fn write(&self, field: &FieldInfo, target: Option<&Value>, value: Value) -> ReflectResult<()> {
        if !value_assignable(&self.registry, field.ty, &value) {
            let actual = value
                .type_ref()
                .map(|ty| self.registry.type_name(ty))
                .unwrap_or_else(|| "null".to_string());
            return Err(ReflectError::Runtime(RuntimeError::TypeMismatch {
                expected: self.registry.type_name(field.ty),
                actual,
            }));
        }
        if field.is_static {
            let class = self.registry.require(field.declaring)?;
            Ok(class.set_static_value(field.slot, value)?)
        } else {
            let obj = self.instance_for(field, target)?;
            Ok(obj.set(field.slot, value)?)
        }
    }

    fn instance_for<'a>(
        &self,
        field: &FieldInfo,
        target: Option<&'a Value>,
    ) -> ReflectResult<&'a ObjectRef> {
        match target {
            Some(Value::Object(obj)) => {
                if self.registry.is_subclass_of(obj.class_id(), field.declaring) {
                    Ok(obj)
                } else {
                    Err(ReflectError::Runtime(RuntimeError::ClassMismatch {
                        expected: self
                            .registry
                            .get(field.declaring)
                            .map(|c| c.name().to_string())
                            .unwrap_or_else(|| field.declaring.to_string()),
                        actual: self
                            .registry
                            .get(obj.class_id())
                            .map(|c| c.name().to_string())
                            .unwrap_or_else(|| obj.class_id().to_string()),
                    }))
                }
            }
            Some(Value::Null) | None => Err(ReflectError::Runtime(RuntimeError::NullTarget)),
            Some(_) => Err(ReflectError::Runtime(RuntimeError::NotAnObject)),
        }
    }
}

/// Type-directed match: equivalence or assignability, never the universal
/// base.
fn declared_matches(registry: &TypeRegistry, declared: TypeRef, target: TypeRef) -> bool {
    if declared.is_object_root() {
        return false;
    }
    if declared.canonical_class() == target.canonical_class() {
        return true;
    }
    match (declared, target) {
        (TypeRef::Class(d), TypeRef::Class(t)) => registry.is_subclass_of(t, d),
        _ => false,
    }
}

/// Write-side check: can `value` be stored in a field declared as
/// `declared`? Null assigns to reference types only; the universal base
/// accepts everything.
fn value_assignable(registry: &TypeRegistry, declared: TypeRef, value: &Value) -> bool {
    match value.type_ref() {
        None => matches!(declared, TypeRef::Class(_)),
        Some(ty) => {
            if declared.is_object_root() {
                return true;
            }
            if declared.canonical_class() == ty.canonical_class() {
                return true;
            }
            match (declared, ty) {
                (TypeRef::Class(d), TypeRef::Class(t)) => registry.is_subclass_of(t, d),
                _ => false,
            }
        }
    }
}
