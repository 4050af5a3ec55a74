//! Class registry
//!
//! Process-lifetime store of resolved classes. Append-only: classes are
//! never removed or replaced, so handed-out `Arc<ClassDef>`s stay valid
//! and identity-stable for the life of the registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::class::{ClassDef, ClassDefinition};
use crate::error::{RuntimeError, RuntimeResult};
use crate::types::{well_known, ClassId, TypeRef};
use crate::value::Value;

/// Concurrent registry of class definitions.
///
/// Construction bootstraps the well-known classes (`Object`, the eight
/// primitive wrappers, `String`) at their fixed
/// [`well_known`] ids.
pub struct TypeRegistry {
    classes: DashMap<ClassId, Arc<ClassDef>>,
    names: DashMap<String, ClassId>,
    next_id: AtomicUsize,
}

impl TypeRegistry {
    /// Fresh registry with the bootstrap classes installed.
    pub fn new() -> Self {
        let registry = Self {
            classes: DashMap::new(),
            names: DashMap::new(),
            next_id: AtomicUsize::new(well_known::FIRST_USER.as_usize()),
        };
        registry.install_bootstrap();
        registry
    }

    fn install_bootstrap(&self) {
        let bootstrap = [
            (well_known::OBJECT, "Object", None),
            (well_known::BOOLEAN, "Boolean", Some(well_known::OBJECT)),
            (well_known::CHAR, "Char", Some(well_known::OBJECT)),
            (well_known::BYTE, "Byte", Some(well_known::OBJECT)),
            (well_known::SHORT, "Short", Some(well_known::OBJECT)),
            (well_known::INT, "Int", Some(well_known::OBJECT)),
            (well_known::LONG, "Long", Some(well_known::OBJECT)),
            (well_known::FLOAT, "Float", Some(well_known::OBJECT)),
            (well_known::DOUBLE, "Double", Some(well_known::OBJECT)),
            (well_known::STRING, "String", Some(well_known::OBJECT)),
        ];
        for (id, name, parent) in bootstrap {
            let class = Arc::new(ClassDef::bootstrap(id, name, parent));
            self.classes.insert(id, class);
            self.names.insert(name.to_string(), id);
        }
    }

    /// Resolve and register a class declaration.
    ///
    /// Classes without an explicit parent extend the universal base. Fails
    /// when the name is already taken or the parent is not registered.
    pub fn define(&self, mut def: ClassDefinition) -> RuntimeResult<Arc<ClassDef>> {
        if def.parent.is_none() {
            def.parent = Some(well_known::OBJECT);
        }
        let parent = match def.parent {
            Some(parent_id) => Some(self.require(parent_id)?),
            None => None,
        };

        // The name entry is the registration gate: holding it makes the
        // id-map insert and the name publish atomic with respect to other
        // definers of the same name.
        match self.names.entry(def.name.clone()) {
            Entry::Occupied(_) => Err(RuntimeError::DuplicateClass(def.name)),
            Entry::Vacant(vacant) => {
                let id = ClassId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let class = Arc::new(ClassDef::resolve(id, def, parent.as_deref()));
                self.classes.insert(id, class.clone());
                vacant.insert(id);
                Ok(class)
            }
        }
    }

    /// Class by id.
    pub fn get(&self, id: ClassId) -> Option<Arc<ClassDef>> {
        self.classes.get(&id).map(|entry| entry.clone())
    }

    /// Class by id, failing on unregistered ids.
    pub fn require(&self, id: ClassId) -> RuntimeResult<Arc<ClassDef>> {
        self.get(id).ok_or(RuntimeError::UnknownClass(id))
    }

    /// Class by registered name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<ClassDef>> {
        let id = *self.names.get(name)?;
        self.get(id)
    }

    /// True when `sub` is `sup` or descends from it.
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut current = Some(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.get(id).and_then(|class| class.parent());
        }
        false
    }

    /// True when `value` is an object of `class` or one of its descendants.
    pub fn is_instance_of(&self, value: &Value, class: ClassId) -> bool {
        match value.as_object() {
            Some(obj) => self.is_subclass_of(obj.class_id(), class),
            None => false,
        }
    }

    /// Inheritance chain from `id` (inclusive) up to the root.
    pub fn hierarchy(&self, id: ClassId) -> Vec<Arc<ClassDef>> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            match self.get(id) {
                Some(class) => {
                    current = class.parent();
                    chain.push(class);
                }
                None => break,
            }
        }
        chain
    }

    /// Simple display name of a type reference, for signatures and errors.
    pub fn type_name(&self, ty: TypeRef) -> String {
        match ty {
            TypeRef::Primitive(p) => p.name().to_string(),
            TypeRef::Class(id) => match self.get(id) {
                Some(class) => class.name().to_string(),
                None => id.to_string(),
            },
        }
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ConstructorDefinition, FieldDefinition, MethodDefinition};
    use crate::types::Primitive;

    #[test]
    fn test_bootstrap_classes_at_well_known_ids() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.class_count(), 10);

        let object = registry.get(well_known::OBJECT).unwrap();
        assert_eq!(object.name().as_ref(), "Object");
        assert_eq!(object.parent(), None);

        let int = registry.get(well_known::INT).unwrap();
        assert_eq!(int.name().as_ref(), "Int");
        assert_eq!(int.parent(), Some(well_known::OBJECT));

        assert_eq!(
            registry.get_by_name("String").unwrap().id(),
            well_known::STRING
        );
    }

    #[test]
    fn test_define_assigns_fresh_ids() {
        let registry = TypeRegistry::new();
        let a = registry.define(ClassDefinition::new("A")).unwrap();
        let b = registry.define(ClassDefinition::new("B")).unwrap();

        assert_eq!(a.id(), well_known::FIRST_USER);
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.get_by_name("A").unwrap().id(), a.id());
    }

    #[test]
    fn test_implicit_parent_is_object() {
        let registry = TypeRegistry::new();
        let a = registry.define(ClassDefinition::new("A")).unwrap();
        assert_eq!(a.parent(), Some(well_known::OBJECT));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = TypeRegistry::new();
        registry.define(ClassDefinition::new("A")).unwrap();
        assert_eq!(
            registry
                .define(ClassDefinition::new("A"))
                .map(|c| c.id())
                .unwrap_err(),
            RuntimeError::DuplicateClass("A".to_string())
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let registry = TypeRegistry::new();
        let missing = ClassId(999);
        assert_eq!(
            registry
                .define(ClassDefinition::new("A").with_parent(missing))
                .map(|c| c.id())
                .unwrap_err(),
            RuntimeError::UnknownClass(missing)
        );
    }

    #[test]
    fn test_subclass_chain() {
        let registry = TypeRegistry::new();
        let animal = registry.define(ClassDefinition::new("Animal")).unwrap();
        let dog = registry
            .define(ClassDefinition::new("Dog").with_parent(animal.id()))
            .unwrap();
        let labrador = registry
            .define(ClassDefinition::new("Labrador").with_parent(dog.id()))
            .unwrap();

        assert!(registry.is_subclass_of(labrador.id(), animal.id()));
        assert!(registry.is_subclass_of(labrador.id(), labrador.id()));
        assert!(registry.is_subclass_of(dog.id(), well_known::OBJECT));
        assert!(!registry.is_subclass_of(animal.id(), dog.id()));
    }

    #[test]
    fn test_hierarchy_most_derived_first() {
        let registry = TypeRegistry::new();
        let animal = registry.define(ClassDefinition::new("Animal")).unwrap();
        let dog = registry
            .define(ClassDefinition::new("Dog").with_parent(animal.id()))
            .unwrap();

        let chain = registry.hierarchy(dog.id());
        let names: Vec<&str> = chain.iter().map(|c| c.name().as_ref()).collect();
        assert_eq!(names, vec!["Dog", "Animal", "Object"]);
    }

    #[test]
    fn test_is_instance_of_follows_inheritance() {
        let registry = TypeRegistry::new();
        let animal = registry.define(ClassDefinition::new("Animal")).unwrap();
        let dog = registry
            .define(ClassDefinition::new("Dog").with_parent(animal.id()))
            .unwrap();

        let instance = Value::Object(dog.allocate());
        assert!(registry.is_instance_of(&instance, dog.id()));
        assert!(registry.is_instance_of(&instance, animal.id()));
        assert!(registry.is_instance_of(&instance, well_known::OBJECT));
        assert!(!registry.is_instance_of(&Value::Int(1), well_known::INT));
    }

    #[test]
    fn test_inherited_slot_layout() {
        let registry = TypeRegistry::new();
        let animal = registry
            .define(
                ClassDefinition::new("Animal")
                    .add_field(FieldDefinition::new("legs", Primitive::Int)),
            )
            .unwrap();
        let dog = registry
            .define(
                ClassDefinition::new("Dog")
                    .with_parent(animal.id())
                    .add_field(FieldDefinition::new(
                        "breed",
                        TypeRef::Class(well_known::STRING),
                    )),
            )
            .unwrap();

        assert_eq!(animal.fields()[0].slot, 0);
        assert_eq!(dog.fields()[0].slot, 1);
        assert_eq!(dog.instance_slot_count(), 2);
    }

    #[test]
    fn test_method_dispatch_through_registry() {
        let registry = TypeRegistry::new();
        let counter = registry
            .define(
                ClassDefinition::new("Counter")
                    .add_field(FieldDefinition::new("count", Primitive::Int))
                    .add_method(
                        MethodDefinition::new("bump", |call| {
                            let obj = call.instance()?;
                            let count = obj.get(0)?.as_int().unwrap_or(0);
                            obj.set(0, Value::Int(count + 1))?;
                            Ok(Value::Int(count + 1))
                        }),
                    ),
            )
            .unwrap();

        let instance = Value::Object(counter.allocate());
        let bump = &counter.methods()[0];
        assert_eq!(
            bump.call(&registry, Some(&instance), &[]).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            bump.call(&registry, Some(&instance), &[]).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn test_instance_method_rejects_bad_targets() {
        let registry = TypeRegistry::new();
        let a = registry
            .define(
                ClassDefinition::new("A")
                    .add_method(MethodDefinition::new("id", |_| Ok(Value::Null))),
            )
            .unwrap();
        let b = registry.define(ClassDefinition::new("B")).unwrap();
        let method = &a.methods()[0];

        assert_eq!(
            method.call(&registry, None, &[]).unwrap_err(),
            RuntimeError::NullTarget
        );
        assert_eq!(
            method.call(&registry, Some(&Value::Null), &[]).unwrap_err(),
            RuntimeError::NullTarget
        );
        assert_eq!(
            method
                .call(&registry, Some(&Value::Int(1)), &[])
                .unwrap_err(),
            RuntimeError::NotAnObject
        );
        let wrong = Value::Object(b.allocate());
        assert!(matches!(
            method.call(&registry, Some(&wrong), &[]).unwrap_err(),
            RuntimeError::ClassMismatch { .. }
        ));
    }

    #[test]
    fn test_arity_checked_before_dispatch() {
        let registry = TypeRegistry::new();
        let a = registry
            .define(ClassDefinition::new("A").add_method(
                MethodDefinition::new("one", |_| Ok(Value::Null)).param(Primitive::Int),
            ))
            .unwrap();
        let instance = Value::Object(a.allocate());

        assert_eq!(
            a.methods()[0]
                .call(&registry, Some(&instance), &[])
                .unwrap_err(),
            RuntimeError::ArityMismatch {
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_constructor_dispatch() {
        let registry = TypeRegistry::new();
        let point = registry
            .define(
                ClassDefinition::new("Point")
                    .add_field(FieldDefinition::new("x", Primitive::Int))
                    .add_field(FieldDefinition::new("y", Primitive::Int))
                    .add_constructor(
                        ConstructorDefinition::new(|call| {
                            let obj = call.class.allocate();
                            obj.set(0, call.arg(0)?.clone())?;
                            obj.set(1, call.arg(1)?.clone())?;
                            Ok(Value::Object(obj))
                        })
                        .param(Primitive::Int)
                        .param(Primitive::Int),
                    ),
            )
            .unwrap();

        let value = point.constructors()[0]
            .call(&registry, &[Value::Int(3), Value::Int(4)])
            .unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get(0).unwrap(), Value::Int(3));
        assert_eq!(obj.get(1).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_type_name_rendering() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.type_name(TypeRef::Primitive(Primitive::Int)), "int");
        assert_eq!(
            registry.type_name(TypeRef::Class(well_known::STRING)),
            "String"
        );
    }
}
