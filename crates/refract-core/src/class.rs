//! Class descriptors and declared members
//!
//! A class is declared with builder-style definitions ([`ClassDefinition`],
//! [`FieldDefinition`], [`MethodDefinition`], [`ConstructorDefinition`]) and
//! resolved by the registry into an immutable [`ClassDef`]: slot layout for
//! instance fields (ancestors first), static storage, and member metadata
//! in declaration order.
//!
//! Method and constructor bodies are native closures receiving a
//! [`NativeCall`] context. Storage access is slot-indexed and visibility
//! blind; [`Visibility`] is carried as metadata for introspection layers.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{RuntimeError, RuntimeResult};
use crate::registry::TypeRegistry;
use crate::types::{ClassId, TypeRef};
use crate::value::{Object, ObjectRef, Value};

/// Declared member visibility. Metadata only: storage primitives do not
/// gate on it, which is what lets an introspection layer access private
/// members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visible everywhere.
    #[default]
    Public,
    /// Visible to the class and its descendants.
    Protected,
    /// Visible to the declaring class only.
    Private,
}

/// Invocation context handed to a member body.
pub struct NativeCall<'a> {
    /// The registry the declaring class lives in.
    pub registry: &'a TypeRegistry,
    /// The member's declaring class.
    pub class: &'a ClassDef,
    /// Target value for instance members, `None` for statics and
    /// constructors.
    pub target: Option<&'a Value>,
    /// Argument values, already arity-checked against the declaration.
    pub args: &'a [Value],
}

impl NativeCall<'_> {
    /// The target as an object reference.
    pub fn instance(&self) -> RuntimeResult<&ObjectRef> {
        match self.target {
            Some(Value::Object(obj)) => Ok(obj),
            Some(Value::Null) | None => Err(RuntimeError::NullTarget),
            Some(_) => Err(RuntimeError::NotAnObject),
        }
    }

    /// Argument by position.
    pub fn arg(&self, index: usize) -> RuntimeResult<&Value> {
        self.args.get(index).ok_or(RuntimeError::ArityMismatch {
            expected: index + 1,
            actual: self.args.len(),
        })
    }
}

/// A method or constructor implementation.
pub type MemberBody =
    Arc<dyn Fn(&NativeCall<'_>) -> RuntimeResult<Value> + Send + Sync + 'static>;

/// Declared field, before registration.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub(crate) name: String,
    pub(crate) ty: TypeRef,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) initial: Option<Value>,
    pub(crate) attributes: Vec<String>,
}

impl FieldDefinition {
    /// A public instance field.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            visibility: Visibility::Public,
            is_static: false,
            initial: None,
            attributes: Vec::new(),
        }
    }

    /// Mark as static.
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as private.
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as protected.
    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }

    /// Seed value for static storage. Instance fields start null and are
    /// initialized by constructor bodies.
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Attach an attribute tag.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

/// Declared method, before registration.
#[derive(Clone)]
pub struct MethodDefinition {
    pub(crate) name: String,
    pub(crate) params: Vec<TypeRef>,
    pub(crate) ret: Option<TypeRef>,
    pub(crate) visibility: Visibility,
    pub(crate) is_static: bool,
    pub(crate) body: MemberBody,
}

impl MethodDefinition {
    /// A public niladic instance method.
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&NativeCall<'_>) -> RuntimeResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            ret: None,
            visibility: Visibility::Public,
            is_static: false,
            body: Arc::new(body),
        }
    }

    /// Append a parameter type.
    pub fn param(mut self, ty: impl Into<TypeRef>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Declare the return type (`None` means void; void methods return
    /// [`Value::Null`]).
    pub fn returns(mut self, ty: impl Into<TypeRef>) -> Self {
        self.ret = Some(ty.into());
        self
    }

    /// Mark as static.
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as private.
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as protected.
    pub fn protected(mut self) -> Self {
        self.visibility = Visibility::Protected;
        self
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .finish()
    }
}

/// Declared constructor, before registration.
#[derive(Clone)]
pub struct ConstructorDefinition {
    pub(crate) params: Vec<TypeRef>,
    pub(crate) visibility: Visibility,
    pub(crate) body: MemberBody,
}

impl ConstructorDefinition {
    /// A public niladic constructor.
    pub fn new(
        body: impl Fn(&NativeCall<'_>) -> RuntimeResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params: Vec::new(),
            visibility: Visibility::Public,
            body: Arc::new(body),
        }
    }

    /// Append a parameter type.
    pub fn param(mut self, ty: impl Into<TypeRef>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Mark as private.
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }
}

impl fmt::Debug for ConstructorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDefinition")
            .field("params", &self.params)
            .finish()
    }
}

/// Complete declaration of a class, passed to
/// [`TypeRegistry::define`](crate::TypeRegistry::define).
#[derive(Debug, Clone, Default)]
pub struct ClassDefinition {
    pub(crate) name: String,
    pub(crate) parent: Option<ClassId>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) methods: Vec<MethodDefinition>,
    pub(crate) constructors: Vec<ConstructorDefinition>,
}

impl ClassDefinition {
    /// A class extending the universal base.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Extend a specific parent class.
    pub fn with_parent(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a field.
    pub fn add_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a method.
    pub fn add_method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare a constructor. If a class declares none, registration
    /// synthesizes a niladic default that allocates a null-initialized
    /// instance.
    pub fn add_constructor(mut self, constructor: ConstructorDefinition) -> Self {
        self.constructors.push(constructor);
        self
    }
}

/// Resolved field metadata.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name.
    pub name: Arc<str>,
    /// Declared type.
    pub ty: TypeRef,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Static flag.
    pub is_static: bool,
    /// Instance slot index (absolute) or static storage index.
    pub slot: usize,
    /// Declaring class.
    pub declaring: ClassId,
    /// Attribute tags.
    pub attributes: Vec<Arc<str>>,
}

/// Resolved method metadata plus its body.
#[derive(Clone)]
pub struct MethodInfo {
    /// Method name.
    pub name: Arc<str>,
    /// Declared parameter types, in order.
    pub params: Vec<TypeRef>,
    /// Declared return type (`None` means void).
    pub ret: Option<TypeRef>,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Static flag.
    pub is_static: bool,
    /// Declaring class.
    pub declaring: ClassId,
    body: MemberBody,
}

impl MethodInfo {
    /// Dispatch the method body.
    ///
    /// Checks arity and, for instance methods, that `target` is an object
    /// of the declaring class or one of its descendants. Static methods
    /// ignore `target` entirely. Failures raised by the body propagate
    /// unchanged.
    pub fn call(
        &self,
        registry: &TypeRegistry,
        target: Option<&Value>,
        args: &[Value],
    ) -> RuntimeResult<Value> {
        if args.len() != self.params.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        let class = registry.require(self.declaring)?;
        let target = if self.is_static {
            None
        } else {
            Some(check_target(registry, &class, target)?)
        };
        (self.body)(&NativeCall {
            registry,
            class: &class,
            target,
            args,
        })
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .field("declaring", &self.declaring)
            .finish()
    }
}

/// Resolved constructor metadata plus its body.
#[derive(Clone)]
pub struct ConstructorInfo {
    /// Declared parameter types, in order.
    pub params: Vec<TypeRef>,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Declaring class.
    pub declaring: ClassId,
    body: MemberBody,
}

impl ConstructorInfo {
    /// Dispatch the constructor body, yielding the new instance.
    pub fn call(&self, registry: &TypeRegistry, args: &[Value]) -> RuntimeResult<Value> {
        if args.len() != self.params.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        let class = registry.require(self.declaring)?;
        (self.body)(&NativeCall {
            registry,
            class: &class,
            target: None,
            args,
        })
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("params", &self.params)
            .field("declaring", &self.declaring)
            .finish()
    }
}

fn check_target<'a>(
    registry: &TypeRegistry,
    declaring: &ClassDef,
    target: Option<&'a Value>,
) -> RuntimeResult<&'a Value> {
    match target {
        Some(value @ Value::Object(obj)) => {
            if registry.is_subclass_of(obj.class_id(), declaring.id()) {
                Ok(value)
            } else {
                Err(RuntimeError::ClassMismatch {
                    expected: declaring.name().to_string(),
                    actual: registry
                        .get(obj.class_id())
                        .map(|c| c.name().to_string())
                        .unwrap_or_else(|| obj.class_id().to_string()),
                })
            }
        }
        Some(Value::Null) | None => Err(RuntimeError::NullTarget),
        Some(_) => Err(RuntimeError::NotAnObject),
    }
}

/// An immutable, resolved class: the type descriptor the accessor layer
/// introspects.
pub struct ClassDef {
    id: ClassId,
    name: Arc<str>,
    parent: Option<ClassId>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    constructors: Vec<ConstructorInfo>,
    /// Total instance slots including inherited ones.
    instance_slots: usize,
    statics: RwLock<Vec<Value>>,
}

impl ClassDef {
    /// Resolve a declaration against its (already resolved) parent.
    pub(crate) fn resolve(
        id: ClassId,
        def: ClassDefinition,
        parent: Option<&ClassDef>,
    ) -> Self {
        let base = parent.map_or(0, |p| p.instance_slot_count());
        let mut fields = Vec::with_capacity(def.fields.len());
        let mut statics = Vec::new();
        let mut next_instance = base;
        for f in def.fields {
            let slot = if f.is_static {
                statics.push(f.initial.unwrap_or(Value::Null));
                statics.len() - 1
            } else {
                let slot = next_instance;
                next_instance += 1;
                slot
            };
            fields.push(FieldInfo {
                name: Arc::from(f.name),
                ty: f.ty,
                visibility: f.visibility,
                is_static: f.is_static,
                slot,
                declaring: id,
                attributes: f.attributes.into_iter().map(Arc::from).collect(),
            });
        }

        let methods = def
            .methods
            .into_iter()
            .map(|m| MethodInfo {
                name: Arc::from(m.name),
                params: m.params,
                ret: m.ret,
                visibility: m.visibility,
                is_static: m.is_static,
                declaring: id,
                body: m.body,
            })
            .collect();

        let mut constructors: Vec<ConstructorInfo> = def
            .constructors
            .into_iter()
            .map(|c| ConstructorInfo {
                params: c.params,
                visibility: c.visibility,
                declaring: id,
                body: c.body,
            })
            .collect();
        if constructors.is_empty() {
            constructors.push(ConstructorInfo {
                params: Vec::new(),
                visibility: Visibility::Public,
                declaring: id,
                body: Arc::new(|call: &NativeCall<'_>| {
                    Ok(Value::Object(call.class.allocate()))
                }),
            });
        }

        Self {
            id,
            name: Arc::from(def.name),
            parent: def.parent,
            fields,
            methods,
            constructors,
            instance_slots: next_instance,
            statics: RwLock::new(statics),
        }
    }

    /// A bootstrap class: no members, no constructors.
    pub(crate) fn bootstrap(id: ClassId, name: &str, parent: Option<ClassId>) -> Self {
        Self {
            id,
            name: Arc::from(name),
            parent,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            instance_slots: 0,
            statics: RwLock::new(Vec::new()),
        }
    }

    /// Class identity.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Registered name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Immediate ancestor, `None` only for the universal base.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Own declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Own declared methods, in declaration order.
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// Own declared constructors.
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// Total instance slots including inherited ones.
    pub fn instance_slot_count(&self) -> usize {
        self.instance_slots
    }

    /// Number of own static storage slots.
    pub fn static_count(&self) -> usize {
        self.statics.read().len()
    }

    /// Read a static storage slot.
    pub fn static_value(&self, slot: usize) -> RuntimeResult<Value> {
        let statics = self.statics.read();
        statics
            .get(slot)
            .cloned()
            .ok_or(RuntimeError::SlotOutOfBounds {
                slot,
                len: statics.len(),
            })
    }

    /// Write a static storage slot.
    pub fn set_static_value(&self, slot: usize, value: Value) -> RuntimeResult<()> {
        let mut statics = self.statics.write();
        let len = statics.len();
        match statics.get_mut(slot) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(RuntimeError::SlotOutOfBounds { slot, len }),
        }
    }

    /// Allocate an instance with every slot null.
    pub fn allocate(&self) -> ObjectRef {
        ObjectRef::new(Object::new(self.id, self.instance_slots))
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .field("instance_slots", &self.instance_slots)
            .finish()
    }
}
