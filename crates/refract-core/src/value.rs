//! Runtime values and instance storage
//!
//! A [`Value`] is either null, one of the eight unboxed primitives, a
//! string, or a shared reference to a heap object. Values are cheap to
//! clone; objects clone by reference and compare by identity.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{RuntimeError, RuntimeResult};
use crate::types::{well_known, ClassId, Primitive, TypeRef};

/// A dynamic runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value. A null has no runtime type.
    Null,
    /// Boolean primitive.
    Bool(bool),
    /// Character primitive.
    Char(char),
    /// 8-bit integer primitive.
    Byte(i8),
    /// 16-bit integer primitive.
    Short(i16),
    /// 32-bit integer primitive.
    Int(i32),
    /// 64-bit integer primitive.
    Long(i64),
    /// 32-bit float primitive.
    Float(f32),
    /// 64-bit float primitive.
    Double(f64),
    /// Immutable string.
    Str(Arc<str>),
    /// Shared reference to a heap object.
    Object(ObjectRef),
}

impl Value {
    /// String value from anything string-like.
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// The value's own concrete runtime type, or `None` for null.
    pub fn type_ref(&self) -> Option<TypeRef> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeRef::Primitive(Primitive::Bool)),
            Value::Char(_) => Some(TypeRef::Primitive(Primitive::Char)),
            Value::Byte(_) => Some(TypeRef::Primitive(Primitive::Byte)),
            Value::Short(_) => Some(TypeRef::Primitive(Primitive::Short)),
            Value::Int(_) => Some(TypeRef::Primitive(Primitive::Int)),
            Value::Long(_) => Some(TypeRef::Primitive(Primitive::Long)),
            Value::Float(_) => Some(TypeRef::Primitive(Primitive::Float)),
            Value::Double(_) => Some(TypeRef::Primitive(Primitive::Double)),
            Value::Str(_) => Some(TypeRef::Class(well_known::STRING)),
            Value::Object(obj) => Some(TypeRef::Class(obj.class_id())),
        }
    }

    /// True for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the object reference, if this is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The `i32` payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The `i64` payload, if this is a `Long`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// The `bool` payload, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}

/// Instance state: the owning class and one slot per instance field,
/// ancestors' slots first.
#[derive(Debug, Clone)]
pub struct Object {
    class_id: ClassId,
    fields: Vec<Value>,
}

impl Object {
    /// Fresh instance with every slot null.
    pub fn new(class_id: ClassId, field_count: usize) -> Self {
        Self {
            class_id,
            fields: vec![Value::Null; field_count],
        }
    }

    /// The owning class.
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    /// Number of instance slots.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Read a slot.
    pub fn get_field(&self, slot: usize) -> RuntimeResult<Value> {
        self.fields
            .get(slot)
            .cloned()
            .ok_or(RuntimeError::SlotOutOfBounds {
                slot,
                len: self.fields.len(),
            })
    }

    /// Write a slot.
    pub fn set_field(&mut self, slot: usize, value: Value) -> RuntimeResult<()> {
        let len = self.fields.len();
        match self.fields.get_mut(slot) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(RuntimeError::SlotOutOfBounds { slot, len }),
        }
    }
}

/// Shared handle to an [`Object`]. Clones alias the same instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    /// Wrap an instance in a shared handle.
    pub fn new(object: Object) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// The owning class.
    pub fn class_id(&self) -> ClassId {
        self.0.read().class_id()
    }

    /// Number of instance slots.
    pub fn field_count(&self) -> usize {
        self.0.read().field_count()
    }

    /// Read a slot.
    pub fn get(&self, slot: usize) -> RuntimeResult<Value> {
        self.0.read().get_field(slot)
    }

    /// Write a slot.
    pub fn set(&self, slot: usize, value: Value) -> RuntimeResult<()> {
        self.0.write().set_field(slot, value)
    }

    /// Identity comparison: true when both handles alias the same instance.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.read();
        f.debug_struct("ObjectRef")
            .field("class_id", &inner.class_id())
            .field("field_count", &inner.field_count())
            .finish()
    }
}
