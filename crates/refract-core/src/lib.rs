//! Refract dynamic object model
//!
//! This crate provides the host runtime the accessor layer introspects:
//! - Dynamic values and slot-indexed heap instances
//! - Class descriptors with fields, native-bodied methods, and constructors
//! - A concurrent, append-only type registry
//! - The primitive/boxed equivalence table shared by type matching and
//!   signature encoding

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use class::{
    ClassDef, ClassDefinition, ConstructorDefinition, ConstructorInfo, FieldDefinition,
    FieldInfo, MemberBody, MethodDefinition, MethodInfo, NativeCall, Visibility,
};
pub use error::{RuntimeError, RuntimeResult};
pub use registry::TypeRegistry;
pub use types::{well_known, ClassId, Primitive, TypeRef};
pub use value::{Object, ObjectRef, Value};
