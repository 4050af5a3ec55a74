//! Refract accessor layer
//!
//! Member resolution and caching over the `refract-core` object model:
//! - Signature codec: stable identifiers over (member name, parameter
//!   types) with primitive/boxed normalization
//! - Field, method, and constructor index builders with configurable
//!   visibility/inheritance traversal
//! - [`Reflector`]: the per-class, build-at-most-once accessor cache and
//!   facade
//!
//! Generic code asks a [`Reflector`] for the accessor bound to a class and
//! then reads/writes fields and invokes methods/constructors by name or by
//! argument types, without holding direct member handles.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod config;
pub mod constructor;
pub mod error;
pub mod field;
pub mod method;
pub mod signature;

pub use cache::Reflector;
pub use config::AccessorConfig;
pub use constructor::ConstructorAccessor;
pub use error::{ReflectError, ReflectResult};
pub use field::FieldAccessor;
pub use method::MethodAccessor;
pub use signature::Signature;

// The object-model surface callers need alongside the accessors.
pub use refract_core::{
    well_known, ClassDef, ClassDefinition, ClassId, ConstructorDefinition, ConstructorInfo,
    FieldDefinition, FieldInfo, MethodDefinition, MethodInfo, NativeCall, ObjectRef,
    Primitive, RuntimeError, TypeRef, TypeRegistry, Value, Visibility,
};
