//! Failures surfaced by the underlying object model
//!
//! These are the errors the accessor layer wraps uniformly: a member was
//! resolved, but the storage read/write or the invocation itself failed.

use thiserror::Error;

use crate::types::ClassId;

/// Errors raised while reading/writing storage or dispatching a member body.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    /// An instance member was accessed with no target object.
    #[error("null target for instance member access")]
    NullTarget,

    /// The target value is not a heap object.
    #[error("target value is not an object")]
    NotAnObject,

    /// The target object is not an instance of the member's declaring class.
    #[error("target of class {actual} is not an instance of {expected}")]
    ClassMismatch {
        /// Declaring class name.
        expected: String,
        /// The target's actual class name.
        actual: String,
    },

    /// A value's type is not assignable to the field's declared type.
    #[error("value of type {actual} is not assignable to {expected}")]
    TypeMismatch {
        /// Declared field type name.
        expected: String,
        /// The value's runtime type name.
        actual: String,
    },

    /// Storage slot index outside the allocated range.
    #[error("slot {slot} out of bounds ({len} slots)")]
    SlotOutOfBounds {
        /// Requested slot.
        slot: usize,
        /// Number of allocated slots.
        len: usize,
    },

    /// A member body was dispatched with the wrong number of arguments.
    #[error("expected {expected} arguments, got {actual}")]
    ArityMismatch {
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// A class id with no registry entry.
    #[error("class {0} is not registered")]
    UnknownClass(ClassId),

    /// A class name that is already taken.
    #[error("class `{0}` is already defined")]
    DuplicateClass(String),

    /// Failure raised by an invoked member body itself.
    #[error("{0}")]
    Native(String),
}

/// Object-model result alias.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
