//! Accessor layer errors
//!
//! Two families, deliberately kept apart: resolution failures (the member
//! could not be found, or the lookup itself was ill-formed) are raised at
//! lookup time with descriptive messages; anything the underlying object
//! model rejects while actually reading, writing, invoking, or
//! constructing is re-wrapped uniformly as [`ReflectError::Runtime`], so
//! callers have exactly one failure kind to match for "the operation blew
//! up" versus "the member does not exist".

use std::sync::Arc;

use thiserror::Error;

use refract_core::{ClassId, RuntimeError};

/// Errors raised by the accessor layer.
#[derive(Debug, Clone, Error)]
pub enum ReflectError {
    /// No field matched a name or type-directed lookup.
    #[error("field {query} can not be found in class {class}")]
    FieldNotFound {
        /// Class the accessor was built for.
        class: Arc<str>,
        /// The failed query, e.g. `` `name` `` or `of type int`.
        query: String,
    },

    /// Type-directed field lookup matched more than one field.
    #[error("found more than one field of type {ty} in class {class}")]
    AmbiguousField {
        /// Class the accessor was built for.
        class: Arc<str>,
        /// The queried type's simple name.
        ty: String,
    },

    /// No method matched the encoded signature.
    #[error("method {signature} can not be found")]
    MethodNotFound {
        /// Rendered signature, e.g. `User.set_name(String)`.
        signature: String,
    },

    /// No constructor matched the encoded signature.
    #[error("constructor {signature} can not be found")]
    ConstructorNotFound {
        /// Rendered signature, e.g. `Point(int, int)`.
        signature: String,
    },

    /// A null value where a typed argument was required; a null carries
    /// no runtime type to resolve against.
    #[error("null argument has no runtime type")]
    NullArgument,

    /// Accessor requested for a class id with no registry entry.
    #[error("class {0} is not registered")]
    UnknownClass(ClassId),

    /// The member resolved, but the underlying read/write/invoke/construct
    /// was rejected by the object model.
    #[error("runtime access failure: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Accessor-layer result alias.
pub type ReflectResult<T> = Result<T, ReflectError>;
