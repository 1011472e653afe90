//! Construction-time configuration errors for displayer contexts.

use thiserror::Error;

/// Fatal: a context that fails validation never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("key {key:?} is reserved for {reserved}")]
    ReservedKey { key: String, reserved: &'static str },

    #[error("key {key:?} is bound to more than one action")]
    DuplicateAction { key: String },

    #[error("action {description:?} has an empty key")]
    EmptyKey { description: String },
}
