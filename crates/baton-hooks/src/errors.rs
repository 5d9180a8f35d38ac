//! Event handler error types.

use thiserror::Error;

/// Errors that can occur during event handling.
#[derive(Debug, Error)]
pub enum HookError {
    /// Handler returned an error.
    #[error("Handler error in '{name}': {message}")]
    HandlerError {
        /// Handler name.
        name: String,
        /// Error message from the handler.
        message: String,
    },

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

impl HookError {
    /// Create a handler error.
    #[must_use]
    pub fn handler(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerError {
            name: name.into(),
            message: message.into(),
        }
    }
}
