//! Validator error types.
//!
//! These are configuration and setup failures. Data that fails a schema is
//! never an error here; it is reported inside a
//! [`ValidationResult`](crate::ValidationResult).

use ariadne_router::RouteError;
use thiserror::Error;

/// Result type alias using [`ValidatorError`].
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Errors raised while compiling or invoking validators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// A synthesised schema failed to compile.
    #[error("failed to compile {target} schema for {operation}: {reason}")]
    Compile {
        /// Operation label.
        operation: String,
        /// Which schema (`parameters`, `requestBody`, `response 200`, ...).
        target: String,
        /// Compiler message.
        reason: String,
    },

    /// A `$ref` inside a schema points at nothing.
    #[error("unresolved schema reference {reference} in {operation}")]
    UnresolvedReference {
        /// Operation label.
        operation: String,
        /// The dangling reference.
        reference: String,
    },

    /// No operation matches the request being validated.
    #[error("unknown operation for {method} {path}")]
    UnknownOperation {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// An unrecognised set-match mode name.
    #[error("invalid set match type '{0}', expected any, superset, subset or exact")]
    InvalidSetMatchType(String),

    /// Router setup failed.
    #[error(transparent)]
    Route(#[from] RouteError),
}
