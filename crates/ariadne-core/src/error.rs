//! Contract error types.

use thiserror::Error;

/// Result type alias using [`ContractError`].
pub type ContractResult<T> = Result<T, ContractError>;

/// Errors raised while turning a contract document into operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The document is not shaped like an API contract.
    #[error("invalid contract document: {0}")]
    InvalidDocument(String),

    /// A `$ref` pointed outside the document or at nothing.
    #[error("unresolved reference: {reference}")]
    UnresolvedReference {
        /// The reference that could not be followed.
        reference: String,
    },

    /// A parameter declaration is malformed.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name (or `<unnamed>`).
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A path template could not be compiled into a matcher.
    #[error("invalid path template '{template}': {reason}")]
    InvalidPathTemplate {
        /// The offending template.
        template: String,
        /// Underlying reason.
        reason: String,
    },
}

impl ContractError {
    /// Creates an invalid-document error.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }

    /// Creates an unresolved-reference error.
    #[must_use]
    pub fn unresolved(reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
        }
    }

    /// Creates an invalid-parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
