//! Routing error types.

use ariadne_core::ContractError;
use thiserror::Error;

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors raised by the router.
///
/// Only the two strict-mode routing failures occur per request. Malformed
/// bodies or query strings never fail routing; the validator reports them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No declared path matches the request.
    #[error("no route for {method} {path}")]
    NotFound {
        /// Lowercased request method.
        method: String,
        /// Normalised request path.
        path: String,
    },

    /// A path matches but none of its operations accept the method.
    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        /// Lowercased request method.
        method: String,
        /// Normalised request path.
        path: String,
        /// Methods the matching paths do accept, uppercase and sorted.
        allowed: Vec<String>,
    },

    /// A path template could not be compiled.
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl RouteError {
    /// Returns true for [`RouteError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`RouteError::MethodNotAllowed`].
    #[must_use]
    pub fn is_method_not_allowed(&self) -> bool {
        matches!(self, Self::MethodNotAllowed { .. })
    }
}
