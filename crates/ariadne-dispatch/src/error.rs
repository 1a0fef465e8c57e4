//! Dispatch error types.

use std::fmt;

use ariadne_core::ContractError;
use ariadne_router::RouteError;
use ariadne_validator::ValidatorError;
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors surfaced by the request pipeline and its setup.
///
/// Routing, not-implemented and security outcomes become errors only when
/// no lifecycle handler is registered to answer them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No route matched and no not-found handler is registered.
    #[error("no route for {method} {path}")]
    NotFound {
        /// Lowercase request method.
        method: String,
        /// Normalised request path.
        path: String,
    },

    /// The path matched with another method and neither a
    /// method-not-allowed nor a not-found handler is registered.
    #[error("method {method} not allowed for {path}, allowed: {}", allowed.join(", "))]
    MethodNotAllowed {
        /// Lowercase request method.
        method: String,
        /// Normalised request path.
        path: String,
        /// Methods the path accepts.
        allowed: Vec<String>,
    },

    /// The operation has no handler and no not-implemented handler is
    /// registered.
    #[error("operation {operation} is not implemented")]
    NotImplemented {
        /// Operation identifier or label.
        operation: String,
    },

    /// No security requirement-set passed and no unauthorized handler is
    /// registered.
    #[error("request to {operation} is not authorized")]
    Unauthorized {
        /// Operation identifier or label.
        operation: String,
    },

    /// A handler key names neither a known operation nor a lifecycle hook.
    #[error("unknown operation '{0}' for handler registration")]
    UnknownHandler(String),

    /// An operation identifier is not declared by the contract.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// A security handler names a scheme the contract does not declare.
    #[error("unknown security scheme '{0}'")]
    UnknownSecurityScheme(String),

    /// The pre-response hook was registered through the generic handler
    /// table instead of its dedicated method.
    #[error("'{0}' must be registered with register_pre_response")]
    MisplacedHook(String),

    /// The contract document could not be loaded.
    #[error("failed to load contract: {0}")]
    Load(String),

    /// The contract document was rejected by the linter.
    #[error("contract failed linting: {0}")]
    Lint(String),

    /// The contract document is malformed.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Router setup failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Validator setup or invocation failed.
    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

impl DispatchError {
    /// Returns true for setup-time failures.
    #[must_use]
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::Load(_) | Self::Lint(_) | Self::Contract(_) | Self::Route(_) | Self::Validator(_)
        )
    }
}

/// An error raised by a security handler.
///
/// Captured per scheme; it fails that scheme only and never aborts the
/// evaluation of the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHandlerError {
    message: String,
}

impl SecurityHandlerError {
    /// Creates an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SecurityHandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "security handler failed: {}", self.message)
    }
}

impl std::error::Error for SecurityHandlerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_display() {
        let err = DispatchError::MethodNotAllowed {
            method: "patch".to_string(),
            path: "/pets".to_string(),
            allowed: vec!["GET".to_string(), "POST".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "method patch not allowed for /pets, allowed: GET, POST"
        );
    }

    #[test]
    fn test_setup_classification() {
        assert!(DispatchError::Load("missing".to_string()).is_setup());
        assert!(!DispatchError::UnknownHandler("x".to_string()).is_setup());
    }

    #[test]
    fn test_security_handler_error() {
        let err = SecurityHandlerError::new("token expired");
        assert_eq!(err.message(), "token expired");
        assert_eq!(err.to_string(), "security handler failed: token expired");
    }
}
