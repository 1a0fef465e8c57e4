//! Handler types and registration keys.
//!
//! Route handlers and lifecycle hooks share one signature: they receive
//! the mutable [`RequestContext`] and the caller's extra arguments, and
//! return a boxed future of the response. The synchronous part of a
//! handler may read or mutate the context; the future it returns owns
//! whatever it needs.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::context::RequestContext;
use crate::error::SecurityHandlerError;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A route handler or lifecycle hook.
pub type Handler<A, R> =
    Arc<dyn Fn(&mut RequestContext<R>, &A) -> BoxFuture<'static, R> + Send + Sync + 'static>;

/// The pre-response hook: `Some` short-circuits the route handler.
pub type PreResponseHandler<A, R> = Arc<
    dyn Fn(&mut RequestContext<R>, &A) -> BoxFuture<'static, Option<R>> + Send + Sync + 'static,
>;

/// A security scheme handler. A truthy `Ok` value passes the scheme.
pub type SecurityHandler<A, R> = Arc<
    dyn Fn(&RequestContext<R>, &A) -> BoxFuture<'static, Result<Value, SecurityHandlerError>>
        + Send
        + Sync
        + 'static,
>;

/// Wraps a closure as a [`Handler`].
///
/// Passing the closure through here gives it the higher-ranked signature
/// the handler table stores.
pub fn handler<A, R, F>(f: F) -> Handler<A, R>
where
    F: Fn(&mut RequestContext<R>, &A) -> BoxFuture<'static, R> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure as a [`PreResponseHandler`].
pub fn pre_response_handler<A, R, F>(f: F) -> PreResponseHandler<A, R>
where
    F: Fn(&mut RequestContext<R>, &A) -> BoxFuture<'static, Option<R>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure as a [`SecurityHandler`].
pub fn security_handler<A, R, F>(f: F) -> SecurityHandler<A, R>
where
    F: Fn(&RequestContext<R>, &A) -> BoxFuture<'static, Result<Value, SecurityHandlerError>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Key of a registered handler: a lifecycle hook or an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerKey {
    /// `notFound`: no route matched.
    NotFound,
    /// `methodNotAllowed`: the path matched with other methods.
    MethodNotAllowed,
    /// `notImplemented`: the operation has no handler.
    NotImplemented,
    /// `validationFail`: request validation produced errors.
    ValidationFail,
    /// `unauthorizedHandler`: no security requirement-set passed.
    Unauthorized,
    /// `preResponseHandler`: runs before the route handler.
    PreResponse,
    /// `postResponseHandler`: runs after the route handler.
    PostResponse,
    /// A contract operation identifier.
    Operation(String),
}

impl HandlerKey {
    /// Every lifecycle key.
    pub const LIFECYCLE: [HandlerKey; 7] = [
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::NotImplemented,
        Self::ValidationFail,
        Self::Unauthorized,
        Self::PreResponse,
        Self::PostResponse,
    ];

    /// Returns the registration name of this key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotFound => "notFound",
            Self::MethodNotAllowed => "methodNotAllowed",
            Self::NotImplemented => "notImplemented",
            Self::ValidationFail => "validationFail",
            Self::Unauthorized => "unauthorizedHandler",
            Self::PreResponse => "preResponseHandler",
            Self::PostResponse => "postResponseHandler",
            Self::Operation(id) => id,
        }
    }

    /// Returns true for lifecycle keys.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, Self::Operation(_))
    }

    /// Creates an operation key.
    pub fn operation(id: impl Into<String>) -> Self {
        Self::Operation(id.into())
    }
}

impl FromStr for HandlerKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "notFound" => Self::NotFound,
            "methodNotAllowed" => Self::MethodNotAllowed,
            "notImplemented" => Self::NotImplemented,
            "validationFail" => Self::ValidationFail,
            "unauthorizedHandler" => Self::Unauthorized,
            "preResponseHandler" => Self::PreResponse,
            "postResponseHandler" => Self::PostResponse,
            other => Self::Operation(other.to_string()),
        })
    }
}

impl From<&str> for HandlerKey {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl From<String> for HandlerKey {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
