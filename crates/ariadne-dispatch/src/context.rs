//! Per-request context.
//!
//! A [`RequestContext`] is created for every request and filled in as the
//! pipeline advances:
//!
//! | stage              | writes                                  |
//! |--------------------|-----------------------------------------|
//! | routing            | `request`, `operation` or `route_error` |
//! | security           | `security`                              |
//! | validation         | `validation`                            |
//! | route handler      | `response`                              |
//!
//! Hooks may mutate any field; later stages observe the mutation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use ariadne_core::{Operation, ParsedRequest};
use ariadne_validator::ValidationResult;

use crate::error::DispatchError;
use crate::security::SecurityContext;

/// State shared by the pipeline stages and handlers of one request.
pub struct RequestContext<R> {
    request: ParsedRequest,
    operation: Option<Arc<Operation>>,
    route_error: Option<DispatchError>,
    validation: Option<ValidationResult>,
    security: Option<SecurityContext>,
    response: Option<R>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl<R> RequestContext<R> {
    /// Creates a context for a parsed request.
    #[must_use]
    pub fn new(request: ParsedRequest) -> Self {
        Self {
            request,
            operation: None,
            route_error: None,
            validation: None,
            security: None,
            response: None,
            extensions: HashMap::new(),
        }
    }

    /// Returns the parsed request.
    #[must_use]
    pub fn request(&self) -> &ParsedRequest {
        &self.request
    }

    /// Returns the parsed request for modification.
    pub fn request_mut(&mut self) -> &mut ParsedRequest {
        &mut self.request
    }

    pub(crate) fn set_request(&mut self, request: ParsedRequest) {
        self.request = request;
    }

    /// Returns the matched operation.
    #[must_use]
    pub fn operation(&self) -> Option<&Arc<Operation>> {
        self.operation.as_ref()
    }

    /// Returns the matched operation's identifier.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation.as_ref().and_then(|op| op.operation_id())
    }

    pub(crate) fn set_operation(&mut self, operation: Arc<Operation>) {
        self.operation = Some(operation);
    }

    /// Returns the routing failure the not-found or method-not-allowed
    /// handler is answering.
    #[must_use]
    pub fn route_error(&self) -> Option<&DispatchError> {
        self.route_error.as_ref()
    }

    pub(crate) fn set_route_error(&mut self, error: DispatchError) {
        self.route_error = Some(error);
    }

    /// Returns the request validation result, when validation ran.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    /// Replaces the validation result.
    pub fn set_validation(&mut self, validation: ValidationResult) {
        self.validation = Some(validation);
    }

    /// Returns the security evaluation, once security ran.
    #[must_use]
    pub fn security(&self) -> Option<&SecurityContext> {
        self.security.as_ref()
    }

    /// Replaces the security evaluation.
    pub fn set_security(&mut self, security: SecurityContext) {
        self.security = Some(security);
    }

    /// Returns the route handler's response, inside the post-response hook.
    #[must_use]
    pub fn response(&self) -> Option<&R> {
        self.response.as_ref()
    }

    /// Takes the route handler's response out of the context.
    pub fn take_response(&mut self) -> Option<R> {
        self.response.take()
    }

    pub(crate) fn set_response(&mut self, response: R) {
        self.response = Some(response);
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for RequestContext<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request", &self.request)
            .field("operation", &self.operation.as_ref().map(|op| op.label()))
            .field("route_error", &self.route_error)
            .field("validation", &self.validation)
            .field("security", &self.security)
            .field("response", &self.response)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_extensions() {
        let mut ctx: RequestContext<()> = RequestContext::new(ParsedRequest::default());
        assert!(ctx.get_extension::<Tenant>().is_none());

        ctx.set_extension(Tenant("acme"));
        assert_eq!(ctx.get_extension::<Tenant>(), Some(&Tenant("acme")));
        assert_eq!(ctx.remove_extension::<Tenant>(), Some(Tenant("acme")));
        assert!(ctx.get_extension::<Tenant>().is_none());
    }

    #[test]
    fn test_response_slot() {
        let mut ctx: RequestContext<u16> = RequestContext::new(ParsedRequest::default());
        assert!(ctx.response().is_none());
        ctx.set_response(200);
        assert_eq!(ctx.response(), Some(&200));
        assert_eq!(ctx.take_response(), Some(200));
        assert!(ctx.response().is_none());
    }

    #[test]
    fn test_fresh_context_has_no_operation() {
        let ctx: RequestContext<()> = RequestContext::new(ParsedRequest::default());
        assert!(ctx.operation().is_none());
        assert!(ctx.operation_id().is_none());
        assert!(ctx.validation().is_none());
        assert!(ctx.security().is_none());
        assert!(ctx.route_error().is_none());
    }
}
