//! The request-handling pipeline.
//!
//! [`Api`] owns the handler tables and, after one-time setup, the router
//! and validator built from the contract. Each request runs through a
//! fixed sequence of stages:
//!
//! ```text
//! Routing → Re-parse → Security → Validation → Pre-response → Handler → Post-response
//! ```
//!
//! A stage that answers the request (a not-found, unauthorized or
//! validation-fail handler, say) ends the sequence; its response still
//! passes through the post-response hook. Only the pre-response hook
//! returns its answer as is.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ariadne_config::AriadneConfig;
use ariadne_core::{Contract, Operation, ParamMap, RawRequest};
use ariadne_router::{normalize, RouteError, Router};
use ariadne_telemetry::metrics::{
    record_dispatch, record_security_denial, record_validation_failure, DispatchOutcome,
};
use ariadne_validator::{ResponseHeaderOptions, ValidationResult, Validator};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::error::{DispatchError, DispatchResult, SecurityHandlerError};
use crate::handler::{
    handler, pre_response_handler, security_handler, BoxFuture, Handler, HandlerKey,
    PreResponseHandler, SecurityHandler,
};
use crate::loader::{load_document, ContractLinter, ContractLoader};
use crate::mock::{mock_operation, MockGenerator, MockOptions, MockResponse, SchemaMocker};
use crate::security;

/// Decides per request whether validation runs.
pub type ValidationPredicate<A, R> =
    Arc<dyn Fn(&RequestContext<R>, &A) -> bool + Send + Sync + 'static>;

enum ValidationGate<A, R> {
    Static(bool),
    Predicate(ValidationPredicate<A, R>),
}

/// Router and validator built by setup.
struct ApiState {
    router: Arc<Router>,
    validator: Validator,
}

impl ApiState {
    fn new(contract: Contract, config: &AriadneConfig) -> DispatchResult<Self> {
        let router = Arc::new(Router::new(Arc::new(contract), config.router.clone())?);
        let validator = Validator::new(Arc::clone(&router), config.validation.clone())?;
        Ok(Self { router, validator })
    }
}

/// How a stage answered the request.
enum Reply<R> {
    /// Passes through the post-response hook.
    Respond(R),
    /// Returned to the caller unchanged.
    Final(R),
}

/// Contract-driven request dispatcher.
///
/// `A` is the type of the extra arguments the caller hands to
/// [`Api::handle_request`]; every handler receives them by reference. `R`
/// is the response type handlers produce.
///
/// # Example
///
/// ```
/// use ariadne_core::{fixtures, RawRequest};
/// use ariadne_dispatch::Api;
///
/// # tokio_test::block_on(async {
/// let mut api: Api<(), u16> = Api::new(fixtures::petstore());
/// api.register("getPets", |_ctx, _args| Box::pin(async { 200 })).unwrap();
/// api.register("notFound", |_ctx, _args| Box::pin(async { 404 })).unwrap();
///
/// assert_eq!(api.handle_request(RawRequest::new("GET", "/pets"), &()).await.unwrap(), 200);
/// assert_eq!(api.handle_request(RawRequest::new("GET", "/cats"), &()).await.unwrap(), 404);
/// # });
/// ```
pub struct Api<A, R> {
    config: AriadneConfig,
    loader: Box<dyn ContractLoader>,
    linter: Option<Box<dyn ContractLinter>>,
    mock_generator: Box<dyn MockGenerator>,
    validation_gate: ValidationGate<A, R>,
    state: OnceCell<ApiState>,
    handlers: HashMap<HandlerKey, Handler<A, R>>,
    pre_response: Option<PreResponseHandler<A, R>>,
    security_handlers: HashMap<String, SecurityHandler<A, R>>,
}

impl<A: 'static, R: Send + 'static> Api<A, R> {
    /// Creates an API over a contract with the default configuration.
    pub fn new(definition: impl ContractLoader + 'static) -> Self {
        Self::builder(definition).build()
    }

    /// Starts building an API over a contract.
    pub fn builder(definition: impl ContractLoader + 'static) -> ApiBuilder<A, R> {
        ApiBuilder::new(definition)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AriadneConfig {
        &self.config
    }

    /// Returns true once setup has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.initialized()
    }

    /// Loads the contract and builds the router and validator.
    ///
    /// Runs at most once; later calls return immediately. In strict mode
    /// a load, lint or compile failure is returned. Otherwise it is logged
    /// and the API continues with no operations, so every request routes
    /// to not-found.
    pub async fn init(&self) -> DispatchResult<()> {
        self.state().await.map(|_| ())
    }

    async fn state(&self) -> DispatchResult<&ApiState> {
        self.state.get_or_try_init(|| self.setup()).await
    }

    async fn setup(&self) -> DispatchResult<ApiState> {
        let state = match self.build_state().await {
            Ok(state) => state,
            Err(e) if self.config.dispatch.strict => return Err(e),
            Err(e) => {
                warn!(error = %e, "contract setup failed, continuing without operations");
                ApiState::new(Contract::empty(), &self.config)?
            }
        };

        for key in self.handlers.keys() {
            self.check_handler_key(&state, key)?;
        }
        for scheme in self.security_handlers.keys() {
            self.check_security_scheme(&state, scheme)?;
        }

        info!(
            operations = state.router.operations().len(),
            handlers = self.handlers.len(),
            security_handlers = self.security_handlers.len(),
            "api initialized"
        );
        Ok(state)
    }

    async fn build_state(&self) -> DispatchResult<ApiState> {
        let document = load_document(self.loader.as_ref(), self.linter.as_deref()).await?;
        let contract = Contract::from_document(document)?;
        ApiState::new(contract, &self.config)
    }

    fn check_handler_key(&self, state: &ApiState, key: &HandlerKey) -> DispatchResult<()> {
        let HandlerKey::Operation(id) = key else {
            return Ok(());
        };
        if state.router.get_operation(id).is_some() {
            return Ok(());
        }
        if self.config.dispatch.strict {
            return Err(DispatchError::UnknownHandler(id.clone()));
        }
        warn!(handler = %id, "handler registered for unknown operation");
        Ok(())
    }

    fn check_security_scheme(&self, state: &ApiState, scheme: &str) -> DispatchResult<()> {
        if state
            .router
            .contract()
            .security_scheme_names()
            .any(|name| name == scheme)
        {
            return Ok(());
        }
        if self.config.dispatch.strict {
            return Err(DispatchError::UnknownSecurityScheme(scheme.to_string()));
        }
        warn!(scheme, "security handler registered for unknown scheme");
        Ok(())
    }

    /// Registers a route handler or lifecycle hook.
    ///
    /// The key is an operation identifier or a lifecycle name such as
    /// `notFound`. After setup, an identifier the contract does not
    /// declare is an error in strict mode and a warning otherwise; the
    /// handler is registered either way when no error is returned.
    ///
    /// # Errors
    ///
    /// [`DispatchError::MisplacedHook`] for `preResponseHandler`, which
    /// has its own signature and is registered with
    /// [`register_pre_response`](Self::register_pre_response).
    pub fn register<F>(&mut self, key: impl Into<HandlerKey>, f: F) -> DispatchResult<()>
    where
        F: Fn(&mut RequestContext<R>, &A) -> BoxFuture<'static, R> + Send + Sync + 'static,
    {
        self.register_handler(key, handler(f))
    }

    /// Registers an already wrapped [`Handler`].
    pub fn register_handler(
        &mut self,
        key: impl Into<HandlerKey>,
        handler: Handler<A, R>,
    ) -> DispatchResult<()> {
        let key = key.into();
        if key == HandlerKey::PreResponse {
            return Err(DispatchError::MisplacedHook(key.to_string()));
        }
        if let Some(state) = self.state.get() {
            self.check_handler_key(state, &key)?;
        }
        debug!(handler = %key, "handler registered");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Registers the pre-response hook.
    ///
    /// It runs after validation with the populated context. Returning
    /// `Some` answers the request in place of the route handler and skips
    /// the post-response hook.
    pub fn register_pre_response<F>(&mut self, f: F)
    where
        F: Fn(&mut RequestContext<R>, &A) -> BoxFuture<'static, Option<R>> + Send + Sync + 'static,
    {
        self.pre_response = Some(pre_response_handler(f));
    }

    /// Registers the handler of a security scheme.
    ///
    /// # Errors
    ///
    /// After setup in strict mode,
    /// [`DispatchError::UnknownSecurityScheme`] when the contract does not
    /// declare the scheme.
    pub fn register_security_handler<F>(
        &mut self,
        scheme: impl Into<String>,
        f: F,
    ) -> DispatchResult<()>
    where
        F: Fn(&RequestContext<R>, &A) -> BoxFuture<'static, Result<Value, SecurityHandlerError>>
            + Send
            + Sync
            + 'static,
    {
        let scheme = scheme.into();
        if let Some(state) = self.state.get() {
            self.check_security_scheme(state, &scheme)?;
        }
        self.security_handlers.insert(scheme, security_handler(f));
        Ok(())
    }

    /// Returns the handler registered under a key.
    pub fn handler(&self, key: impl Into<HandlerKey>) -> Option<&Handler<A, R>> {
        self.handlers.get(&key.into())
    }

    /// Returns the keys of all registered handlers.
    pub fn handler_keys(&self) -> impl Iterator<Item = &HandlerKey> {
        self.handlers.keys()
    }

    /// Returns the handler registered for a security scheme.
    #[must_use]
    pub fn security_handler(&self, scheme: &str) -> Option<&SecurityHandler<A, R>> {
        self.security_handlers.get(scheme)
    }

    /// Returns the router, running setup first if needed.
    pub async fn router(&self) -> DispatchResult<&Arc<Router>> {
        Ok(&self.state().await?.router)
    }

    /// Returns the validator, running setup first if needed.
    pub async fn validator(&self) -> DispatchResult<&Validator> {
        Ok(&self.state().await?.validator)
    }

    /// Returns the operation a request targets, if any.
    pub async fn match_operation(&self, request: &RawRequest) -> DispatchResult<Option<Arc<Operation>>> {
        Ok(self.state().await?.router.match_operation(request, false)?)
    }

    /// Returns a declared operation by identifier.
    pub async fn get_operation(&self, operation_id: &str) -> DispatchResult<Arc<Operation>> {
        let state = self.state().await?;
        lookup_operation(state, operation_id).map(Arc::clone)
    }

    /// Validates a request against the operation it routes to.
    pub async fn validate_request(&self, request: &RawRequest) -> DispatchResult<ValidationResult> {
        Ok(self.state().await?.validator.validate_request(request, None)?)
    }

    /// Validates a response body of an operation.
    pub async fn validate_response(
        &self,
        body: &Value,
        operation_id: &str,
        status: Option<u16>,
    ) -> DispatchResult<ValidationResult> {
        let state = self.state().await?;
        let operation = lookup_operation(state, operation_id)?;
        let result = state.validator.validate_response(body, operation, status)?;
        if !result.valid() {
            record_validation_failure(operation_id, "response");
        }
        Ok(result)
    }

    /// Validates the response headers of an operation.
    pub async fn validate_response_headers(
        &self,
        headers: &ParamMap,
        operation_id: &str,
        options: ResponseHeaderOptions,
    ) -> DispatchResult<ValidationResult> {
        let state = self.state().await?;
        let operation = lookup_operation(state, operation_id)?;
        let result = state
            .validator
            .validate_response_headers(headers, operation, options)?;
        if !result.valid() {
            record_validation_failure(operation_id, "response_headers");
        }
        Ok(result)
    }

    /// Generates a mock response for an operation.
    pub async fn mock_response_for_operation(
        &self,
        operation_id: &str,
        options: &MockOptions,
    ) -> DispatchResult<MockResponse> {
        let state = self.state().await?;
        let operation = lookup_operation(state, operation_id)?;
        Ok(mock_operation(
            operation,
            options,
            state.router.contract().document(),
            self.mock_generator.as_ref(),
        ))
    }

    /// Runs a request through the pipeline.
    ///
    /// Setup runs first when it has not yet. `args` reaches every handler
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Routing, security and not-implemented outcomes with no handler
    /// registered to answer them, and setup failures in strict mode.
    pub async fn handle_request(&self, request: RawRequest, args: &A) -> DispatchResult<R> {
        let state = self.state().await?;
        let mut ctx = RequestContext::new(state.router.parse_request(&request, None));

        match self.run(state, &request, &mut ctx, args).await? {
            Reply::Final(response) => Ok(response),
            Reply::Respond(response) => match self.handlers.get(&HandlerKey::PostResponse) {
                Some(post) => {
                    ctx.set_response(response);
                    Ok(post(&mut ctx, args).await)
                }
                None => Ok(response),
            },
        }
    }

    async fn run(
        &self,
        state: &ApiState,
        request: &RawRequest,
        ctx: &mut RequestContext<R>,
        args: &A,
    ) -> DispatchResult<Reply<R>> {
        let operation = match state.router.match_operation(request, true) {
            Ok(Some(operation)) => operation,
            Ok(None) => {
                let error = DispatchError::NotFound {
                    method: request.method.to_ascii_lowercase(),
                    path: normalize(&request.path),
                };
                return self.unrouted(ctx, error, args).await;
            }
            Err(RouteError::NotFound { method, path }) => {
                return self.unrouted(ctx, DispatchError::NotFound { method, path }, args).await;
            }
            Err(RouteError::MethodNotAllowed {
                method,
                path,
                allowed,
            }) => {
                let error = DispatchError::MethodNotAllowed {
                    method,
                    path,
                    allowed,
                };
                return self.unrouted(ctx, error, args).await;
            }
            Err(e) => return Err(e.into()),
        };

        let label = operation
            .operation_id()
            .map_or_else(|| operation.label(), str::to_string);
        ctx.set_request(state.router.parse_request(request, Some(&*operation)));
        ctx.set_operation(Arc::clone(&operation));

        let security =
            security::evaluate(operation.security(), &self.security_handlers, ctx, args).await;
        let authorized = security.authorized;
        ctx.set_security(security);
        if !authorized {
            record_security_denial(&label);
            record_dispatch(&label, DispatchOutcome::Unauthorized);
            debug!(operation = %label, "no security requirement satisfied");
            return match self.handlers.get(&HandlerKey::Unauthorized) {
                Some(unauthorized) => Ok(Reply::Respond(unauthorized(ctx, args).await)),
                None => Err(DispatchError::Unauthorized { operation: label }),
            };
        }

        if self.should_validate(ctx, args) {
            let validation = state
                .validator
                .validate_parsed_request(ctx.request(), &operation)?;
            let error_count = validation.errors().len();
            ctx.set_validation(validation);

            if error_count > 0 {
                record_validation_failure(&label, "request");
                if let Some(validation_fail) = self.handlers.get(&HandlerKey::ValidationFail) {
                    record_dispatch(&label, DispatchOutcome::ValidationFailed);
                    return Ok(Reply::Respond(validation_fail(ctx, args).await));
                }
                debug!(
                    operation = %label,
                    errors = error_count,
                    "request failed validation, continuing without a validationFail handler"
                );
            }
        }

        if let Some(pre_response) = &self.pre_response {
            if let Some(response) = pre_response(ctx, args).await {
                record_dispatch(&label, DispatchOutcome::ShortCircuited);
                return Ok(Reply::Final(response));
            }
        }

        let route_handler = operation
            .operation_id()
            .and_then(|id| self.handlers.get(&HandlerKey::operation(id)));
        match route_handler {
            Some(route_handler) => {
                record_dispatch(&label, DispatchOutcome::Handled);
                Ok(Reply::Respond(route_handler(ctx, args).await))
            }
            None => {
                record_dispatch(&label, DispatchOutcome::NotImplemented);
                match self.handlers.get(&HandlerKey::NotImplemented) {
                    Some(not_implemented) => Ok(Reply::Respond(not_implemented(ctx, args).await)),
                    None => Err(DispatchError::NotImplemented { operation: label }),
                }
            }
        }
    }

    async fn unrouted(
        &self,
        ctx: &mut RequestContext<R>,
        error: DispatchError,
        args: &A,
    ) -> DispatchResult<Reply<R>> {
        let not_found = self.handlers.get(&HandlerKey::NotFound);
        let (outcome, fallback) = if matches!(error, DispatchError::MethodNotAllowed { .. }) {
            (
                DispatchOutcome::MethodNotAllowed,
                self.handlers.get(&HandlerKey::MethodNotAllowed).or(not_found),
            )
        } else {
            (DispatchOutcome::NotFound, not_found)
        };
        record_dispatch("", outcome);
        debug!(%error, "request not routed");

        match fallback {
            Some(fallback) => {
                ctx.set_route_error(error);
                Ok(Reply::Respond(fallback(ctx, args).await))
            }
            None => Err(error),
        }
    }

    fn should_validate(&self, ctx: &RequestContext<R>, args: &A) -> bool {
        match &self.validation_gate {
            ValidationGate::Static(enabled) => *enabled,
            ValidationGate::Predicate(predicate) => predicate(ctx, args),
        }
    }
}

fn lookup_operation<'s>(state: &'s ApiState, operation_id: &str) -> DispatchResult<&'s Arc<Operation>> {
    state
        .router
        .get_operation(operation_id)
        .ok_or_else(|| DispatchError::UnknownOperation(operation_id.to_string()))
}

impl<A, R> fmt::Debug for Api<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&str> = self.handlers.keys().map(HandlerKey::as_str).collect();
        handlers.sort_unstable();
        f.debug_struct("Api")
            .field("config", &self.config)
            .field("initialized", &self.state.initialized())
            .field("handlers", &handlers)
            .field("pre_response", &self.pre_response.is_some())
            .field("security_handlers", &self.security_handlers.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Api`].
///
/// # Example
///
/// ```
/// use ariadne_config::AriadneConfig;
/// use ariadne_core::fixtures;
/// use ariadne_dispatch::{Api, StructureLinter};
///
/// let api: Api<(), ()> = Api::builder(fixtures::petstore())
///     .config(AriadneConfig::development())
///     .linter(StructureLinter)
///     .validate(false)
///     .build();
/// assert!(api.config().dispatch.strict);
/// ```
pub struct ApiBuilder<A, R> {
    config: AriadneConfig,
    loader: Box<dyn ContractLoader>,
    linter: Option<Box<dyn ContractLinter>>,
    mock_generator: Option<Box<dyn MockGenerator>>,
    validation_gate: Option<ValidationGate<A, R>>,
}

impl<A: 'static, R: Send + 'static> ApiBuilder<A, R> {
    /// Creates a builder over a contract.
    pub fn new(definition: impl ContractLoader + 'static) -> Self {
        Self {
            config: AriadneConfig::default(),
            loader: Box::new(definition),
            linter: None,
            mock_generator: None,
            validation_gate: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: AriadneConfig) -> Self {
        self.config = config;
        self
    }

    /// Lints the contract before it is compiled.
    pub fn linter(mut self, linter: impl ContractLinter + 'static) -> Self {
        self.linter = Some(Box::new(linter));
        self
    }

    /// Replaces the schema-driven mock generator.
    pub fn mock_generator(mut self, generator: impl MockGenerator + 'static) -> Self {
        self.mock_generator = Some(Box::new(generator));
        self
    }

    /// Turns request validation on or off, overriding the configuration.
    pub fn validate(mut self, enabled: bool) -> Self {
        self.validation_gate = Some(ValidationGate::Static(enabled));
        self
    }

    /// Validates only the requests for which `predicate` returns true.
    ///
    /// The predicate sees the context after routing and security.
    pub fn validate_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RequestContext<R>, &A) -> bool + Send + Sync + 'static,
    {
        self.validation_gate = Some(ValidationGate::Predicate(Arc::new(predicate)));
        self
    }

    /// Builds the API. Setup is deferred to [`Api::init`] or the first
    /// request.
    pub fn build(self) -> Api<A, R> {
        let validation_gate = self
            .validation_gate
            .unwrap_or(ValidationGate::Static(self.config.validation.enabled));
        Api {
            config: self.config,
            loader: self.loader,
            linter: self.linter,
            mock_generator: self.mock_generator.unwrap_or_else(|| Box::new(SchemaMocker)),
            validation_gate,
            state: OnceCell::new(),
            handlers: HashMap::new(),
            pre_response: None,
            security_handlers: HashMap::new(),
        }
    }
}

impl<A, R> fmt::Debug for ApiBuilder<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("config", &self.config)
            .field("linter", &self.linter.is_some())
            .field("mock_generator", &self.mock_generator.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::JsonFileLoader;
    use ariadne_core::fixtures;
    use serde_json::json;

    fn petstore() -> Api<(), &'static str> {
        Api::new(fixtures::petstore())
    }

    #[tokio::test]
    async fn test_lazy_setup() {
        let api = petstore();
        assert!(!api.is_initialized());
        api.init().await.unwrap();
        assert!(api.is_initialized());
        api.init().await.unwrap();
        assert_eq!(api.router().await.unwrap().operations().len(), 8);
    }

    #[tokio::test]
    async fn test_pre_response_key_is_rejected() {
        let mut api = petstore();
        let err = api
            .register("preResponseHandler", |_, _| Box::pin(async { "x" }))
            .unwrap_err();
        assert_eq!(err, DispatchError::MisplacedHook("preResponseHandler".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_operation_after_setup() {
        let mut lenient = petstore();
        lenient.init().await.unwrap();
        lenient.register("getCats", |_, _| Box::pin(async { "cats" })).unwrap();
        assert!(lenient.handler("getCats").is_some());

        let mut strict: Api<(), &str> = Api::builder(fixtures::petstore())
            .config(AriadneConfig::development())
            .build();
        strict.init().await.unwrap();
        let err = strict.register("getCats", |_, _| Box::pin(async { "cats" })).unwrap_err();
        assert_eq!(err, DispatchError::UnknownHandler("getCats".to_string()));
        strict.register("notFound", |_, _| Box::pin(async { "404" })).unwrap();
    }

    #[tokio::test]
    async fn test_strict_setup_checks_registered_handlers() {
        let mut api: Api<(), &str> = Api::builder(fixtures::petstore())
            .config(AriadneConfig::development())
            .build();
        api.register("getCats", |_, _| Box::pin(async { "cats" })).unwrap();
        assert_eq!(api.init().await.unwrap_err(), DispatchError::UnknownHandler("getCats".to_string()));
    }

    #[tokio::test]
    async fn test_setup_failure_policy() {
        let missing = JsonFileLoader::new("/nonexistent/ariadne/contract.json");

        let lenient: Api<(), &str> = Api::new(missing.clone());
        lenient.init().await.unwrap();
        assert!(lenient.router().await.unwrap().operations().is_empty());

        let strict: Api<(), &str> = Api::builder(missing)
            .config(AriadneConfig::development())
            .build();
        assert!(strict.init().await.unwrap_err().is_setup());
    }

    #[tokio::test]
    async fn test_unknown_security_scheme() {
        let mut api: Api<(), &str> = Api::builder(fixtures::secured())
            .config(AriadneConfig::development())
            .build();
        api.init().await.unwrap();
        let err = api
            .register_security_handler("oauth", |_, _| Box::pin(async { Ok::<_, SecurityHandlerError>(json!(true)) }))
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownSecurityScheme("oauth".to_string()));
        api.register_security_handler("basicAuth", |_, _| Box::pin(async { Ok::<_, SecurityHandlerError>(json!(true)) }))
            .unwrap();
        assert!(api.security_handler("basicAuth").is_some());
    }

    #[tokio::test]
    async fn test_unknown_operation_lookups() {
        let api = petstore();
        let err = api
            .mock_response_for_operation("getCats", &MockOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownOperation("getCats".to_string()));
        assert!(api.get_operation("getPets").await.is_ok());
    }
}
