//! # Ariadne Dispatch
//!
//! The request-handling pipeline that ties routing, security evaluation
//! and validation to registered handlers.
//!
//! ## Pipeline
//!
//! | stage         | on failure                                                  |
//! |---------------|-------------------------------------------------------------|
//! | routing       | `methodNotAllowed`, then `notFound`, else an error          |
//! | security      | `unauthorizedHandler`, else [`DispatchError::Unauthorized`]  |
//! | validation    | `validationFail`, else the route handler runs anyway        |
//! | pre-response  | `Some` answers the request                                  |
//! | route handler | `notImplemented`, else [`DispatchError::NotImplemented`]     |
//! | post-response | receives the response and returns the final one             |
//!
//! ## Example
//!
//! ```
//! use ariadne_core::{fixtures, RawRequest};
//! use ariadne_dispatch::{Api, SecurityHandlerError};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let mut api: Api<(), String> = Api::new(fixtures::secured());
//! api.register_security_handler("basicAuth", |ctx, _| {
//!     let authorized = ctx.request().header("authorization").is_some();
//!     Box::pin(async move { Ok::<_, SecurityHandlerError>(json!(authorized)) })
//! })
//! .unwrap();
//! api.register("getPets", |_, _| Box::pin(async { "pets".to_string() })).unwrap();
//! api.register("unauthorizedHandler", |_, _| Box::pin(async { "denied".to_string() }))
//!     .unwrap();
//!
//! let anonymous = RawRequest::new("GET", "/pets");
//! assert_eq!(api.handle_request(anonymous, &()).await.unwrap(), "denied");
//!
//! let signed = RawRequest::new("GET", "/pets").header("Authorization", "Basic YTpi");
//! assert_eq!(api.handle_request(signed, &()).await.unwrap(), "pets");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod context;
mod error;
mod handler;
mod loader;
mod mock;
mod security;

pub use api::{Api, ApiBuilder, ValidationPredicate};
pub use context::RequestContext;
pub use error::{DispatchError, DispatchResult, SecurityHandlerError};
pub use handler::{
    handler, pre_response_handler, security_handler, BoxFuture, Handler, HandlerKey,
    PreResponseHandler, SecurityHandler,
};
pub use loader::{ContractLinter, ContractLoader, JsonFileLoader, StructureLinter};
pub use mock::{MockGenerator, MockOptions, MockResponse, SchemaMocker};
pub use security::{is_truthy, requirements_satisfied, SchemeResult, SecurityContext};
