//! # Ariadne
//!
//! **Contract-driven request routing, validation and dispatch for OpenAPI services**
//!
//! Ariadne sits between an HTTP server and its handler functions. Given an
//! OpenAPI 3.0 or 3.1 document it:
//!
//! - **Routes** a method and path to the operation it targets, telling a
//!   missing route apart from a method the path does not accept
//! - **Parses** path, query, header and cookie parameters following their
//!   declared serialization styles
//! - **Validates** requests against compiled JSON Schemas, coercing wire
//!   strings to their declared types, and validates responses and
//!   response headers for contract tests
//! - **Dispatches** each request through security evaluation and
//!   validation to a registered handler, with lifecycle hooks for every
//!   outcome
//!
//! ## Quick Start
//!
//! ```
//! use ariadne::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let mut api: Api<(), Value> = Api::new(ariadne::core::fixtures::petstore());
//! api.register("getPetById", |ctx, _| {
//!     let id = ctx.request().path_params["id"].clone();
//!     Box::pin(async move { json!({ "id": id }) })
//! })
//! .unwrap();
//!
//! let response = api
//!     .handle_request(RawRequest::new("GET", "/pets/7"), &())
//!     .await
//!     .unwrap();
//! assert_eq!(response, json!({ "id": "7" }));
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Routing → Re-parse → Security → Validation → Pre-response → Handler
//!                                                                         ↓
//! Response ←──────────────────────────────────────────── Post-response ←──┘
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the contract model
pub use ariadne_core as core;

// Re-export configuration
pub use ariadne_config as config;

// Re-export logging and metrics
pub use ariadne_telemetry as telemetry;

// Re-export routing and request parsing
pub use ariadne_router as router;

// Re-export schema validation
pub use ariadne_validator as validator;

// Re-export the request pipeline
pub use ariadne_dispatch as dispatch;

/// Installs logging and registers metric descriptions from a configuration.
///
/// Call once at startup, after installing a metrics recorder if metrics
/// are wanted.
pub fn init_telemetry(
    config: &ariadne_config::AriadneConfig,
) -> ariadne_telemetry::TelemetryResult<()> {
    ariadne_telemetry::init_logging(&config.telemetry.logging)?;
    ariadne_telemetry::describe_metrics();
    Ok(())
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use ariadne::prelude::*;
///
/// let config = AriadneConfig::default();
/// assert!(config.validation.enabled);
/// ```
pub mod prelude {
    pub use ariadne_core::{
        Contract, Operation, ParamMap, ParsedRequest, RawRequest, SecurityRequirement,
    };

    // Re-export configuration types
    pub use ariadne_config::{AriadneConfig, ConfigLoader};

    // Re-export routing types
    pub use ariadne_router::{RouteMatch, Router};

    // Re-export validation types
    pub use ariadne_validator::{
        ResponseHeaderOptions, SetMatchType, ValidationError, ValidationResult, Validator,
    };

    // Re-export pipeline types
    pub use ariadne_dispatch::{
        Api, ApiBuilder, BoxFuture, ContractLinter, ContractLoader, DispatchError, DispatchResult,
        HandlerKey, JsonFileLoader, MockOptions, MockResponse, RequestContext, SchemeResult,
        SecurityContext, SecurityHandlerError, StructureLinter,
    };

    pub use serde_json::Value;
}
