//! # Ariadne Core
//!
//! Core types shared by every Ariadne crate.
//!
//! This crate provides the in-memory model of an API contract and the
//! request shapes that flow through routing, validation and dispatch:
//!
//! - [`Contract`] - The dereferenced contract document flattened into [`Operation`]s
//! - [`Operation`], [`Parameter`], [`Response`] - Per-operation declarations
//! - [`RawRequest`] / [`ParsedRequest`] - Inbound request before and after parsing
//! - [`status`] - Patterned status-code lookup and default response resolution
//! - [`ContractError`] - Errors raised while flattening a contract
//!
//! # Example
//!
//! ```
//! use ariadne_core::Contract;
//! use serde_json::json;
//!
//! let contract = Contract::from_document(json!({
//!     "openapi": "3.0.3",
//!     "info": { "title": "pets", "version": "1.0.0" },
//!     "paths": {
//!         "/pets": { "get": { "operationId": "getPets", "responses": {} } }
//!     }
//! }))
//! .unwrap();
//!
//! assert_eq!(contract.operations().len(), 1);
//! assert!(contract.get_operation("getPets").is_some());
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contract;
mod error;
pub mod fixtures;
pub mod request;
pub mod status;

pub use contract::{
    resolve_pointer, Contract, Header, MediaType, Operation, Parameter, ParameterLocation,
    ParameterStyle, RequestBody, Response, SecurityRequirement,
};
pub use error::{ContractError, ContractResult};
pub use request::{HeaderValue, ParamMap, ParsedRequest, RawBody, RawQuery, RawRequest};
