//! # Ariadne Validator
//!
//! Contract-driven validation of requests, responses and response headers.
//!
//! For every operation the validator synthesises JSON schemas from the
//! contract and compiles them with [`jsonschema`]:
//!
//! | schema              | instance                              |
//! |---------------------|---------------------------------------|
//! | parameters          | `{path, query, header, cookie}`       |
//! | request body        | `{requestBody}`                       |
//! | response per status | the response body                     |
//! | any response        | the body, against the union of statuses |
//! | response headers    | lowercase header map, per [`SetMatchType`] |
//!
//! Schema references are inlined before compilation. Recursive schemas
//! become local back-references, so self-referential shapes compile.
//!
//! Parameter values arrive from the wire as strings; with
//! `coerce_types` enabled they are converted to their declared scalar
//! types first, and the converted values are returned in
//! [`ValidationResult::coerced`].
//!
//! Schema violations never surface as `Err`: they are collected into a
//! [`ValidationResult`]. [`ValidatorError`] is reserved for setup
//! problems such as unresolved references.

#![doc(html_root_url = "https://docs.rs/ariadne-validator/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod compile;
mod error;
mod result;
pub mod schema;
mod validator;

pub use error::{ValidatorError, ValidatorResult};
pub use result::{CoercedRequest, SetMatchType, ValidationError, ValidationResult};
pub use schema::SchemaNode;
pub use validator::{ResponseHeaderOptions, Validator};
