//! # Ariadne Router
//!
//! Matches inbound requests to contract operations and decomposes them into
//! structured parameters.
//!
//! ## Matching
//!
//! 1. The path is normalised (query stripped, one leading slash).
//! 2. The API root is stripped; paths outside it never match.
//! 3. Literal templates are compared as strings first.
//! 4. Otherwise templates are tried as anchored patterns in order of
//!    specificity (template length without placeholders), so `/pets/meta`
//!    wins over `/pets/{id}`.
//! 5. A path that matches some template but not with the requested method
//!    is "method not allowed", distinct from "not found".
//!
//! ## Parsing
//!
//! [`Router::parse_request`] lowercases header names, parses cookies and
//! the query string, decodes JSON bodies, and, once an operation is known,
//! binds path parameters and applies query serialization styles.

#![doc(html_root_url = "https://docs.rs/ariadne-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod path;
pub mod query;
mod router;
mod template;

pub use error::{RouteError, RouteResult};
pub use path::{normalize, strip_api_root, strip_trailing_slashes};
pub use router::{RouteMatch, Router};
