//! Typed configuration for Ariadne.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`ARIADNE__ROUTER__API_ROOT=/api`)
//! - Strict parsing: unknown fields are rejected
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! api_root = "/api"
//! ignore_trailing_slashes = true
//!
//! [validation]
//! enabled = true
//! coerce_types = true
//! validate_formats = true
//! compile = "eager"
//!
//! [dispatch]
//! strict = false
//!
//! [telemetry.logging]
//! level = "info"
//! json_format = true
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{AriadneConfig, AriadneConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{CompileMode, DispatchConfig, RouterConfig, TelemetryConfigSection, ValidationConfig};
