//! Observability for Ariadne.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: dispatch outcome and validation failure counters through the
//!   `metrics` facade
//!
//! Every Ariadne crate emits diagnostics through `tracing`. Until a
//! subscriber is installed those events go nowhere, so libraries embedding
//! Ariadne keep full control over output. Likewise metrics are no-ops until
//! the host installs a `metrics` recorder.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ariadne_dispatch_total` | Counter | `operation`, `outcome` | Requests by pipeline outcome |
//! | `ariadne_validation_failures_total` | Counter | `operation`, `kind` | Failed request/response validations |
//! | `ariadne_security_denials_total` | Counter | `operation` | Requests no requirement-set authorised |
//!
//! # Example
//!
//! ```rust,ignore
//! use ariadne_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(operation_id = "getPets", "dispatching");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{describe_metrics, DispatchOutcome};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
