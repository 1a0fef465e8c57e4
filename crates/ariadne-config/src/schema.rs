//! Configuration section types.

use std::fmt;
use std::str::FromStr;

use ariadne_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Router settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Path prefix every API route lives under.
    pub api_root: String,

    /// Whether `/pets` and `/pets/` route to the same operation.
    pub ignore_trailing_slashes: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            api_root: "/".to_string(),
            ignore_trailing_slashes: true,
        }
    }
}

/// When per-operation validators are compiled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// Compile everything at construction.
    #[default]
    Eager,
    /// Compile each operation on first use.
    Lazy,
}

impl FromStr for CompileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "lazy" => Ok(Self::Lazy),
            other => Err(format!("unknown compile mode '{other}'")),
        }
    }
}

impl fmt::Display for CompileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager => f.write_str("eager"),
            Self::Lazy => f.write_str("lazy"),
        }
    }
}

/// Validator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Whether the pipeline validates requests at all.
    pub enabled: bool,

    /// Whether wire strings are coerced to their declared scalar types.
    pub coerce_types: bool,

    /// Whether `format` keywords are asserted.
    pub validate_formats: bool,

    /// When validators are compiled.
    pub compile: CompileMode,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            coerce_types: true,
            validate_formats: true,
            compile: CompileMode::Eager,
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Turns setup failures and unknown handler registrations into errors
    /// instead of warnings.
    pub strict: bool,
}

/// Telemetry settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Logging subscriber settings.
    pub logging: LogConfig,
}
