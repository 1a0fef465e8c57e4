//! Top-level configuration.

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, DispatchConfig, RouterConfig, TelemetryConfigSection, ValidationConfig,
};

/// Complete Ariadne configuration.
///
/// # Example
///
/// ```
/// use ariadne_config::AriadneConfig;
///
/// let config = AriadneConfig::default();
/// assert_eq!(config.router.api_root, "/");
/// assert!(config.validation.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AriadneConfig {
    /// Router configuration.
    #[serde(default)]
    pub router: RouterConfig,

    /// Validator configuration.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Orchestrator configuration.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl AriadneConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> AriadneConfigBuilder {
        AriadneConfigBuilder::new()
    }

    /// Development preset: pretty debug logging, strict dispatch.
    #[must_use]
    pub fn development() -> Self {
        Self {
            dispatch: DispatchConfig { strict: true },
            telemetry: TelemetryConfigSection {
                logging: ariadne_telemetry::LogConfig::development(),
            },
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the API root does not start
    /// with `/` or the log filter does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.router.api_root.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "router.api_root",
                format!("must start with '/': {}", self.router.api_root),
            ));
        }

        if self.router.api_root.contains(['?', '#', '{', '}']) {
            return Err(ConfigError::invalid_value(
                "router.api_root",
                "must be a literal path without query, fragment or placeholders",
            ));
        }

        self.telemetry
            .logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;

        Ok(())
    }
}

/// Builder for [`AriadneConfig`].
#[derive(Debug, Default)]
pub struct AriadneConfigBuilder {
    config: AriadneConfig,
}

impl AriadneConfigBuilder {
    /// Create a builder starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the router section.
    #[must_use]
    pub fn router(mut self, router: RouterConfig) -> Self {
        self.config.router = router;
        self
    }

    /// Set the validation section.
    #[must_use]
    pub fn validation(mut self, validation: ValidationConfig) -> Self {
        self.config.validation = validation;
        self
    }

    /// Set the dispatch section.
    #[must_use]
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Set the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.config.telemetry = telemetry;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AriadneConfig {
        self.config
    }
}
