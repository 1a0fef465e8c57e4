//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{AriadneConfig, ConfigError};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables (`PREFIX__SECTION__KEY`)
///
/// # Example
///
/// ```no_run
/// use ariadne_config::ConfigLoader;
///
/// # fn main() -> Result<(), ariadne_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("ariadne.toml")?
///     .with_dotenv()
///     .with_env_prefix("ARIADNE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: AriadneConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use ariadne_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = AriadneConfig::development();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension (`.toml` or `.json`).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        self.config = parse(&content, &format)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format.
    ///
    /// ```
    /// use ariadne_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [router]
    ///     api_root = "/api"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.router.api_root, "/api");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    pub fn load(mut self) -> Result<AriadneConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> AriadneConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Another variable that merely shares the prefix.
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["ROUTER", "API_ROOT"] => {
                self.config.router.api_root = value.to_string();
            }
            ["ROUTER", "IGNORE_TRAILING_SLASHES"] => {
                self.config.router.ignore_trailing_slashes = bool_var(key, value)?;
            }
            ["VALIDATION", "ENABLED"] => {
                self.config.validation.enabled = bool_var(key, value)?;
            }
            ["VALIDATION", "COERCE_TYPES"] => {
                self.config.validation.coerce_types = bool_var(key, value)?;
            }
            ["VALIDATION", "VALIDATE_FORMATS"] => {
                self.config.validation.validate_formats = bool_var(key, value)?;
            }
            ["VALIDATION", "COMPILE"] => {
                self.config.validation.compile = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected 'eager' or 'lazy'"))?;
            }
            ["DISPATCH", "STRICT"] => {
                self.config.dispatch.strict = bool_var(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                self.config.telemetry.logging.enabled = bool_var(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                self.config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "JSON_FORMAT"] => {
                self.config.telemetry.logging.json_format = bool_var(key, value)?;
            }
            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<AriadneConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompileMode;
    use std::io::Write;

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, AriadneConfig::default());
    }

    #[test]
    fn test_with_string_json() {
        let json = r#"{"router": {"api_root": "/v1", "ignore_trailing_slashes": false}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.router.api_root, "/v1");
        assert!(!config.router.ignore_trailing_slashes);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
            [router]
            api_prefix = "/v1"
        "#;
        assert!(matches!(
            ConfigLoader::new().with_string(toml, "toml"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            ConfigLoader::new().with_string("", "yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_with_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [validation]
            compile = "lazy"
            coerce_types = false

            [dispatch]
            strict = true

            [telemetry.logging]
            level = "warn"
            json_format = false
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.validation.compile, CompileMode::Lazy);
        assert!(!config.validation.coerce_types);
        assert!(config.dispatch.strict);
        assert_eq!(config.telemetry.logging.level, "warn");
    }

    #[test]
    fn test_with_file_not_found() {
        assert!(matches!(
            ConfigLoader::new().with_file("/nonexistent/ariadne.toml"),
            Err(ConfigError::FileNotFound { .. })
        ));
        assert!(ConfigLoader::new()
            .with_optional_file("/nonexistent/ariadne.toml")
            .is_ok());
    }

    #[test]
    fn test_invalid_api_root_fails_load() {
        let result = ConfigLoader::new()
            .with_string(r#"{"router": {"api_root": "v1"}}"#, "json")
            .unwrap()
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_env_vars() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__ROUTER__API_ROOT", "/api", "TEST").unwrap();
        loader.apply_env_var("TEST__DISPATCH__STRICT", "yes", "TEST").unwrap();
        loader.apply_env_var("TEST__VALIDATION__COMPILE", "lazy", "TEST").unwrap();
        loader.apply_env_var("TEST__TELEMETRY__LOGGING__LEVEL", "debug", "TEST").unwrap();
        assert_eq!(loader.config.router.api_root, "/api");
        assert!(loader.config.dispatch.strict);
        assert_eq!(loader.config.validation.compile, CompileMode::Lazy);
        assert_eq!(loader.config.telemetry.logging.level, "debug");
    }

    #[test]
    fn test_apply_env_var_invalid_boolean() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__VALIDATION__ENABLED", "maybe", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn test_env_prefix_from_process() {
        env::set_var("ARIADNE_LOADER_TEST__ROUTER__IGNORE_TRAILING_SLASHES", "false");
        let config = ConfigLoader::new()
            .with_env_prefix("ariadne_loader_test")
            .load()
            .unwrap();
        env::remove_var("ARIADNE_LOADER_TEST__ROUTER__IGNORE_TRAILING_SLASHES");
        assert!(!config.router.ignore_trailing_slashes);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
