//! Validation outcome types.

use std::fmt;
use std::str::FromStr;

use ariadne_core::ParamMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::ValidatorError;

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The failing schema keyword (`required`, `minimum`, `parse`, ...).
    pub keyword: String,
    /// JSON pointer into the validated instance.
    pub instance_path: String,
    /// JSON pointer into the synthesised schema.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn from_schema_error(error: &jsonschema::ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = schema_path
            .rsplit('/')
            .find(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
            .unwrap_or_default()
            .to_string();
        Self {
            keyword,
            instance_path: error.instance_path.to_string(),
            schema_path: format!("#{schema_path}"),
            message: error.to_string(),
        }
    }

    /// The error reported when a JSON-only request body does not parse.
    pub(crate) fn unparseable_body(reason: &str) -> Self {
        Self {
            keyword: "parse".to_string(),
            instance_path: String::new(),
            schema_path: "#/requestBody".to_string(),
            message: format!("request body is not valid JSON: {reason}"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{} ({})", self.message, self.keyword)
        } else {
            write!(f, "{}: {} ({})", self.instance_path, self.message, self.keyword)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Request values after coercion to their declared types.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoercedRequest {
    /// Path parameters.
    pub path: ParamMap,
    /// Query parameters.
    pub query: ParamMap,
    /// Headers, lowercase names.
    pub headers: ParamMap,
    /// Cookies.
    pub cookies: ParamMap,
}

/// Outcome of validating a request, response or response headers.
///
/// `valid` holds exactly when no error was collected. Serialised, an
/// empty error list is rendered as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    coerced: Option<CoercedRequest>,
}

impl ValidationResult {
    /// A result with no errors.
    #[must_use]
    pub fn valid_result() -> Self {
        Self::default()
    }

    /// A result holding the given errors.
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            errors,
            coerced: None,
        }
    }

    pub(crate) fn with_coerced(mut self, coerced: CoercedRequest) -> Self {
        self.coerced = Some(coerced);
        self
    }

    /// Returns true when no error was collected.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the collected errors, empty when valid.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns the coerced request values.
    ///
    /// Present only for valid request results when coercion is enabled.
    #[must_use]
    pub fn coerced(&self) -> Option<&CoercedRequest> {
        self.coerced.as_ref()
    }

    /// Consumes the result, returning its errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 3)?;
        state.serialize_field("valid", &self.valid())?;
        state.serialize_field(
            "errors",
            &(!self.errors.is_empty()).then_some(&self.errors),
        )?;
        state.serialize_field("coerced", &self.coerced)?;
        state.end()
    }
}

/// How strictly observed response headers must match the declared ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetMatchType {
    /// Unlisted headers allowed, declared ones optional.
    Any,
    /// Unlisted headers allowed, required ones must be present.
    #[default]
    Superset,
    /// No unlisted headers, declared ones optional.
    Subset,
    /// No unlisted headers, required ones must be present.
    Exact,
}

impl SetMatchType {
    /// All modes, in compilation order.
    pub const ALL: [Self; 4] = [Self::Any, Self::Superset, Self::Subset, Self::Exact];

    /// Returns the lowercase mode name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Superset => "superset",
            Self::Subset => "subset",
            Self::Exact => "exact",
        }
    }

    pub(crate) fn allows_unlisted(self) -> bool {
        matches!(self, Self::Any | Self::Superset)
    }

    pub(crate) fn enforces_required(self) -> bool {
        matches!(self, Self::Superset | Self::Exact)
    }
}

impl FromStr for SetMatchType {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "superset" => Ok(Self::Superset),
            "subset" => Ok(Self::Subset),
            "exact" => Ok(Self::Exact),
            other => Err(ValidatorError::InvalidSetMatchType(other.to_string())),
        }
    }
}

impl fmt::Display for SetMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_iff_no_errors() {
        assert!(ValidationResult::valid_result().valid());
        let result = ValidationResult::from_errors(vec![ValidationError::unparseable_body("eof")]);
        assert!(!result.valid());
        assert_eq!(result.errors()[0].keyword, "parse");
        assert_eq!(result.errors()[0].schema_path, "#/requestBody");
    }

    #[test]
    fn test_serialized_errors_null_when_valid() {
        let value = serde_json::to_value(ValidationResult::valid_result()).unwrap();
        assert_eq!(value, json!({ "valid": true, "errors": null, "coerced": null }));

        let failed = ValidationResult::from_errors(vec![ValidationError::unparseable_body("eof")]);
        let value = serde_json::to_value(failed).unwrap();
        assert_eq!(value["valid"], json!(false));
        assert_eq!(value["errors"][0]["keyword"], json!("parse"));
    }

    #[test]
    fn test_set_match_parse() {
        for mode in SetMatchType::ALL {
            assert_eq!(mode.as_str().parse::<SetMatchType>().unwrap(), mode);
        }
        assert_eq!(
            "most".parse::<SetMatchType>(),
            Err(ValidatorError::InvalidSetMatchType("most".to_string()))
        );
    }

    #[test]
    fn test_set_match_semantics() {
        assert!(SetMatchType::Any.allows_unlisted() && !SetMatchType::Any.enforces_required());
        assert!(SetMatchType::Superset.allows_unlisted() && SetMatchType::Superset.enforces_required());
        assert!(!SetMatchType::Subset.allows_unlisted() && !SetMatchType::Subset.enforces_required());
        assert!(!SetMatchType::Exact.allows_unlisted() && SetMatchType::Exact.enforces_required());
    }
}
