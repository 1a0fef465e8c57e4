//! The contract validator.

use std::sync::{Arc, OnceLock};

use ariadne_config::{CompileMode, ValidationConfig};
use ariadne_core::status::{lookup_status, resolve_default_status};
use ariadne_core::{Operation, ParamMap, ParsedRequest, RawRequest};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::coerce::wrap_singular;
use crate::compile::{CompileContext, OperationValidators};
use crate::error::{ValidatorError, ValidatorResult};
use crate::result::{CoercedRequest, SetMatchType, ValidationError, ValidationResult};
use ariadne_router::Router;

type Slot = OnceLock<ValidatorResult<Arc<OperationValidators>>>;

/// Options for [`Validator::validate_response_headers`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseHeaderOptions {
    /// The actual status; the representative success status when absent.
    pub status: Option<u16>,
    /// How strictly observed headers must match the declared set.
    pub set_match: SetMatchType,
}

impl ResponseHeaderOptions {
    /// Options for a known status with the default set-match mode.
    #[must_use]
    pub fn for_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Sets the set-match mode.
    #[must_use]
    pub fn set_match(mut self, set_match: SetMatchType) -> Self {
        self.set_match = set_match;
        self
    }
}

/// Validates requests, responses and response headers against the
/// contract served by a [`Router`].
///
/// Per-operation validators are compiled at construction in
/// [`CompileMode::Eager`], or on first use in [`CompileMode::Lazy`]. The
/// compiled state is read-only afterwards and shared freely across
/// threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ariadne_config::{RouterConfig, ValidationConfig};
/// use ariadne_core::{fixtures, Contract, RawRequest};
/// use ariadne_router::Router;
/// use ariadne_validator::Validator;
///
/// let contract = Arc::new(Contract::from_document(fixtures::petstore()).unwrap());
/// let router = Arc::new(Router::new(contract, RouterConfig::default()).unwrap());
/// let validator = Validator::new(router, ValidationConfig::default()).unwrap();
///
/// let result = validator
///     .validate_request(&RawRequest::new("GET", "/pets/-1"), None)
///     .unwrap();
/// assert!(!result.valid());
/// assert_eq!(result.errors()[0].keyword, "minimum");
/// ```
#[derive(Debug)]
pub struct Validator {
    router: Arc<Router>,
    config: ValidationConfig,
    /// One slot per contract operation, in declaration order.
    slots: Vec<Slot>,
}

impl Validator {
    /// Creates a validator over a router's contract.
    ///
    /// # Errors
    ///
    /// In eager mode, returns the first schema that fails to compile.
    pub fn new(router: Arc<Router>, config: ValidationConfig) -> ValidatorResult<Self> {
        let slots: Vec<Slot> = router.operations().iter().map(|_| OnceLock::new()).collect();
        let validator = Self {
            router,
            config,
            slots,
        };

        if validator.config.compile == CompileMode::Eager {
            for (index, operation) in validator.router.operations().iter().enumerate() {
                validator.compiled_at(index, operation)?;
            }
        }

        info!(
            operations = validator.slots.len(),
            mode = %validator.config.compile,
            openapi = %validator.router.contract().openapi_version(),
            "validator initialized"
        );
        Ok(validator)
    }

    /// Returns the router this validator resolves operations with.
    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Returns the validator configuration.
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn context(&self) -> CompileContext<'_> {
        let contract = self.router.contract();
        CompileContext {
            document: contract.document(),
            openapi_31: contract.is_openapi_31(),
            validate_formats: self.config.validate_formats,
        }
    }

    fn compiled_at(&self, index: usize, operation: &Operation) -> ValidatorResult<Arc<OperationValidators>> {
        self.slots[index]
            .get_or_init(|| OperationValidators::compile(operation, self.context()).map(Arc::new))
            .clone()
    }

    fn validators_for(&self, operation: &Operation) -> ValidatorResult<Arc<OperationValidators>> {
        let index = self
            .router
            .operations()
            .iter()
            .position(|op| op.method() == operation.method() && op.path() == operation.path());

        match index {
            Some(index) => self.compiled_at(index, operation),
            None => {
                debug!(operation = %operation.label(), "compiling validators for foreign operation");
                OperationValidators::compile(operation, self.context()).map(Arc::new)
            }
        }
    }

    /// Validates a raw request.
    ///
    /// The operation is matched through the router when not given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::UnknownOperation`] when no operation
    /// matches, or a compile error in lazy mode.
    pub fn validate_request(
        &self,
        request: &RawRequest,
        operation: Option<&Operation>,
    ) -> ValidatorResult<ValidationResult> {
        let matched;
        let operation = match operation {
            Some(operation) => operation,
            None => {
                matched = self.router.match_operation(request, false)?.ok_or_else(|| {
                    ValidatorError::UnknownOperation {
                        method: request.method.to_ascii_lowercase(),
                        path: request.path.clone(),
                    }
                })?;
                &*matched
            }
        };

        let parsed = self.router.parse_request(request, Some(operation));
        self.validate_parsed_request(&parsed, operation)
    }

    /// Validates a request already parsed against `operation`.
    ///
    /// Errors from parameters and body are concatenated. With coercion
    /// enabled, a valid result carries the coerced parameter values.
    pub fn validate_parsed_request(
        &self,
        parsed: &ParsedRequest,
        operation: &Operation,
    ) -> ValidatorResult<ValidationResult> {
        let validators = self.validators_for(operation)?;

        let mut query = parsed.query.clone();
        for (name, value) in &mut query {
            if let Some(schema) = validators.query_param_schema(name) {
                wrap_singular(value, schema, validators.parameters.prepared());
            }
        }

        let mut instance = json!({
            "path": parsed.path_params,
            "query": query,
            "header": parsed.headers,
            "cookie": parsed.cookies,
        });
        if self.config.coerce_types {
            validators.parameters.coerce(&mut instance);
        }

        let mut errors = validators.parameters.errors(&instance);
        errors.extend(self.body_errors(parsed, operation, &validators));

        if !errors.is_empty() {
            debug!(
                operation = %operation.label(),
                errors = errors.len(),
                "request failed validation"
            );
            return Ok(ValidationResult::from_errors(errors));
        }

        let result = ValidationResult::valid_result();
        if !self.config.coerce_types {
            return Ok(result);
        }
        Ok(result.with_coerced(CoercedRequest {
            path: take_map(&mut instance, "path"),
            query: take_map(&mut instance, "query"),
            headers: take_map(&mut instance, "header"),
            cookies: take_map(&mut instance, "cookie"),
        }))
    }

    fn body_errors(
        &self,
        parsed: &ParsedRequest,
        operation: &Operation,
        validators: &OperationValidators,
    ) -> Vec<ValidationError> {
        let (Some(schema), Some(body)) = (&validators.body, operation.request_body()) else {
            return Vec::new();
        };

        let json_only = body.json_only();
        if !json_only {
            let negotiated_json = parsed
                .content_type()
                .map_or(true, |ct| ct.to_ascii_lowercase().contains("json"));
            if parsed.body.is_none() || !negotiated_json {
                return Vec::new();
            }
        }

        let mut errors = Vec::new();
        if json_only {
            if let Some(raw) = &parsed.raw_body {
                if let Err(e) = serde_json::from_str::<Value>(raw) {
                    errors.push(ValidationError::unparseable_body(&e.to_string()));
                }
            }
        }

        let instance = match &parsed.body {
            Some(body) => json!({ "requestBody": body }),
            None => json!({}),
        };
        errors.extend(schema.errors(&instance));
        errors
    }

    /// Validates a response body.
    ///
    /// With a status, the patterned per-status validator is used;
    /// otherwise the body must match some declared response. An operation
    /// declaring no response schema leaves the body unchecked. Pass
    /// [`Value::Null`] for an empty body.
    pub fn validate_response(
        &self,
        body: &Value,
        operation: &Operation,
        status: Option<u16>,
    ) -> ValidatorResult<ValidationResult> {
        let validators = self.validators_for(operation)?;
        let schema = match status {
            Some(status) => validators.response_for(status),
            None => validators.any_response.as_ref(),
        };

        Ok(match schema {
            Some(schema) => ValidationResult::from_errors(schema.errors(body)),
            None => {
                debug!(operation = %operation.label(), ?status, "no response schema, unchecked");
                ValidationResult::valid_result()
            }
        })
    }

    /// Validates response headers.
    ///
    /// Header names are compared case-insensitively and values are
    /// coerced to their declared scalar types before validation.
    pub fn validate_response_headers(
        &self,
        headers: &ParamMap,
        operation: &Operation,
        options: ResponseHeaderOptions,
    ) -> ValidatorResult<ValidationResult> {
        let validators = self.validators_for(operation)?;

        let key = match options.status {
            Some(status) => lookup_status(&validators.response_headers, status).map(|(key, _)| key),
            None => resolve_default_status(&validators.response_headers, None),
        };
        let Some(header_validators) = key.and_then(|k| validators.response_headers.get(k)) else {
            return Ok(ValidationResult::valid_result());
        };
        let schema = header_validators.get(options.set_match);

        let mut instance = Value::Object(
            headers
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
                .collect(),
        );
        schema.coerce(&mut instance);

        Ok(ValidationResult::from_errors(schema.errors(&instance)))
    }
}

fn take_map(instance: &mut Value, key: &str) -> ParamMap {
    match instance.get_mut(key).map(Value::take) {
        Some(Value::Object(map)) => map,
        _ => ParamMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_config::RouterConfig;
    use ariadne_core::{fixtures, Contract};

    fn validator_for(document: Value, config: ValidationConfig) -> Validator {
        let contract = Arc::new(Contract::from_document(document).unwrap());
        let router = Arc::new(Router::new(contract, RouterConfig::default()).unwrap());
        Validator::new(router, config).unwrap()
    }

    fn petstore() -> Validator {
        validator_for(fixtures::petstore(), ValidationConfig::default())
    }

    fn op(validator: &Validator, id: &str) -> Arc<Operation> {
        Arc::clone(validator.router().get_operation(id).unwrap())
    }

    #[test]
    fn test_path_parameter_minimum() {
        let validator = petstore();
        let ok = validator.validate_request(&RawRequest::new("GET", "/pets/1"), None).unwrap();
        assert!(ok.valid());

        let bad = validator.validate_request(&RawRequest::new("GET", "/pets/-1"), None).unwrap();
        assert_eq!(bad.errors().len(), 1);
        assert_eq!(bad.errors()[0].keyword, "minimum");
        assert_eq!(bad.errors()[0].instance_path, "/path/id");
    }

    #[test]
    fn test_unknown_query_parameter_beside_free_form_object() {
        let validator = validator_for(fixtures::free_form_query(), ValidationConfig::default());
        let request = RawRequest::new("GET", "/pets").query_string("color=red&limit=1");
        let result = validator.validate_request(&request, None).unwrap();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].keyword, "additionalProperties");

        let declared = RawRequest::new("GET", "/pets").query_string("limit=1");
        assert!(validator.validate_request(&declared, None).unwrap().valid());
    }

    #[test]
    fn test_unknown_operation() {
        let validator = petstore();
        let err = validator
            .validate_request(&RawRequest::new("GET", "/nowhere"), None)
            .unwrap_err();
        assert!(matches!(err, ValidatorError::UnknownOperation { .. }));
    }

    #[test]
    fn test_coerced_view_leaves_input_untouched() {
        let validator = petstore();
        let request = RawRequest::new("GET", "/pets?limit=10&tag=cat");
        let result = validator.validate_request(&request, None).unwrap();
        assert!(result.valid());

        let coerced = result.coerced().unwrap();
        assert_eq!(coerced.query["limit"], json!(10));
        assert_eq!(coerced.query["tag"], json!(["cat"]));
        assert_eq!(request.path, "/pets?limit=10&tag=cat");

        let parsed = validator
            .router()
            .parse_request(&request, Some(&op(&validator, "getPets")));
        assert_eq!(parsed.query["limit"], json!("10"));
    }

    #[test]
    fn test_no_coercion_rejects_wire_strings() {
        let config = ValidationConfig {
            coerce_types: false,
            ..ValidationConfig::default()
        };
        let validator = validator_for(fixtures::petstore(), config);
        let result = validator
            .validate_request(&RawRequest::new("GET", "/pets?limit=10"), None)
            .unwrap();
        assert!(!result.valid());
        assert_eq!(result.errors()[0].keyword, "type");
        assert!(result.coerced().is_none());
    }

    #[test]
    fn test_unknown_query_parameter_rejected() {
        let validator = petstore();
        let result = validator
            .validate_request(&RawRequest::new("GET", "/pets?color=red"), None)
            .unwrap();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].keyword, "additionalProperties");
    }

    #[test]
    fn test_required_header_case_insensitive() {
        let validator = petstore();
        let missing = validator
            .validate_request(&RawRequest::new("GET", "/pets/1/history"), None)
            .unwrap();
        assert_eq!(missing.errors().len(), 1);
        assert_eq!(missing.errors()[0].keyword, "required");

        let present = validator
            .validate_request(
                &RawRequest::new("GET", "/pets/1/history?verbose=true").header("X-Api-Version", "2"),
                None,
            )
            .unwrap();
        assert!(present.valid(), "{:?}", present.errors());
        assert_eq!(present.coerced().unwrap().headers["x-api-version"], json!(2));
        assert_eq!(present.coerced().unwrap().query["verbose"], json!(true));
    }

    #[test]
    fn test_json_content_query_parameter() {
        let validator = petstore();
        let request = RawRequest::new("GET", "/pets/1/history")
            .query_string("filter=%7B%22kind%22%3A%5B%5D%7D")
            .header("x-api-version", "1");
        let result = validator.validate_request(&request, None).unwrap();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].instance_path, "/query/filter/kind");
    }

    #[test]
    fn test_format_validation_toggle() {
        let request = RawRequest::new("GET", "/pets/1/history?since=yesterday").header("x-api-version", "1");

        let strict = petstore();
        assert_eq!(strict.validate_request(&request, None).unwrap().errors()[0].keyword, "format");

        let lenient = validator_for(
            fixtures::petstore(),
            ValidationConfig {
                validate_formats: false,
                ..ValidationConfig::default()
            },
        );
        assert!(lenient.validate_request(&request, None).unwrap().valid());
    }

    #[test]
    fn test_body_scenarios() {
        let validator = petstore();
        let post = |body: Option<Value>| {
            let mut request = RawRequest::new("POST", "/pets");
            if let Some(body) = body {
                request = request.json(body);
            }
            validator.validate_request(&request, None).unwrap()
        };

        assert!(post(Some(json!({ "name": "Garfield" }))).valid());

        let missing_name = post(Some(json!({ "age": 40 })));
        assert_eq!(missing_name.errors().len(), 1);
        assert_eq!(missing_name.errors()[0].keyword, "required");

        let extra = post(Some(json!({ "name": "Garfield", "hello": "world" })));
        assert_eq!(extra.errors().len(), 1);
        assert_eq!(extra.errors()[0].keyword, "additionalProperties");

        let empty = post(None);
        assert_eq!(empty.errors().len(), 1);
        assert_eq!(empty.errors()[0].keyword, "required");
    }

    #[test]
    fn test_errors_aggregate_across_parameters_and_body() {
        let validator = petstore();
        let request = RawRequest::new("POST", "/pets?color=red").json(json!({ "age": 1 }));
        let result = validator.validate_request(&request, None).unwrap();
        let keywords: Vec<_> = result.errors().iter().map(|e| e.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["additionalProperties", "required"]);
    }

    #[test]
    fn test_unparseable_json_body() {
        let validator = petstore();
        let request = RawRequest::new("POST", "/pets")
            .header("content-type", "application/json")
            .text("{ name: ");
        let result = validator.validate_request(&request, None).unwrap();
        assert_eq!(result.errors()[0].keyword, "parse");
        assert_eq!(result.errors()[0].schema_path, "#/requestBody");
    }

    #[test]
    fn test_negotiated_body_validation() {
        let validator = petstore();

        let text = RawRequest::new("PUT", "/pets/1")
            .header("content-type", "text/plain")
            .text("just words");
        assert!(validator.validate_request(&text, None).unwrap().valid());

        let json_body = RawRequest::new("PUT", "/pets/1")
            .header("content-type", "application/json; charset=utf-8")
            .json(json!({ "nickname": "G" }));
        assert!(!validator.validate_request(&json_body, None).unwrap().valid());

        let absent = RawRequest::new("PUT", "/pets/1");
        assert!(validator.validate_request(&absent, None).unwrap().valid());
    }

    #[test]
    fn test_response_by_status_pattern() {
        let validator = petstore();
        let get_pets = op(&validator, "getPets");

        let errors_body = json!({ "errors": [] });
        let message_body = json!({ "message": "nope" });

        assert!(validator.validate_response(&errors_body, &get_pets, Some(400)).unwrap().valid());
        assert!(!validator.validate_response(&message_body, &get_pets, Some(400)).unwrap().valid());
        assert!(validator.validate_response(&message_body, &get_pets, Some(403)).unwrap().valid());
        assert!(validator.validate_response(&message_body, &get_pets, Some(500)).unwrap().valid());
        assert!(!validator.validate_response(&json!([]), &get_pets, Some(500)).unwrap().valid());
    }

    #[test]
    fn test_response_any_status_union() {
        let validator = petstore();
        let get_pets = op(&validator, "getPets");
        let pets = json!([{ "id": 1, "name": "Garfield", "tag": null }]);

        assert!(validator.validate_response(&pets, &get_pets, None).unwrap().valid());
        assert!(validator
            .validate_response(&json!({ "message": "x" }), &get_pets, None)
            .unwrap()
            .valid());
        assert!(!validator.validate_response(&json!(42), &get_pets, None).unwrap().valid());
    }

    #[test]
    fn test_unchecked_responses() {
        let validator = validator_for(fixtures::secured(), ValidationConfig::default());
        let get_pets = op(&validator, "getPets");
        assert!(validator.validate_response(&json!("anything"), &get_pets, None).unwrap().valid());
        assert!(validator.validate_response(&json!(1), &get_pets, Some(200)).unwrap().valid());
    }

    #[test]
    fn test_no_content_response() {
        let validator = petstore();
        let delete = op(&validator, "deletePetById");
        assert!(validator.validate_response(&Value::Null, &delete, Some(204)).unwrap().valid());
        assert!(!validator.validate_response(&json!({}), &delete, Some(204)).unwrap().valid());
    }

    #[test]
    fn test_response_header_modes() {
        let validator = petstore();
        let get_pets = op(&validator, "getPets");

        let declared: ParamMap = serde_json::from_value(json!({ "X-Total-Count": "3" })).unwrap();
        let extra: ParamMap =
            serde_json::from_value(json!({ "x-total-count": "3", "x-served-by": "a" })).unwrap();
        let nothing = ParamMap::new();

        let check = |headers: &ParamMap, mode: SetMatchType| {
            validator
                .validate_response_headers(headers, &get_pets, ResponseHeaderOptions::for_status(200).set_match(mode))
                .unwrap()
                .valid()
        };

        assert!(check(&nothing, SetMatchType::Any));
        assert!(check(&extra, SetMatchType::Any));

        assert!(!check(&nothing, SetMatchType::Superset));
        assert!(check(&extra, SetMatchType::Superset));

        assert!(check(&nothing, SetMatchType::Subset));
        assert!(!check(&extra, SetMatchType::Subset));

        assert!(check(&declared, SetMatchType::Exact));
        assert!(!check(&extra, SetMatchType::Exact));
        assert!(!check(&nothing, SetMatchType::Exact));
    }

    #[test]
    fn test_response_header_values_coerced() {
        let validator = petstore();
        let get_pets = op(&validator, "getPets");
        let headers: ParamMap = serde_json::from_value(json!({ "x-total-count": "many" })).unwrap();
        let result = validator
            .validate_response_headers(&headers, &get_pets, ResponseHeaderOptions::default())
            .unwrap();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].keyword, "type");
    }

    #[test]
    fn test_lazy_and_eager_agree() {
        let eager = petstore();
        let lazy = validator_for(
            fixtures::petstore(),
            ValidationConfig {
                compile: CompileMode::Lazy,
                ..ValidationConfig::default()
            },
        );

        let requests = [
            RawRequest::new("GET", "/pets/-1"),
            RawRequest::new("GET", "/pets?limit=0&color=red"),
            RawRequest::new("POST", "/pets").json(json!({ "age": "x" })),
            RawRequest::new("GET", "/pets/1/history").header("x-api-version", "v2"),
        ];
        for request in &requests {
            assert_eq!(
                eager.validate_request(request, None).unwrap(),
                lazy.validate_request(request, None).unwrap()
            );
        }
    }

    #[test]
    fn test_recursive_contract() {
        let validator = validator_for(fixtures::recursive(), ValidationConfig::default());
        let tree = json!({ "value": 1, "children": [{ "value": 2, "children": [{ "value": 3 }] }] });
        let ok = validator
            .validate_request(&RawRequest::new("POST", "/trees").json(tree), None)
            .unwrap();
        assert!(ok.valid());

        let bad_tree = json!({ "value": 1, "children": [{ "children": [] }] });
        let bad = validator
            .validate_request(&RawRequest::new("POST", "/trees").json(bad_tree), None)
            .unwrap();
        assert_eq!(bad.errors().len(), 1);
        assert_eq!(bad.errors()[0].instance_path, "/requestBody/children/0");

        let person = op(&validator, "getPerson");
        let body = json!({ "name": "Ada", "employer": { "employees": [{ "name": 1 }] } });
        let result = validator.validate_response(&body, &person, Some(200)).unwrap();
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_openapi_31_contract() {
        let validator = validator_for(fixtures::openapi_31(), ValidationConfig::default());
        let post = |body: Value| {
            validator
                .validate_request(&RawRequest::new("POST", "/notes").json(body), None)
                .unwrap()
        };
        assert!(post(json!({ "text": "hi", "archivedAt": null, "priority": 1 })).valid());
        assert!(!post(json!({ "text": "hi", "priority": 0 })).valid());
    }

    #[test]
    fn test_openapi_30_nullable() {
        let validator = petstore();
        let get = op(&validator, "getPetById");
        assert!(validator
            .validate_response(&json!({ "id": 1, "name": "G", "tag": null }), &get, Some(200))
            .unwrap()
            .valid());
    }

    #[test]
    fn test_declared_status_without_payload_is_unchecked() {
        let validator = petstore();
        let get_pets = op(&validator, "getPets");
        // 401 declares no content; it must not fall through to 4XX.
        assert!(validator.validate_response(&json!(42), &get_pets, Some(401)).unwrap().valid());
        assert!(!validator.validate_response(&json!(42), &get_pets, Some(402)).unwrap().valid());
    }

    #[test]
    fn test_foreign_operation_compiled_on_demand() {
        let validator = petstore();
        let other = Contract::from_document(json!({
            "openapi": "3.0.3",
            "info": { "title": "other", "version": "1" },
            "paths": {
                "/trees": {
                    "post": {
                        "operationId": "plantTree",
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": { "type": "object", "required": ["species"] }
                                }
                            }
                        },
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap();
        let plant = other.get_operation("plantTree").unwrap();
        let result = validator
            .validate_request(&RawRequest::new("POST", "/trees").json(json!({})), Some(plant))
            .unwrap();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].keyword, "required");
    }
}
