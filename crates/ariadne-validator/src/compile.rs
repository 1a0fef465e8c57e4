//! Per-operation schema synthesis and compilation.

use ariadne_core::status::lookup_status;
use ariadne_core::{Operation, ParameterLocation};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::coerce;
use crate::error::{ValidatorError, ValidatorResult};
use crate::result::{SetMatchType, ValidationError};
use crate::schema::{escape_token, normalize_openapi30, Decycler};

/// Settings shared by every compilation against one contract.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompileContext<'d> {
    pub document: &'d Value,
    pub openapi_31: bool,
    pub validate_formats: bool,
}

/// A compiled synthesised schema together with its prepared form.
pub(crate) struct CompiledSchema {
    prepared: Value,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("prepared", &self.prepared)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    fn compile(
        root: &Value,
        ctx: CompileContext<'_>,
        operation: &str,
        target: &str,
    ) -> ValidatorResult<Self> {
        let mut prepared = Decycler::new(ctx.document).run(root).map_err(|reference| {
            ValidatorError::UnresolvedReference {
                operation: operation.to_string(),
                reference,
            }
        })?;

        let draft = if ctx.openapi_31 {
            jsonschema::Draft::Draft202012
        } else {
            normalize_openapi30(&mut prepared);
            jsonschema::Draft::Draft7
        };

        let validator = jsonschema::options()
            .with_draft(draft)
            .should_validate_formats(ctx.validate_formats)
            .build(&prepared)
            .map_err(|e| ValidatorError::Compile {
                operation: operation.to_string(),
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            prepared,
            validator,
        })
    }

    pub(crate) fn errors(&self, instance: &Value) -> Vec<ValidationError> {
        self.validator
            .iter_errors(instance)
            .map(|e| ValidationError::from_schema_error(&e))
            .collect()
    }

    pub(crate) fn coerce(&self, instance: &mut Value) {
        coerce::coerce(instance, &self.prepared, &self.prepared);
    }

    /// Returns the prepared sub-schema at `pointer`.
    pub(crate) fn subschema(&self, pointer: &str) -> Option<&Value> {
        self.prepared.pointer(pointer)
    }

    pub(crate) fn prepared(&self) -> &Value {
        &self.prepared
    }
}

/// Response header validators of one status, one per set-match mode.
#[derive(Debug)]
pub(crate) struct HeaderValidators {
    any: CompiledSchema,
    superset: CompiledSchema,
    subset: CompiledSchema,
    exact: CompiledSchema,
}

impl HeaderValidators {
    pub(crate) fn get(&self, mode: SetMatchType) -> &CompiledSchema {
        match mode {
            SetMatchType::Any => &self.any,
            SetMatchType::Superset => &self.superset,
            SetMatchType::Subset => &self.subset,
            SetMatchType::Exact => &self.exact,
        }
    }
}

/// Everything compiled for one operation.
#[derive(Debug)]
pub(crate) struct OperationValidators {
    pub parameters: CompiledSchema,
    pub body: Option<CompiledSchema>,
    pub responses: IndexMap<String, Option<CompiledSchema>>,
    pub any_response: Option<CompiledSchema>,
    pub response_headers: IndexMap<String, HeaderValidators>,
}

impl OperationValidators {
    pub(crate) fn compile(operation: &Operation, ctx: CompileContext<'_>) -> ValidatorResult<Self> {
        let label = operation.label();

        let parameters = CompiledSchema::compile(
            &parameters_schema(operation),
            ctx,
            &label,
            "parameters",
        )?;

        let body = body_schema(operation)
            .map(|schema| CompiledSchema::compile(&schema, ctx, &label, "requestBody"))
            .transpose()?;

        // Declared statuses without a JSON payload stay in the map as
        // unchecked, so patterned lookup never falls through past them.
        let mut response_schemas = IndexMap::new();
        for (status, response) in operation.responses() {
            let schema = match response.json_schema() {
                Some(schema) => Some(schema.clone()),
                None if status == "204" => Some(json!({ "type": "null" })),
                None => None,
            };
            response_schemas.insert(status.clone(), schema);
        }

        let mut responses = IndexMap::new();
        for (status, schema) in &response_schemas {
            let target = format!("response {status}");
            let compiled = schema
                .as_ref()
                .map(|schema| CompiledSchema::compile(schema, ctx, &label, &target))
                .transpose()?;
            responses.insert(status.clone(), compiled);
        }

        let declared: Vec<&Value> = response_schemas.values().flatten().collect();
        let any_response = if declared.is_empty() {
            None
        } else {
            let union = json!({ "anyOf": declared });
            Some(CompiledSchema::compile(&union, ctx, &label, "response")?)
        };

        let mut response_headers = IndexMap::new();
        for status in operation.responses().keys() {
            let target = format!("response {status} headers");
            let build = |mode| {
                CompiledSchema::compile(&response_headers_schema(operation, status, mode), ctx, &label, &target)
            };
            response_headers.insert(
                status.clone(),
                HeaderValidators {
                    any: build(SetMatchType::Any)?,
                    superset: build(SetMatchType::Superset)?,
                    subset: build(SetMatchType::Subset)?,
                    exact: build(SetMatchType::Exact)?,
                },
            );
        }

        debug!(
            operation = %label,
            responses = responses.values().flatten().count(),
            has_body = body.is_some(),
            "operation validators compiled"
        );

        Ok(Self {
            parameters,
            body,
            responses,
            any_response,
            response_headers,
        })
    }

    /// Finds the response validator for a concrete status.
    pub(crate) fn response_for(&self, status: u16) -> Option<&CompiledSchema> {
        lookup_status(&self.responses, status).and_then(|(_, schema)| schema.as_ref())
    }

    /// Returns the prepared schema of a declared query parameter.
    pub(crate) fn query_param_schema(&self, name: &str) -> Option<&Value> {
        self.parameters
            .subschema(&format!("/properties/query/properties/{}", escape_token(name)))
    }
}

/// Builds the combined parameter schema of an operation.
///
/// The instance it validates is `{path, query, header, cookie}`.
pub(crate) fn parameters_schema(operation: &Operation) -> Value {
    let mut locations = Map::new();
    let mut required_locations = Vec::new();

    for location in ParameterLocation::ALL {
        let mut properties = Map::new();
        let mut required = Vec::new();
        let additional = matches!(location, ParameterLocation::Header | ParameterLocation::Cookie);

        for param in operation.parameters_in(location) {
            let name = match location {
                ParameterLocation::Header => param.name().to_ascii_lowercase(),
                _ => param.name().to_string(),
            };
            let schema = param.effective_schema().cloned().unwrap_or_else(|| json!({}));

            if param.required() {
                required.push(Value::String(name.clone()));
            }
            properties.insert(name, schema);
        }

        let mut location_schema = Map::new();
        location_schema.insert("type".to_string(), json!("object"));
        location_schema.insert("properties".to_string(), Value::Object(properties));
        location_schema.insert("additionalProperties".to_string(), Value::Bool(additional));
        if !required.is_empty() {
            required_locations.push(json!(location.as_str()));
            location_schema.insert("required".to_string(), Value::Array(required));
        }
        locations.insert(location.as_str().to_string(), Value::Object(location_schema));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(locations));
    if !required_locations.is_empty() {
        schema.insert("required".to_string(), Value::Array(required_locations));
    }
    Value::Object(schema)
}

/// Builds the request body schema, `None` when no JSON body is declared.
pub(crate) fn body_schema(operation: &Operation) -> Option<Value> {
    let body = operation.request_body()?;
    let schema = body.json_schema()?;
    let mut wrapper = json!({
        "type": "object",
        "properties": { "requestBody": schema },
    });
    if body.json_only() {
        wrapper["required"] = json!(["requestBody"]);
    }
    Some(wrapper)
}

/// Builds the response header schema of one status for one set-match mode.
pub(crate) fn response_headers_schema(operation: &Operation, status: &str, mode: SetMatchType) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    if let Some(response) = operation.responses().get(status) {
        for (name, header) in &response.headers {
            let name = name.to_ascii_lowercase();
            if header.required {
                required.push(Value::String(name.clone()));
            }
            properties.insert(name, header.schema.clone().unwrap_or_else(|| json!({})));
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": mode.allows_unlisted(),
    });
    if mode.enforces_required() && !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}
