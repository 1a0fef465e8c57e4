//! Mock responses generated from the contract.
//!
//! The status is picked with the default-response rule. The body is, in
//! order of preference: the requested named example, the media type's
//! inline `example`, its first named example, then a value synthesised
//! from the schema by a [`MockGenerator`].

use ariadne_core::contract::JSON_MEDIA_TYPE;
use ariadne_core::status::{resolve_default_status, status_code_for_key};
use ariadne_core::{resolve_pointer, MediaType, Operation};
use serde_json::{json, Map, Value};

/// Schema depth past which generation stops descending.
const MAX_DEPTH: usize = 16;

/// Selects which response, media type and example to mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockOptions {
    /// Preferred status code.
    pub code: Option<u16>,
    /// Preferred media type; JSON, then the first declared, otherwise.
    pub media_type: Option<String>,
    /// Name of the example to return.
    pub example: Option<String>,
}

impl MockOptions {
    /// Options preferring a status code.
    #[must_use]
    pub fn code(code: u16) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// Sets the example name.
    #[must_use]
    pub fn example(mut self, name: impl Into<String>) -> Self {
        self.example = Some(name.into());
        self
    }

    /// Sets the media type.
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// A generated mock response.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Body, `Null` when the response declares none.
    pub mock: Value,
}

/// Synthesises a value conforming to a schema.
pub trait MockGenerator: Send + Sync {
    /// Generates a value for `schema`; `document` resolves its references.
    fn generate(&self, schema: &Value, document: &Value) -> Value;
}

/// The default [`MockGenerator`].
///
/// Prefers `example`, `default`, `const` and the first `enum` entry, then
/// falls back to a placeholder for the declared type, recursing into
/// object properties and array items.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMocker;

impl MockGenerator for SchemaMocker {
    fn generate(&self, schema: &Value, document: &Value) -> Value {
        mock_schema(schema, document, 0)
    }
}

fn mock_schema(schema: &Value, document: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return resolve_pointer(document, reference)
            .map_or(Value::Null, |target| mock_schema(target, document, depth + 1));
    }

    for keyword in ["example", "default", "const"] {
        if let Some(value) = schema.get(keyword) {
            return value.clone();
        }
    }
    if let Some(first) = schema.get("enum").and_then(Value::as_array).and_then(|e| e.first()) {
        return first.clone();
    }

    if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
        let mut merged = Map::new();
        for part in parts {
            if let Value::Object(fields) = mock_schema(part, document, depth + 1) {
                merged.extend(fields);
            }
        }
        return Value::Object(merged);
    }
    for keyword in ["oneOf", "anyOf"] {
        if let Some(first) = schema.get(keyword).and_then(Value::as_array).and_then(|v| v.first()) {
            return mock_schema(first, document, depth + 1);
        }
    }

    let declared = match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).find(|t| *t != "null"),
        _ => None,
    };
    let inferred = declared.or_else(|| {
        if schema.get("properties").is_some() {
            Some("object")
        } else if schema.get("items").is_some() {
            Some("array")
        } else {
            None
        }
    });

    match inferred {
        Some("object") => {
            let mut object = Map::new();
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (name, property) in properties {
                    object.insert(name.clone(), mock_schema(property, document, depth + 1));
                }
            }
            Value::Object(object)
        }
        Some("array") => match schema.get("items") {
            Some(items) if depth < MAX_DEPTH => {
                let item = mock_schema(items, document, depth + 1);
                if item.is_null() {
                    json!([])
                } else {
                    json!([item])
                }
            }
            _ => json!([]),
        },
        Some("string") => mock_string(schema),
        Some("integer") => schema
            .get("minimum")
            .and_then(Value::as_i64)
            .map_or(json!(0), Value::from),
        Some("number") => schema
            .get("minimum")
            .and_then(Value::as_f64)
            .map_or(json!(0.0), Value::from),
        Some("boolean") => json!(true),
        _ => Value::Null,
    }
}

fn mock_string(schema: &Value) -> Value {
    let text = match schema.get("format").and_then(Value::as_str) {
        Some("date") => "2024-01-01",
        Some("date-time") => "2024-01-01T00:00:00Z",
        Some("email") => "user@example.com",
        Some("uuid") => "00000000-0000-0000-0000-000000000000",
        Some("uri" | "url") => "https://example.com",
        Some("ipv4") => "127.0.0.1",
        Some("ipv6") => "::1",
        _ => "string",
    };
    json!(text)
}

/// Builds the mock response of an operation.
pub(crate) fn mock_operation(
    operation: &Operation,
    options: &MockOptions,
    document: &Value,
    generator: &dyn MockGenerator,
) -> MockResponse {
    let Some(key) = resolve_default_status(operation.responses(), options.code) else {
        return MockResponse {
            status: options.code.unwrap_or(200),
            mock: Value::Null,
        };
    };
    let status = status_code_for_key(key);

    let media = operation.responses().get(key).and_then(|response| {
        options
            .media_type
            .as_deref()
            .and_then(|requested| response.content.get(requested))
            .or_else(|| response.content.get(JSON_MEDIA_TYPE))
            .or_else(|| response.content.values().next())
    });

    let mock = media.map_or(Value::Null, |media| mock_media(media, options, document, generator));
    MockResponse { status, mock }
}

fn mock_media(
    media: &MediaType,
    options: &MockOptions,
    document: &Value,
    generator: &dyn MockGenerator,
) -> Value {
    if let Some(named) = options.example.as_deref().and_then(|name| media.examples.get(name)) {
        return named.clone();
    }
    if let Some(example) = &media.example {
        return example.clone();
    }
    if let Some(first) = media.examples.values().next() {
        return first.clone();
    }
    media
        .schema
        .as_ref()
        .map_or(Value::Null, |schema| generator.generate(schema, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_core::{fixtures, Contract};

    fn mock(operation_id: &str, options: &MockOptions) -> MockResponse {
        let contract = Contract::from_document(fixtures::petstore()).unwrap();
        let op = contract.get_operation(operation_id).unwrap();
        mock_operation(op, options, contract.document(), &SchemaMocker)
    }

    #[test]
    fn test_named_example() {
        let response = mock("getPets", &MockOptions::default().example("odie"));
        assert_eq!(response.status, 200);
        assert_eq!(response.mock, json!([{ "id": 2, "name": "Odie" }]));
    }

    #[test]
    fn test_first_example_when_unnamed() {
        let response = mock("getPets", &MockOptions::default());
        assert_eq!(response.mock, json!([{ "id": 1, "name": "Garfield" }]));
    }

    #[test]
    fn test_inline_example() {
        let response = mock("createPet", &MockOptions::default());
        assert_eq!(response.status, 201);
        assert_eq!(response.mock, json!({ "id": 3, "name": "Nermal" }));
    }

    #[test]
    fn test_schema_generated_body() {
        let response = mock("getOwnerByPetId", &MockOptions::default());
        assert_eq!(response.mock, json!({ "name": "string", "email": "user@example.com" }));
    }

    #[test]
    fn test_explicit_code_and_pattern_keys() {
        let response = mock("getPets", &MockOptions::code(400));
        assert_eq!(response.status, 400);
        assert_eq!(response.mock, json!({ "errors": [] }));

        let history = mock("getPetHistory", &MockOptions::default());
        assert_eq!(history.status, 200);
        assert_eq!(history.mock, json!([]));
    }

    #[test]
    fn test_undeclared_code_falls_back() {
        let response = mock("getPetById", &MockOptions::code(418));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_no_content() {
        let response = mock("deletePetById", &MockOptions::default());
        assert_eq!(response, MockResponse { status: 204, mock: Value::Null });
    }

    #[test]
    fn test_recursive_schema_terminates() {
        let contract = Contract::from_document(fixtures::recursive()).unwrap();
        let op = contract.get_operation("createTree").unwrap();
        let response = mock_operation(op, &MockOptions::default(), contract.document(), &SchemaMocker);
        assert_eq!(response.mock["value"], json!(0));
        assert!(response.mock["children"].is_array());
    }

    #[test]
    fn test_generator_keywords() {
        let document = json!({});
        let mocker = SchemaMocker;
        assert_eq!(mocker.generate(&json!({ "enum": ["cat", "dog"] }), &document), json!("cat"));
        assert_eq!(mocker.generate(&json!({ "type": "integer", "default": 7 }), &document), json!(7));
        assert_eq!(mocker.generate(&json!({ "type": ["null", "boolean"] }), &document), json!(true));
        assert_eq!(
            mocker.generate(
                &json!({ "allOf": [
                    { "type": "object", "properties": { "a": { "type": "integer", "minimum": 2 } } },
                    { "type": "object", "properties": { "b": { "type": "string", "format": "date" } } }
                ] }),
                &document
            ),
            json!({ "a": 2, "b": "2024-01-01" })
        );
    }
}
