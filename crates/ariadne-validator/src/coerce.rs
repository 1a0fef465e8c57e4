//! Schema-guided scalar coercion.
//!
//! Path, query, header and cookie values arrive as strings. Before they are
//! validated they are converted to the scalar type their schema declares,
//! so `"10"` against `type: integer` becomes `10`. The walk follows a
//! prepared schema (references already inlined, cycles as local
//! back-references).

use percent_encoding::percent_decode_str;
use serde_json::{Number, Value};

/// Back-reference hops followed without consuming any instance data.
const MAX_REF_HOPS: usize = 32;

/// Coerces `value` in place against a prepared `schema`.
///
/// `root` is the synthesised schema the back-references point into.
pub(crate) fn coerce(value: &mut Value, schema: &Value, root: &Value) {
    coerce_at(value, schema, root, 0);
}

fn coerce_at(value: &mut Value, schema: &Value, root: &Value, hops: usize) {
    let Some(schema) = follow_refs(schema, root, hops) else {
        return;
    };

    if let Some(Value::Array(parts)) = schema.get("allOf") {
        for part in parts {
            coerce_at(value, part, root, hops + 1);
        }
    }

    let types = declared_types(schema);
    if !types.is_empty() {
        coerce_scalar(value, &types);
    }

    match value {
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for item in items {
                    coerce_at(item, item_schema, root, 0);
                }
            }
        }
        Value::Object(map) => {
            let properties = schema.get("properties").and_then(Value::as_object);
            let additional = schema.get("additionalProperties").filter(|s| s.is_object());
            for (key, child) in map.iter_mut() {
                if let Some(child_schema) = properties.and_then(|p| p.get(key)).or(additional) {
                    coerce_at(child, child_schema, root, 0);
                }
            }
        }
        _ => {}
    }
}

fn follow_refs<'s>(mut schema: &'s Value, root: &'s Value, mut hops: usize) -> Option<&'s Value> {
    while let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        if hops >= MAX_REF_HOPS {
            return None;
        }
        hops += 1;
        let pointer = reference.strip_prefix('#')?;
        let pointer = percent_decode_str(pointer).decode_utf8().ok()?;
        schema = if pointer.is_empty() {
            root
        } else {
            root.pointer(&pointer)?
        };
    }
    Some(schema)
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn coerce_scalar(value: &mut Value, types: &[&str]) {
    match value {
        Value::String(text) if !types.contains(&"string") => {
            if let Some(converted) = types.iter().find_map(|t| from_text(text, t)) {
                *value = converted;
            }
        }
        Value::Number(n) if types.contains(&"string") && !accepts_number(n, types) => {
            *value = Value::String(n.to_string());
        }
        Value::Bool(b) if types.contains(&"string") && !types.contains(&"boolean") => {
            *value = Value::String(b.to_string());
        }
        _ => {}
    }
}

fn accepts_number(n: &Number, types: &[&str]) -> bool {
    types.contains(&"number") || (types.contains(&"integer") && (n.is_i64() || n.is_u64()))
}

fn from_text(text: &str, target: &str) -> Option<Value> {
    match target {
        "integer" => parse_integer(text.trim()),
        "number" => {
            let trimmed = text.trim();
            parse_integer(trimmed).or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            })
        }
        "boolean" => match text {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        "null" if text.is_empty() => Some(Value::Null),
        _ => None,
    }
}

fn parse_integer(text: &str) -> Option<Value> {
    text.parse::<i64>()
        .map(Value::from)
        .or_else(|_| text.parse::<u64>().map(Value::from))
        .ok()
}

/// Wraps a scalar in a one-element array when the schema expects an array.
///
/// A repeatable query parameter given once decodes to a plain string.
pub(crate) fn wrap_singular(value: &mut Value, schema: &Value, root: &Value) {
    if value.is_array() {
        return;
    }
    let Some(schema) = follow_refs(schema, root, 0) else {
        return;
    };
    if declared_types(schema).contains(&"array") {
        let single = value.take();
        *value = Value::Array(vec![single]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(mut value: Value, schema: Value) -> Value {
        coerce(&mut value, &schema, &schema);
        value
    }

    #[test]
    fn test_scalars() {
        assert_eq!(run(json!("10"), json!({ "type": "integer" })), json!(10));
        assert_eq!(run(json!("1.5"), json!({ "type": "number" })), json!(1.5));
        assert_eq!(run(json!("true"), json!({ "type": "boolean" })), json!(true));
        assert_eq!(run(json!(""), json!({ "type": ["integer", "null"] })), json!(null));
        assert_eq!(run(json!(7), json!({ "type": "string" })), json!("7"));
        assert_eq!(run(json!(false), json!({ "type": "string" })), json!("false"));
    }

    #[test]
    fn test_integers_beyond_i64() {
        let max = json!("18446744073709551615");
        assert_eq!(run(max.clone(), json!({ "type": "integer" })), json!(u64::MAX));
        assert_eq!(run(max, json!({ "type": "number" })), json!(u64::MAX));
        assert_eq!(run(json!("-9223372036854775808"), json!({ "type": "integer" })), json!(i64::MIN));
        assert_eq!(
            run(json!("18446744073709551616"), json!({ "type": "integer" })),
            json!("18446744073709551616")
        );
    }

    #[test]
    fn test_unconvertible_left_alone() {
        assert_eq!(run(json!("ten"), json!({ "type": "integer" })), json!("ten"));
        assert_eq!(run(json!("1.5"), json!({ "type": "integer" })), json!("1.5"));
        assert_eq!(run(json!("10"), json!({ "type": ["string", "integer"] })), json!("10"));
        assert_eq!(run(json!("yes"), json!({})), json!("yes"));
    }

    #[test]
    fn test_nested_structures() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "object",
                    "properties": {
                        "limit": { "type": "integer" },
                        "ids": { "type": "array", "items": { "type": "integer" } }
                    },
                    "additionalProperties": { "type": "boolean" }
                }
            }
        });
        let value = json!({ "query": { "limit": "5", "ids": ["1", "2"], "flag": "true" } });
        assert_eq!(
            run(value, schema),
            json!({ "query": { "limit": 5, "ids": [1, 2], "flag": true } })
        );
    }

    #[test]
    fn test_all_of_and_back_references() {
        let root = json!({
            "properties": {
                "node": {
                    "type": "object",
                    "allOf": [{ "properties": { "depth": { "type": "integer" } } }],
                    "properties": { "child": { "$ref": "#/properties/node" } }
                }
            }
        });
        let mut value = json!({ "node": { "depth": "1", "child": { "depth": "2" } } });
        coerce(&mut value, &root, &root);
        assert_eq!(value, json!({ "node": { "depth": 1, "child": { "depth": 2 } } }));
    }

    #[test]
    fn test_self_reference_terminates() {
        let root = json!({ "$ref": "#" });
        let mut value = json!("1");
        coerce(&mut value, &root, &root);
        assert_eq!(value, json!("1"));
    }

    #[test]
    fn test_wrap_singular() {
        let schema = json!({ "type": "array", "items": { "type": "integer" } });
        let mut value = json!("10");
        wrap_singular(&mut value, &schema, &schema);
        assert_eq!(value, json!(["10"]));

        let mut value = json!(["10"]);
        wrap_singular(&mut value, &schema, &schema);
        assert_eq!(value, json!(["10"]));

        let mut value = json!("10");
        wrap_singular(&mut value, &json!({ "type": "integer" }), &schema);
        assert_eq!(value, json!("10"));
    }

    proptest::proptest! {
        #[test]
        fn prop_integer_strings_coerce_exactly(n in proptest::num::i64::ANY) {
            proptest::prop_assert_eq!(run(json!(n.to_string()), json!({ "type": "integer" })), json!(n));
        }

        #[test]
        fn prop_string_schema_keeps_text(text in "\\PC*") {
            proptest::prop_assert_eq!(run(json!(text.clone()), json!({ "type": "string" })), json!(text));
        }
    }
}
