//! Query string and cookie decoding.
//!
//! Query strings are decoded into a [`ParamMap`] following the usual
//! nested-bracket conventions:
//!
//! | raw                  | decoded                        |
//! |----------------------|--------------------------------|
//! | `a=1&a=2`            | `{"a": ["1", "2"]}`            |
//! | `a[]=1&a[]=2`        | `{"a": ["1", "2"]}`            |
//! | `a[0]=1&a[1]=2`      | `{"a": ["1", "2"]}`            |
//! | `a[b]=1&a[c][d]=2`   | `{"a": {"b": "1", "c": {"d": "2"}}}` |
//!
//! Style-aware re-interpretation of declared parameters happens afterwards
//! in [`apply_parameter_styles`].

use ariadne_core::{Operation, ParamMap, ParameterLocation, ParameterStyle};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use tracing::trace;

/// Decodes a raw query string (with or without the leading `?`).
#[must_use]
pub fn parse_query_string(query: &str) -> ParamMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut map = Map::new();

    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(e) => {
            // Malformed input is left for the validator to flag as missing.
            trace!(error = %e, "undecodable query string");
            return map;
        }
    };

    for (key, value) in pairs {
        insert_pair(&mut map, &key, Value::String(value));
    }
    map
}

fn insert_pair(map: &mut ParamMap, key: &str, value: Value) {
    match split_brackets(key) {
        Some((base, segments)) if !segments.is_empty() => {
            insert_nested(map, base, &segments, value);
        }
        _ => append(map, key, value),
    }
}

/// Splits `a[b][c]` into `("a", ["b", "c"])`. Returns `None` when the key
/// is not well-formed bracket syntax.
fn split_brackets(key: &str) -> Option<(&str, Vec<&str>)> {
    let open = key.find('[')?;
    if open == 0 {
        return None;
    }
    let base = &key[..open];
    let mut rest = &key[open..];
    let mut segments = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    Some((base, segments))
}

fn insert_nested(map: &mut ParamMap, base: &str, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        append(map, base, value);
        return;
    };

    let is_index = first.is_empty() || first.bytes().all(|b| b.is_ascii_digit());
    if is_index && rest.is_empty() {
        push_array(map, base, value);
        return;
    }

    let slot = map
        .entry(base.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        // `a=1&a[b]=2`: the scalar occurrence wins.
        return;
    }
    if let Value::Object(inner) = slot {
        insert_nested(inner, first, rest, value);
    }
}

/// Adds a value under `key`, turning repeated keys into an array.
fn append(map: &mut ParamMap, key: &str, value: Value) {
    match map.get_mut(key) {
        None => {
            map.insert(key.to_string(), value);
        }
        Some(Value::Array(values)) => values.push(value),
        Some(existing) if existing.is_string() => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        Some(_) => {}
    }
}

fn push_array(map: &mut ParamMap, key: &str, value: Value) {
    match map.get_mut(key) {
        None => {
            map.insert(key.to_string(), Value::Array(vec![value]));
        }
        Some(_) => append(map, key, value),
    }
}

/// Re-interprets query values according to each declared parameter's
/// serialization style.
///
/// - `content: application/json` values are JSON-decoded.
/// - `form` with `explode=false` splits on `,`.
/// - `spaceDelimited` splits on a space or `%20`.
/// - `pipeDelimited` splits on `|` or `%7C`.
///
/// Only single string occurrences are split; repeated keys already
/// decoded to arrays are left alone.
pub fn apply_parameter_styles(query: &mut ParamMap, operation: &Operation) {
    for param in operation.parameters_in(ParameterLocation::Query) {
        let Some(Value::String(raw)) = query.get(param.name()) else {
            continue;
        };

        let replacement = if param.json_content_schema().is_some() {
            serde_json::from_str::<Value>(raw).ok()
        } else {
            match param.style() {
                ParameterStyle::Form if !param.explode() => Some(split_on(raw, &[","])),
                ParameterStyle::SpaceDelimited => Some(split_on(raw, &[" ", "%20"])),
                ParameterStyle::PipeDelimited => Some(split_on(raw, &["|", "%7C", "%7c"])),
                _ => None,
            }
        };

        if let Some(value) = replacement {
            query.insert(param.name().to_string(), value);
        }
    }
}

fn split_on(raw: &str, separators: &[&str]) -> Value {
    let mut parts = vec![raw.to_string()];
    for sep in separators {
        parts = parts
            .iter()
            .flat_map(|p| p.split(sep).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    Value::Array(parts.into_iter().map(Value::String).collect())
}

/// Parses a `cookie` header into a map. Values are percent-decoded and
/// surrounding quotes removed; the first occurrence of a name wins.
#[must_use]
pub fn parse_cookies(header: &str) -> ParamMap {
    let mut cookies = Map::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || cookies.contains_key(name) {
            continue;
        }
        let value = value.trim().trim_matches('"');
        let decoded = percent_decode_str(value).decode_utf8_lossy().into_owned();
        cookies.insert(name.to_string(), Value::String(decoded));
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;
    use ariadne_core::{fixtures, Contract};
    use serde_json::json;

    fn styled(style: &str, explode: bool, query: &str) -> Value {
        let contract = Contract::from_document(fixtures::styled_query(style, explode)).unwrap();
        let op = contract.get_operation("getPets").unwrap();
        let mut parsed = parse_query_string(query);
        apply_parameter_styles(&mut parsed, op);
        parsed.get("limit").cloned().unwrap_or(Value::Null)
    }

    #[test]
    fn test_repeated_keys_become_array() {
        assert_eq!(
            Value::Object(parse_query_string("limit=10&limit=20&x=1")),
            json!({ "limit": ["10", "20"], "x": "1" })
        );
    }

    #[test]
    fn test_bracket_arrays() {
        assert_eq!(
            Value::Object(parse_query_string("?a[]=1&a[]=2&b[0]=x&b[1]=y")),
            json!({ "a": ["1", "2"], "b": ["x", "y"] })
        );
    }

    #[test]
    fn test_nested_objects() {
        assert_eq!(
            Value::Object(parse_query_string("filter[kind]=cat&filter[age][min]=2")),
            json!({ "filter": { "kind": "cat", "age": { "min": "2" } } })
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            Value::Object(parse_query_string("q=hello%20world&r=a+b")),
            json!({ "q": "hello world", "r": "a b" })
        );
    }

    #[test]
    fn test_malformed_brackets_stay_literal() {
        assert_eq!(
            Value::Object(parse_query_string("a[b=1&[c]=2")),
            json!({ "a[b": "1", "[c]": "2" })
        );
    }

    #[test]
    fn test_form_not_exploded() {
        assert_eq!(styled("form", false, "limit=10,20"), json!(["10", "20"]));
        assert_eq!(styled("form", true, "limit=10,20"), json!("10,20"));
    }

    #[test]
    fn test_space_delimited() {
        assert_eq!(styled("spaceDelimited", false, "limit=10%2020"), json!(["10", "20"]));
        assert_eq!(styled("spaceDelimited", false, "limit=10+20"), json!(["10", "20"]));
    }

    #[test]
    fn test_pipe_delimited() {
        assert_eq!(styled("pipeDelimited", false, "limit=10|20"), json!(["10", "20"]));
        assert_eq!(styled("pipeDelimited", false, "limit=10%7C20"), json!(["10", "20"]));
    }

    #[test]
    fn test_repeated_keys_regardless_of_style() {
        for style in ["form", "spaceDelimited", "pipeDelimited"] {
            assert_eq!(styled(style, false, "limit=10&limit=20"), json!(["10", "20"]));
        }
    }

    #[test]
    fn test_json_content_parameter() {
        let contract = Contract::from_document(fixtures::petstore()).unwrap();
        let op = contract.get_operation("getPetHistory").unwrap();
        let mut parsed = parse_query_string("filter=%7B%22kind%22%3A%22vet%22%7D&since=2024-01-01");
        apply_parameter_styles(&mut parsed, op);
        assert_eq!(parsed["filter"], json!({ "kind": "vet" }));
        assert_eq!(parsed["since"], json!("2024-01-01"));
    }

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies(r#"session=abc123; theme="dark"; note=a%20b; session=other; broken"#);
        assert_eq!(
            Value::Object(cookies),
            json!({ "session": "abc123", "theme": "dark", "note": "a b" })
        );
    }
}
