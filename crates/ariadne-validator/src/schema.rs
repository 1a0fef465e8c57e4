//! Schema preparation before compilation.
//!
//! Contract schemas reference each other with internal `$ref` pointers and
//! may be recursive. Before a synthesised schema is compiled, every
//! reference is inlined depth-first. A reference that is already being
//! expanded further up the traversal is a cycle: it becomes a
//! back-reference to the location where that schema was first inlined in
//! the synthesised root.
//!
//! OpenAPI 3.0 schemas are additionally rewritten into plain Draft 7
//! (`nullable` and boolean `exclusiveMinimum`/`exclusiveMaximum`).

use ariadne_core::resolve_pointer;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{json, Map, Value};

/// Characters escaped when a JSON pointer is written as a URI fragment.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%')
    .add(b'{')
    .add(b'}');

/// Keywords whose values are instance data, never schemas.
const DATA_KEYWORDS: [&str; 5] = ["enum", "const", "default", "example", "examples"];

/// Keywords whose values map names to schemas.
const SCHEMA_MAP_KEYWORDS: [&str; 5] = [
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependentSchemas",
];

/// One node of a prepared schema: inlined content or a back-reference.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// The schema itself, with references inlined.
    Direct(Value),
    /// A JSON pointer into the synthesised root where the schema was
    /// first inlined.
    Reference(String),
}

impl SchemaNode {
    /// Converts the node into a compilable schema value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Direct(value) => value,
            Self::Reference(pointer) => {
                json!({ "$ref": format!("#{}", utf8_percent_encode(&pointer, FRAGMENT)) })
            }
        }
    }
}

/// Escapes one JSON pointer token.
#[must_use]
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Inlines references in a synthesised root.
pub(crate) struct Decycler<'d> {
    document: &'d Value,
    /// References being expanded, with the pointer of their expansion.
    stack: Vec<(String, String)>,
}

impl<'d> Decycler<'d> {
    pub(crate) fn new(document: &'d Value) -> Self {
        Self {
            document,
            stack: Vec::new(),
        }
    }

    /// Prepares `root`, treating it as the top of the synthesised schema.
    ///
    /// Returns the dangling reference on failure.
    pub(crate) fn run(mut self, root: &Value) -> Result<Value, String> {
        self.schema(root, "").map(SchemaNode::into_value)
    }

    fn schema(&mut self, value: &Value, pointer: &str) -> Result<SchemaNode, String> {
        let Value::Object(map) = value else {
            return Ok(SchemaNode::Direct(self.generic(value, pointer)?));
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            if let Some((_, first_seen)) = self.stack.iter().find(|(r, _)| r == reference) {
                return Ok(SchemaNode::Reference(first_seen.clone()));
            }

            let target = resolve_pointer(self.document, reference)
                .ok_or_else(|| reference.to_string())?;

            // Sibling keywords override the referenced schema's.
            let merged = match target {
                Value::Object(target_map) => {
                    let mut merged = target_map.clone();
                    for (k, v) in map {
                        if k != "$ref" {
                            merged.insert(k.clone(), v.clone());
                        }
                    }
                    Value::Object(merged)
                }
                other => other.clone(),
            };

            self.stack.push((reference.to_string(), pointer.to_string()));
            let node = self.schema(&merged, pointer);
            self.stack.pop();
            return node;
        }

        let mut out = Map::with_capacity(map.len());
        for (key, child) in map {
            let child_pointer = format!("{pointer}/{}", escape_token(key));
            let prepared = if DATA_KEYWORDS.contains(&key.as_str()) {
                child.clone()
            } else if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) {
                self.schema_map(child, &child_pointer)?
            } else {
                self.generic(child, &child_pointer)?
            };
            out.insert(key.clone(), prepared);
        }
        Ok(SchemaNode::Direct(Value::Object(out)))
    }

    fn schema_map(&mut self, value: &Value, pointer: &str) -> Result<Value, String> {
        let Value::Object(map) = value else {
            return Ok(value.clone());
        };
        let mut out = Map::with_capacity(map.len());
        for (name, child) in map {
            let child_pointer = format!("{pointer}/{}", escape_token(name));
            out.insert(name.clone(), self.schema(child, &child_pointer)?.into_value());
        }
        Ok(Value::Object(out))
    }

    /// Walks a value that may hold schemas (`items`, `allOf`, ...).
    fn generic(&mut self, value: &Value, pointer: &str) -> Result<Value, String> {
        match value {
            Value::Object(_) => Ok(self.schema(value, pointer)?.into_value()),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.generic(item, &format!("{pointer}/{i}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}

/// Rewrites OpenAPI 3.0 schema keywords into their Draft 7 equivalents.
///
/// - `nullable: true` adds `"null"` to `type` (and to `enum` when present).
/// - boolean `exclusiveMinimum`/`exclusiveMaximum` become numeric bounds.
pub fn normalize_openapi30(schema: &mut Value) {
    let Value::Object(map) = schema else {
        if let Value::Array(items) = schema {
            items.iter_mut().for_each(normalize_openapi30);
        }
        return;
    };

    if map.get("nullable").and_then(Value::as_bool).is_some() {
        let nullable = map.remove("nullable").and_then(|v| v.as_bool()).unwrap_or(false);
        if nullable {
            match map.get_mut("type") {
                Some(Value::String(t)) => {
                    let t = std::mem::take(t);
                    map.insert("type".to_string(), json!([t, "null"]));
                }
                Some(Value::Array(types)) if !types.iter().any(|t| t == "null") => {
                    types.push(json!("null"));
                }
                _ => {}
            }
            if let Some(Value::Array(values)) = map.get_mut("enum") {
                if !values.contains(&Value::Null) {
                    values.push(Value::Null);
                }
            }
        }
    }

    for (flag, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
        if let Some(Value::Bool(exclusive)) = map.get(flag) {
            let exclusive = *exclusive;
            map.remove(flag);
            if exclusive {
                if let Some(limit) = map.remove(bound) {
                    map.insert(flag.to_string(), limit);
                }
            }
        }
    }

    for (key, child) in map.iter_mut() {
        if DATA_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) {
            if let Value::Object(children) = child {
                children.values_mut().for_each(normalize_openapi30);
            }
            continue;
        }
        normalize_openapi30(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        json!({
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "owner": { "$ref": "#/components/schemas/Owner" }
                        }
                    },
                    "Owner": { "type": "object", "properties": { "email": { "type": "string" } } },
                    "Node": {
                        "type": "object",
                        "properties": {
                            "children": { "type": "array", "items": { "$ref": "#/components/schemas/Node" } }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_inlines_nested_references() {
        let document = doc();
        let root = json!({ "properties": { "body": { "$ref": "#/components/schemas/Pet" } } });
        let prepared = Decycler::new(&document).run(&root).unwrap();
        assert_eq!(
            prepared.pointer("/properties/body/properties/owner/properties/email/type"),
            Some(&json!("string"))
        );
    }

    #[test]
    fn test_cycle_becomes_back_reference() {
        let document = doc();
        let root = json!({ "properties": { "tree": { "$ref": "#/components/schemas/Node" } } });
        let prepared = Decycler::new(&document).run(&root).unwrap();
        assert_eq!(
            prepared.pointer("/properties/tree/properties/children/items"),
            Some(&json!({ "$ref": "#/properties/tree" }))
        );
    }

    #[test]
    fn test_sibling_keywords_override() {
        let document = doc();
        let root = json!({ "$ref": "#/components/schemas/Owner", "description": "the owner" });
        let prepared = Decycler::new(&document).run(&root).unwrap();
        assert_eq!(prepared["description"], json!("the owner"));
        assert_eq!(prepared["type"], json!("object"));
    }

    #[test]
    fn test_data_keywords_untouched() {
        let document = doc();
        let root = json!({ "type": "object", "example": { "$ref": "#/nowhere" } });
        let prepared = Decycler::new(&document).run(&root).unwrap();
        assert_eq!(prepared["example"], json!({ "$ref": "#/nowhere" }));
    }

    #[test]
    fn test_property_named_like_keyword_is_walked() {
        let document = doc();
        let root = json!({ "properties": { "default": { "$ref": "#/components/schemas/Owner" } } });
        let prepared = Decycler::new(&document).run(&root).unwrap();
        assert_eq!(prepared["properties"]["default"]["type"], json!("object"));
    }

    #[test]
    fn test_dangling_reference() {
        let document = doc();
        let root = json!({ "$ref": "#/components/schemas/Missing" });
        assert_eq!(
            Decycler::new(&document).run(&root),
            Err("#/components/schemas/Missing".to_string())
        );
    }

    #[test]
    fn test_reference_node_escapes_pointer() {
        let node = SchemaNode::Reference("/properties/a~1b c".to_string());
        assert_eq!(node.into_value(), json!({ "$ref": "#/properties/a~1b%20c" }));
    }

    #[test]
    fn test_normalize_nullable() {
        let mut schema = json!({ "type": "string", "nullable": true, "enum": ["a", "b"] });
        normalize_openapi30(&mut schema);
        assert_eq!(schema, json!({ "type": ["string", "null"], "enum": ["a", "b", null] }));

        let mut schema = json!({ "type": "integer", "nullable": false });
        normalize_openapi30(&mut schema);
        assert_eq!(schema, json!({ "type": "integer" }));
    }

    #[test]
    fn test_normalize_exclusive_bounds() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "age": { "type": "integer", "minimum": 0, "exclusiveMinimum": true },
                "score": { "type": "number", "maximum": 10, "exclusiveMaximum": false }
            }
        });
        normalize_openapi30(&mut schema);
        assert_eq!(schema["properties"]["age"], json!({ "type": "integer", "exclusiveMinimum": 0 }));
        assert_eq!(schema["properties"]["score"], json!({ "type": "number", "maximum": 10 }));
    }

    #[test]
    fn test_escape_token() {
        assert_eq!(escape_token("a/b~c"), "a~1b~0c");
    }
}
