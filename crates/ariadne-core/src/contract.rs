//! The in-memory contract model.
//!
//! A [`Contract`] wraps a fully dereferenced contract document (an OpenAPI
//! 3.x document held as a [`serde_json::Value`]) and flattens its `paths`
//! into an ordered list of [`Operation`]s.
//!
//! Recursive schemas cannot be expanded inline, so the document keeps them
//! as `$ref` JSON pointers into itself. Parameter, request-body, response
//! and header objects written as `$ref` are followed while flattening;
//! schemas keep their references and are inlined later by the validator.
//!
//! # Example
//!
//! ```
//! use ariadne_core::{Contract, ParameterLocation};
//! use http::Method;
//! use serde_json::json;
//!
//! let contract = Contract::from_document(json!({
//!     "openapi": "3.0.3",
//!     "paths": {
//!         "/pets/{id}": {
//!             "parameters": [
//!                 { "name": "id", "in": "path", "schema": { "type": "integer" } }
//!             ],
//!             "get": { "operationId": "getPetById", "responses": {} }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let op = contract.get_operation("getPetById").unwrap();
//! assert_eq!(op.method(), &Method::GET);
//! assert_eq!(op.parameters()[0].location(), ParameterLocation::Path);
//! assert!(op.parameters()[0].required());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ContractError, ContractResult};

/// HTTP method keys recognised inside a path item, in lookup order.
const PATH_ITEM_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Upper bound on `$ref` chains followed for a single object.
const MAX_REF_HOPS: usize = 32;

/// The JSON media type every schema-backed payload is checked against.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A dereferenced API contract flattened into routable operations.
///
/// The contract is immutable once built. Routers and validators share it
/// behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct Contract {
    /// The contract document as loaded.
    document: Value,
    /// The declared `openapi` version string.
    openapi_version: String,
    /// Operations in document declaration order.
    operations: Vec<Arc<Operation>>,
    /// Operation lookup by ID.
    operation_index: HashMap<String, usize>,
}

impl Contract {
    /// Flattens a contract document into operations.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the document is not an object, a
    /// `$ref` on a parameter/body/response cannot be followed, or a
    /// parameter declaration is malformed.
    pub fn from_document(document: Value) -> ContractResult<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| ContractError::invalid_document("document must be a JSON object"))?;

        let openapi_version = root
            .get("openapi")
            .and_then(Value::as_str)
            .unwrap_or("3.0.0")
            .to_string();

        let global_security = match root.get("security") {
            Some(value) => Some(parse_security(value)?),
            None => None,
        };

        let mut operations = Vec::new();
        if let Some(paths) = root.get("paths") {
            let paths = paths
                .as_object()
                .ok_or_else(|| ContractError::invalid_document("'paths' must be an object"))?;

            for (path, item) in paths {
                let item = deref_object(&document, item)?;
                let Some(item) = item.as_object() else {
                    continue;
                };

                let shared_params = match item.get("parameters") {
                    Some(params) => parse_parameters(&document, params)?,
                    None => Vec::new(),
                };

                // Declaration order within the path item drives matching order.
                for (key, op) in item {
                    let Some(method) = method_from_key(key) else {
                        continue;
                    };
                    let operation = Operation::from_declaration(
                        &document,
                        path,
                        method,
                        op,
                        &shared_params,
                        global_security.as_deref(),
                    )?;
                    operations.push(Arc::new(operation));
                }
            }
        }

        let mut operation_index = HashMap::new();
        for (idx, op) in operations.iter().enumerate() {
            if let Some(id) = op.operation_id() {
                if operation_index.contains_key(id) {
                    warn!(operation_id = id, "duplicate operationId, keeping first declaration");
                    continue;
                }
                operation_index.insert(id.to_string(), idx);
            }
        }

        debug!(
            openapi = openapi_version,
            operations = operations.len(),
            "contract flattened"
        );

        Ok(Self {
            document,
            openapi_version,
            operations,
            operation_index,
        })
    }

    /// Creates a contract with no operations.
    ///
    /// Used when setup fails in non-strict mode: every request then routes
    /// to "not found".
    #[must_use]
    pub fn empty() -> Self {
        Self {
            document: Value::Object(Map::new()),
            openapi_version: "3.0.0".to_string(),
            operations: Vec::new(),
            operation_index: HashMap::new(),
        }
    }

    /// Returns the underlying document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns the declared `openapi` version.
    #[must_use]
    pub fn openapi_version(&self) -> &str {
        &self.openapi_version
    }

    /// Returns true when the document declares OpenAPI 3.1.
    #[must_use]
    pub fn is_openapi_31(&self) -> bool {
        self.openapi_version.starts_with("3.1")
    }

    /// Returns all operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    /// Looks up an operation by its ID.
    #[must_use]
    pub fn get_operation(&self, operation_id: &str) -> Option<&Arc<Operation>> {
        self.operation_index
            .get(operation_id)
            .map(|&idx| &self.operations[idx])
    }

    /// Returns the names of the declared security schemes.
    pub fn security_scheme_names(&self) -> impl Iterator<Item = &str> {
        self.document
            .pointer("/components/securitySchemes")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|schemes| schemes.keys().map(String::as_str))
    }

    /// Follows an internal `$ref` such as `#/components/schemas/Pet`.
    #[must_use]
    pub fn resolve_ref(&self, reference: &str) -> Option<&Value> {
        resolve_pointer(&self.document, reference)
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::empty()
    }
}

/// Resolves an internal reference (`#/a/b`) against a document.
///
/// Returns `None` for external references and missing targets.
#[must_use]
pub fn resolve_pointer<'a>(document: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if pointer.is_empty() {
        return Some(document);
    }
    document.pointer(pointer)
}

/// Follows `$ref` chains on a non-schema object (parameter, body, response).
fn deref_object<'a>(document: &'a Value, value: &'a Value) -> ContractResult<&'a Value> {
    let mut current = value;
    for _ in 0..MAX_REF_HOPS {
        match current.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                current = resolve_pointer(document, reference)
                    .ok_or_else(|| ContractError::unresolved(reference))?;
            }
            None => return Ok(current),
        }
    }
    Err(ContractError::invalid_document(
        "reference chain too deep on a non-schema object",
    ))
}

fn method_from_key(key: &str) -> Option<Method> {
    if !PATH_ITEM_METHODS.contains(&key) {
        return None;
    }
    Method::from_bytes(key.to_ascii_uppercase().as_bytes()).ok()
}

/// An operation: one (path template, HTTP method) pair of the contract.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Unique identifier used for handler lookup.
    operation_id: Option<String>,
    /// HTTP method.
    method: Method,
    /// Path template with `{param}` placeholders.
    path: String,
    /// Short summary.
    summary: Option<String>,
    /// Tags for grouping operations.
    tags: Vec<String>,
    /// Whether the operation is deprecated.
    deprecated: bool,
    /// Path-level parameters followed by operation-level parameters.
    parameters: Vec<Parameter>,
    /// Request body declaration.
    request_body: Option<RequestBody>,
    /// Responses keyed by status code, pattern (`4XX`) or `default`.
    responses: IndexMap<String, Response>,
    /// Security requirement alternatives (OR of ANDs).
    security: Vec<SecurityRequirement>,
}

impl Operation {
    fn from_declaration(
        document: &Value,
        path: &str,
        method: Method,
        declaration: &Value,
        shared_params: &[Parameter],
        global_security: Option<&[SecurityRequirement]>,
    ) -> ContractResult<Self> {
        let declaration = deref_object(document, declaration)?;

        let mut parameters = shared_params.to_vec();
        if let Some(params) = declaration.get("parameters") {
            parameters.extend(parse_parameters(document, params)?);
        }

        let request_body = match declaration.get("requestBody") {
            Some(body) => Some(RequestBody::parse(document, body)?),
            None => None,
        };

        let mut responses = IndexMap::new();
        if let Some(declared) = declaration.get("responses").and_then(Value::as_object) {
            for (status, response) in declared {
                responses.insert(status.clone(), Response::parse(document, response)?);
            }
        }

        let security = match declaration.get("security") {
            Some(value) => parse_security(value)?,
            None => global_security.map(<[_]>::to_vec).unwrap_or_default(),
        };

        Ok(Self {
            operation_id: declaration
                .get("operationId")
                .and_then(Value::as_str)
                .map(str::to_string),
            method,
            path: path.to_string(),
            summary: declaration
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_string),
            tags: declaration
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            deprecated: declaration
                .get("deprecated")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            parameters,
            request_body,
            responses,
            security,
        })
    }

    /// Returns the operation ID, if declared.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns whether the operation is deprecated.
    #[must_use]
    pub fn deprecated(&self) -> bool {
        self.deprecated
    }

    /// Returns the merged parameter list.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the parameters declared in one location.
    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    /// Returns the request body declaration.
    #[must_use]
    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    /// Returns the responses keyed by status key.
    #[must_use]
    pub fn responses(&self) -> &IndexMap<String, Response> {
        &self.responses
    }

    /// Returns the security requirement alternatives.
    #[must_use]
    pub fn security(&self) -> &[SecurityRequirement] {
        &self.security
    }

    /// Returns a label for logs: the operation ID or `METHOD path`.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.operation_id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// A `{name}` segment of the path template.
    Path,
    /// The query string.
    Query,
    /// A request header.
    Header,
    /// A cookie in the `cookie` header.
    Cookie,
}

impl ParameterLocation {
    /// All locations, in the order validation schemas list them.
    pub const ALL: [Self; 4] = [Self::Path, Self::Query, Self::Header, Self::Cookie];

    /// Returns the contract name of this location.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }

    /// Returns the default serialization style for this location.
    #[must_use]
    pub const fn default_style(&self) -> ParameterStyle {
        match self {
            Self::Path | Self::Header => ParameterStyle::Simple,
            Self::Query | Self::Cookie => ParameterStyle::Form,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(format!("unknown location '{other}'")),
        }
    }
}

/// How array and object values are encoded in a raw parameter string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterStyle {
    /// `;name=value` path style.
    Matrix,
    /// `.value` path style.
    Label,
    /// `name=a,b` or repeated `name=a&name=b`.
    Form,
    /// `a,b` (path and header default).
    Simple,
    /// `a%20b`.
    SpaceDelimited,
    /// `a|b`.
    PipeDelimited,
    /// `name[key]=value`.
    DeepObject,
}

impl FromStr for ParameterStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matrix" => Ok(Self::Matrix),
            "label" => Ok(Self::Label),
            "form" => Ok(Self::Form),
            "simple" => Ok(Self::Simple),
            "spaceDelimited" => Ok(Self::SpaceDelimited),
            "pipeDelimited" => Ok(Self::PipeDelimited),
            "deepObject" => Ok(Self::DeepObject),
            other => Err(format!("unknown style '{other}'")),
        }
    }
}

/// A declared request parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    location: ParameterLocation,
    required: bool,
    schema: Option<Value>,
    content: IndexMap<String, MediaType>,
    style: ParameterStyle,
    explode: bool,
}

impl Parameter {
    fn parse(document: &Value, value: &Value) -> ContractResult<Self> {
        let value = deref_object(document, value)?;
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ContractError::invalid_parameter("<unnamed>", "missing 'name'"))?
            .to_string();

        let location: ParameterLocation = value
            .get("in")
            .and_then(Value::as_str)
            .ok_or_else(|| ContractError::invalid_parameter(&name, "missing 'in'"))?
            .parse()
            .map_err(|reason: String| ContractError::invalid_parameter(&name, reason))?;

        let style = match value.get("style").and_then(Value::as_str) {
            Some(style) => style
                .parse()
                .map_err(|reason: String| ContractError::invalid_parameter(&name, reason))?,
            None => location.default_style(),
        };

        let explode = value
            .get("explode")
            .and_then(Value::as_bool)
            .unwrap_or(style == ParameterStyle::Form);

        // Path parameters are always required, whatever the document says.
        let required = location == ParameterLocation::Path
            || value
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);

        let content = match value.get("content") {
            Some(content) => parse_content(document, content)?,
            None => IndexMap::new(),
        };

        Ok(Self {
            name,
            location,
            required,
            schema: value.get("schema").cloned(),
            content,
            style,
            explode,
        })
    }

    /// Returns the parameter name as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter location.
    #[must_use]
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    /// Returns whether the parameter is required.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    /// Returns the `schema` of the parameter.
    #[must_use]
    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    /// Returns the `content` map of the parameter.
    #[must_use]
    pub fn content(&self) -> &IndexMap<String, MediaType> {
        &self.content
    }

    /// Returns the schema of `content.application/json`, if declared.
    #[must_use]
    pub fn json_content_schema(&self) -> Option<&Value> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
    }

    /// Returns the schema values are validated against: the JSON content
    /// schema when declared, the plain schema otherwise.
    #[must_use]
    pub fn effective_schema(&self) -> Option<&Value> {
        self.json_content_schema().or(self.schema.as_ref())
    }

    /// Returns the serialization style.
    #[must_use]
    pub fn style(&self) -> ParameterStyle {
        self.style
    }

    /// Returns the explode flag.
    #[must_use]
    pub fn explode(&self) -> bool {
        self.explode
    }
}

fn parse_parameters(document: &Value, value: &Value) -> ContractResult<Vec<Parameter>> {
    let Some(list) = value.as_array() else {
        return Err(ContractError::invalid_document("'parameters' must be an array"));
    };
    list.iter()
        .map(|param| Parameter::parse(document, param))
        .collect()
}

/// A media type entry of a `content` map.
#[derive(Debug, Clone, Default)]
pub struct MediaType {
    /// The payload schema.
    pub schema: Option<Value>,
    /// The inline `example`.
    pub example: Option<Value>,
    /// Named examples, already reduced to their `value`.
    pub examples: IndexMap<String, Value>,
}

impl MediaType {
    fn parse(document: &Value, value: &Value) -> ContractResult<Self> {
        let mut examples = IndexMap::new();
        if let Some(declared) = value.get("examples").and_then(Value::as_object) {
            for (name, example) in declared {
                let example = deref_object(document, example)?;
                if let Some(v) = example.get("value") {
                    examples.insert(name.clone(), v.clone());
                }
            }
        }
        Ok(Self {
            schema: value.get("schema").cloned(),
            example: value.get("example").cloned(),
            examples,
        })
    }
}

fn parse_content(document: &Value, value: &Value) -> ContractResult<IndexMap<String, MediaType>> {
    let mut content = IndexMap::new();
    if let Some(map) = value.as_object() {
        for (media_type, entry) in map {
            content.insert(media_type.clone(), MediaType::parse(document, entry)?);
        }
    }
    Ok(content)
}

/// A request body declaration.
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    /// Whether the body is marked required.
    pub required: bool,
    /// Payload declarations keyed by media type.
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    fn parse(document: &Value, value: &Value) -> ContractResult<Self> {
        let value = deref_object(document, value)?;
        Ok(Self {
            required: value
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            content: match value.get("content") {
                Some(content) => parse_content(document, content)?,
                None => IndexMap::new(),
            },
        })
    }

    /// Returns the JSON payload schema, if declared.
    #[must_use]
    pub fn json_schema(&self) -> Option<&Value> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
    }

    /// Returns true when JSON is the only declared media type.
    #[must_use]
    pub fn json_only(&self) -> bool {
        self.content.len() == 1 && self.content.contains_key(JSON_MEDIA_TYPE)
    }
}

/// A declared response header.
#[derive(Debug, Clone, Default)]
pub struct Header {
    /// Whether the header must be present.
    pub required: bool,
    /// The header value schema.
    pub schema: Option<Value>,
}

/// A declared response.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Human-readable description.
    pub description: Option<String>,
    /// Payload declarations keyed by media type.
    pub content: IndexMap<String, MediaType>,
    /// Declared headers keyed by name as written.
    pub headers: IndexMap<String, Header>,
}

impl Response {
    fn parse(document: &Value, value: &Value) -> ContractResult<Self> {
        let value = deref_object(document, value)?;

        let mut headers = IndexMap::new();
        if let Some(declared) = value.get("headers").and_then(Value::as_object) {
            for (name, header) in declared {
                let header = deref_object(document, header)?;
                let schema = header.get("schema").cloned().or_else(|| {
                    header
                        .get("content")
                        .and_then(|c| c.get(JSON_MEDIA_TYPE))
                        .and_then(|m| m.get("schema"))
                        .cloned()
                });
                headers.insert(
                    name.clone(),
                    Header {
                        required: header
                            .get("required")
                            .and_then(Value::as_bool)
                            .unwrap_or(false),
                        schema,
                    },
                );
            }
        }

        Ok(Self {
            description: value
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            content: match value.get("content") {
                Some(content) => parse_content(document, content)?,
                None => IndexMap::new(),
            },
            headers,
        })
    }

    /// Returns the JSON payload schema, if declared.
    #[must_use]
    pub fn json_schema(&self) -> Option<&Value> {
        self.content
            .get(JSON_MEDIA_TYPE)
            .and_then(|media| media.schema.as_ref())
    }
}

/// One security requirement: schemes that must all pass together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityRequirement {
    schemes: IndexMap<String, Vec<String>>,
}

impl SecurityRequirement {
    /// Creates a requirement from scheme names with no scopes.
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemes: schemes
                .into_iter()
                .map(|s| (s.into(), Vec::new()))
                .collect(),
        }
    }

    /// Returns the scheme names of this requirement.
    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.schemes.keys().map(String::as_str)
    }

    /// Returns the scopes requested for a scheme.
    #[must_use]
    pub fn scopes(&self, scheme: &str) -> Option<&[String]> {
        self.schemes.get(scheme).map(Vec::as_slice)
    }

    /// Returns true when the requirement names no scheme (anonymous access).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

fn parse_security(value: &Value) -> ContractResult<Vec<SecurityRequirement>> {
    let list = value
        .as_array()
        .ok_or_else(|| ContractError::invalid_document("'security' must be an array"))?;

    list.iter()
        .map(|req| {
            let map = req.as_object().ok_or_else(|| {
                ContractError::invalid_document("security requirement must be an object")
            })?;
            let schemes = map
                .iter()
                .map(|(name, scopes)| {
                    let scopes = scopes
                        .as_array()
                        .map(|s| {
                            s.iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    (name.clone(), scopes)
                })
                .collect();
            Ok(SecurityRequirement { schemes })
        })
        .collect()
}
