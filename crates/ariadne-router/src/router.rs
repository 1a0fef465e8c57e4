//! Operation matching and request parsing.

use std::sync::Arc;

use ariadne_config::RouterConfig;
use ariadne_core::{Contract, Operation, ParsedRequest, RawBody, RawQuery, RawRequest};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{RouteError, RouteResult};
use crate::path::{normalize, strip_api_root, strip_trailing_slashes};
use crate::query::{apply_parameter_styles, parse_cookies, parse_query_string};
use crate::template::CompiledTemplate;

/// Outcome of matching a method and path against the contract.
#[derive(Debug, Clone)]
pub enum RouteMatch<'a> {
    /// A path and method matched this operation.
    Matched(&'a Arc<Operation>),
    /// At least one template matched the path, none with this method.
    MethodNotAllowed {
        /// Methods the matching templates accept, uppercase and sorted.
        allowed: Vec<String>,
    },
    /// No template matched the path, or it lies outside the API root.
    NotFound,
}

#[derive(Debug)]
struct Route {
    operation: Arc<Operation>,
    template: CompiledTemplate,
}

/// Matches requests to contract operations.
///
/// Templates are compiled once at construction and ordered by
/// specificity, so the router can be shared across concurrent requests.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ariadne_config::RouterConfig;
/// use ariadne_core::{fixtures, Contract, RawRequest};
/// use ariadne_router::Router;
///
/// let contract = Arc::new(Contract::from_document(fixtures::petstore()).unwrap());
/// let router = Router::new(contract, RouterConfig::default()).unwrap();
///
/// let op = router
///     .match_operation(&RawRequest::new("GET", "/pets/meta"), true)
///     .unwrap()
///     .unwrap();
/// assert_eq!(op.operation_id(), Some("getPetsMeta"));
/// ```
#[derive(Debug)]
pub struct Router {
    contract: Arc<Contract>,
    api_root: String,
    ignore_trailing_slashes: bool,
    /// Routes ordered by descending specificity, ties in declaration order.
    routes: Vec<Route>,
}

impl Router {
    /// Builds a router over a contract.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Contract`] if a path template is malformed.
    pub fn new(contract: Arc<Contract>, config: RouterConfig) -> RouteResult<Self> {
        let api_root = strip_trailing_slashes(&normalize(&config.api_root)).to_string();

        let mut routes = contract
            .operations()
            .iter()
            .map(|op| {
                Ok(Route {
                    template: CompiledTemplate::compile(op.path(), config.ignore_trailing_slashes)?,
                    operation: Arc::clone(op),
                })
            })
            .collect::<RouteResult<Vec<_>>>()?;

        // Stable sort keeps declaration order among equally specific templates.
        routes.sort_by(|a, b| b.template.specificity.cmp(&a.template.specificity));

        debug!(
            api_root = %api_root,
            routes = routes.len(),
            "router initialized"
        );

        Ok(Self {
            contract,
            api_root,
            ignore_trailing_slashes: config.ignore_trailing_slashes,
            routes,
        })
    }

    /// Returns the contract this router serves.
    #[must_use]
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    /// Returns every operation in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[Arc<Operation>] {
        self.contract.operations()
    }

    /// Looks up an operation by ID.
    #[must_use]
    pub fn get_operation(&self, operation_id: &str) -> Option<&Arc<Operation>> {
        self.contract.get_operation(operation_id)
    }

    /// Returns the normalised API root.
    #[must_use]
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Returns `path` relative to the API root with trailing slashes
    /// handled per configuration, or `None` outside the root.
    fn relative_path<'p>(&self, normalized: &'p str) -> Option<&'p str> {
        let relative = strip_api_root(normalized, &self.api_root)?;
        Some(if self.ignore_trailing_slashes {
            strip_trailing_slashes(relative)
        } else {
            relative
        })
    }

    /// Matches a method and raw path.
    pub fn route(&self, method: &str, path: &str) -> RouteMatch<'_> {
        let normalized = normalize(path);
        let Some(relative) = self.relative_path(&normalized) else {
            return RouteMatch::NotFound;
        };

        // Literal templates compare as plain strings before any regex runs.
        if let Some(route) = self.routes.iter().find(|r| {
            r.template.is_literal()
                && r.template.path == relative
                && r.operation.method().as_str().eq_ignore_ascii_case(method)
        }) {
            return RouteMatch::Matched(&route.operation);
        }

        let mut allowed: Vec<String> = Vec::new();
        for route in &self.routes {
            if !route.template.pattern.is_match(relative) {
                continue;
            }
            if route.operation.method().as_str().eq_ignore_ascii_case(method) {
                return RouteMatch::Matched(&route.operation);
            }
            allowed.push(route.operation.method().as_str().to_string());
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            allowed.sort();
            allowed.dedup();
            RouteMatch::MethodNotAllowed { allowed }
        }
    }

    /// Matches a request to an operation.
    ///
    /// In strict mode a miss is an error distinguishing
    /// [`RouteError::NotFound`] from [`RouteError::MethodNotAllowed`];
    /// otherwise a miss is `Ok(None)`.
    pub fn match_operation(
        &self,
        request: &RawRequest,
        strict: bool,
    ) -> RouteResult<Option<Arc<Operation>>> {
        let method = request.method.to_ascii_lowercase();
        match self.route(&method, &request.path) {
            RouteMatch::Matched(op) => {
                debug!(operation = %op.label(), method = %method, "route matched");
                Ok(Some(Arc::clone(op)))
            }
            RouteMatch::MethodNotAllowed { allowed } if strict => {
                Err(RouteError::MethodNotAllowed {
                    method,
                    path: normalize(&request.path),
                    allowed,
                })
            }
            RouteMatch::NotFound if strict => Err(RouteError::NotFound {
                method,
                path: normalize(&request.path),
            }),
            _ => Ok(None),
        }
    }

    /// Decomposes a raw request.
    ///
    /// With an operation, path parameters are bound from its template and
    /// declared query parameters are re-interpreted per their style. Never
    /// fails: malformed parts are left for the validator to flag.
    #[must_use]
    pub fn parse_request(&self, request: &RawRequest, operation: Option<&Operation>) -> ParsedRequest {
        let path = normalize(&request.path);

        let mut headers = Map::new();
        for (name, value) in &request.headers {
            headers.insert(name.to_ascii_lowercase(), value.to_json());
        }

        let cookies = match headers.get("cookie") {
            Some(Value::String(header)) => parse_cookies(header),
            Some(Value::Array(lines)) => {
                let joined = lines
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; ");
                parse_cookies(&joined)
            }
            _ => Map::new(),
        };

        let mut query = match &request.query {
            Some(RawQuery::Parsed(map)) => map.clone(),
            Some(RawQuery::Raw(raw)) => parse_query_string(raw),
            None => request
                .path
                .split_once('?')
                .map(|(_, q)| parse_query_string(q.split('#').next().unwrap_or(q)))
                .unwrap_or_default(),
        };

        let (body, raw_body) = match &request.body {
            Some(RawBody::Json(value)) => (Some(value.clone()), None),
            Some(RawBody::Text(text)) if text.trim().is_empty() => (None, None),
            Some(RawBody::Text(text)) => {
                let body = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()));
                (Some(body), Some(text.clone()))
            }
            None => (None, None),
        };

        let mut path_params = Map::new();
        if let Some(op) = operation {
            if let Some(bound) = self.bind_path_params(&path, op) {
                for (name, value) in bound {
                    let decoded = percent_decode_str(&value).decode_utf8_lossy().into_owned();
                    path_params.insert(name, Value::String(decoded));
                }
            }
            apply_parameter_styles(&mut query, op);
        }

        ParsedRequest {
            method: request.method.to_ascii_lowercase(),
            path,
            path_params,
            query,
            headers,
            cookies,
            body,
            raw_body,
        }
    }

    fn bind_path_params(&self, normalized: &str, operation: &Operation) -> Option<Vec<(String, String)>> {
        let relative = self.relative_path(normalized)?;
        let known = self.routes.iter().find(|r| {
            r.operation.method() == operation.method() && r.operation.path() == operation.path()
        });
        match known {
            Some(route) => route.template.captures(relative),
            // An operation from elsewhere: compile its template on the spot.
            None => CompiledTemplate::compile(operation.path(), self.ignore_trailing_slashes)
                .ok()?
                .captures(relative),
        }
    }
}
