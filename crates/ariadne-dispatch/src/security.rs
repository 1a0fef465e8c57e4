//! Security requirement evaluation.
//!
//! An operation lists alternative requirement-sets; each set names schemes
//! that must all pass. Every distinct scheme is evaluated once, all
//! concurrently, and each settles on its own: a failing handler never
//! cancels its siblings.

use std::collections::HashMap;

use ariadne_core::SecurityRequirement;
use futures_util::future::join_all;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::SecurityHandlerError;
use crate::handler::SecurityHandler;

/// The settled outcome of one security scheme.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemeResult {
    /// The handler returned a value; it passes when truthy.
    Value(Value),
    /// The handler failed.
    Error(SecurityHandlerError),
    /// No handler is registered for the scheme.
    Unregistered,
}

impl SchemeResult {
    /// Returns true when the scheme passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        match self {
            Self::Value(value) => is_truthy(value),
            Self::Error(_) | Self::Unregistered => false,
        }
    }

    /// Returns the handler's value, if it produced one.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Security evaluation of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityContext {
    /// Whether some requirement-set passed, or none was declared.
    pub authorized: bool,
    /// Outcome per evaluated scheme, in first-mention order.
    pub results: IndexMap<String, SchemeResult>,
}

impl SecurityContext {
    /// The context of an operation without security requirements.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            authorized: true,
            results: IndexMap::new(),
        }
    }

    /// Returns the outcome of a scheme.
    #[must_use]
    pub fn result(&self, scheme: &str) -> Option<&SchemeResult> {
        self.results.get(scheme)
    }
}

/// JavaScript-style truthiness of a JSON value.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns true when some requirement-set has every scheme passing.
#[must_use]
pub fn requirements_satisfied(
    requirements: &[SecurityRequirement],
    results: &IndexMap<String, SchemeResult>,
) -> bool {
    requirements.iter().any(|requirement| {
        requirement
            .scheme_names()
            .all(|name| results.get(name).is_some_and(SchemeResult::passed))
    })
}

/// Runs the security handlers of every scheme the requirements mention.
pub(crate) async fn evaluate<A, R>(
    requirements: &[SecurityRequirement],
    handlers: &HashMap<String, SecurityHandler<A, R>>,
    ctx: &RequestContext<R>,
    args: &A,
) -> SecurityContext {
    if requirements.is_empty() {
        return SecurityContext::unrestricted();
    }

    let mut schemes: Vec<&str> = Vec::new();
    for name in requirements.iter().flat_map(SecurityRequirement::scheme_names) {
        if !schemes.contains(&name) {
            schemes.push(name);
        }
    }

    let pending: Vec<_> = schemes
        .iter()
        .map(|name| handlers.get(*name).map(|handler| handler(ctx, args)))
        .collect();
    let invoked = pending.iter().filter(|p| p.is_some()).count();

    let settled = join_all(pending.into_iter().map(|slot| async move {
        match slot {
            Some(future) => match future.await {
                Ok(value) => SchemeResult::Value(value),
                Err(e) => SchemeResult::Error(e),
            },
            None => SchemeResult::Unregistered,
        }
    }))
    .await;

    let results: IndexMap<String, SchemeResult> = schemes
        .iter()
        .map(|name| (*name).to_string())
        .zip(settled)
        .collect();
    let authorized = requirements_satisfied(requirements, &results);

    debug!(
        schemes = schemes.len(),
        invoked,
        authorized,
        "security evaluated"
    );

    SecurityContext {
        authorized,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::security_handler;
    use ariadne_core::ParsedRequest;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Handlers = HashMap<String, SecurityHandler<(), ()>>;

    fn returning(value: Value) -> SecurityHandler<(), ()> {
        security_handler(move |_, _| {
            let value = value.clone();
            Box::pin(async move { Ok::<_, SecurityHandlerError>(value) })
        })
    }

    fn failing() -> SecurityHandler<(), ()> {
        security_handler(|_, _| Box::pin(async { Err::<Value, _>(SecurityHandlerError::new("bad token")) }))
    }

    fn ctx() -> RequestContext<()> {
        RequestContext::new(ParsedRequest::default())
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy}");
        }
        for truthy in [json!(true), json!(1), json!(-0.5), json!("x"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy}");
        }
    }

    #[tokio::test]
    async fn test_no_requirements_invokes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut handlers: Handlers = HashMap::new();
        handlers.insert(
            "basicAuth".to_string(),
            security_handler(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok::<_, SecurityHandlerError>(json!(true)) })
            }),
        );

        let security = evaluate(&[], &handlers, &ctx(), &()).await;
        assert!(security.authorized);
        assert!(security.results.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unregistered_scheme_fails() {
        let requirements = [SecurityRequirement::new(["basicAuth"])];
        let security = evaluate(&requirements, &Handlers::new(), &ctx(), &()).await;
        assert!(!security.authorized);
        assert_eq!(security.result("basicAuth"), Some(&SchemeResult::Unregistered));
    }

    #[tokio::test]
    async fn test_or_of_ands() {
        let requirements = [
            SecurityRequirement::new(["bearerAuth"]),
            SecurityRequirement::new(["apiKey", "basicAuth"]),
        ];

        let mut handlers: Handlers = HashMap::new();
        handlers.insert("bearerAuth".to_string(), failing());
        handlers.insert("apiKey".to_string(), returning(json!({ "key": "k" })));
        handlers.insert("basicAuth".to_string(), returning(json!("alice")));
        let security = evaluate(&requirements, &handlers, &ctx(), &()).await;
        assert!(security.authorized);
        assert!(matches!(security.result("bearerAuth"), Some(SchemeResult::Error(_))));
        assert_eq!(
            security.results.keys().collect::<Vec<_>>(),
            vec!["bearerAuth", "apiKey", "basicAuth"]
        );

        handlers.insert("basicAuth".to_string(), returning(json!(false)));
        let security = evaluate(&requirements, &handlers, &ctx(), &()).await;
        assert!(!security.authorized);
    }

    #[tokio::test]
    async fn test_empty_requirement_set_allows_anonymous() {
        let requirements = [
            SecurityRequirement::new(["bearerAuth"]),
            SecurityRequirement::new(Vec::<String>::new()),
        ];
        let security = evaluate(&requirements, &Handlers::new(), &ctx(), &()).await;
        assert!(security.authorized);
    }
}
