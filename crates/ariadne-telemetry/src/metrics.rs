//! Dispatch metrics.
//!
//! Recorded through the `metrics` facade. The host application decides
//! where they go by installing a recorder; without one every call here is
//! a no-op.

use metrics::{counter, describe_counter};

/// Counter of handled requests by outcome.
pub const DISPATCH_TOTAL: &str = "ariadne_dispatch_total";

/// Counter of failed validations.
pub const VALIDATION_FAILURES_TOTAL: &str = "ariadne_validation_failures_total";

/// Counter of requests denied by security evaluation.
pub const SECURITY_DENIALS_TOTAL: &str = "ariadne_security_denials_total";

/// The terminal state a request reached in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The route handler ran.
    Handled,
    /// The pre-response hook answered instead of the route handler.
    ShortCircuited,
    /// No route matched.
    NotFound,
    /// A route matched but not with the requested method.
    MethodNotAllowed,
    /// The operation has no registered handler.
    NotImplemented,
    /// Validation failed and the validation-fail handler answered.
    ValidationFailed,
    /// No security requirement-set passed.
    Unauthorized,
}

impl DispatchOutcome {
    /// Returns the label value used for this outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Handled => "handled",
            Self::ShortCircuited => "short_circuited",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::NotImplemented => "not_implemented",
            Self::ValidationFailed => "validation_failed",
            Self::Unauthorized => "unauthorized",
        }
    }
}

/// Registers descriptions for all Ariadne metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Requests handled, by pipeline outcome");
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Request or response validations that produced errors"
    );
    describe_counter!(
        SECURITY_DENIALS_TOTAL,
        "Requests for which no security requirement-set passed"
    );
}

/// Records the outcome of one pipeline run.
///
/// `operation` is empty when no route matched.
pub fn record_dispatch(operation: &str, outcome: DispatchOutcome) {
    counter!(
        DISPATCH_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Records a failed validation.
///
/// `kind` is `"request"`, `"response"` or `"response_headers"`.
pub fn record_validation_failure(operation: &str, kind: &'static str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "operation" => operation.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Records a security denial.
pub fn record_security_denial(operation: &str) {
    counter!(SECURITY_DENIALS_TOTAL, "operation" => operation.to_string()).increment(1);
}
