//! Run errors
//!
//! Failures of hooks and middleware steps abort the run; failures of test
//! bodies are converted into FAIL results using [`RunError::reason`].

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Builds the value carried by a timeout from its message
pub type ErrorFactory = Arc<dyn Fn(String) -> Value + Send + Sync>;

pub fn default_error_factory() -> ErrorFactory {
    Arc::new(Value::String)
}

/// Fatal error of a run, or the failure of a single invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("{label} timed out in {timeout_ms}ms.")]
    Timeout {
        label: String,
        timeout_ms: u64,
        reason: Value,
    },

    #[error("{label} failed: {reason}")]
    Rejected { label: String, reason: Value },

    #[error("{label} panicked: {message}")]
    Panicked { label: String, message: String },
}

impl RunError {
    /// Label of the invocation that failed
    pub fn label(&self) -> &str {
        match self {
            RunError::Timeout { label, .. }
            | RunError::Rejected { label, .. }
            | RunError::Panicked { label, .. } => label,
        }
    }

    /// Value recorded as the error of a failed test
    pub fn reason(&self) -> Value {
        match self {
            RunError::Timeout { reason, .. } | RunError::Rejected { reason, .. } => reason.clone(),
            RunError::Panicked { message, .. } => Value::String(message.clone()),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RunError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timeout_message() {
        let err = RunError::Timeout {
            label: "Root suite before hook".to_string(),
            timeout_ms: 10,
            reason: json!("Root suite before hook timed out in 10ms."),
        };
        assert_eq!(err.to_string(), "Root suite before hook timed out in 10ms.");
        assert_eq!(err.label(), "Root suite before hook");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_reason() {
        let rejected = RunError::Rejected {
            label: "t".to_string(),
            reason: json!({ "code": 1 }),
        };
        assert_eq!(rejected.reason(), json!({ "code": 1 }));

        let panicked = RunError::Panicked {
            label: "t".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(panicked.reason(), json!("boom"));
        assert!(!panicked.is_timeout());
    }

    #[test]
    fn test_default_error_factory() {
        let factory = default_error_factory();
        assert_eq!(factory("x timed out".to_string()), json!("x timed out"));
    }
}
