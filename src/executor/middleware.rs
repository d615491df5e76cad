//! Middleware pipeline
//!
//! Middleware wraps every test invocation (never suite hooks). All `before`
//! steps run in list order, then the test, then all `after` steps in the same
//! list order, each folding over the running result.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::error::RunError;
use super::timeout::TimeoutWrapper;
use crate::models::{Callable, TestFn, TestResult};
use crate::utils::monotonic_ms;

/// `before(test_name) -> before_result`
pub type MiddlewareBefore = Callable<String, Value>;

/// `after((result, before_result)) -> augmented_result`
pub type MiddlewareAfter = Callable<(TestResult, Value), TestResult>;

/// Named before/after interceptor pair
#[derive(Clone)]
pub struct Middleware {
    pub name: String,
    pub before: MiddlewareBefore,
    pub after: MiddlewareAfter,
}

impl Middleware {
    pub fn new(name: impl Into<String>, before: MiddlewareBefore, after: MiddlewareAfter) -> Self {
        Self {
            name: name.into(),
            before,
            after,
        }
    }

    /// Stamps `duration` (milliseconds) on every result
    pub fn timer() -> Self {
        Self::new(
            "timer",
            Callable::from_fn(|_name: String| Value::from(monotonic_ms())),
            Callable::from_fn(|(result, started): (TestResult, Value)| {
                match started.as_f64() {
                    Some(start) => result.with_duration(monotonic_ms() - start),
                    None => result,
                }
            }),
        )
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("before", &self.before)
            .field("after", &self.after)
            .finish()
    }
}

/// Ordered middleware list applied around each test
#[derive(Clone, Debug, Default)]
pub struct MiddlewarePipeline {
    middlewares: Arc<Vec<Middleware>>,
}

impl MiddlewarePipeline {
    pub fn new(middlewares: Vec<Middleware>) -> Self {
        Self {
            middlewares: Arc::new(middlewares),
        }
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run `test` with `context`, wrapped by every middleware.
    ///
    /// The test's own failure (non-`true` value, rejection, panic or timeout)
    /// becomes a FAIL result; a failing middleware step is returned as an error.
    pub async fn run<C>(
        &self,
        wrapper: &TimeoutWrapper,
        context: C,
        name: &str,
        test: &TestFn<C>,
    ) -> Result<TestResult, RunError>
    where
        C: Send + 'static,
    {
        let mut collected = Vec::with_capacity(self.middlewares.len());
        for middleware in self.middlewares.iter() {
            let label = format!("{} middleware before hook", middleware.name);
            let before_result = wrapper
                .call(&label, &middleware.before, name.to_string())
                .await?;
            collected.push((before_result, middleware));
        }

        let mut result = match wrapper.call(name, test, context).await {
            Ok(Value::Bool(true)) => TestResult::pass(name),
            Ok(other) => TestResult::fail(name, other),
            Err(err) => {
                debug!(test = name, error = %err, "test body failed");
                TestResult::fail(name, err.reason())
            }
        };

        for (before_result, middleware) in collected {
            let label = format!("{} middleware after hook", middleware.name);
            result = wrapper
                .call(&label, &middleware.after, (result, before_result))
                .await?;
        }

        Ok(result)
    }
}
