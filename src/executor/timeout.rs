//! Deadline enforcement
//!
//! Every hook, test body and middleware step runs through a [`TimeoutWrapper`],
//! which normalizes the three calling conventions into one async call and
//! races it against the effective timeout.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::{default_error_factory, ErrorFactory, RunError};
use crate::models::{Callable, Done};

/// Global default timeout for every invocation
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

enum Failure {
    Rejected(Value),
    Panicked(String),
}

/// Races invocations against a deadline
#[derive(Clone)]
pub struct TimeoutWrapper {
    timeout_ms: u64,
    error_factory: ErrorFactory,
}

impl TimeoutWrapper {
    pub fn new(timeout_ms: u64, error_factory: ErrorFactory) -> Self {
        Self {
            timeout_ms,
            error_factory,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Same error factory, different deadline
    pub fn with_timeout_ms(&self, timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            error_factory: self.error_factory.clone(),
        }
    }

    /// Invoke `callable` with `arg`, bounded by the timeout.
    ///
    /// On timeout the pending work is dropped (async) or abandoned with its
    /// cancellation token cancelled (callback), and the error carries
    /// `error_factory("<label> timed out in <ms>ms.")`.
    pub async fn call<A, R>(&self, label: &str, callable: &Callable<A, R>, arg: A) -> Result<R, RunError>
    where
        A: Send + 'static,
        R: Send + 'static,
    {
        debug!(label, kind = %callable.kind(), timeout_ms = self.timeout_ms, "invoking");

        let token = CancellationToken::new();
        let deadline = Duration::from_millis(self.timeout_ms);

        match tokio::time::timeout(deadline, invoke(callable, arg, token.clone())).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(Failure::Rejected(reason))) => Err(RunError::Rejected {
                label: label.to_string(),
                reason,
            }),
            Ok(Err(Failure::Panicked(message))) => Err(RunError::Panicked {
                label: label.to_string(),
                message,
            }),
            Err(_) => {
                token.cancel();
                let message = format!("{label} timed out in {}ms.", self.timeout_ms);
                warn!("{}", message);
                Err(RunError::Timeout {
                    label: label.to_string(),
                    timeout_ms: self.timeout_ms,
                    reason: (self.error_factory)(message),
                })
            }
        }
    }
}

impl Default for TimeoutWrapper {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS, default_error_factory())
    }
}

impl fmt::Debug for TimeoutWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutWrapper")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

async fn invoke<A, R>(callable: &Callable<A, R>, arg: A, token: CancellationToken) -> Result<R, Failure>
where
    A: Send + 'static,
    R: Send + 'static,
{
    match callable {
        Callable::Sync(f) => catch_unwind(AssertUnwindSafe(|| f(arg)))
            .map_err(panic_message)?
            .map_err(Failure::Rejected),
        Callable::Callback(f) => {
            let (done, rx) = Done::channel(token);
            catch_unwind(AssertUnwindSafe(|| f(arg, done))).map_err(panic_message)?;
            match rx.await {
                Ok(outcome) => outcome.map_err(Failure::Rejected),
                // Done dropped without completing: nothing will ever fire.
                Err(_) => std::future::pending().await,
            }
        }
        Callable::Async(f) => {
            let fut = catch_unwind(AssertUnwindSafe(|| f(arg))).map_err(panic_message)?;
            AssertUnwindSafe(fut)
                .catch_unwind()
                .await
                .map_err(panic_message)?
                .map_err(Failure::Rejected)
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Failure {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked with a non-string payload".to_string()
    };
    Failure::Panicked(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn wrapper(timeout_ms: u64) -> TimeoutWrapper {
        TimeoutWrapper::new(timeout_ms, default_error_factory())
    }

    #[tokio::test]
    async fn test_sync_value() {
        let double: Callable<u32, u32> = Callable::from_fn(|n| n * 2);
        assert_eq!(assert_ok!(wrapper(10).call("double", &double, 4).await), 8);
    }

    #[tokio::test]
    async fn test_sync_rejection() {
        let failing: Callable<(), ()> = Callable::sync(|_| Err(json!("nope")));
        let err = wrapper(10).call("failing", &failing, ()).await.unwrap_err();
        assert_eq!(
            err,
            RunError::Rejected {
                label: "failing".to_string(),
                reason: json!("nope"),
            }
        );
    }

    #[tokio::test]
    async fn test_sync_panic_is_caught() {
        let throwing: Callable<(), Value> = Callable::from_fn(|_| panic!("thrown"));
        let err = wrapper(10).call("throws", &throwing, ()).await.unwrap_err();
        assert_eq!(err.reason(), json!("thrown"));
    }

    #[tokio::test]
    async fn test_async_panic_is_caught() {
        let throwing: Callable<(), Value> = Callable::future(|_| async {
            tokio::task::yield_now().await;
            panic!("{}", "late throw".to_string())
        });
        let err = wrapper(100).call("throws", &throwing, ()).await.unwrap_err();
        assert!(matches!(err, RunError::Panicked { ref message, .. } if message == "late throw"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_resolves_later() {
        let cb: Callable<u32, u32> = Callable::callback(|n, done| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.resolve(n + 1);
            });
        });
        assert_eq!(wrapper(10).call("cb", &cb, 1).await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_reject() {
        let cb: Callable<(), ()> = Callable::callback(|_, done| done.reject("bad"));
        let err = wrapper(10).call("cb", &cb, ()).await.unwrap_err();
        assert_eq!(err.reason(), json!("bad"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_timeout_uses_error_factory() {
        let slow: Callable<(), ()> = Callable::future(|_| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        });
        let factory: ErrorFactory = Arc::new(|msg| json!({ "message": msg }));
        let err = TimeoutWrapper::new(10, factory)
            .call("slow", &slow, ())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RunError::Timeout {
                label: "slow".to_string(),
                timeout_ms: 10,
                reason: json!({ "message": "slow timed out in 10ms." }),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_done_times_out() {
        let forgetful: Callable<(), ()> = Callable::callback(|_, done| drop(done));
        let err = assert_err!(wrapper(10).call("forgetful", &forgetful, ()).await);
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_callback_token() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));
        let cooperative: Callable<(), ()> = Callable::callback(move |_, done| {
            let token = done.token();
            let tx = tx.lock().unwrap().take();
            tokio::spawn(async move {
                token.cancelled().await;
                if let Some(tx) = tx {
                    let _ = tx.send("stopped");
                }
                drop(done);
            });
        });

        let err = wrapper(10).call("coop", &cooperative, ()).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(rx.await, Ok("stopped"));
    }

    #[test]
    fn test_with_timeout_ms() {
        let base = TimeoutWrapper::default();
        assert_eq!(base.timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(base.with_timeout_ms(3).timeout_ms(), 3);
    }
}
