//! Calling conventions for hooks, tests and middleware steps
//!
//! Every unit of user code the runner invokes is tagged with the convention
//! it follows instead of having it inferred from its signature.

use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

pub type SyncFn<A, R> = dyn Fn(A) -> Result<R, Value> + Send + Sync;
pub type CallbackFn<A, R> = dyn Fn(A, Done<R>) + Send + Sync;
pub type AsyncFn<A, R> = dyn Fn(A) -> BoxFuture<'static, Result<R, Value>> + Send + Sync;

/// Calling convention tag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Sync,
    Callback,
    Async,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Sync => write!(f, "sync"),
            CallKind::Callback => write!(f, "callback"),
            CallKind::Async => write!(f, "async"),
        }
    }
}

/// A function taking `A` and eventually producing `R` or a rejection reason.
pub enum Callable<A, R> {
    /// Returns (or fails) before the call returns
    Sync(Arc<SyncFn<A, R>>),
    /// Completes by consuming the supplied [`Done`] handle, possibly later
    Callback(Arc<CallbackFn<A, R>>),
    /// Returns a future
    Async(Arc<AsyncFn<A, R>>),
}

impl<A, R> Callable<A, R>
where
    A: Send + 'static,
    R: Send + 'static,
{
    /// Wrap a fallible synchronous function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(A) -> Result<R, Value> + Send + Sync + 'static,
    {
        Callable::Sync(Arc::new(f))
    }

    /// Wrap an infallible synchronous function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Callable::Sync(Arc::new(move |arg| Ok(f(arg))))
    }

    /// Wrap a callback-style function.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(A, Done<R>) + Send + Sync + 'static,
    {
        Callable::Callback(Arc::new(f))
    }

    /// Wrap a function returning a future.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Value>> + Send + 'static,
    {
        Callable::Async(Arc::new(move |arg| Box::pin(f(arg))))
    }
}

impl<A, R> Callable<A, R> {
    pub fn kind(&self) -> CallKind {
        match self {
            Callable::Sync(_) => CallKind::Sync,
            Callable::Callback(_) => CallKind::Callback,
            Callable::Async(_) => CallKind::Async,
        }
    }
}

impl<A, R> Clone for Callable<A, R> {
    fn clone(&self) -> Self {
        match self {
            Callable::Sync(f) => Callable::Sync(Arc::clone(f)),
            Callable::Callback(f) => Callable::Callback(Arc::clone(f)),
            Callable::Async(f) => Callable::Async(Arc::clone(f)),
        }
    }
}

impl<A, R> fmt::Debug for Callable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self.kind())
    }
}

/// Completion handle passed to callback-style functions.
///
/// Dropping it without calling [`Done::resolve`] or [`Done::reject`] leaves the
/// invocation pending until its deadline fires.
pub struct Done<R> {
    tx: oneshot::Sender<Result<R, Value>>,
    token: CancellationToken,
}

impl<R> Done<R> {
    pub(crate) fn channel(token: CancellationToken) -> (Self, oneshot::Receiver<Result<R, Value>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx, token }, rx)
    }

    pub fn resolve(self, value: R) {
        // The receiver is gone once the deadline fired; nothing left to notify.
        let _ = self.tx.send(Ok(value));
    }

    pub fn reject(self, reason: impl Into<Value>) {
        let _ = self.tx.send(Err(reason.into()));
    }

    /// Token cancelled when the invocation's deadline fires.
    ///
    /// Work that ignores it keeps running in the background after a timeout.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<R> fmt::Debug for Done<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_kind() {
        let sync: Callable<(), ()> = Callable::from_fn(|_| ());
        let callback: Callable<(), ()> = Callable::callback(|_, done| done.resolve(()));
        let future: Callable<(), ()> = Callable::future(|_| async { Ok(()) });

        assert_eq!(sync.kind(), CallKind::Sync);
        assert_eq!(callback.kind(), CallKind::Callback);
        assert_eq!(future.kind(), CallKind::Async);
        assert_eq!(format!("{:?}", callback.clone()), "Callable(callback)");
    }

    #[tokio::test]
    async fn test_done_delivers_once() {
        let (done, rx) = Done::<u32>::channel(CancellationToken::new());
        done.resolve(7);
        assert_eq!(rx.await.ok(), Some(Ok(7)));

        let (done, rx) = Done::<u32>::channel(CancellationToken::new());
        done.reject("nope");
        assert_eq!(rx.await.ok(), Some(Err(Value::from("nope"))));
    }

    #[test]
    fn test_done_token() {
        let token = CancellationToken::new();
        let (done, _rx) = Done::<()>::channel(token.clone());
        assert!(!done.is_cancelled());
        token.cancel();
        assert!(done.is_cancelled());
        assert!(done.token().is_cancelled());
    }
}
