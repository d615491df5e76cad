//! Test execution engine
//!
//! Timeout enforcement, hook composition, the middleware pipeline and the
//! recursive suite walker.

mod error;
mod filter;
mod hooks;
mod middleware;
mod runner;
mod timeout;

pub use error::{default_error_factory, ErrorFactory, RunError};
pub use filter::{Filter, DEFAULT_SKIP_PREFIX};
pub use hooks::HookChain;
pub use middleware::{Middleware, MiddlewareAfter, MiddlewareBefore, MiddlewarePipeline};
pub use runner::{run, ContextFactory, SuiteRunner, INVALID_ENTRY_MESSAGE, ROOT_SUITE_LABEL};
pub use timeout::{TimeoutWrapper, DEFAULT_TIMEOUT_MS};
