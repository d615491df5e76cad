//! swat - nested test suite execution engine
//!
//! Runs a declaratively nested description of test suites: tests, nested
//! suites and `before` / `beforeEach` / `afterEach` / `after` hooks. Every
//! invocation is bounded by a timeout, a context value is threaded through
//! the per-test hooks, middleware wraps each test, and the outcome is a
//! result tree mirroring the input's nesting.
//!
//! ## Usage
//!
//! ```no_run
//! use swat::{run, Suite};
//!
//! # async fn demo() -> Result<(), swat::RunError> {
//! let suite: Suite<serde_json::Value> = Suite::new()
//!     .test("adds", |_| 1 + 1 == 2)
//!     .suite("nested", Suite::new().test("fails", |_| "reason"));
//!
//! let tree = run(&suite).await?;
//! assert_eq!(tree.count_tests(), 2);
//! # Ok(())
//! # }
//! ```

pub mod assert;
pub mod config;
pub mod demo;
pub mod executor;
pub mod models;
pub mod output;
pub mod utils;

pub use assert::assert_many;
pub use executor::{run, Filter, Middleware, RunError, SuiteRunner};
pub use models::{Callable, Done, Entry, Suite, SuiteResult, TestResult, TestStatus};
