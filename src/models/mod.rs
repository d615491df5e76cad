//! Data models for suite definitions and run results
//!
//! This module contains all data structures used throughout the application.

mod callable;
mod suite;
mod test_result;

pub use callable::{CallKind, Callable, Done};
pub use suite::{EachHook, Entry, Suite, SuiteHook, TestFn};
pub use test_result::{NodeType, RunSummary, SuiteResult, TestResult, TestStatus};
