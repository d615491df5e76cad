//! Result tree models
//!
//! Defines test results, suite results and the run summary read by reporters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Node tag for result tree entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    RootSuite,
    Suite,
    Test,
}

/// Test execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✓",
            TestStatus::Fail => "✗",
            TestStatus::Skip => "○",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "PASS"),
            TestStatus::Fail => write!(f, "FAIL"),
            TestStatus::Skip => write!(f, "SKIP"),
        }
    }
}

/// Result of a single test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub name: String,
    pub result: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    /// Test body time in milliseconds, stamped by the timer middleware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Fields added by middleware
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl TestResult {
    fn new(name: impl Into<String>, result: TestStatus, error: Option<Value>) -> Self {
        Self {
            kind: NodeType::Test,
            name: name.into(),
            result,
            error,
            duration: None,
            extras: Map::new(),
        }
    }

    pub fn pass(name: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Pass, None)
    }

    pub fn fail(name: impl Into<String>, error: impl Into<Value>) -> Self {
        Self::new(name, TestStatus::Fail, Some(error.into()))
    }

    pub fn skip(name: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Skip, None)
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn is_pass(&self) -> bool {
        self.result == TestStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.result == TestStatus::Fail
    }

    pub fn is_skip(&self) -> bool {
        self.result == TestStatus::Skip
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.result.symbol(), self.name)?;
        if let Some(duration) = self.duration {
            write!(f, " ({duration:.1}ms)")?;
        }
        if let Some(error) = &self.error {
            match error {
                Value::String(msg) => write!(f, " - {msg}")?,
                other => write!(f, " - {other}")?,
            }
        }
        Ok(())
    }
}

/// Result of a suite level, mirroring the nesting of its definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub name: Option<String>,
    pub tests: Vec<TestResult>,
    pub suites: Vec<SuiteResult>,
}

impl SuiteResult {
    pub fn root() -> Self {
        Self {
            kind: NodeType::RootSuite,
            name: None,
            tests: Vec::new(),
            suites: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: NodeType::Suite,
            name: Some(name.into()),
            tests: Vec::new(),
            suites: Vec::new(),
        }
    }

    pub fn with_test(mut self, test: TestResult) -> Self {
        self.tests.push(test);
        self
    }

    pub fn with_suite(mut self, suite: SuiteResult) -> Self {
        self.suites.push(suite);
        self
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeType::RootSuite
    }

    /// Total number of tests in this subtree
    pub fn count_tests(&self) -> usize {
        self.suites
            .iter()
            .fold(self.tests.len(), |count, suite| count + suite.count_tests())
    }

    pub fn count_status(&self, status: TestStatus) -> usize {
        let own = self.tests.iter().filter(|t| t.result == status).count();
        self.suites
            .iter()
            .fold(own, |count, suite| count + suite.count_status(status))
    }

    /// Failed tests of this subtree in tree order
    pub fn failed_tests(&self) -> Vec<&TestResult> {
        let mut failed = Vec::new();
        self.collect_failed(&mut failed);
        failed
    }

    fn collect_failed<'a>(&'a self, out: &mut Vec<&'a TestResult>) {
        out.extend(self.tests.iter().filter(|t| t.is_fail()));
        for suite in &self.suites {
            suite.collect_failed(out);
        }
    }

    pub fn is_success(&self) -> bool {
        self.count_status(TestStatus::Fail) == 0
    }

    /// Copy of the tree with every duration removed, for structural comparison
    pub fn without_durations(&self) -> Self {
        Self {
            kind: self.kind,
            name: self.name.clone(),
            tests: self
                .tests
                .iter()
                .cloned()
                .map(|mut t| {
                    t.duration = None;
                    t
                })
                .collect(),
            suites: self.suites.iter().map(Self::without_durations).collect(),
        }
    }
}

/// Tally of a finished run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>, tree: &SuiteResult, total_duration_ms: u64) -> Self {
        Self {
            started_at,
            total: tree.count_tests(),
            passed: tree.count_status(TestStatus::Pass),
            failed: tree.count_status(TestStatus::Fail),
            skipped: tree.count_status(TestStatus::Skip),
            total_duration_ms,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        let ran = self.total - self.skipped;
        if ran == 0 {
            0.0
        } else {
            (self.passed as f64 / ran as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {}",
            self.total, self.passed, self.failed, self.skipped
        )?;
        write!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms | Started: {}",
            self.pass_rate(),
            self.total_duration_ms,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
