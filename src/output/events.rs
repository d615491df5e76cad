//! Event-based reporter bridge
//!
//! Replays a finished result tree through a reporter that consumes
//! `start` / `suite` / `pass` / `fail` / `test end` / `end` events.

use serde_json::Value;

use crate::models::{SuiteResult, TestResult, TestStatus};

/// Suite announcement passed to [`ReporterEvents::suite`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuiteEvent<'a> {
    /// Set when the suite sits directly under the replayed tree
    pub root: bool,
    pub title: &'a str,
}

/// Callbacks of an event-driven reporter. Every method defaults to a no-op.
pub trait ReporterEvents {
    fn start(&mut self) {}
    fn suite(&mut self, _suite: SuiteEvent<'_>) {}
    fn pass(&mut self, _test: &TestResult) {}
    fn fail(&mut self, _test: &TestResult, _error: Option<&Value>) {}
    fn test_end(&mut self, _test: &TestResult) {}
    fn end(&mut self) {}
}

/// Walk `tree` and emit the events a live run would have produced, in tree
/// order. Each suite level is framed by its own `start` / `end` pair.
///
/// Skipped tests are reported through `pass`, matching reporters that only
/// know two outcomes.
pub fn replay<R: ReporterEvents + ?Sized>(tree: &SuiteResult, reporter: &mut R) {
    replay_level(tree, reporter, true);
}

fn replay_level<R: ReporterEvents + ?Sized>(suite: &SuiteResult, reporter: &mut R, root: bool) {
    reporter.start();
    for test in &suite.tests {
        match test.result {
            TestStatus::Fail => reporter.fail(test, test.error.as_ref()),
            TestStatus::Pass | TestStatus::Skip => reporter.pass(test),
        }
        reporter.test_end(test);
    }
    for child in &suite.suites {
        reporter.suite(SuiteEvent {
            root,
            title: child.name.as_deref().unwrap_or_default(),
        });
        replay_level(child, reporter, false);
    }
    reporter.end();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ReporterEvents for Recorder {
        fn start(&mut self) {
            self.0.push("start".into());
        }
        fn suite(&mut self, suite: SuiteEvent<'_>) {
            self.0.push(format!("suite {} root={}", suite.title, suite.root));
        }
        fn pass(&mut self, test: &TestResult) {
            self.0.push(format!("pass {}", test.name));
        }
        fn fail(&mut self, test: &TestResult, error: Option<&Value>) {
            self.0.push(format!("fail {} {}", test.name, error.cloned().unwrap_or_default()));
        }
        fn test_end(&mut self, _test: &TestResult) {
            self.0.push("test end".into());
        }
        fn end(&mut self) {
            self.0.push("end".into());
        }
    }

    #[test]
    fn test_replay_order() {
        let tree = SuiteResult::root()
            .with_test(TestResult::pass("a"))
            .with_test(TestResult::fail("b", json!("oops")))
            .with_suite(SuiteResult::named("inner").with_test(TestResult::pass("c")));

        let mut recorder = Recorder::default();
        replay(&tree, &mut recorder);

        assert_eq!(
            recorder.0,
            vec![
                "start",
                "pass a",
                "test end",
                "fail b \"oops\"",
                "test end",
                "suite inner root=true",
                "start",
                "pass c",
                "test end",
                "end",
                "end",
            ]
        );
    }

    #[test]
    fn test_default_methods_are_noops() {
        struct Silent;
        impl ReporterEvents for Silent {}

        replay(&SuiteResult::root().with_test(TestResult::skip("s")), &mut Silent);
    }
}
