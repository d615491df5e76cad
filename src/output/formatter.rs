//! Output formatters for result trees
//!
//! Provides spec, error, summary, JSON and CSV renderings.

use std::io::Write;

use crate::models::{RunSummary, SuiteResult, TestResult, TestStatus};

const INDENT: &str = "  ";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Spec tree, failure details and summary
    Spec,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spec" | "node" => Some(OutputFormat::Spec),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Spec => "spec",
            OutputFormat::Json => "json",
            OutputFormat::JsonPretty => "json-pretty",
            OutputFormat::Csv => "csv",
            OutputFormat::Summary => "summary",
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn colorize(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colorize {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Render a whole tree in the configured format
    pub fn format_tree(&self, tree: &SuiteResult) -> String {
        match self.format {
            OutputFormat::Spec => self.node_report(tree),
            OutputFormat::Json => serde_json::to_string(tree).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(tree).unwrap_or_default(),
            OutputFormat::Csv => self.format_csv(tree),
            OutputFormat::Summary => self.summary_report(tree),
        }
    }

    /// Format a single test line, e.g. `✓ name (1.2ms)`
    pub fn format_test(&self, result: &TestResult) -> String {
        let time = match result.duration {
            Some(ms) if ms > 0.0 => format!(" ({ms:.1}ms)"),
            _ => String::new(),
        };
        let line = format!("{} {}{}", result.result.symbol(), result.name, time);
        let color = match result.result {
            TestStatus::Pass => GREEN,
            TestStatus::Fail => RED,
            TestStatus::Skip => YELLOW,
        };
        self.paint(color, &line)
    }

    /// Suite names indented by depth, tests one level deeper than their suite
    pub fn spec_lines(&self, tree: &SuiteResult) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_spec_lines(tree, 0, &mut lines);
        lines
    }

    fn collect_spec_lines(&self, suite: &SuiteResult, depth: usize, lines: &mut Vec<String>) {
        match &suite.name {
            Some(name) if !suite.is_root() => {
                lines.push(format!("{}{}", INDENT.repeat(depth), name));
            }
            _ => lines.push(String::new()),
        }
        for test in &suite.tests {
            lines.push(format!("{}{}", INDENT.repeat(depth + 1), self.format_test(test)));
        }
        for child in &suite.suites {
            self.collect_spec_lines(child, depth + 1, lines);
        }
    }

    pub fn spec_report(&self, tree: &SuiteResult) -> String {
        self.spec_lines(tree).join("\n")
    }

    /// Each failed test name followed by its pretty-printed error
    pub fn error_report(&self, tree: &SuiteResult) -> String {
        tree.failed_tests()
            .into_iter()
            .map(|test| {
                let error = test
                    .error
                    .as_ref()
                    .and_then(|e| serde_json::to_string_pretty(e).ok())
                    .unwrap_or_else(|| "null".to_string());
                format!("{}\n{}\n", self.paint(RED, &test.name), self.paint(GREY, &error))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn summary_report(&self, tree: &SuiteResult) -> String {
        let total = tree.count_tests();
        let fails = tree.failed_tests().len();
        let label = self.paint(GREY, "SWAT:");
        if fails == 0 {
            format!(
                "  {} {} ({} of {} tests passed).",
                label,
                self.paint(&format!("{BOLD}{GREEN}"), "SUCCESS"),
                self.paint(GREEN, &(total - fails).to_string()),
                total
            )
        } else {
            format!(
                "  {} {} ({} of {} tests failed).",
                label,
                self.paint(&format!("{BOLD}{RED}"), "FAILURE"),
                self.paint(RED, &fails.to_string()),
                total
            )
        }
    }

    /// Spec tree, then failure details, then the summary line
    pub fn node_report(&self, tree: &SuiteResult) -> String {
        format!(
            "{}\n\n{}\n{}",
            self.spec_report(tree),
            self.error_report(tree),
            self.summary_report(tree)
        )
    }

    /// Run statistics block shown after a report
    pub fn format_run_summary(&self, summary: &RunSummary) -> String {
        let rate = format!("{:5.1}%", summary.pass_rate());
        let rate = if summary.is_all_passed() {
            self.paint(GREEN, &rate)
        } else {
            self.paint(RED, &rate)
        };
        format!(
            "  Started {} | Total: {} | Pass: {} | Fail: {} | Skip: {} | Pass Rate: {} | Duration: {}ms",
            summary.started_at.format("%Y-%m-%d %H:%M:%S"),
            summary.total,
            summary.passed,
            summary.failed,
            summary.skipped,
            rate,
            summary.total_duration_ms
        )
    }

    fn format_csv(&self, tree: &SuiteResult) -> String {
        let mut buf = Vec::new();
        match write_csv(tree, &mut buf) {
            Ok(()) => String::from_utf8(buf).unwrap_or_default(),
            Err(err) => format!("failed to render csv: {err}"),
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Spec)
    }
}

/// Write one CSV row per test: `suite,name,result,duration_ms,error`
pub fn write_csv<W: Write>(tree: &SuiteResult, out: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["suite", "name", "result", "duration_ms", "error"])?;
    write_csv_rows(tree, &mut Vec::new(), &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_csv_rows<W: Write>(
    suite: &SuiteResult,
    path: &mut Vec<String>,
    writer: &mut csv::Writer<W>,
) -> anyhow::Result<()> {
    if let Some(name) = &suite.name {
        path.push(name.clone());
    }
    let suite_path = path.join(" > ");
    for test in &suite.tests {
        let duration = test.duration.map(|d| format!("{d:.3}")).unwrap_or_default();
        let error = match &test.error {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let status = test.result.to_string();
        writer.write_record([
            suite_path.as_str(),
            test.name.as_str(),
            status.as_str(),
            duration.as_str(),
            error.as_str(),
        ])?;
    }
    for child in &suite.suites {
        write_csv_rows(child, path, writer)?;
    }
    if suite.name.is_some() {
        path.pop();
    }
    Ok(())
}

/// Write a rendered tree to a file
pub fn write_results_to_file(
    path: &str,
    tree: &SuiteResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_tree(tree);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SuiteResult {
        SuiteResult::root()
            .with_test(TestResult::pass("a").with_duration(1.2))
            .with_test(TestResult::fail("b", json!({ "why": "oops" })))
            .with_suite(
                SuiteResult::named("inner")
                    .with_test(TestResult::skip("skip-c"))
                    .with_test(TestResult::fail("d", "bad")),
            )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("SPEC"), Some(OutputFormat::Spec));
        assert_eq!(OutputFormat::from_str("unknown"), None);
        assert_eq!(OutputFormat::JsonPretty.name(), "json-pretty");
    }

    #[test]
    fn test_spec_lines() {
        let lines = ResultFormatter::default().no_color().spec_lines(&sample());
        assert_eq!(
            lines,
            vec!["", "  ✓ a (1.2ms)", "  ✗ b", "  inner", "    ○ skip-c", "    ✗ d"]
        );
    }

    #[test]
    fn test_colorized_test_line() {
        let line = ResultFormatter::default().format_test(&TestResult::pass("a"));
        assert_eq!(line, "\x1b[32m✓ a\x1b[0m");
    }

    #[test]
    fn test_summary_report() {
        let formatter = ResultFormatter::default().no_color();
        assert_eq!(
            formatter.summary_report(&sample()),
            "  SWAT: FAILURE (2 of 4 tests failed)."
        );

        let passing = SuiteResult::root().with_test(TestResult::pass("a"));
        assert_eq!(
            formatter.summary_report(&passing),
            "  SWAT: SUCCESS (1 of 1 tests passed)."
        );
    }

    #[test]
    fn test_error_report() {
        let report = ResultFormatter::default().no_color().error_report(&sample());
        assert_eq!(report, "b\n{\n  \"why\": \"oops\"\n}\n\nd\n\"bad\"\n");
    }

    #[test]
    fn test_csv_rows() {
        let csv = ResultFormatter::new(OutputFormat::Csv).format_tree(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "suite,name,result,duration_ms,error");
        assert_eq!(lines[1], ",a,PASS,1.200,");
        assert_eq!(lines[2], ",b,FAIL,,\"{\"\"why\"\":\"\"oops\"\"}\"");
        assert_eq!(lines[4], "inner,d,FAIL,,bad");
    }

    #[test]
    fn test_json_round_trip() {
        let json = ResultFormatter::new(OutputFormat::Json).format_tree(&sample());
        let parsed: SuiteResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_write_results_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let path = path.to_str().unwrap();

        write_results_to_file(path, &sample(), OutputFormat::JsonPretty).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"ROOT_SUITE\""));
    }
}
