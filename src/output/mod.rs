//! Output formatting module
//!
//! Renders result trees for humans and replays them into event reporters.

mod events;
mod formatter;

pub use events::{replay, ReporterEvents, SuiteEvent};
pub use formatter::{write_csv, write_results_to_file, OutputFormat, ResultFormatter};
