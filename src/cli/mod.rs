//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Nested test suite runner with hooks, middleware and timeouts
#[derive(Parser, Debug)]
#[command(name = "swat")]
#[command(version)]
#[command(about = "Run nested test suites with lifecycle hooks, middleware and timeouts")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bundled suites
    Run(RunArgs),

    /// List bundled suites and their entries
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Run only this bundled suite (all when omitted)
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Regex of entry names to record as SKIP
    #[arg(long)]
    pub skip: Option<String>,

    /// Regex of entry names to run; everything else is skipped
    #[arg(long)]
    pub only: Option<String>,

    /// Timeout in milliseconds for every hook, test and middleware step
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output format (spec, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Do not record test durations
    #[arg(long)]
    pub no_timer: bool,

    /// Configuration file (defaults to the discovered one)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Save the report to file
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show every entry of each suite
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Output path (defaults to the user config directory)
        #[arg(short, long)]
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment variable overrides instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from([
            "swat", "run", "--only", "^basic", "--timeout", "100", "--format", "json",
        ]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.only.as_deref(), Some("^basic"));
                assert_eq!(run.timeout, Some(100));
                assert_eq!(run.format.as_deref(), Some("json"));
                assert!(!run.no_color);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let args = Args::parse_from(["swat", "-v", "config", "show", "--env"]);
        assert!(args.verbose);
        assert!(matches!(
            args.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Show { env: true, .. }
            })
        ));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
