//! swat - nested test suite runner
//!
//! A CLI for running the bundled demonstration suites through the engine.
//!
//! ## Usage
//!
//! ```bash
//! # Run every bundled suite with the spec report
//! swat run
//!
//! # Run one suite, JSON output, 200ms timeout
//! swat run --suite context --format json --timeout 200
//!
//! # Only run entries matching a pattern
//! swat run --only '^(basic|test)'
//!
//! # List bundled suites
//! swat list --detailed
//!
//! # Write a default configuration file
//! swat config init
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde_json::Value;
use tracing::{error, info};

mod cli;

use cli::Args;
use swat::config::{default_config_path, print_env_help, EnvConfig, RunnerConfig};
use swat::demo::{self, DemoSuite};
use swat::executor::{Middleware, SuiteRunner};
use swat::models::{Entry, RunSummary, Suite};
use swat::output::{write_results_to_file, OutputFormat, ResultFormatter};
use swat::utils::{init_logger, LogLevel, Timer};

/// Exit code for a run with failing tests
const EXIT_FAILED: i32 = 1;
/// Exit code for a run aborted by a hook or middleware error
const EXIT_ABORTED: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    match args.command {
        cli::Command::Run(run_args) => {
            let code = run_suites(run_args, &env, args.verbose).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        cli::Command::List(list_args) => {
            list_suites(list_args);
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &env)?;
        }
    }

    Ok(())
}

/// Resolve configuration: file, then environment, then command line
fn load_config(path: Option<&str>, env: &EnvConfig) -> Result<RunnerConfig> {
    let config = match path.or(env.config_file.as_deref()) {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::load_or_default()?,
    };
    Ok(config.merge_env(env))
}

async fn run_suites(args: cli::RunArgs, env: &EnvConfig, verbose: bool) -> Result<i32> {
    let mut config = load_config(args.config.as_deref(), env)?;
    if let Some(timeout) = args.timeout {
        config.default_timeout_ms = timeout;
    }
    if let Some(skip) = args.skip {
        config.skip_pattern = skip;
    }
    if let Some(only) = args.only {
        config.only_pattern = only;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.no_color {
        config.colorize = false;
    }
    if args.no_timer {
        config.timer = false;
    }

    init_logger(if verbose { LogLevel::Debug } else { config.log_level });

    let filter = config.filter()?;
    let format = config.output_format()?;
    let formatter = ResultFormatter::new(format).colorize(config.colorize);

    let demos = match args.suite.as_deref() {
        Some(name) => vec![demo::find(name).with_context(|| format!("Unknown suite: {name}"))?],
        None => demo::all(),
    };

    info!(
        "Running {} suite(s) with {}ms timeout",
        demos.len(),
        config.default_timeout_ms
    );

    let suite = demos
        .into_iter()
        .fold(Suite::new(), |root, demo| root.suite(demo.name, demo.suite));

    let middlewares = if config.timer {
        vec![Middleware::timer()]
    } else {
        Vec::new()
    };
    let runner = SuiteRunner::new(Value::default)
        .timeout_ms(config.default_timeout_ms)
        .middlewares(middlewares);

    let started_at = Utc::now();
    let timer = Timer::start("swat run");
    let tree = match runner.run(&suite, &filter).await {
        Ok(tree) => tree,
        Err(err) => {
            error!("Run aborted: {}", err);
            eprintln!("SWAT: ABORTED - {err}");
            return Ok(EXIT_ABORTED);
        }
    };
    let summary = RunSummary::new(started_at, &tree, timer.stop().as_millis() as u64);

    println!("{}", formatter.format_tree(&tree));
    if format == OutputFormat::Spec {
        println!("{}", formatter.format_run_summary(&summary));
    }

    if let Some(path) = args.output {
        write_results_to_file(&path, &tree, format)?;
        info!("Results saved to {}", path);
    }

    Ok(if tree.is_success() { 0 } else { EXIT_FAILED })
}

fn list_suites(args: cli::ListArgs) {
    println!("\nBundled suites\n");

    for DemoSuite {
        name,
        description,
        suite,
    } in demo::all()
    {
        println!("  {name:12} {description}");
        if args.detailed {
            print_entries(&suite, 2);
            println!();
        }
    }
}

fn print_entries(suite: &Suite<Value>, depth: usize) {
    for (name, entry) in &suite.entries {
        println!("{}{} [{}]", "  ".repeat(depth), name, entry.kind());
        if let Entry::Suite(child) = entry {
            print_entries(child, depth + 1);
        }
    }
}

fn manage_config(args: cli::ConfigArgs, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = output
                .map(std::path::PathBuf::from)
                .unwrap_or_else(default_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            RunnerConfig::default().save(&path)?;
            println!("✓ Configuration file created: {}", path.display());
        }

        cli::ConfigAction::Show { env: show_env, format } => {
            if show_env {
                env.print_summary();
                println!();
                print_env_help();
            } else {
                let config = load_config(None, env)?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }
    }

    Ok(())
}
