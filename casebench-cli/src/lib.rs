#![warn(missing_docs)]
//! Casebench CLI Library
//!
//! This module provides the harness command line for solution binaries.
//! Use `casebench::run()` (or `casebench_cli::run()`) in your main function to
//! run the registered entry point against a testcase file.
//!
//! # Example
//!
//! ```ignore
//! use casebench::prelude::*;
//!
//! #[solution]
//! fn solution(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! fn main() {
//!     if let Err(e) = casebench::run() {
//!         eprintln!("Error: {e:#}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod loader;
mod planner;

pub use config::*;
pub use executor::{ExecutionConfig, Executor, Phase, format_human_output};
pub use loader::{LoadError, TestCase, TestSuite};
pub use planner::{PlannedCase, RunPlan, build_plan};

use anyhow::Context;
#[cfg(target_os = "linux")]
use casebench_core::ProcProbe;
use casebench_core::{
    CaptureMode, Invoker, NullProbe, ResourceProbe, StdoutDivert, resolve_entry_point,
};
use casebench_report::{OutputFormat, Report, generate_json_report};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Casebench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "casebench")]
#[command(author, version, about = "Casebench - per-testcase execution harness")]
pub struct Cli {
    /// Identifier of the solution under test (used in messages)
    pub solution_id: Option<String>,

    /// Path to the JSON testcase file
    pub testcase_path: Option<PathBuf>,

    /// Configuration file (default: discover casebench.toml upwards)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Name the entry point is registered under
    #[arg(long)]
    pub entry_point: Option<String>,

    /// Output capture mode: descriptor, sink
    #[arg(long)]
    pub capture: Option<CaptureMode>,

    /// Report zero CPU and memory figures instead of reading procfs
    #[arg(long)]
    pub no_probe: bool,

    /// Output format: json, human
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dry run - show the plan without invoking anything
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the fallback report for every testcase without invoking anything
    #[arg(long)]
    pub placeholder: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,

    /// Print a default casebench.toml and exit
    #[arg(long)]
    pub init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the Casebench CLI with the process arguments.
/// This is the main entry point for solution binaries.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if the run must abort.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Casebench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if cli.init_config {
        print!("{}", CasebenchConfig::default_toml());
        return Ok(());
    }

    let (Some(solution_id), Some(testcase_path)) =
        (cli.solution_id.as_deref(), cli.testcase_path.as_deref())
    else {
        println!("{}", usage(&program_name()));
        return Ok(());
    };

    // casebench.toml first, CLI flags override
    let config = match &cli.config {
        Some(path) => CasebenchConfig::load(path)?,
        None => CasebenchConfig::discover()?,
    };
    let config = apply_overrides(&cli, config);

    let solution = resolve_entry_point(&config.runner.entry_point)
        .with_context(|| format!("solution {solution_id}: cannot resolve entry point"))?;

    let suite = TestSuite::load(testcase_path)
        .with_context(|| format!("solution {solution_id}: cannot load testcases"))?;

    if cli.placeholder {
        let report = Report::placeholder(suite.keys());
        let output = generate_json_report(&report)?;
        return emit(&output, cli.output.as_deref());
    }

    if cli.dry_run {
        print!("{}", build_plan(solution, &suite).render());
        return Ok(());
    }

    let invoker = Invoker::new(solution).with_backtrace(config.fault.backtrace);
    let exec_config = ExecutionConfig {
        capture_mode: config.capture.mode,
        show_progress: cli.progress,
    };
    let executor = Executor::new(exec_config, build_probe(&config.probe));

    let report = {
        let _divert = divert_ambient_stdout();
        executor.execute(&invoker, &suite)
    }
    .with_context(|| {
        format!(
            "solution {solution_id}: output capture failed while running {}",
            testcase_path.display()
        )
    })?;

    let output = match config.output.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report, invoker.name()),
    };
    emit(&output, cli.output.as_deref())
}

/// Logging goes to stderr; stdout carries only the report
fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "casebench=debug"
    } else {
        "casebench=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be set when embedded in a larger program
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn program_name() -> String {
    std::env::args()
        .next()
        .unwrap_or_else(|| "casebench".to_string())
}

/// Usage line printed when operands are missing
pub fn usage(program: &str) -> String {
    format!("Usage: {program} <solution_path> <testcase_path>")
}

/// Layer CLI flags over file configuration
fn apply_overrides(cli: &Cli, mut config: CasebenchConfig) -> CasebenchConfig {
    if let Some(entry_point) = &cli.entry_point {
        config.runner.entry_point = entry_point.clone();
    }
    if let Some(mode) = cli.capture {
        config.capture.mode = mode;
    }
    if cli.no_probe {
        config.probe.enabled = false;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    config
}

fn build_probe(config: &ProbeConfig) -> Box<dyn ResourceProbe> {
    if !config.enabled {
        return Box::new(NullProbe);
    }
    build_platform_probe(config)
}

#[cfg(target_os = "linux")]
fn build_platform_probe(config: &ProbeConfig) -> Box<dyn ResourceProbe> {
    let probe = ProcProbe::new(config.proc_root.clone());
    tracing::debug!(root = %probe.root().display(), "reading resource accounting");
    Box::new(probe)
}

#[cfg(not(target_os = "linux"))]
fn build_platform_probe(_config: &ProbeConfig) -> Box<dyn ResourceProbe> {
    casebench_core::default_probe()
}

/// Keep stray solution output off stdout while testcases run
fn divert_ambient_stdout() -> Option<StdoutDivert> {
    match StdoutDivert::to_stderr() {
        Ok(divert) => Some(divert),
        Err(e) => {
            tracing::warn!(error = %e, "cannot divert stdout, stray output may precede the report");
            None
        }
    }
}

/// Write the rendered report exactly once
fn emit(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        file.write_all(b"\n")?;
        println!("Report written to: {}", path.display());
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }
    Ok(())
}
