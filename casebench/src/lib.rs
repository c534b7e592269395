#![warn(missing_docs)]
//! # Casebench
//!
//! Per-testcase execution harness for code-grading pipelines.
//!
//! A solution binary registers one entry point and calls [`run`]. For each
//! testcase in a JSON file the harness:
//! - **Binds arguments**: coerces JSON input positionally onto the declared parameter types
//! - **Isolates faults**: a panic becomes a trace in the report, and the run continues
//! - **Captures output**: everything printed during the call is recorded per testcase
//! - **Measures**: CPU ticks, wall-clock seconds, and peak resident memory
//!
//! The report is one pretty-printed JSON object keyed by testcase, in file order.
//!
//! ## Quick Start
//!
//! ```ignore
//! use casebench::prelude::*;
//!
//! #[solution]
//! fn solution(nums: Vec<i64>, target: i64) -> Vec<usize> {
//!     // ...
//! }
//!
//! fn main() {
//!     if let Err(e) = casebench::run() {
//!         eprintln!("Error: {e:#}");
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! ## Writing Through the Console
//!
//! ```ignore
//! #[solution]
//! fn solution(n: u32, out: &mut Console) -> u64 {
//!     writeln!(out, "computing {n}").ok();
//!     // ...
//! }
//! ```
//!
//! ## Structured Parameters
//!
//! Tuples, fixed arrays and the std collections bind directly. Your own
//! types need `Deserialize` and `Default`, plus one registration:
//!
//! ```ignore
//! #[derive(Deserialize, Default)]
//! struct Point { x: i64, y: i64 }
//!
//! casebench::param!(Point);
//!
//! #[solution]
//! fn solution(from: Point, to: Point) -> i64 { ... }
//! ```
//!
//! ## Async Entry Points
//!
//! ```ignore
//! #[solution]
//! async fn solution(delay_ms: u64) -> u64 {
//!     tokio::time::sleep(Duration::from_millis(delay_ms)).await;
//!     delay_ms
//! }
//! ```

// Re-export core types
pub use casebench_core::{
    ArgumentVector, BindError, CallError, CaptureError, CaptureMode, Console, InvocationOutcome,
    Invokable, Invoker, Kind, NullProbe, Param, ProcProbe, ResolveError, ResourceProbe,
    ResourceSnapshot, SolutionDef, encode_return, param, registered_solutions, resolve_entry_point,
};

// Re-export macros
pub use casebench_macros::solution;

// Re-export report types
pub use casebench_report::{OutputFormat, Realtime, Report, ReportEntry, generate_json_report};

// Re-export the harness pieces for embedding
pub use casebench_cli::{CasebenchConfig, ExecutionConfig, Executor, TestCase, TestSuite};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use inventory;
    pub use serde_json;
    pub use tokio;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Console, solution};
    pub use std::io::Write;
}

/// Run the Casebench CLI harness.
///
/// Call this from your solution binary's `main()`:
/// ```ignore
/// fn main() {
///     if let Err(e) = casebench::run() {
///         eprintln!("Error: {e:#}");
///         std::process::exit(1);
///     }
/// }
/// ```
pub use casebench_cli::run;
