//! Testcase Executor
//!
//! Runs testcases and assembles the report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! TestSuite (loaded from the testcase file)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Snapshot → capture → invoke → capture done → snapshot
//! └──────┬──────┘
//!        │
//!        ▼
//!    Report (casebench-report)
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output (JSON is rendered by casebench-report)
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Per-testcase execution and report assembly
//! - [`formatting`] - Human-readable output formatting

mod execution;
mod formatting;

// Re-export public API
pub use execution::{ExecutionConfig, Executor, Phase};
pub use formatting::format_human_output;
