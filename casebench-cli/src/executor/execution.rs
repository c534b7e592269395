//! Testcase Execution
//!
//! Runs each testcase once through the invoker, strictly in declaration
//! order, wrapping every invocation in resource snapshots and an output
//! capture window.
//!
//! ## Per-testcase Phases
//!
//! ```text
//! Idle → MeasuringBefore → Capturing → Invoking → CapturingDone → MeasuringAfter → Reported
//! ```
//!
//! `Invoking` always moves on to `CapturingDone`, whether the entry point
//! returned or faulted. The wall-clock window covers `MeasuringBefore`
//! through `MeasuringAfter`.

use crate::loader::{TestCase, TestSuite};
use casebench_core::{
    CaptureError, CaptureMode, InvocationOutcome, Invoker, OutputCapture, ResourceProbe, Timer,
};
use casebench_report::{Realtime, Report, ReportEntry, Usage};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::Cell;

/// Configuration for testcase execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// How output is captured
    pub capture_mode: CaptureMode,
    /// Show a progress bar on stderr
    pub show_progress: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            capture_mode: CaptureMode::Descriptor,
            show_progress: false,
        }
    }
}

/// Lifecycle of one testcase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not started
    Idle,
    /// Taking the "before" snapshot
    MeasuringBefore,
    /// Capture window open
    Capturing,
    /// Entry point running
    Invoking,
    /// Capture window closed
    CapturingDone,
    /// Taking the "after" snapshot
    MeasuringAfter,
    /// Entry built
    Reported,
}

/// Execute testcases and produce the run report
pub struct Executor {
    config: ExecutionConfig,
    probe: Box<dyn ResourceProbe>,
    fallback_warned: Cell<bool>,
}

impl Executor {
    /// Executor reading resources from `probe`
    pub fn new(config: ExecutionConfig, probe: Box<dyn ResourceProbe>) -> Self {
        Self {
            config,
            probe,
            fallback_warned: Cell::new(false),
        }
    }

    /// Execute every testcase in order
    pub fn execute(&self, invoker: &Invoker<'_>, suite: &TestSuite) -> Result<Report, CaptureError> {
        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(suite.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        tracing::info!(
            entry = invoker.name(),
            arity = invoker.signature().len(),
            testcases = suite.len(),
            "run started"
        );

        let mut report = Report::with_capacity(suite.len());
        for case in suite {
            pb.set_message(case.key.clone());
            let entry = self.execute_single(invoker, case)?;
            report.push(case.key.clone(), entry);
            pb.inc(1);
        }

        pb.finish_with_message("Complete");

        let summary = report.summary();
        tracing::info!(
            total = summary.total,
            faulted = summary.faulted,
            "run finished"
        );
        Ok(report)
    }

    /// Execute a single testcase
    pub fn execute_single(
        &self,
        invoker: &Invoker<'_>,
        case: &TestCase,
    ) -> Result<ReportEntry, CaptureError> {
        let key = case.key.as_str();
        advance(key, Phase::Idle);
        let inputs = case.values();

        advance(key, Phase::MeasuringBefore);
        let timer = Timer::start();
        let before = self.probe.snapshot();

        advance(key, Phase::Capturing);
        let mut capture = self.open_capture()?;

        advance(key, Phase::Invoking);
        let outcome = invoker.invoke(inputs, capture.console());

        advance(key, Phase::CapturingDone);
        let stdout = capture.finish()?;

        advance(key, Phase::MeasuringAfter);
        let after = self.probe.snapshot();
        let elapsed = timer.stop();

        let usage = Usage {
            utime: before.user_delta(&after),
            stime: before.system_delta(&after),
            realtime: Realtime::from_duration(elapsed),
            max_memory: after.peak_memory_kb,
        };

        if let InvocationOutcome::Fault(_) = &outcome {
            tracing::debug!(testcase = key, "invocation faulted");
        }
        let outcome = match outcome {
            InvocationOutcome::Success(value) => Ok(value),
            InvocationOutcome::Fault(trace) => Err(trace),
        };

        let entry = ReportEntry::new(outcome, &stdout, usage);
        advance(key, Phase::Reported);
        Ok(entry)
    }

    fn open_capture(&self) -> Result<OutputCapture, CaptureError> {
        match OutputCapture::start(self.config.capture_mode) {
            Ok(capture) => Ok(capture),
            Err(e) => {
                if !self.fallback_warned.replace(true) {
                    tracing::warn!(
                        error = %e,
                        "stdout redirect unavailable, capturing console output only"
                    );
                }
                OutputCapture::start(CaptureMode::Sink)
            }
        }
    }
}

fn advance(key: &str, phase: Phase) {
    tracing::trace!(testcase = key, ?phase, "phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebench_core::{
        ArgumentVector, CallError, Console, Invokable, Kind, NullProbe, ResourceSnapshot,
        encode_return,
    };
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::io::Write;

    struct Divide;

    impl Invokable for Divide {
        fn name(&self) -> &str {
            "divide"
        }

        fn parameter_kinds(&self) -> Vec<Kind> {
            vec![Kind::Int, Kind::Int]
        }

        fn call(&self, args: &mut ArgumentVector, console: &mut Console) -> Result<Value, CallError> {
            let a: i64 = args.take(0)?;
            let b: i64 = args.take(1)?;
            writeln!(console, "  dividing {a} by {b}  ").ok();
            encode_return(&(a / b))
        }
    }

    /// Replays a fixed sequence of snapshots
    struct ScriptedProbe {
        snapshots: RefCell<Vec<ResourceSnapshot>>,
    }

    impl ResourceProbe for ScriptedProbe {
        fn snapshot(&self) -> ResourceSnapshot {
            let mut snapshots = self.snapshots.borrow_mut();
            if snapshots.is_empty() {
                ResourceSnapshot::default()
            } else {
                snapshots.remove(0)
            }
        }
    }

    fn sink_config() -> ExecutionConfig {
        ExecutionConfig {
            capture_mode: CaptureMode::Sink,
            show_progress: false,
        }
    }

    #[test]
    fn test_execute_preserves_order_and_classifies() {
        let suite = TestSuite::from_json_str(
            r#"{
                "z_ok": {"input": [10, 2]},
                "a_fault": {"input": [1, 0]},
                "m_named": {"input": {"x": 9, "y": 3}}
            }"#,
        )
        .unwrap();

        let target = Divide;
        let invoker = Invoker::new(&target).with_backtrace(false);
        let executor = Executor::new(sink_config(), Box::new(NullProbe));
        let report = executor.execute(&invoker, &suite).unwrap();

        let keys: Vec<&str> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z_ok", "a_fault", "m_named"]);

        let ok = report.get("z_ok").unwrap();
        assert_eq!(ok.result, json!(5));
        assert_eq!(ok.stderr, None);
        assert_eq!(ok.stdout, "dividing 10 by 2");

        let fault = report.get("a_fault").unwrap();
        assert_eq!(fault.result, Value::Null);
        assert!(fault.stderr.as_deref().unwrap().contains("divide by zero"));
        assert_eq!(fault.stdout, "dividing 1 by 0");

        assert_eq!(report.get("m_named").unwrap().result, json!(3));
    }

    #[test]
    fn test_null_probe_reports_zeros() {
        let suite = TestSuite::from_json_str(r#"{"t": {"input": [4, 2]}}"#).unwrap();
        let target = Divide;
        let invoker = Invoker::new(&target);
        let executor = Executor::new(sink_config(), Box::new(NullProbe));
        let entry = executor.execute_single(&invoker, suite.iter().next().unwrap()).unwrap();

        assert_eq!(entry.utime, 0);
        assert_eq!(entry.stime, 0);
        assert_eq!(entry.max_memory, 0);
        assert!(entry.realtime.seconds() >= 0.0);
    }

    #[test]
    fn test_cpu_deltas_and_raw_peak_memory() {
        let probe = ScriptedProbe {
            snapshots: RefCell::new(vec![
                ResourceSnapshot {
                    user_ticks: 10,
                    system_ticks: 4,
                    peak_memory_kb: 100,
                },
                ResourceSnapshot {
                    user_ticks: 13,
                    system_ticks: 5,
                    peak_memory_kb: 250,
                },
            ]),
        };
        let suite = TestSuite::from_json_str(r#"{"t": {"input": [4, 2]}}"#).unwrap();
        let target = Divide;
        let invoker = Invoker::new(&target);
        let executor = Executor::new(sink_config(), Box::new(probe));
        let entry = executor.execute_single(&invoker, suite.iter().next().unwrap()).unwrap();

        assert_eq!(entry.utime, 3);
        assert_eq!(entry.stime, 1);
        assert_eq!(entry.max_memory, 250);
    }

    #[test]
    fn test_missing_arguments_take_zero_value() {
        // One value for two parameters: b defaults to 0, so the division faults
        let suite = TestSuite::from_json_str(r#"{"short": {"input": [7]}}"#).unwrap();
        let target = Divide;
        let invoker = Invoker::new(&target).with_backtrace(false);
        let executor = Executor::new(sink_config(), Box::new(NullProbe));
        let entry = executor.execute_single(&invoker, suite.iter().next().unwrap()).unwrap();

        assert_eq!(entry.stdout, "dividing 7 by 0");
        assert!(entry.is_fault());
    }
}
