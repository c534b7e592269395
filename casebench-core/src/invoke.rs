//! Dynamic Invocation
//!
//! Binds untyped JSON input to an entry point whose parameter signature is
//! only known through [`Invokable`], runs it once, and classifies the
//! outcome as a return value or a fault trace.

use crate::SolutionDef;
use crate::args::{ArgumentVector, CallError};
use crate::capture::Console;
use crate::fault::{FaultTrap, payload_message};
use crate::kind::Kind;
use serde_json::Value;
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error;

/// A callable entry point with an introspectable parameter signature
pub trait Invokable {
    /// Registered entry-point name
    fn name(&self) -> &str;

    /// Declared parameter kinds, in order (the injected console excluded)
    fn parameter_kinds(&self) -> Vec<Kind>;

    /// Call once with bound arguments, writing output through `console`
    fn call(&self, args: &mut ArgumentVector, console: &mut Console) -> Result<Value, CallError>;
}

/// Result of one invocation; exactly one variant holds
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// The entry point returned normally
    Success(Value),
    /// Binding failed or the entry point panicked; the text is the trace
    Fault(String),
}

impl InvocationOutcome {
    /// Whether this is a fault
    pub fn is_fault(&self) -> bool {
        matches!(self, InvocationOutcome::Fault(_))
    }
}

/// Invokes one entry point against many inputs.
///
/// The parameter signature is read once, at construction.
pub struct Invoker<'a> {
    target: &'a dyn Invokable,
    kinds: Vec<Kind>,
    force_backtrace: bool,
}

impl<'a> Invoker<'a> {
    /// Prepare an invoker for `target`
    pub fn new(target: &'a dyn Invokable) -> Self {
        let kinds = target.parameter_kinds();
        tracing::debug!(entry = target.name(), arity = kinds.len(), "invoker ready");
        Self {
            target,
            kinds,
            force_backtrace: true,
        }
    }

    /// Whether fault traces include a force-captured stack backtrace
    pub fn with_backtrace(mut self, force: bool) -> Self {
        self.force_backtrace = force;
        self
    }

    /// Entry-point name
    pub fn name(&self) -> &str {
        self.target.name()
    }

    /// The cached parameter signature
    pub fn signature(&self) -> &[Kind] {
        &self.kinds
    }

    /// Call the entry point once with up to `signature().len()` of `inputs`
    pub fn invoke(
        &self,
        inputs: impl IntoIterator<Item = Value>,
        console: &mut Console,
    ) -> InvocationOutcome {
        let mut args = ArgumentVector::bind_coerced(&self.kinds, inputs);

        let trap = FaultTrap::arm(self.force_backtrace);
        let result = catch_unwind(AssertUnwindSafe(|| self.target.call(&mut args, console)));

        match result {
            Ok(Ok(value)) => InvocationOutcome::Success(value),
            Ok(Err(CallError::Encode(e))) => InvocationOutcome::Fault(format!(
                "failed to encode return value of '{}': {}",
                self.name(),
                e
            )),
            Ok(Err(CallError::Runtime(e))) => InvocationOutcome::Fault(format!(
                "failed to start async runtime for '{}': {}",
                self.name(),
                e
            )),
            Ok(Err(e)) => InvocationOutcome::Fault(format!(
                "failed to bind arguments for '{}': {}",
                self.name(),
                e
            )),
            Err(payload) => {
                let trace = trap
                    .take_trace()
                    .unwrap_or_else(|| payload_message(payload.as_ref()));
                InvocationOutcome::Fault(trace)
            }
        }
    }
}

/// Entry-point resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Nothing is registered under the name
    #[error("no matching entry point: no solution named '{name}' is registered")]
    NotFound {
        /// Requested name
        name: String,
    },

    /// More than one registration shares the name
    #[error("ambiguous entry point '{name}': registered at {}", locations.join(", "))]
    Ambiguous {
        /// Requested name
        name: String,
        /// `file:line` of every candidate
        locations: Vec<String>,
    },
}

/// Find the single registered solution called `name`
pub fn resolve_entry_point(name: &str) -> Result<&'static SolutionDef, ResolveError> {
    resolve_among(name, crate::registered_solutions())
}

/// Find the single solution called `name` among `candidates`
pub fn resolve_among<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a SolutionDef>,
) -> Result<&'a SolutionDef, ResolveError> {
    let matches: Vec<&SolutionDef> = candidates.into_iter().filter(|s| s.name == name).collect();

    match matches.as_slice() {
        [] => Err(ResolveError::NotFound {
            name: name.to_string(),
        }),
        [single] => {
            tracing::debug!(entry = name, file = single.file, line = single.line, "entry point resolved");
            Ok(single)
        }
        many => Err(ResolveError::Ambiguous {
            name: name.to_string(),
            locations: many
                .iter()
                .map(|s| format!("{}:{}", s.file, s.line))
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::encode_return;
    use serde_json::json;
    use std::io::Write;

    struct Sum;

    impl Invokable for Sum {
        fn name(&self) -> &str {
            "sum"
        }

        fn parameter_kinds(&self) -> Vec<Kind> {
            vec![Kind::Int, Kind::Int]
        }

        fn call(&self, args: &mut ArgumentVector, console: &mut Console) -> Result<Value, CallError> {
            let a: i64 = args.take(0)?;
            let b: i64 = args.take(1)?;
            writeln!(console, "adding {a} and {b}").ok();
            encode_return(&(a + b))
        }
    }

    struct Divide;

    impl Invokable for Divide {
        fn name(&self) -> &str {
            "divide"
        }

        fn parameter_kinds(&self) -> Vec<Kind> {
            vec![Kind::Int]
        }

        fn call(&self, args: &mut ArgumentVector, _console: &mut Console) -> Result<Value, CallError> {
            let d: i32 = args.take(0)?;
            encode_return(&(10 / d))
        }
    }

    struct NanReturn;

    impl Invokable for NanReturn {
        fn name(&self) -> &str {
            "nan"
        }

        fn parameter_kinds(&self) -> Vec<Kind> {
            Vec::new()
        }

        fn call(&self, _args: &mut ArgumentVector, _console: &mut Console) -> Result<Value, CallError> {
            let mut map = std::collections::HashMap::new();
            map.insert(vec![1u8], 1u8);
            encode_return(&map)
        }
    }

    #[test]
    fn test_success_and_console() {
        let invoker = Invoker::new(&Sum);
        assert_eq!(invoker.signature(), [Kind::Int, Kind::Int]);
        let mut console = Console::buffered();
        let outcome = invoker.invoke(vec![json!(2), json!(3)], &mut console);
        assert_eq!(outcome, InvocationOutcome::Success(json!(5)));
    }

    #[test]
    fn test_surplus_and_missing_inputs() {
        let invoker = Invoker::new(&Sum);
        let mut console = Console::buffered();
        assert_eq!(
            invoker.invoke(vec![json!(1), json!(2), json!(99)], &mut console),
            InvocationOutcome::Success(json!(3))
        );
        assert_eq!(
            invoker.invoke(vec![json!(4)], &mut console),
            InvocationOutcome::Success(json!(4))
        );
    }

    #[test]
    fn test_panic_becomes_fault_trace() {
        let invoker = Invoker::new(&Divide).with_backtrace(false);
        let mut console = Console::buffered();
        match invoker.invoke(vec![json!(0)], &mut console) {
            InvocationOutcome::Fault(trace) => {
                assert!(trace.contains("panicked at"), "{trace}");
                assert!(trace.contains("divide by zero"), "{trace}");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_bind_failure_is_fault() {
        let invoker = Invoker::new(&Divide);
        let mut console = Console::buffered();
        match invoker.invoke(vec![json!([1, 2])], &mut console) {
            InvocationOutcome::Fault(text) => {
                assert!(text.starts_with("failed to bind arguments for 'divide'"), "{text}");
                assert!(text.contains("expected int"), "{text}");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_unencodable_return_is_fault() {
        let invoker = Invoker::new(&NanReturn);
        let mut console = Console::buffered();
        let outcome = invoker.invoke(Vec::new(), &mut console);
        match outcome {
            InvocationOutcome::Fault(text) => {
                assert!(text.starts_with("failed to encode return value of 'nan'"), "{text}");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    struct NoRuntime;

    impl Invokable for NoRuntime {
        fn name(&self) -> &str {
            "ticker"
        }

        fn parameter_kinds(&self) -> Vec<Kind> {
            Vec::new()
        }

        fn call(&self, _args: &mut ArgumentVector, _console: &mut Console) -> Result<Value, CallError> {
            Err(CallError::Runtime(std::io::Error::other("reactor unavailable")))
        }
    }

    #[test]
    fn test_runtime_failure_is_not_a_bind_fault() {
        let invoker = Invoker::new(&NoRuntime);
        let mut console = Console::buffered();
        match invoker.invoke(Vec::new(), &mut console) {
            InvocationOutcome::Fault(text) => {
                assert!(
                    text.starts_with("failed to start async runtime for 'ticker'"),
                    "{text}"
                );
                assert!(text.contains("reactor unavailable"), "{text}");
                assert!(!text.contains("bind"), "{text}");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    fn def(name: &'static str, line: u32) -> SolutionDef {
        fn call(_: &mut ArgumentVector, _: &mut Console) -> Result<Value, CallError> {
            Ok(Value::Null)
        }
        fn kinds() -> Vec<Kind> {
            Vec::new()
        }
        SolutionDef {
            name,
            call,
            kinds,
            file: "src/main.rs",
            line,
            module_path: "demo",
        }
    }

    #[test]
    fn test_resolve_among() {
        let defs = vec![def("solution", 3), def("helper", 9)];
        assert_eq!(resolve_among("solution", &defs).unwrap().line, 3);

        assert!(matches!(
            resolve_among("missing", &defs),
            Err(ResolveError::NotFound { .. })
        ));

        let dup = vec![def("solution", 3), def("solution", 12)];
        let err = resolve_among("solution", &dup).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ambiguous entry point 'solution': registered at src/main.rs:3, src/main.rs:12"
        );
    }
}
