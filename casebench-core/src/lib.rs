#![warn(missing_docs)]
//! Casebench Core - Invocation Runtime
//!
//! This crate provides the execution environment for one entry point:
//! - `Kind`/`Param` parameter signatures and JSON argument binding
//! - `Invoker` with panic isolation and fault traces
//! - Scoped stdout capture (`OutputCapture`)
//! - procfs resource snapshots (`ResourceProbe`)

mod args;
mod capture;
mod fault;
mod invoke;
mod kind;
mod probe;

pub use args::{ArgumentVector, BindError, CallError, encode_return};
pub use capture::{CaptureError, CaptureMode, Console, OutputCapture, StdoutDivert};
pub use fault::{FaultTrap, payload_message};
pub use invoke::{
    InvocationOutcome, Invokable, Invoker, ResolveError, resolve_among, resolve_entry_point,
};
pub use kind::{Kind, Param, coerce};
pub use probe::{
    DEFAULT_PROC_ROOT, NullProbe, ProcProbe, ResourceProbe, ResourceSnapshot, Timer,
    default_probe, parse_stat, parse_vm_hwm,
};

/// Entry point registered via `#[casebench::solution]`
#[derive(Debug, Clone)]
pub struct SolutionDef {
    /// Registered name (the function name unless overridden)
    pub name: &'static str,
    /// Generated call shim
    pub call: fn(&mut ArgumentVector, &mut Console) -> Result<serde_json::Value, CallError>,
    /// Generated parameter signature
    pub kinds: fn() -> Vec<Kind>,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
    /// Module path
    pub module_path: &'static str,
}

impl SolutionDef {
    /// `name(kind, kind, ...)`
    pub fn signature_string(&self) -> String {
        let kinds: Vec<String> = (self.kinds)().iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, kinds.join(", "))
    }
}

impl Invokable for SolutionDef {
    fn name(&self) -> &str {
        self.name
    }

    fn parameter_kinds(&self) -> Vec<Kind> {
        (self.kinds)()
    }

    fn call(
        &self,
        args: &mut ArgumentVector,
        console: &mut Console,
    ) -> Result<serde_json::Value, CallError> {
        (self.call)(args, console)
    }
}

// Collect all registered solutions
inventory::collect!(SolutionDef);

/// All registered solutions, in link order
pub fn registered_solutions() -> impl Iterator<Item = &'static SolutionDef> {
    inventory::iter::<SolutionDef>.into_iter()
}

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || for _ in inventory::iter::<SolutionDef> {};
