//! Resource Probing
//!
//! Point-in-time snapshots of process CPU time and peak resident memory,
//! read from Linux procfs with an all-zero fallback everywhere else.
//!
//! CPU figures are clock ticks exactly as `/proc/self/stat` reports them.
//! Peak memory is `VmHWM` from `/proc/self/status`, in kB.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default procfs directory for the running process
pub const DEFAULT_PROC_ROOT: &str = "/proc/self";

/// Process resource accounting at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceSnapshot {
    /// Accumulated user-mode CPU time, in clock ticks
    pub user_ticks: u64,
    /// Accumulated kernel-mode CPU time, in clock ticks
    pub system_ticks: u64,
    /// High-water-mark resident set size, in kB
    pub peak_memory_kb: u64,
}

impl ResourceSnapshot {
    /// User ticks spent between `self` and a later snapshot
    pub fn user_delta(&self, after: &ResourceSnapshot) -> u64 {
        after.user_ticks.saturating_sub(self.user_ticks)
    }

    /// Kernel ticks spent between `self` and a later snapshot
    pub fn system_delta(&self, after: &ResourceSnapshot) -> u64 {
        after.system_ticks.saturating_sub(self.system_ticks)
    }
}

/// Source of resource snapshots.
///
/// Implementations never fail and never block for long: unavailable
/// accounting reads as zero.
pub trait ResourceProbe {
    /// Take a snapshot
    fn snapshot(&self) -> ResourceSnapshot;
}

/// Probe that always reports zeros
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl ResourceProbe for NullProbe {
    fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot::default()
    }
}

/// Probe backed by procfs `stat` and `status` files
#[derive(Debug, Clone)]
pub struct ProcProbe {
    root: PathBuf,
}

impl ProcProbe {
    /// Probe the files under `root` (normally `/proc/self`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the probe reads from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cpu_ticks(&self) -> (u64, u64) {
        let path = self.root.join("stat");
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_stat(&content).unwrap_or_else(|| {
                tracing::debug!(path = %path.display(), "unrecognised stat layout");
                (0, 0)
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cpu accounting unavailable");
                (0, 0)
            }
        }
    }

    fn peak_memory_kb(&self) -> u64 {
        let path = self.root.join("status");
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_vm_hwm(&content).unwrap_or(0),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "memory accounting unavailable");
                0
            }
        }
    }
}

impl Default for ProcProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ResourceProbe for ProcProbe {
    fn snapshot(&self) -> ResourceSnapshot {
        let (user_ticks, system_ticks) = self.cpu_ticks();
        ResourceSnapshot {
            user_ticks,
            system_ticks,
            peak_memory_kb: self.peak_memory_kb(),
        }
    }
}

/// The probe suited to this platform
#[cfg(target_os = "linux")]
pub fn default_probe() -> Box<dyn ResourceProbe> {
    Box::new(ProcProbe::default())
}

/// The probe suited to this platform
#[cfg(not(target_os = "linux"))]
pub fn default_probe() -> Box<dyn ResourceProbe> {
    Box::new(NullProbe)
}

/// Parse `utime` and `stime` (fields 14 and 15) out of a `stat` line.
///
/// The command name (field 2) may contain spaces and parentheses, so fields
/// are counted from the last `)`.
pub fn parse_stat(content: &str) -> Option<(u64, u64)> {
    let rest = &content[content.rfind(')')? + 1..];
    // rest starts at field 3 (state)
    let mut fields = rest.split_whitespace().skip(11);
    let utime = fields.next()?.parse().ok()?;
    let stime = fields.next()?.parse().ok()?;
    Some((utime, stime))
}

/// Parse the `VmHWM:` line of a `status` file, in kB
pub fn parse_vm_hwm(content: &str) -> Option<u64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("VmHWM:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

/// Wall-clock timer for one invocation window
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since start
    #[inline]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }
}
