//! Configuration loading from casebench.toml
//!
//! Casebench configuration can be specified in a `casebench.toml` file next to the
//! solution or anywhere above it. The configuration is discovered by walking up from
//! the current directory; `--config` names a file explicitly.

use anyhow::Context;
use casebench_core::{CaptureMode, DEFAULT_PROC_ROOT};
use casebench_report::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up during discovery
pub const CONFIG_FILE_NAME: &str = "casebench.toml";

/// Casebench configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CasebenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output capture configuration
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Resource probe configuration
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Fault trace configuration
    #[serde(default)]
    pub fault: FaultConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Name the entry point is registered under
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
        }
    }
}

fn default_entry_point() -> String {
    "solution".to_string()
}

/// Output capture configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureConfig {
    /// "descriptor" (fd-level redirect) or "sink" (injected console only)
    #[serde(default)]
    pub mode: CaptureMode,
}

/// Resource probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Read process accounting; when off every figure is zero
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// procfs directory for the current process
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proc_root: default_proc_root(),
        }
    }
}

fn default_proc_root() -> PathBuf {
    PathBuf::from(DEFAULT_PROC_ROOT)
}

/// Fault trace configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FaultConfig {
    /// Append a force-captured stack backtrace to fault traces
    #[serde(default = "default_true")]
    pub backtrace: bool,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self { backtrace: true }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Report format: "json" or "human"
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_true() -> bool {
    true
}

impl CasebenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Find `casebench.toml` by walking up from the current directory
    pub fn discover_path() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Load the discovered configuration, or defaults when there is none
    pub fn discover() -> anyhow::Result<Self> {
        match Self::discover_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Casebench Configuration

[runner]
# Name the entry point is registered under
entry_point = "solution"

[capture]
# "descriptor" also captures print!/println!, "sink" only the injected Console
mode = "descriptor"

[probe]
# Report CPU ticks and peak memory from procfs (zeros when disabled)
enabled = true
proc_root = "/proc/self"

[fault]
# Include a stack backtrace in fault traces
backtrace = true

[output]
# Report format: json or human
format = "json"
"#
        .to_string()
    }
}
