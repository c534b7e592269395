//! Output Capture
//!
//! Everything an entry point prints during one invocation is collected and
//! handed back as text.
//!
//! Two modes:
//! - **Sink**: the entry point writes through an injected [`Console`], which
//!   buffers in memory. Nothing process-wide is touched.
//! - **Descriptor** (Unix): file descriptor 1 is swapped for an anonymous
//!   temp file for the duration of the call, so `print!`/`println!` are
//!   captured as well. The [`Console`] writes straight to the redirected
//!   stdout to keep ordering intact. fd 1 is restored on every exit path,
//!   including unwinding and early drop.
//!
//! Descriptor capture owns process-wide state and cannot nest; a second
//! concurrent start fails with [`CaptureError::AlreadyActive`].
//!
//! [`StdoutDivert`] points fd 1 at stderr for a whole run, so output that no
//! capture window collects never lands in front of the report.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use thiserror::Error;

/// How output is captured during an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    /// Redirect the stdout file descriptor (falls back to `Sink` when unavailable)
    #[default]
    Descriptor,
    /// Only capture what is written through the injected [`Console`]
    Sink,
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "descriptor" | "fd" => Ok(CaptureMode::Descriptor),
            "sink" => Ok(CaptureMode::Sink),
            other => Err(format!("Unknown capture mode: {}", other)),
        }
    }
}

/// Output capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Another descriptor capture owns fd 1
    #[error("stdout capture is already active in this process")]
    AlreadyActive,

    /// No descriptor redirection on this platform
    #[error("descriptor capture is not supported on this platform")]
    Unsupported,

    /// `dup`/`dup2` or the temp file failed
    #[error("failed to redirect stdout: {0}")]
    Redirect(#[source] io::Error),

    /// fd 1 could not be put back
    #[error("failed to restore stdout: {0}")]
    Restore(#[source] io::Error),

    /// The capture file could not be read back
    #[error("failed to read captured output: {0}")]
    Read(#[source] io::Error),
}

/// Writable sink handed to an entry point
#[derive(Debug)]
pub struct Console {
    target: Target,
}

#[derive(Debug)]
enum Target {
    Buffer(Vec<u8>),
    Stdout,
}

impl Console {
    /// A console that buffers everything in memory
    pub fn buffered() -> Self {
        Self {
            target: Target::Buffer(Vec::new()),
        }
    }

    fn passthrough() -> Self {
        Self {
            target: Target::Stdout,
        }
    }

    fn take_buffer(&mut self) -> Vec<u8> {
        match &mut self.target {
            Target::Buffer(buf) => std::mem::take(buf),
            Target::Stdout => Vec::new(),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::buffered()
    }
}

impl Write for Console {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match &mut self.target {
            Target::Buffer(buf) => buf.write(bytes),
            Target::Stdout => io::stdout().write(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.target {
            Target::Buffer(_) => Ok(()),
            Target::Stdout => io::stdout().flush(),
        }
    }
}

/// One active capture window
pub struct OutputCapture {
    console: Console,
    redirect: Option<StdoutRedirect>,
}

impl OutputCapture {
    /// Open a capture window in the given mode
    pub fn start(mode: CaptureMode) -> Result<Self, CaptureError> {
        match mode {
            CaptureMode::Sink => Ok(Self {
                console: Console::buffered(),
                redirect: None,
            }),
            CaptureMode::Descriptor => {
                let redirect = StdoutRedirect::begin()?;
                Ok(Self {
                    console: Console::passthrough(),
                    redirect: Some(redirect),
                })
            }
        }
    }

    /// Mode this window is running in
    pub fn mode(&self) -> CaptureMode {
        if self.redirect.is_some() {
            CaptureMode::Descriptor
        } else {
            CaptureMode::Sink
        }
    }

    /// The sink to inject into the invocation
    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Close the window, restore stdout, and return the captured text
    pub fn finish(mut self) -> Result<String, CaptureError> {
        let _ = self.console.flush();
        let bytes = match self.redirect.take() {
            Some(redirect) => redirect.end()?,
            None => self.console.take_buffer(),
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(unix)]
use unix::StdoutRedirect;
#[cfg(unix)]
pub use unix::StdoutDivert;

#[cfg(unix)]
mod unix {
    use super::CaptureError;
    use std::fs::File;
    use std::io::{self, Read, Seek, SeekFrom, Write};
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::sync::atomic::{AtomicBool, Ordering};

    static REDIRECT_ACTIVE: AtomicBool = AtomicBool::new(false);

    /// fd 1 pointed at a temp file until restored
    pub(super) struct StdoutRedirect {
        saved_fd: RawFd,
        file: File,
        restored: bool,
    }

    impl StdoutRedirect {
        pub(super) fn begin() -> Result<Self, CaptureError> {
            if REDIRECT_ACTIVE
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(CaptureError::AlreadyActive);
            }

            Self::swap().map_err(|e| {
                REDIRECT_ACTIVE.store(false, Ordering::SeqCst);
                CaptureError::Redirect(e)
            })
        }

        fn swap() -> io::Result<Self> {
            // Anything already buffered belongs to the host, not the capture
            io::stdout().flush()?;
            let file = tempfile::tempfile()?;

            let saved_fd = unsafe { libc::dup(libc::STDOUT_FILENO) };
            if saved_fd < 0 {
                return Err(io::Error::last_os_error());
            }
            if unsafe { libc::dup2(file.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
                let err = io::Error::last_os_error();
                unsafe { libc::close(saved_fd) };
                return Err(err);
            }

            Ok(Self {
                saved_fd,
                file,
                restored: false,
            })
        }

        fn restore(&mut self) -> io::Result<()> {
            if self.restored {
                return Ok(());
            }
            self.restored = true;
            let _ = io::stdout().flush();

            let rc = unsafe { libc::dup2(self.saved_fd, libc::STDOUT_FILENO) };
            let err = (rc < 0).then(io::Error::last_os_error);
            unsafe { libc::close(self.saved_fd) };
            REDIRECT_ACTIVE.store(false, Ordering::SeqCst);

            match err {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        pub(super) fn end(mut self) -> Result<Vec<u8>, CaptureError> {
            self.restore().map_err(CaptureError::Restore)?;

            let mut bytes = Vec::new();
            self.file
                .seek(SeekFrom::Start(0))
                .map_err(CaptureError::Read)?;
            self.file
                .read_to_end(&mut bytes)
                .map_err(CaptureError::Read)?;
            Ok(bytes)
        }
    }

    impl Drop for StdoutRedirect {
        fn drop(&mut self) {
            let _ = self.restore();
        }
    }

    /// fd 1 pointed at stderr until dropped
    pub struct StdoutDivert {
        saved_fd: RawFd,
    }

    impl StdoutDivert {
        /// Send everything written to stdout to stderr instead
        pub fn to_stderr() -> Result<Self, CaptureError> {
            io::stdout().flush().map_err(CaptureError::Redirect)?;

            let saved_fd = unsafe { libc::dup(libc::STDOUT_FILENO) };
            if saved_fd < 0 {
                return Err(CaptureError::Redirect(io::Error::last_os_error()));
            }
            if unsafe { libc::dup2(libc::STDERR_FILENO, libc::STDOUT_FILENO) } < 0 {
                let err = io::Error::last_os_error();
                unsafe { libc::close(saved_fd) };
                return Err(CaptureError::Redirect(err));
            }
            Ok(Self { saved_fd })
        }
    }

    impl Drop for StdoutDivert {
        fn drop(&mut self) {
            let _ = io::stdout().flush();
            unsafe {
                libc::dup2(self.saved_fd, libc::STDOUT_FILENO);
                libc::close(self.saved_fd);
            }
        }
    }
}

#[cfg(not(unix))]
struct StdoutRedirect;

/// fd 1 pointed at stderr until dropped
#[cfg(not(unix))]
pub struct StdoutDivert {
    _private: (),
}

#[cfg(not(unix))]
impl StdoutDivert {
    /// Send everything written to stdout to stderr instead
    pub fn to_stderr() -> Result<Self, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

#[cfg(not(unix))]
impl StdoutRedirect {
    fn begin() -> Result<Self, CaptureError> {
        Err(CaptureError::Unsupported)
    }

    fn end(self) -> Result<Vec<u8>, CaptureError> {
        Ok(Vec::new())
    }
}
