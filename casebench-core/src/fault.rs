//! Fault Capture
//!
//! Turns a panic inside an entry point into the text Rust itself prints for
//! an unhandled panic: thread name, location, message and stack backtrace.
//!
//! A single process-wide panic hook is installed on first use and chained to
//! whatever hook was there before. It only records while a [`FaultTrap`] is
//! armed on the panicking thread; every other panic goes to the previous hook
//! unchanged.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

thread_local! {
    static ARMED: Cell<bool> = const { Cell::new(false) };
    static FORCE_BACKTRACE: Cell<bool> = const { Cell::new(true) };
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK_INSTALLED: Once = Once::new();

fn install_hook() {
    HOOK_INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if ARMED.with(Cell::get) {
                let trace = render_trace(info, FORCE_BACKTRACE.with(Cell::get));
                LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            } else {
                previous(info);
            }
        }));
    });
}

fn render_trace(info: &PanicHookInfo<'_>, force_backtrace: bool) -> String {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let message = payload_message(info.payload());

    let mut trace = match info.location() {
        Some(location) => format!("thread '{name}' panicked at {location}:\n{message}\n"),
        None => format!("thread '{name}' panicked:\n{message}\n"),
    };

    if force_backtrace {
        trace.push_str("stack backtrace:\n");
        trace.push_str(&Backtrace::force_capture().to_string());
    } else {
        trace.push_str(
            "note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace\n",
        );
    }
    trace
}

/// Extract the message carried by a panic payload
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Scoped recorder for panics on the current thread.
///
/// Disarms on drop, so a trap never outlives the invocation it guards.
pub struct FaultTrap {
    // Armed state is thread-local; the trap must stay on its thread
    _not_send: PhantomData<*const ()>,
}

impl FaultTrap {
    /// Arm the trap for the current thread
    pub fn arm(force_backtrace: bool) -> Self {
        install_hook();
        LAST_TRACE.with(|slot| slot.borrow_mut().take());
        FORCE_BACKTRACE.with(|flag| flag.set(force_backtrace));
        ARMED.with(|flag| flag.set(true));
        Self {
            _not_send: PhantomData,
        }
    }

    /// Take the trace recorded since the trap was armed, if any
    pub fn take_trace(&self) -> Option<String> {
        LAST_TRACE.with(|slot| slot.borrow_mut().take())
    }
}

impl Drop for FaultTrap {
    fn drop(&mut self) {
        ARMED.with(|flag| flag.set(false));
    }
}
