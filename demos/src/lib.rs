//! Casebench Demos
//!
//! Runnable solution binaries built on `casebench`. This crate is not
//! published; it hosts harness binaries and the end-to-end tests that
//! spawn them.
//!
//! Run any demo with:
//! ```sh
//! cargo run --bin <name> -p casebench-demos -- <solution_id> <testcase_path>
//! ```
//!
//! | Binary | Shows |
//! |--------|-------|
//! | `sum` | Scalar parameters and return value |
//! | `divide` | A panic recorded as a fault after earlier `println!` output |
//! | `two_sum` | Sequence parameters, object-shaped input |
//! | `profile` | Three parameters, zero-filled missing arguments, the injected `Console` |
//! | `countdown` | An `async` entry point |
//! | `depth` | Deep recursion; a stack overflow aborts the run with no report |
