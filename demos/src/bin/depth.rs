//! Deep recursion
//!
//! Returns the depth it reached. A stack overflow is not a panic: the
//! process aborts and no report is written, so the grading pipeline falls
//! back to its placeholder document.

use casebench::prelude::*;
use std::hint::black_box;

fn descend(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    // Live across the call, so every level keeps a real stack frame
    let frame = [n; 16];
    let below = descend(n - 1);
    1 + below + black_box(&frame)[15] - n
}

#[solution]
fn solution(n: u64) -> u64 {
    descend(n)
}

fn main() {
    if let Err(e) = casebench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
