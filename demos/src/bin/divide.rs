//! Fault capture
//!
//! Prints before dividing, so a zero divisor yields a report entry with a
//! null result, the panic trace in `stderr`, and the earlier line in
//! `stdout`. Later testcases still run.

use casebench::prelude::*;

#[solution]
fn solution(divisor: i64) -> i64 {
    println!("computing 10 / {divisor}");
    10 / divisor
}

fn main() {
    if let Err(e) = casebench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
