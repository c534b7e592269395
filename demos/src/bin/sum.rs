//! Scalar parameters and return value
//!
//! Run with:
//!   cargo run --bin sum -p casebench-demos -- sum.rs cases.json
//!
//! For `{"t1": {"input": [2, 3]}}` the report holds `"result": 5`.

use casebench::prelude::*;

#[solution]
fn solution(a: i64, b: i64) -> i64 {
    a + b
}

fn main() {
    if let Err(e) = casebench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
