//! Async entry point
//!
//! The future is driven on a current-thread tokio runtime built for each
//! invocation.

use casebench::prelude::*;
use std::time::Duration;

#[solution]
async fn solution(from: u32, step_ms: u64) -> Vec<u32> {
    let mut ticks = Vec::new();
    for n in (0..=from).rev() {
        tokio::time::sleep(Duration::from_millis(step_ms)).await;
        println!("tick {n}");
        ticks.push(n);
    }
    ticks
}

fn main() {
    if let Err(e) = casebench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
