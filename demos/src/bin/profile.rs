//! Three parameters and the injected console
//!
//! Testcases that supply fewer than three values still run: missing
//! parameters take their zero value (`0`, `""`, `[]`).

use casebench::prelude::*;
use serde_json::{Value, json};

#[solution]
fn solution(age: u32, name: String, tags: Vec<String>, out: &mut Console) -> Value {
    writeln!(out, "profiling {:?} with {} tags", name, tags.len()).ok();
    json!({
        "age": age,
        "name": name,
        "tags": tags,
        "adult": age >= 18,
    })
}

fn main() {
    if let Err(e) = casebench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
