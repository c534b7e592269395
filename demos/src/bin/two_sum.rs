//! Sequence parameters
//!
//! Input may be positional (`[[2, 7, 11, 15], 9]`) or named
//! (`{"nums": [2, 7, 11, 15], "target": 9}`); named members bind in the
//! order they appear.

use casebench::prelude::*;
use std::collections::HashMap;

#[solution]
fn solution(nums: Vec<i64>, target: i64) -> Vec<usize> {
    let mut seen: HashMap<i64, usize> = HashMap::new();
    for (i, n) in nums.iter().enumerate() {
        if let Some(&j) = seen.get(&(target - n)) {
            return vec![j, i];
        }
        seen.insert(*n, i);
    }
    Vec::new()
}

fn main() {
    if let Err(e) = casebench::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
