//! Integration tests for Casebench
//!
//! These tests register entry points in-process and drive them through the
//! same resolution, invocation and report pipeline the CLI uses.

use casebench::prelude::*;
use casebench::{
    CaptureMode, ExecutionConfig, Executor, Invoker, Kind, NullProbe, ResolveError, TestSuite,
    generate_json_report, resolve_entry_point,
};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};

#[derive(serde::Deserialize, Default)]
struct Point {
    x: i64,
    y: i64,
}

casebench::param!(Point);

#[solution(name = "it_two_sum")]
fn two_sum(nums: Vec<i64>, target: i64) -> Vec<usize> {
    for i in 0..nums.len() {
        for j in i + 1..nums.len() {
            if nums[i] + nums[j] == target {
                return vec![i, j];
            }
        }
    }
    Vec::new()
}

#[solution(name = "it_add")]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

#[solution(name = "it_divide")]
fn divide(d: i32, out: &mut Console) -> i32 {
    writeln!(out, "about to divide by {d}").ok();
    10 / d
}

#[solution(name = "it_three")]
fn three(count: u32, label: String, values: Vec<f64>) -> Value {
    json!({ "count": count, "label": label, "values": values })
}

#[solution(name = "it_optional")]
fn optional(limit: Option<i64>, scores: BTreeMap<String, i64>) -> i64 {
    let total: i64 = scores.values().sum();
    limit.map_or(total, |l| total.min(l))
}

#[solution(name = "it_structured")]
fn structured(
    origin: Point,
    span: (i64, i64),
    sep: char,
    seen: BTreeSet<u32>,
    rgb: [u8; 3],
    label: Box<String>,
) -> Value {
    json!({
        "manhattan": origin.x.abs() + origin.y.abs(),
        "span": span.1 - span.0,
        "joined": format!("{label}{sep}{}", seen.len()),
        "rgb": rgb.iter().map(|c| u32::from(*c)).sum::<u32>(),
    })
}

#[solution(name = "it_async")]
async fn doubled(x: i64) -> i64 {
    casebench::internal::tokio::task::yield_now().await;
    x * 2
}

#[solution(name = "it_unit")]
fn unit(_flag: bool, out: &mut Console) {
    write!(out, "   \n\t  ").ok();
}

#[solution(name = "it_dup")]
fn dup_one() -> u8 {
    1
}

#[solution(name = "it_dup")]
fn dup_two() -> u8 {
    2
}

fn run(entry: &str, testcases: &str) -> casebench::Report {
    let solution = resolve_entry_point(entry).unwrap();
    let invoker = Invoker::new(solution).with_backtrace(false);
    let suite = TestSuite::from_json_str(testcases).unwrap();
    let executor = Executor::new(
        ExecutionConfig {
            capture_mode: CaptureMode::Sink,
            show_progress: false,
        },
        Box::new(NullProbe),
    );
    executor.execute(&invoker, &suite).unwrap()
}

#[test]
fn test_positional_input() {
    let report = run("it_two_sum", r#"{"t1": {"input": [[2, 7, 11, 15], 9]}}"#);
    let entry = report.get("t1").unwrap();
    assert_eq!(entry.result, json!([0, 1]));
    assert_eq!(entry.stderr, None);
}

#[test]
fn test_sum_returns_value() {
    let report = run("it_add", r#"{"sum": {"input": [2, 3]}}"#);
    let entry = report.get("sum").unwrap();
    assert_eq!(entry.result, json!(5));
    assert!(entry.stderr.is_none());
}

#[test]
fn test_division_fault_keeps_prior_output() {
    let report = run("it_divide", r#"{"zero": {"input": [0]}, "two": {"input": [2]}}"#);

    let zero = report.get("zero").unwrap();
    assert_eq!(zero.result, Value::Null);
    let trace = zero.stderr.as_deref().unwrap();
    assert!(trace.contains("panicked at"), "{trace}");
    assert!(trace.contains("divide by zero"), "{trace}");
    assert_eq!(zero.stdout, "about to divide by 0");

    // The run continues after a fault
    let two = report.get("two").unwrap();
    assert_eq!(two.result, json!(5));
    assert_eq!(two.stdout, "about to divide by 2");
}

#[test]
fn test_object_input_binds_in_member_order() {
    let named = run("it_add", r#"{"c": {"input": {"a": 1, "b": 2}}}"#);
    let positional = run("it_add", r#"{"c": {"input": [1, 2]}}"#);
    assert_eq!(named.get("c").unwrap().result, json!(3));
    assert_eq!(
        named.get("c").unwrap().result,
        positional.get("c").unwrap().result
    );
}

#[test]
fn test_short_input_zero_fills() {
    let report = run("it_three", r#"{"short": {"input": [4]}}"#);
    let entry = report.get("short").unwrap();
    assert!(entry.stderr.is_none());
    assert_eq!(
        entry.result,
        json!({ "count": 4, "label": "", "values": [] })
    );
}

#[test]
fn test_surplus_input_ignored() {
    let report = run("it_add", r#"{"long": {"input": [1, 2, 3, 4]}}"#);
    assert_eq!(report.get("long").unwrap().result, json!(3));
}

#[test]
fn test_best_effort_coercion() {
    let report = run(
        "it_three",
        r#"{"loose": {"input": ["7", 12, ["1.5", 2]]}}"#,
    );
    assert_eq!(
        report.get("loose").unwrap().result,
        json!({ "count": 7, "label": "12", "values": [1.5, 2.0] })
    );
}

#[test]
fn test_binding_failure_is_fault() {
    let report = run("it_add", r#"{"bad": {"input": [{"nested": true}, 1]}}"#);
    let entry = report.get("bad").unwrap();
    assert_eq!(entry.result, Value::Null);
    let text = entry.stderr.as_deref().unwrap();
    assert!(
        text.starts_with("failed to bind arguments for 'it_add': argument 0 (expected int)"),
        "{text}"
    );
}

#[test]
fn test_optional_and_map_params() {
    let report = run(
        "it_optional",
        r#"{"capped": {"input": [5, {"a": 3, "b": 4}]}, "open": {"input": [null, {"a": 3, "b": 4}]}}"#,
    );
    assert_eq!(report.get("capped").unwrap().result, json!(5));
    assert_eq!(report.get("open").unwrap().result, json!(7));
}

#[test]
fn test_async_entry_point() {
    let report = run("it_async", r#"{"t": {"input": [21]}}"#);
    assert_eq!(report.get("t").unwrap().result, json!(42));
}

#[test]
fn test_unit_return_and_whitespace_output() {
    let report = run("it_unit", r#"{"t": {"input": [true]}}"#);
    let entry = report.get("t").unwrap();
    assert_eq!(entry.result, Value::Null);
    assert_eq!(entry.stderr, None);
    assert_eq!(entry.stdout, "");
}

#[test]
fn test_signature_excludes_console() {
    let divide = resolve_entry_point("it_divide").unwrap();
    assert_eq!(divide.signature_string(), "it_divide(int)");

    let three = resolve_entry_point("it_three").unwrap();
    assert_eq!(
        (three.kinds)(),
        vec![Kind::UInt, Kind::Str, Kind::Seq(Box::new(Kind::Float))]
    );
}

#[test]
fn test_resolution_errors() {
    assert!(matches!(
        resolve_entry_point("it_missing"),
        Err(ResolveError::NotFound { .. })
    ));
    match resolve_entry_point("it_dup") {
        Err(ResolveError::Ambiguous { locations, .. }) => assert_eq!(locations.len(), 2),
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_report_document_order_and_precision() {
    let report = run(
        "it_add",
        r#"{"zeta": {"input": [1, 1]}, "alpha": {"input": [2, 2]}, "mid": {"input": [3, 3]}}"#,
    );
    let text = generate_json_report(&report).unwrap();

    let zeta = text.find("\"zeta\"").unwrap();
    let alpha = text.find("\"alpha\"").unwrap();
    let mid = text.find("\"mid\"").unwrap();
    assert!(zeta < alpha && alpha < mid, "{text}");

    for line in text.lines().filter(|l| l.contains("\"realtime\"")) {
        let value = line.trim().trim_start_matches("\"realtime\": ").trim_end_matches(',');
        let decimals = value.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 6, "{line}");
    }

    // utime/stime/max_memory are zero without a probe
    let parsed: Value = serde_json::from_str(&text).unwrap();
    for (_, entry) in parsed.as_object().unwrap() {
        assert_eq!(entry["utime"], json!(0));
        assert_eq!(entry["stime"], json!(0));
        assert_eq!(entry["max_memory"], json!(0));
    }
}

#[test]
fn test_repeat_runs_are_stable() {
    let cases = r#"{"a": {"input": [0]}, "b": {"input": [5]}}"#;
    let first = run("it_divide", cases);
    let second = run("it_divide", cases);
    for ((_, x), (_, y)) in first.iter().zip(second.iter()) {
        assert_eq!(x.result, y.result);
        assert_eq!(x.stdout, y.stdout);
        assert_eq!(x.stderr, y.stderr);
    }
}

#[test]
fn test_structured_parameter_types() {
    let report = run(
        "it_structured",
        r#"{"t": {"input": [{"x": -3, "y": 4}, ["1", 6], ":", [2, 2, 5], [1, 2, 3], "seen"]}}"#,
    );
    let entry = report.get("t").unwrap();
    assert_eq!(entry.stderr, None);
    assert_eq!(
        entry.result,
        json!({"manhattan": 7, "span": 5, "joined": "seen:2", "rgb": 6})
    );

    let def = resolve_entry_point("it_structured").unwrap();
    assert_eq!(
        def.signature_string(),
        "it_structured(Point, tuple<int, int>, char, seq<uint>, seq<uint>, str)"
    );
}

#[test]
fn test_structured_parameters_zero_fill() {
    let report = run("it_structured", r#"{"t": {"input": []}}"#);
    let entry = report.get("t").unwrap();
    assert_eq!(entry.stderr, None);
    assert_eq!(
        entry.result,
        json!({"manhattan": 0, "span": 0, "joined": "\u{0}0", "rgb": 0})
    );
}
