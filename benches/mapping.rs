//! Mapping benchmark suite.
//!
//! Benchmarks the pure translation path every command goes through:
//! - Request mapping for representative commands
//! - Response mapping, including remote value conversion
//! - Error redirection
//!
//! Run with: cargo bench --bench mapping
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use webdriver_bidi_bridge::ContextId;
use webdriver_bidi_bridge::mapping::{map_request, map_response, redirect_error_response};
use webdriver_bidi_bridge::protocol::ProtocolError;

// ============================================================================
// Benchmark Parameters
// ============================================================================

fn request_cases() -> Vec<(&'static str, Value)> {
    vec![
        ("get", json!({"url": "https://example.com"})),
        ("findElement", json!({"using": "css selector", "value": "#main"})),
        ("clickElement", json!({"id": "node-1"})),
        (
            "w3cExecuteScript",
            json!({"script": "return arguments[0].length", "args": [[1, 2, 3], {"a": "b"}]}),
        ),
    ]
}

fn object_result(entries: usize) -> Value {
    let pairs: Vec<Value> = (0..entries)
        .map(|i| json!([format!("key{i}"), {"type": "number", "value": i}]))
        .collect();
    json!({"type": "success", "result": {"type": "object", "value": pairs}})
}

// ============================================================================
// Benchmark: Request Mapping
// ============================================================================

fn bench_map_request(c: &mut Criterion) {
    let context = ContextId::new("bench-context");
    let mut group = c.benchmark_group("map_request");

    for (command, params) in request_cases() {
        group.bench_with_input(BenchmarkId::from_parameter(command), &params, |b, params| {
            b.iter(|| map_request(black_box(command), black_box(params), Some(&context)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Response Mapping
// ============================================================================

fn bench_map_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_response");
    let params = json!({});

    for entries in [1usize, 16, 256] {
        let result = object_result(entries);
        group.bench_with_input(BenchmarkId::new("execute_script", entries), &result, |b, result| {
            b.iter(|| map_response("w3cExecuteScript", black_box(result), &params));
        });
    }

    let nodes: Vec<Value> = (0..64)
        .map(|i| json!({"type": "node", "sharedId": format!("node-{i}")}))
        .collect();
    let located = json!({"nodes": nodes});
    group.bench_function("find_elements", |b| {
        b.iter(|| map_response("findElements", black_box(&located), &params));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Error Redirection
// ============================================================================

fn bench_redirect(c: &mut Criterion) {
    let error = ProtocolError::new("no such frame", "browsing context discarded");
    c.bench_function("redirect_error_response", |b| {
        b.iter(|| redirect_error_response(black_box("getTitle"), black_box(&error)));
    });
}

criterion_group!(benches, bench_map_request, bench_map_response, bench_redirect);
criterion_main!(benches);
