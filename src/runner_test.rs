// Unit tests for runner module

use super::*;
use crate::types::HttpMethod;
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_classify_wire_body_json_value() {
    let (body, kind) = classify_wire_body(&Payload::Json(json!({"a": 1})));
    assert_eq!(body, "{\"a\":1}");
    assert_eq!(kind, BodyKind::Json);
    assert_eq!(kind.content_type(), "application/json");
}

#[test]
fn test_classify_wire_body_form_text() {
    let (body, kind) = classify_wire_body(&Payload::Text("a=1&b=2".to_string()));
    assert_eq!(body, "a=1&b=2");
    assert_eq!(kind, BodyKind::Form);
    assert_eq!(kind.content_type(), "application/x-www-form-urlencoded");
}

#[test]
fn test_classify_wire_body_json_text() {
    let (body, kind) = classify_wire_body(&Payload::Text("[1,2,3]".to_string()));
    assert_eq!(body, "[1,2,3]");
    assert_eq!(kind, BodyKind::Json);
}

#[test]
fn test_classify_wire_body_plain_text() {
    let (body, kind) = classify_wire_body(&Payload::Text("hello there".to_string()));
    assert_eq!(body, "hello there");
    assert_eq!(kind, BodyKind::Text);
    assert_eq!(kind.content_type(), "text/plain");
}

#[test]
fn test_form_check_wins_over_json_check() {
    // "a=1&b=2" would never parse as JSON, but a pathological body with
    // both markers still goes form-first, as on the original surface.
    let (_, kind) = classify_wire_body(&Payload::Text("\"x=1&y=2\"".to_string()));
    assert_eq!(kind, BodyKind::Form);
}

#[test]
fn test_resolve_url_absolute_passthrough() {
    assert_eq!(
        resolve_url("https://example.com/api/users", "https://base.example.com"),
        "https://example.com/api/users"
    );
    assert_eq!(
        resolve_url("http://example.com/x", "https://base.example.com"),
        "http://example.com/x"
    );
}

#[test]
fn test_resolve_url_joins_with_single_slash() {
    assert_eq!(
        resolve_url("/api/users", "https://base.example.com"),
        "https://base.example.com/api/users"
    );
    assert_eq!(
        resolve_url("api/users", "https://base.example.com/"),
        "https://base.example.com/api/users"
    );
    assert_eq!(
        resolve_url("/api/users", "https://base.example.com/"),
        "https://base.example.com/api/users"
    );
}

#[test]
fn test_resolve_url_no_base() {
    assert_eq!(resolve_url("/api/users", ""), "/api/users");
    assert_eq!(resolve_url("", "https://base.example.com"), "");
}

#[test]
fn test_summary_counters() {
    let mut summary = Summary::default();
    let passed = TestResult {
        method: HttpMethod::Get,
        url: "https://example.com/a".to_string(),
        status: TestStatus::Code(200),
        elapsed_ms: 10,
        note: "OK".to_string(),
        passed: true,
        response_body: None,
        content_type: None,
    };
    let failed = TestResult {
        status: TestStatus::Code(500),
        passed: false,
        ..passed.clone()
    };

    summary.record(&passed);
    summary.record(&failed);
    summary.record(&passed);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 3);
}

#[tokio::test]
async fn test_run_one_connection_error() {
    // Nothing listens on this port; the result classifies as an error,
    // never a panic or an Err.
    let runner = TestRunner::new(RunnerSettings {
        timeout_ms: 5000,
        ..RunnerSettings::default()
    })
    .unwrap();
    let record = CapturedRequest::new(
        "http://127.0.0.1:1/api/users",
        HttpMethod::Get,
        Utc::now(),
        None,
    );
    let result = runner.run_one(&record).await;
    assert_eq!(result.status, TestStatus::Error);
    assert!(!result.passed);
    assert!(!result.note.is_empty());
}
