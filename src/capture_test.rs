// Unit tests for capture module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

async fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("store.json")).await.unwrap();
    (dir, store)
}

fn enabled_config() -> CaptureConfig {
    CaptureConfig {
        logging_enabled: true,
        domain_filter: String::new(),
    }
}

#[test]
fn test_classify_body_empty() {
    assert!(classify_body("").is_none());
    assert!(classify_body("   \n  ").is_none());
}

#[test]
fn test_classify_body_json_object() {
    assert_eq!(
        classify_body(r#"{"user": "amy"}"#),
        Some(Payload::Json(json!({"user": "amy"})))
    );
    assert_eq!(
        classify_body("[1, 2, 3]"),
        Some(Payload::Json(json!([1, 2, 3])))
    );
}

#[test]
fn test_classify_body_json_string_stays_text() {
    assert_eq!(
        classify_body(r#""just a string""#),
        Some(Payload::Text("just a string".to_string()))
    );
}

#[test]
fn test_classify_body_form_and_plain_text() {
    assert_eq!(
        classify_body("user=amy&pass=secret"),
        Some(Payload::Text("user=amy&pass=secret".to_string()))
    );
    assert_eq!(
        classify_body("hello world"),
        Some(Payload::Text("hello world".to_string()))
    );
}

#[test]
fn test_classify_body_truncates_oversized() {
    let big = "x".repeat(MAX_BODY_CHARS + 50);
    let Some(Payload::Text(stored)) = classify_body(&big) else {
        panic!("expected text payload");
    };
    assert!(stored.ends_with(TRUNCATION_MARKER));
    assert_eq!(
        stored.chars().count(),
        MAX_BODY_CHARS + TRUNCATION_MARKER.chars().count()
    );
}

#[test]
fn test_oversized_json_degrades_to_text() {
    // Truncation happens before parsing, so giant JSON ends up as text.
    let big = format!(r#"{{"data": "{}"}}"#, "y".repeat(MAX_BODY_CHARS));
    let payload = classify_body(&big).unwrap();
    assert!(matches!(payload, Payload::Text(_)));
}

#[test]
fn test_classify_edited() {
    let (payload, warning) = classify_edited(r#"{"a": 1}"#);
    assert_eq!(payload, Some(Payload::Json(json!({"a": 1}))));
    assert!(warning.is_none());

    let (payload, warning) = classify_edited("a=1&b=2");
    assert_eq!(payload, Some(Payload::Text("a=1&b=2".to_string())));
    assert!(warning.is_none());

    let (payload, warning) = classify_edited("plain words");
    assert_eq!(payload, Some(Payload::Text("plain words".to_string())));
    assert!(warning.is_some());

    let (payload, warning) = classify_edited("  ");
    assert!(payload.is_none());
    assert!(warning.is_none());
}

#[test]
fn test_payload_buffer_insert_take() {
    let buffer = PayloadBuffer::default();
    let id = Uuid::new_v4();
    buffer.insert(id, Payload::Text("body".to_string()));
    assert_eq!(buffer.len(), 1);

    assert_eq!(buffer.take(&id), Some(Payload::Text("body".to_string())));
    assert!(buffer.is_empty());
    // Second take finds nothing.
    assert!(buffer.take(&id).is_none());
}

#[test]
fn test_payload_buffer_sweep() {
    // Zero retention expires everything on the next sweep.
    let expiring = PayloadBuffer::new(Duration::ZERO);
    expiring.insert(Uuid::new_v4(), Payload::Text("old".to_string()));
    expiring.sweep();
    assert!(expiring.is_empty());

    // Entries inside the window survive.
    let keeping = PayloadBuffer::new(Duration::from_secs(300));
    let id = Uuid::new_v4();
    keeping.insert(id, Payload::Text("fresh".to_string()));
    keeping.sweep();
    assert_eq!(keeping.len(), 1);
}

#[test]
fn test_tap_buffers_form_body_as_json() {
    let tap = NetworkTap::new(Arc::new(PayloadBuffer::default()));
    let id = Uuid::new_v4();
    let mut fields = BTreeMap::new();
    fields.insert("user".to_string(), vec!["amy".to_string()]);
    tap.on_before_request(id, RequestBody::Form(fields));

    assert_eq!(
        tap.buffer().take(&id),
        Some(Payload::Json(json!({"user": ["amy"]})))
    );
}

#[test]
fn test_tap_marks_undecodable_bytes() {
    let tap = NetworkTap::new(Arc::new(PayloadBuffer::default()));
    let id = Uuid::new_v4();
    tap.on_before_request(id, RequestBody::Raw(vec![0xff, 0xfe, 0xfd]));
    assert_eq!(
        tap.buffer().take(&id),
        Some(Payload::Text(UNDECODABLE_MARKER.to_string()))
    );
}

#[test]
fn test_tap_skips_blank_raw_body() {
    let tap = NetworkTap::new(Arc::new(PayloadBuffer::default()));
    tap.on_before_request(Uuid::new_v4(), RequestBody::Raw(b"   ".to_vec()));
    assert!(tap.buffer().is_empty());
}

#[tokio::test]
async fn test_tap_completed_appends_and_dedups() {
    let (_dir, mut store) = temp_store().await;
    let tap = NetworkTap::new(Arc::new(PayloadBuffer::default()));
    let config = enabled_config();

    let id = Uuid::new_v4();
    tap.on_before_request(id, RequestBody::Raw(br#"{"q": 1}"#.to_vec()));
    let appended = tap
        .on_completed(id, "https://example.com/api/search", HttpMethod::Post, &config, &mut store)
        .await
        .unwrap();
    assert!(appended);
    assert_eq!(store.requests().len(), 1);
    assert_eq!(store.requests()[0].action, "search");
    assert_eq!(
        store.requests()[0].payload,
        Some(Payload::Json(json!({"q": 1})))
    );

    // Same (url, method) again: dropped.
    let appended = tap
        .on_completed(
            Uuid::new_v4(),
            "https://example.com/api/search",
            HttpMethod::Post,
            &config,
            &mut store,
        )
        .await
        .unwrap();
    assert!(!appended);
    assert_eq!(store.requests().len(), 1);
}

#[tokio::test]
async fn test_tap_disabled_drains_buffer() {
    let (_dir, mut store) = temp_store().await;
    let tap = NetworkTap::new(Arc::new(PayloadBuffer::default()));
    let config = CaptureConfig::default();

    let id = Uuid::new_v4();
    tap.on_before_request(id, RequestBody::Raw(b"payload".to_vec()));
    let appended = tap
        .on_completed(id, "https://example.com/api/x", HttpMethod::Post, &config, &mut store)
        .await
        .unwrap();
    assert!(!appended);
    assert!(store.requests().is_empty());
    // The buffered payload must not leak.
    assert!(tap.buffer().is_empty());
}

#[tokio::test]
async fn test_tap_domain_filter() {
    let (_dir, mut store) = temp_store().await;
    let tap = NetworkTap::new(Arc::new(PayloadBuffer::default()));
    let config = CaptureConfig {
        logging_enabled: true,
        domain_filter: "example.com".to_string(),
    };

    let appended = tap
        .on_completed(
            Uuid::new_v4(),
            "https://other.org/api/x",
            HttpMethod::Post,
            &config,
            &mut store,
        )
        .await
        .unwrap();
    assert!(!appended);

    let appended = tap
        .on_completed(
            Uuid::new_v4(),
            "https://api.example.com/api/x",
            HttpMethod::Post,
            &config,
            &mut store,
        )
        .await
        .unwrap();
    assert!(appended);
}

#[tokio::test]
async fn test_recorder_skips_plain_get() {
    let (_dir, mut store) = temp_store().await;
    let recorder = CallRecorder::new();
    let call = OutboundCall::Target {
        url: "https://example.com/api/users".to_string(),
        method: None,
        body: None,
    };
    let appended = recorder.observe(&call, &enabled_config(), &mut store).await.unwrap();
    assert!(!appended);
    assert!(store.requests().is_empty());
}

#[tokio::test]
async fn test_recorder_records_post() {
    let (_dir, mut store) = temp_store().await;
    let recorder = CallRecorder::new();
    let call = OutboundCall::Request {
        url: "https://example.com/api/login".to_string(),
        method: HttpMethod::Post,
        body: Some("user=amy&pass=x".to_string()),
    };
    let appended = recorder.observe(&call, &enabled_config(), &mut store).await.unwrap();
    assert!(appended);
    assert_eq!(store.requests()[0].action, "login");
    assert_eq!(
        store.requests()[0].payload,
        Some(Payload::Text("user=amy&pass=x".to_string()))
    );
}

#[tokio::test]
async fn test_recorder_session_dedup() {
    let (_dir, mut store) = temp_store().await;
    let recorder = CallRecorder::new();
    let call = OutboundCall::Request {
        url: "https://example.com/api/login".to_string(),
        method: HttpMethod::Post,
        body: Some("user=amy".to_string()),
    };
    assert!(recorder.observe(&call, &enabled_config(), &mut store).await.unwrap());
    assert!(!recorder.observe(&call, &enabled_config(), &mut store).await.unwrap());
    assert_eq!(store.requests().len(), 1);
}

#[tokio::test]
async fn test_recorder_dedup_runs_before_filter() {
    // A call seen while capture is off consumes its dedup slot, so the
    // same call is not recorded once capture turns on. Matches the
    // original surface's ordering.
    let (_dir, mut store) = temp_store().await;
    let recorder = CallRecorder::new();
    let call = OutboundCall::Request {
        url: "https://example.com/api/login".to_string(),
        method: HttpMethod::Post,
        body: Some("user=amy".to_string()),
    };
    let disabled = CaptureConfig::default();
    assert!(!recorder.observe(&call, &disabled, &mut store).await.unwrap());
    assert!(!recorder.observe(&call, &enabled_config(), &mut store).await.unwrap());
    assert!(store.requests().is_empty());
}

#[tokio::test]
async fn test_recorder_body_prefix_collision() {
    // Bodies agreeing on the first 100 characters collapse to one entry.
    let (_dir, mut store) = temp_store().await;
    let recorder = CallRecorder::new();
    let shared = "z".repeat(100);
    let first = OutboundCall::Request {
        url: "https://example.com/api/upload".to_string(),
        method: HttpMethod::Post,
        body: Some(format!("{}AAA", shared)),
    };
    let second = OutboundCall::Request {
        url: "https://example.com/api/upload".to_string(),
        method: HttpMethod::Post,
        body: Some(format!("{}BBB", shared)),
    };
    assert!(recorder.observe(&first, &enabled_config(), &mut store).await.unwrap());
    assert!(!recorder.observe(&second, &enabled_config(), &mut store).await.unwrap());
}

#[test]
fn test_outbound_body_as_text() {
    assert_eq!(OutboundBody::Text("raw".to_string()).as_text(), "raw");
    assert_eq!(
        OutboundBody::Form(vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string())
        ])
        .as_text(),
        "a=1&b=2"
    );
    assert_eq!(OutboundBody::Json(json!({"k": "v"})).as_text(), "{\"k\":\"v\"}");
}

#[test]
fn test_outbound_call_defaults_to_get() {
    let call = OutboundCall::Target {
        url: "https://example.com/x".to_string(),
        method: None,
        body: None,
    };
    assert_eq!(call.method(), HttpMethod::Get);
    assert_eq!(call.body_text(), "");
}

struct FixedTransport {
    status: u16,
}

impl Transport for FixedTransport {
    async fn execute(&self, _call: &OutboundCall) -> anyhow::Result<TransportResponse> {
        Ok(TransportResponse {
            status: self.status,
            body: "ok".to_string(),
        })
    }
}

#[tokio::test]
async fn test_interceptor_records_then_forwards() {
    let (_dir, mut store) = temp_store().await;
    let interceptor = Interceptor::new(FixedTransport { status: 201 });
    let call = OutboundCall::Request {
        url: "https://example.com/api/posts".to_string(),
        method: HttpMethod::Post,
        body: Some(r#"{"title": "hi"}"#.to_string()),
    };

    let response = interceptor
        .send(call, &enabled_config(), &mut store)
        .await
        .unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(store.requests().len(), 1);
}

#[tokio::test]
async fn test_interceptor_forwards_even_when_not_recorded() {
    let (_dir, mut store) = temp_store().await;
    let interceptor = Interceptor::new(FixedTransport { status: 200 });
    let call = OutboundCall::Target {
        url: "https://example.com/api/users".to_string(),
        method: Some(HttpMethod::Get),
        body: None,
    };

    let response = interceptor
        .send(call, &CaptureConfig::default(), &mut store)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert!(store.requests().is_empty());
}
