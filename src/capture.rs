//! Request capture: the privileged network-tap surface and the
//! patched-call interceptor surface. Both converge on the same
//! normalized [`CapturedRequest`] shape and share the body
//! classification rules.

use chrono::Utc;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CaptureConfig;
use crate::store::{Store, StoreError};
use crate::types::{CapturedRequest, HttpMethod, Payload};

/// Bodies larger than this are truncated, never rejected.
pub const MAX_BODY_CHARS: usize = 100_000;
pub const TRUNCATION_MARKER: &str = "...[truncated]";
/// Marker stored when request bytes cannot be decoded.
pub const UNDECODABLE_MARKER: &str = "[Unable to decode payload]";

/// How long buffered payloads wait for their completion event.
pub const PAYLOAD_RETENTION: Duration = Duration::from_secs(5 * 60);

/// Dedup key prefix length on the interceptor surface. Large bodies that
/// agree on the first 100 characters collapse to one entry; a known
/// false-dedup trade-off, kept as observed.
const DEDUP_BODY_PREFIX: usize = 100;

/// Classify raw body text into a payload: JSON when it parses to a
/// structured value, text otherwise. Oversized bodies are truncated
/// first, so a truncated JSON document degrades to text.
pub fn classify_body(text: &str) -> Option<Payload> {
    if text.trim().is_empty() {
        return None;
    }

    let text = truncate_body(text);
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(serde_json::Value::String(s)) => Some(Payload::Text(s)),
        Ok(value) => Some(Payload::Json(value)),
        Err(_) => Some(Payload::Text(text)),
    }
}

/// Classify a user-edited body. Returns the payload to store plus a
/// warning when the text is neither JSON nor form-shaped; such edits are
/// accepted as plain text, never rejected.
pub fn classify_edited(text: &str) -> (Option<Payload>, Option<&'static str>) {
    if text.trim().is_empty() {
        return (None, None);
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text)
        && !value.is_string()
    {
        return (Some(Payload::Json(value)), None);
    }
    if text.contains('=') && text.contains('&') {
        return (Some(Payload::Text(text.to_string())), None);
    }
    (
        Some(Payload::Text(text.to_string())),
        Some("body is neither valid JSON nor form data; storing as plain text"),
    )
}

fn truncate_body(text: &str) -> String {
    if text.chars().count() > MAX_BODY_CHARS {
        let head: String = text.chars().take(MAX_BODY_CHARS).collect();
        format!("{}{}", head, TRUNCATION_MARKER)
    } else {
        text.to_string()
    }
}

/// Per-request identifier on the tap surface.
pub type RequestId = Uuid;

/// Observed request body on the tap surface.
#[derive(Clone, Debug)]
pub enum RequestBody {
    /// Decoded form fields, each possibly multi-valued.
    Form(BTreeMap<String, Vec<String>>),
    /// Raw bytes, decoded and classified on buffering.
    Raw(Vec<u8>),
}

struct Buffered {
    payload: Payload,
    buffered_at: Instant,
}

/// Short-lived holding area joining request bodies with their completion
/// events. Swept periodically; entries inside the retention window are
/// never dropped.
pub struct PayloadBuffer {
    entries: DashMap<RequestId, Buffered>,
    retention: Duration,
}

impl PayloadBuffer {
    pub fn new(retention: Duration) -> Self {
        PayloadBuffer {
            entries: DashMap::new(),
            retention,
        }
    }

    pub fn insert(&self, id: RequestId, payload: Payload) {
        self.entries.insert(
            id,
            Buffered {
                payload,
                buffered_at: Instant::now(),
            },
        );
    }

    /// Remove and return the buffered payload for a completed request.
    pub fn take(&self, id: &RequestId) -> Option<Payload> {
        self.entries.remove(id).map(|(_, buffered)| buffered.payload)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries older than the retention window.
    pub fn sweep(&self) {
        let retention = self.retention;
        self.entries
            .retain(|_, buffered| buffered.buffered_at.elapsed() < retention);
    }

    /// Run `sweep` on a fixed interval until the handle is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let buffer = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                buffer.sweep();
            }
        })
    }
}

impl Default for PayloadBuffer {
    fn default() -> Self {
        PayloadBuffer::new(PAYLOAD_RETENTION)
    }
}

/// Header/body listener surface: buffers decoded payloads keyed by
/// request id, then joins them with the completion event.
pub struct NetworkTap {
    buffer: Arc<PayloadBuffer>,
}

impl NetworkTap {
    pub fn new(buffer: Arc<PayloadBuffer>) -> Self {
        NetworkTap { buffer }
    }

    pub fn buffer(&self) -> &Arc<PayloadBuffer> {
        &self.buffer
    }

    /// Observe an outgoing request body before completion.
    pub fn on_before_request(&self, id: RequestId, body: RequestBody) {
        let payload = match body {
            RequestBody::Form(fields) => {
                Payload::Json(serde_json::to_value(fields).unwrap_or_default())
            }
            RequestBody::Raw(bytes) => match String::from_utf8(bytes) {
                Ok(text) => match classify_body(&text) {
                    Some(payload) => payload,
                    None => return,
                },
                Err(_) => Payload::Text(UNDECODABLE_MARKER.to_string()),
            },
        };
        self.buffer.insert(id, payload);
    }

    /// Join the buffered payload with a completed request and hand the
    /// normalized record to the store. Returns whether a new entry was
    /// appended.
    pub async fn on_completed(
        &self,
        id: RequestId,
        url: &str,
        method: HttpMethod,
        config: &CaptureConfig,
        store: &mut Store,
    ) -> Result<bool, StoreError> {
        if !config.accepts(url) {
            self.buffer.take(&id);
            return Ok(false);
        }

        let payload = self.buffer.take(&id);
        let record = CapturedRequest::new(url, method, Utc::now(), payload);
        store.append_request(record).await
    }
}

/// Response handed back by a [`Transport`].
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// The original-call dependency the interceptor forwards to. Injected
/// explicitly; the interceptor never owns or replaces a shared built-in.
pub trait Transport {
    fn execute(
        &self,
        call: &OutboundCall,
    ) -> impl std::future::Future<Output = anyhow::Result<TransportResponse>> + Send;
}

/// Body shapes an outbound call may carry.
#[derive(Clone, Debug)]
pub enum OutboundBody {
    Text(String),
    /// Form fields, rendered `k=v&k=v`.
    Form(Vec<(String, String)>),
    /// URL search params, same rendering as form fields.
    Params(Vec<(String, String)>),
    Json(serde_json::Value),
}

impl OutboundBody {
    pub fn as_text(&self) -> String {
        match self {
            OutboundBody::Text(s) => s.clone(),
            OutboundBody::Form(pairs) | OutboundBody::Params(pairs) => pairs
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&"),
            OutboundBody::Json(value) => value.to_string(),
        }
    }
}

/// An outbound call in either of the shapes the page APIs accept: a bare
/// URL target with options, or a fully structured request object.
#[derive(Clone, Debug)]
pub enum OutboundCall {
    Target {
        url: String,
        method: Option<HttpMethod>,
        body: Option<OutboundBody>,
    },
    Request {
        url: String,
        method: HttpMethod,
        body: Option<String>,
    },
}

impl OutboundCall {
    pub fn url(&self) -> &str {
        match self {
            OutboundCall::Target { url, .. } | OutboundCall::Request { url, .. } => url,
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            OutboundCall::Target { method, .. } => method.unwrap_or(HttpMethod::Get),
            OutboundCall::Request { method, .. } => *method,
        }
    }

    pub fn body_text(&self) -> String {
        match self {
            OutboundCall::Target { body, .. } => {
                body.as_ref().map(|b| b.as_text()).unwrap_or_default()
            }
            OutboundCall::Request { body, .. } => body.clone().unwrap_or_default(),
        }
    }
}

/// Session-scoped recording half of the patched-call surface: dedup by
/// (method, url, body prefix), then filter and append. Usable on its own
/// when importing an exported call log.
#[derive(Default)]
pub struct CallRecorder {
    seen: Mutex<HashSet<String>>,
}

/// Patched-call surface: an explicit interception boundary wrapping the
/// injected transport. Recording failures never block the forwarded
/// call.
pub struct Interceptor<T: Transport> {
    recorder: CallRecorder,
    transport: T,
}

impl<T: Transport> Interceptor<T> {
    pub fn new(transport: T) -> Self {
        Interceptor {
            recorder: CallRecorder::default(),
            transport,
        }
    }

    /// Record the call if it is new for this session, then forward it.
    pub async fn send(
        &self,
        call: OutboundCall,
        config: &CaptureConfig,
        store: &mut Store,
    ) -> anyhow::Result<TransportResponse> {
        if let Err(e) = self.recorder.observe(&call, config, store).await {
            warn!("Capture failed for {}: {}", call.url(), e);
        }
        self.transport.execute(&call).await
    }
}

impl CallRecorder {
    pub fn new() -> Self {
        CallRecorder::default()
    }

    /// Capture a call without forwarding it. Returns whether a new entry
    /// was appended.
    pub async fn observe(
        &self,
        call: &OutboundCall,
        config: &CaptureConfig,
        store: &mut Store,
    ) -> Result<bool, StoreError> {
        let method = call.method();
        let body_text = call.body_text();

        // Plain GETs with no body are forwarded but not recorded.
        if method == HttpMethod::Get && body_text.is_empty() {
            return Ok(false);
        }

        // Session-scoped dedup runs before the enable/filter checks, as
        // on the original surface.
        let key = dedup_key(method, call.url(), &body_text);
        {
            let mut seen = self.seen.lock().expect("dedup set poisoned");
            if !seen.insert(key) {
                debug!("Skipping already-seen call to {}", call.url());
                return Ok(false);
            }
        }

        if !config.accepts(call.url()) {
            return Ok(false);
        }

        let payload = classify_body(&body_text);
        let record = CapturedRequest::new(call.url(), method, Utc::now(), payload);
        store.append_request_windowed(record, 1000).await
    }
}

fn dedup_key(method: HttpMethod, url: &str, body: &str) -> String {
    let prefix: String = body.chars().take(DEDUP_BODY_PREFIX).collect();
    format!("{}:{}:{}", method, url, prefix)
}

/// Production transport backed by a reqwest client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, call: &OutboundCall) -> anyhow::Result<TransportResponse> {
        let mut request = self
            .client
            .request(call.method().to_reqwest(), call.url());
        let body = call.body_text();
        if call.method().allows_body() && !body.is_empty() {
            request = request.body(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;
