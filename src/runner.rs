//! Replay executor: re-issue captured requests against a configured
//! target and judge each response against the allowed-status set.
//!
//! Batches run strictly sequentially in selection order; each result is
//! reported before the next request starts.

use anyhow::Result;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::RunnerSettings;
use crate::types::{CapturedRequest, Payload, TestResult, TestStatus};

/// Wire classification of a replayed body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Text,
}

impl BodyKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            BodyKind::Json => "application/json",
            BodyKind::Form => "application/x-www-form-urlencoded",
            BodyKind::Text => "text/plain",
        }
    }
}

/// Classify a payload for the wire: objects are JSON; strings with both
/// `=` and `&` are form-encoded; strings that parse as JSON are JSON;
/// anything else goes out as plain text.
pub fn classify_wire_body(payload: &Payload) -> (String, BodyKind) {
    match payload {
        Payload::Json(value) => (value.to_string(), BodyKind::Json),
        Payload::Text(text) => {
            if text.contains('=') && text.contains('&') {
                (text.clone(), BodyKind::Form)
            } else if serde_json::from_str::<serde_json::Value>(text).is_ok() {
                (text.clone(), BodyKind::Json)
            } else {
                (text.clone(), BodyKind::Text)
            }
        }
    }
}

/// Resolve the effective target URL: absolute URLs pass through; a
/// relative URL is prefixed with the base, joined by exactly one slash.
/// With no base configured, the URL is returned unchanged.
pub fn resolve_url(url: &str, base_url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if base_url.is_empty() {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// Running pass/fail counters shown incrementally during a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, result: &TestResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

pub struct TestRunner {
    client: reqwest::Client,
    settings: RunnerSettings,
}

impl TestRunner {
    pub fn new(settings: RunnerSettings) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(TestRunner { client, settings })
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// Replay one captured request and classify the outcome. Failures
    /// are folded into the result; this never returns an error.
    pub async fn run_one(&self, record: &CapturedRequest) -> TestResult {
        let url = resolve_url(record.effective_url(), &self.settings.base_url);
        let allowed = self.settings.allowed_codes();
        let started = Instant::now();

        let mut request = self
            .client
            .request(record.method.to_reqwest(), &url)
            .timeout(Duration::from_millis(self.settings.timeout_ms))
            .header(ACCEPT, "application/json");

        let token = self.settings.auth_token.trim();
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        // GET/HEAD never send a body, even when one was captured.
        if record.method.allows_body()
            && let Some(payload) = record.effective_payload()
        {
            let (body, kind) = classify_wire_body(payload);
            request = request.header(CONTENT_TYPE, kind.content_type()).body(body);
        }

        debug!("Replaying {} {}", record.method, url);
        match request.send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                let note = response
                    .status()
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string();
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.to_string());
                let body = response.text().await.ok();
                TestResult {
                    method: record.method,
                    url,
                    status: TestStatus::Code(code),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    note,
                    passed: allowed.contains(&code),
                    response_body: body,
                    content_type,
                }
            }
            Err(e) if e.is_timeout() => TestResult {
                method: record.method,
                url,
                status: TestStatus::Timeout,
                elapsed_ms: started.elapsed().as_millis() as u64,
                note: format!("Request timed out after {}ms", self.settings.timeout_ms),
                passed: false,
                response_body: None,
                content_type: None,
            },
            Err(e) => TestResult {
                method: record.method,
                url,
                status: TestStatus::Error,
                elapsed_ms: started.elapsed().as_millis() as u64,
                note: e.to_string(),
                passed: false,
                response_body: None,
                content_type: None,
            },
        }
    }

    /// Replay a batch strictly in order, one at a time. The callback
    /// sees each result (with the running summary) before the next
    /// request is issued. One failure never aborts the batch.
    pub async fn run_batch<F>(
        &self,
        records: &[CapturedRequest],
        mut on_result: F,
    ) -> Vec<TestResult>
    where
        F: FnMut(&TestResult, &Summary),
    {
        let mut results = Vec::with_capacity(records.len());
        let mut summary = Summary::default();

        for record in records {
            let result = self.run_one(record).await;
            summary.record(&result);
            on_result(&result, &summary);
            results.push(result);
        }

        info!(
            "Batch finished: {} passed, {} failed",
            summary.passed, summary.failed
        );
        results
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
