use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locator::Selector;

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// HTTP methods the capture and replay surfaces understand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Parse a method name case-insensitively.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => anyhow::bail!("Unknown HTTP method: {}", other),
        }
    }

    /// GET and HEAD requests never carry a body, even if one was captured.
    pub fn allows_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured request body: either raw text or parsed JSON.
///
/// Form-encoded bodies stay as `Text`; only bodies that parse to a
/// non-string JSON value become `Json`. `Text` must come first so that
/// untagged deserialization brings a stored string back as `Text`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Json(serde_json::Value),
}

impl Payload {
    /// The body text to put on the wire for this payload.
    pub fn body_text(&self) -> String {
        match self {
            Payload::Text(s) => s.clone(),
            Payload::Json(v) => v.to_string(),
        }
    }

    /// Short single-line summary for table display.
    pub fn summary(&self, max: usize) -> String {
        let full = self.body_text();
        if full.chars().count() > max {
            let head: String = full.chars().take(max).collect();
            format!("{}...", head)
        } else {
            full
        }
    }
}

/// One observed network call, normalized to the shape both capture
/// surfaces converge on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapturedRequest {
    /// Grouping label derived from the URL's last path segment.
    pub action: String,
    pub url: String,
    pub method: HttpMethod,
    pub time: DateTime<Utc>,
    pub payload: Option<Payload>,
    /// User-edited URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_url: Option<String>,
    /// User-edited payload. The outer `None` means "never edited";
    /// `Some(None)` means the user explicitly cleared the body. A
    /// present-but-null field must deserialize to `Some(None)`, so the
    /// default nested-Option handling is overridden.
    #[serde(
        default,
        deserialize_with = "some_if_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub edited_payload: Option<Option<Payload>>,
}

impl CapturedRequest {
    pub fn new(
        url: impl Into<String>,
        method: HttpMethod,
        time: DateTime<Utc>,
        payload: Option<Payload>,
    ) -> Self {
        let url = url.into();
        CapturedRequest {
            action: extract_action(&url),
            url,
            method,
            time,
            payload,
            edited_url: None,
            edited_payload: None,
        }
    }

    /// Edited URL if present, otherwise the captured one.
    pub fn effective_url(&self) -> &str {
        self.edited_url.as_deref().unwrap_or(&self.url)
    }

    /// Edited payload overrides the original; an explicit clear yields None.
    pub fn effective_payload(&self) -> Option<&Payload> {
        match &self.edited_payload {
            Some(edited) => edited.as_ref(),
            None => self.payload.as_ref(),
        }
    }
}

fn some_if_present<'de, D>(deserializer: D) -> Result<Option<Option<Payload>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Fallback action when a URL yields no usable path segment.
pub const UNGROUPED_ACTION: &str = "Ungrouped";

/// Derive the grouping action from a URL: the last non-empty path
/// segment, ignoring query and fragment. Works for both absolute and
/// relative URLs.
pub fn extract_action(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Relative URL: strip query/fragment by hand.
        Err(_) => {
            let no_fragment = url.split('#').next().unwrap_or(url);
            no_fragment
                .split('?')
                .next()
                .unwrap_or(no_fragment)
                .to_string()
        }
    };

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .unwrap_or_else(|| UNGROUPED_ACTION.to_string())
}

/// Outcome classification for a single replayed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestStatus {
    /// HTTP status code returned by the server.
    Code(u16),
    /// The request was aborted by its own timeout.
    Timeout,
    /// Transport-level failure before any status was received.
    Error,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Code(code) => write!(f, "{}", code),
            TestStatus::Timeout => f.write_str("TIMEOUT"),
            TestStatus::Error => f.write_str("ERROR"),
        }
    }
}

impl Serialize for TestStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TestStatus::Code(code) => serializer.serialize_u16(*code),
            TestStatus::Timeout => serializer.serialize_str("TIMEOUT"),
            TestStatus::Error => serializer.serialize_str("ERROR"),
        }
    }
}

/// Result of replaying one captured request. Derived, never persisted.
#[derive(Clone, Debug, Serialize)]
pub struct TestResult {
    pub method: HttpMethod,
    pub url: String,
    pub status: TestStatus,
    pub elapsed_ms: u64,
    pub note: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Kind of control a collected step drives, used to pick the step-file
/// template downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Click,
    NormalSelect,
    MultiSelect,
    NormalInput,
    SearchDropdown,
    DateFrom,
    DateTo,
    ImageUpload,
    ExcelUpload,
    ExcelFileUpload,
}

impl InputType {
    /// Classify a step from its sentence, refined by whether the locator
    /// points at a composite multiselect trigger.
    pub fn infer(step_text: &str, is_composite: bool) -> Self {
        let step = step_text.to_lowercase();
        let has = |needle: &str| step.contains(needle);

        if has("click") {
            InputType::Click
        } else if has("enter") && (has("date from") || has("datefrom")) {
            InputType::DateFrom
        } else if has("enter") && (has("date to") || has("dateto")) {
            InputType::DateTo
        } else if has("enter") && (has("image") || has("img")) {
            InputType::ImageUpload
        } else if has("enter") && has("excel") && !has("file") {
            InputType::ExcelUpload
        } else if (has("select") || has("upload")) && has("excel file") {
            InputType::ExcelFileUpload
        } else if has("enter") && (has("upload") || has("file")) {
            InputType::ExcelUpload
        } else if has("enter") {
            if is_composite {
                InputType::MultiSelect
            } else {
                InputType::NormalInput
            }
        } else if has("select") && (has("multiple") || has("multi")) {
            InputType::MultiSelect
        } else if has("select") {
            if has("search") || has("dropdown") || has("filter") {
                InputType::SearchDropdown
            } else if is_composite {
                InputType::MultiSelect
            } else {
                InputType::NormalSelect
            }
        } else {
            InputType::Click
        }
    }
}

/// Selector expression bound to its generated identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocatorArtifact {
    /// Identifier derived from the subject label, alphanumerics only.
    pub ident: String,
    pub selector: Selector,
}

/// Accessor method referencing a locator through its element class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessorArtifact {
    pub ident: String,
    pub element_class: String,
}

/// One collected test step: the sentence, the locator it binds, and the
/// accessor that exposes it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepRecord {
    /// Gherkin sentence with zero or more `<param>` placeholders.
    pub gherkin_text: String,
    pub locator: LocatorArtifact,
    pub method: AccessorArtifact,
    pub input_type: InputType,
    /// Placeholder identifier, present for Enter/Select steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
