//! # qaforge
//!
//! Test-automation scaffolding engine: watches a page's DOM interactions
//! and network calls (exported as snapshots and call logs) and generates
//! locators, Gherkin steps, and page-object accessors, plus an ad-hoc
//! API replay runner and a JMeter plan exporter.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Generate steps from a collector export (DOM snapshot + click events)
//! qaforge steps session.json
//!
//! # Debug which control a parameter token resolves to
//! qaforge resolve session.json dateFrom
//!
//! # Import a captured call log through the interception surface
//! qaforge ingest calls.json
//!
//! # List captured requests, filtered by action or free text
//! qaforge list --action posts --search title
//!
//! # Replay captured requests (sequential, incremental results)
//! qaforge run --all
//! qaforge run --index 0 --index 2
//!
//! # Edit a captured request before replaying it
//! qaforge edit 1 --body '{"title":"changed"}'
//!
//! # Export artifacts
//! qaforge export jmx --output plan.jmx
//! qaforge export params --output params.csv
//!
//! # Settings and state
//! qaforge config show
//! qaforge config set base-url https://staging.example.com
//! qaforge reset
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use qaforge::dom::{ElementSpec, PageSnapshot};
//! use qaforge::gherkin::StepSynthesizer;
//! use qaforge::config::UiConfig;
//!
//! let page = PageSnapshot::from_spec(
//!     &ElementSpec::new("body")
//!         .child(ElementSpec::new("label").attr("for", "username").text("Username:"))
//!         .child(ElementSpec::new("input").attr("id", "username")),
//! );
//! let synthesizer = StepSynthesizer::new(&UiConfig::default());
//! let field = page.by_id("username").unwrap();
//! let step = synthesizer.on_click(&page, field).unwrap();
//! assert_eq!(step.gherkin_text, "Enter Username \"<Username>\"");
//! ```

#![allow(clippy::uninlined_format_args)]

/// Request capture surfaces: payload buffer, network tap, interceptor
pub mod capture;

/// Explicit configuration objects and control-plane messages
pub mod config;

/// DOM snapshot model
pub mod dom;

/// Code emission for locator/accessor artifacts
pub mod emitter;

/// Error types with process exit codes
pub mod errors;

/// JMX plan and parameter sheet export
pub mod export;

/// Gherkin step synthesis
pub mod gherkin;

/// Structured selector model and locator synthesis
pub mod locator;

/// Tiered field resolution
pub mod resolver;

/// Replay/test executor
pub mod runner;

/// Persisted request/step store
pub mod store;

/// Core data model
pub mod types;

pub use capture::{CallRecorder, Interceptor, NetworkTap, PayloadBuffer, Transport};
pub use config::{CaptureConfig, ControlMessage, RunnerSettings, UiConfig};
pub use dom::{ElementSpec, NodeId, PageSnapshot};
pub use gherkin::StepSynthesizer;
pub use locator::Selector;
pub use runner::TestRunner;
pub use store::Store;
pub use types::{
    CapturedRequest, HttpMethod, InputType, OutputFormat, Payload, StepRecord, TestResult,
    TestStatus,
};
