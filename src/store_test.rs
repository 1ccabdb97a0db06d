// Unit tests for store module

use super::*;
use crate::locator::Selector;
use crate::types::{AccessorArtifact, HttpMethod, InputType, LocatorArtifact};
use chrono::{Duration as ChronoDuration, Utc};
use pretty_assertions::assert_eq;

async fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("store.json")).await.unwrap();
    (dir, store)
}

fn request(url: &str, method: HttpMethod) -> CapturedRequest {
    CapturedRequest::new(url, method, Utc::now(), None)
}

fn step(ident: &str, gherkin: &str) -> StepRecord {
    StepRecord {
        gherkin_text: gherkin.to_string(),
        locator: LocatorArtifact {
            ident: ident.to_string(),
            selector: Selector::ById {
                tag: "input".to_string(),
                id: ident.to_lowercase(),
            },
        },
        method: AccessorArtifact {
            ident: ident.to_string(),
            element_class: "ElementClass".to_string(),
        },
        input_type: InputType::NormalInput,
        param: Some(ident.to_string()),
    }
}

#[tokio::test]
async fn test_open_missing_file_starts_empty() {
    let (_dir, store) = temp_store().await;
    assert!(store.requests().is_empty());
    assert!(store.steps().is_empty());
    assert!(store.actions().is_empty());
}

#[tokio::test]
async fn test_open_corrupt_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    tokio::fs::write(&path, "{not json").await.unwrap();
    let result = Store::open(&path).await;
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

#[tokio::test]
async fn test_append_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = Store::open(&path).await.unwrap();
    store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap();

    // A fresh open sees the persisted entry.
    let reopened = Store::open(&path).await.unwrap();
    assert_eq!(reopened.requests().len(), 1);
    assert_eq!(reopened.requests()[0].action, "users");
    assert_eq!(reopened.actions(), &["users".to_string()]);
}

#[tokio::test]
async fn test_append_request_dedups_url_method() {
    let (_dir, mut store) = temp_store().await;
    assert!(store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap());
    assert!(!store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap());
    // Same URL with a different method is a new entry.
    assert!(store
        .append_request(request("https://example.com/api/users", HttpMethod::Put))
        .await
        .unwrap());
    assert_eq!(store.requests().len(), 2);
}

#[tokio::test]
async fn test_append_windowed_dedup() {
    let (_dir, mut store) = temp_store().await;
    let first = request("https://example.com/api/users", HttpMethod::Post);
    assert!(store.append_request_windowed(first, 1000).await.unwrap());

    // Within the window: duplicate.
    let near = request("https://example.com/api/users", HttpMethod::Post);
    assert!(!store.append_request_windowed(near, 1000).await.unwrap());

    // Outside the window: new entry.
    let mut late = request("https://example.com/api/users", HttpMethod::Post);
    late.time = Utc::now() + ChronoDuration::seconds(5);
    assert!(store.append_request_windowed(late, 1000).await.unwrap());
    assert_eq!(store.requests().len(), 2);
}

#[tokio::test]
async fn test_action_index_first_seen_order() {
    let (_dir, mut store) = temp_store().await;
    store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap();
    store
        .append_request(request("https://example.com/api/orders", HttpMethod::Post))
        .await
        .unwrap();
    store
        .append_request(request("https://example.com/v2/users", HttpMethod::Post))
        .await
        .unwrap();
    assert_eq!(store.actions(), &["users".to_string(), "orders".to_string()]);
}

#[tokio::test]
async fn test_set_edited_url_and_payload() {
    let (_dir, mut store) = temp_store().await;
    store
        .append_request(request("https://example.com/api/login", HttpMethod::Post))
        .await
        .unwrap();

    store
        .set_edited_url(0, Some("https://staging.example.com/api/login".to_string()))
        .await
        .unwrap();
    store
        .set_edited_payload(0, Some(Some(Payload::Text("user=bob".to_string()))))
        .await
        .unwrap();

    let record = &store.requests()[0];
    assert_eq!(record.effective_url(), "https://staging.example.com/api/login");
    assert_eq!(
        record.effective_payload(),
        Some(&Payload::Text("user=bob".to_string()))
    );

    // Revert drops both edits.
    store.set_edited_url(0, None).await.unwrap();
    store.set_edited_payload(0, None).await.unwrap();
    assert_eq!(store.requests()[0].effective_url(), "https://example.com/api/login");
}

#[tokio::test]
async fn test_edit_bad_index() {
    let (_dir, mut store) = temp_store().await;
    let result = store.set_edited_url(3, Some("x".to_string())).await;
    assert!(matches!(result, Err(StoreError::BadIndex(3))));
}

#[tokio::test]
async fn test_append_step_last_wins() {
    let (_dir, mut store) = temp_store().await;
    store
        .append_step(step("Username", "Enter Username \"<Username>\""))
        .await
        .unwrap();
    store
        .append_step(step("Password", "Enter Password \"<Password>\""))
        .await
        .unwrap();

    // Same identifier replaces in place; order is preserved.
    let mut fresher = step("Username", "Enter Username \"<Username>\"");
    fresher.locator.selector = Selector::ByName {
        tag: "input".to_string(),
        name: "user".to_string(),
    };
    store.append_step(fresher).await.unwrap();

    assert_eq!(store.steps().len(), 2);
    assert_eq!(store.steps()[0].locator.ident, "Username");
    assert_eq!(
        store.steps()[0].locator.selector,
        Selector::ByName {
            tag: "input".to_string(),
            name: "user".to_string()
        }
    );
}

#[tokio::test]
async fn test_merge_params_overwrites() {
    let (_dir, mut store) = temp_store().await;
    let mut first = BTreeMap::new();
    first.insert("Username".to_string(), "amy".to_string());
    first.insert("City".to_string(), "Oslo".to_string());
    store.merge_params(first).await.unwrap();

    let mut second = BTreeMap::new();
    second.insert("Username".to_string(), "bob".to_string());
    store.merge_params(second).await.unwrap();

    assert_eq!(store.param_values().get("Username").map(String::as_str), Some("bob"));
    assert_eq!(store.param_values().get("City").map(String::as_str), Some("Oslo"));
}

#[tokio::test]
async fn test_reset_keeps_settings() {
    let (_dir, mut store) = temp_store().await;
    store
        .update_settings(RunnerSettings {
            base_url: "https://staging.example.com".to_string(),
            ..RunnerSettings::default()
        })
        .await
        .unwrap();
    store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap();
    store
        .append_step(step("Username", "Enter Username \"<Username>\""))
        .await
        .unwrap();

    store.reset().await.unwrap();

    assert!(store.requests().is_empty());
    assert!(store.actions().is_empty());
    assert!(store.steps().is_empty());
    assert!(store.param_values().is_empty());
    assert_eq!(store.settings().base_url, "https://staging.example.com");
}

#[tokio::test]
async fn test_control_messages() {
    let (_dir, mut store) = temp_store().await;

    store.handle(ControlMessage::Toggle(true)).await.unwrap();
    assert!(store.ui_config().capture_enabled);

    store
        .handle(ControlMessage::SetMenuName("Orders".to_string()))
        .await
        .unwrap();
    assert_eq!(store.ui_config().menu_name, "Orders");

    store
        .handle(ControlMessage::SetElementClass("OrderElements".to_string()))
        .await
        .unwrap();
    assert_eq!(store.ui_config().element_class, "OrderElements");

    store
        .handle(ControlMessage::SetPageClass("OrderPage".to_string()))
        .await
        .unwrap();
    assert_eq!(store.ui_config().page_class, "OrderPage");

    store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap();
    store.handle(ControlMessage::Reset).await.unwrap();
    assert!(store.requests().is_empty());
    // Reset is data-only.
    assert!(store.ui_config().capture_enabled);
}

#[tokio::test]
async fn test_storage_changed_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = Store::open(&path).await.unwrap();
    store
        .append_request(request("https://example.com/api/users", HttpMethod::Post))
        .await
        .unwrap();

    // Another writer replaces the document on disk.
    let mut other = Store::open(&path).await.unwrap();
    other.reset().await.unwrap();

    store.handle(ControlMessage::StorageChanged).await.unwrap();
    assert!(store.requests().is_empty());
}

#[tokio::test]
async fn test_partial_document_deserializes() {
    // Older documents missing newer sections still open.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    tokio::fs::write(&path, r#"{"requests": []}"#).await.unwrap();
    let store = Store::open(&path).await.unwrap();
    assert_eq!(store.settings().timeout_ms, 2000);
    assert!(!store.ui_config().capture_enabled);
}
