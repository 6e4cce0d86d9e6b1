//! Tests for the attachment relay and the bot-post client against the
//! mock platform.

use std::sync::atomic::Ordering;

use groupme_bridge::groupme::client::GroupMeClient;
use groupme_bridge::groupme::upload::ImageRelay;
use groupme_bridge::AppError;

use super::test_helpers::{captured_posts, spawn_mock_platform, test_config};

#[tokio::test]
async fn successful_relay_returns_destination_url() {
    let mock = spawn_mock_platform().await;
    let config = test_config(&mock.base_url, true);
    let relay = ImageRelay::new(&config.groupme);

    let url = relay
        .relay(&format!("{}/attachments/ok.png", mock.base_url))
        .await
        .expect("relay should succeed");

    assert_eq!(url, "https://i.groupme.com/abc123");
    assert_eq!(mock.state.uploads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn source_404_fails_fast_without_upload() {
    let mock = spawn_mock_platform().await;
    let config = test_config(&mock.base_url, true);
    let relay = ImageRelay::new(&config.groupme);

    let err = relay
        .relay(&format!("{}/attachments/missing.png", mock.base_url))
        .await
        .expect_err("relay should fail");

    assert!(matches!(err, AppError::FetchFailed(404)));
    assert_eq!(mock.state.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_failure_is_reported_with_status() {
    let mock = spawn_mock_platform().await;
    mock.state.upload_status.store(500, Ordering::SeqCst);
    let config = test_config(&mock.base_url, true);
    let relay = ImageRelay::new(&config.groupme);

    let err = relay
        .relay(&format!("{}/attachments/ok.png", mock.base_url))
        .await
        .expect_err("relay should fail");

    assert!(matches!(err, AppError::UploadFailed(500)));
}

#[tokio::test]
async fn malformed_upload_response_is_a_parse_failure() {
    let mock = spawn_mock_platform().await;
    mock.state.upload_malformed.store(true, Ordering::SeqCst);
    let config = test_config(&mock.base_url, true);
    let relay = ImageRelay::new(&config.groupme);

    let err = relay
        .relay(&format!("{}/attachments/ok.png", mock.base_url))
        .await
        .expect_err("relay should fail");

    assert!(matches!(err, AppError::ParseFailed(_)));
}

#[tokio::test]
async fn non_json_upload_response_is_a_parse_failure() {
    let mock = spawn_mock_platform().await;
    mock.state.upload_not_json.store(true, Ordering::SeqCst);
    let config = test_config(&mock.base_url, true);
    let relay = ImageRelay::new(&config.groupme);

    let err = relay
        .relay(&format!("{}/attachments/ok.png", mock.base_url))
        .await
        .expect_err("relay should fail");

    assert!(matches!(err, AppError::ParseFailed(_)));
}

#[tokio::test]
async fn missing_credential_disables_relay_without_any_request() {
    let mock = spawn_mock_platform().await;
    let config = test_config(&mock.base_url, false);
    let relay = ImageRelay::new(&config.groupme);

    let err = relay
        .relay(&format!("{}/attachments/ok.png", mock.base_url))
        .await
        .expect_err("relay should fail");

    assert!(matches!(err, AppError::ConfigurationMissing(_)));
    assert_eq!(mock.state.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn post_with_image_carries_attachment_payload() {
    let mock = spawn_mock_platform().await;
    let config = test_config(&mock.base_url, true);
    let client = GroupMeClient::new(config.groupme);

    client
        .post("Bob sent an image", Some("https://i.groupme.com/abc123"))
        .await
        .expect("post should be accepted");

    let posts = captured_posts(&mock.state);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["attachments"][0]["type"].as_str(), Some("image"));
}

#[tokio::test]
async fn non_accepted_status_is_post_failed_not_a_fault() {
    let mock = spawn_mock_platform().await;
    mock.state.post_status.store(404, Ordering::SeqCst);
    let config = test_config(&mock.base_url, true);
    let client = GroupMeClient::new(config.groupme);

    let err = client.post("hello", None).await.expect_err("post should fail");
    assert!(matches!(err, AppError::PostFailed { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_destination_is_transport_failed() {
    let mut config = test_config("http://127.0.0.1:1", true);
    config.groupme.api_base = "http://127.0.0.1:1".into();
    let client = GroupMeClient::new(config.groupme);

    let err = client.post("hello", None).await.expect_err("post should fail");
    assert!(matches!(err, AppError::TransportFailed(_)));
}

#[tokio::test]
async fn group_history_lookup_finds_message_by_id() {
    let mock = spawn_mock_platform().await;
    mock.state
        .history
        .lock()
        .expect("history lock")
        .push(serde_json::json!({ "id": "g-7", "name": "Bob", "text": "hi there" }));
    let config = test_config(&mock.base_url, true);
    let client = GroupMeClient::new(config.groupme);

    let found = client
        .find_group_message("g-7")
        .await
        .expect("lookup should succeed");
    assert_eq!(found.map(|msg| msg.text), Some("hi there".into()));

    let missing = client
        .find_group_message("g-999")
        .await
        .expect("lookup should succeed");
    assert!(missing.is_none());
}

#[tokio::test]
async fn non_json_history_response_is_a_parse_failure() {
    let mock = spawn_mock_platform().await;
    mock.state.history_not_json.store(true, Ordering::SeqCst);
    let config = test_config(&mock.base_url, true);
    let client = GroupMeClient::new(config.groupme);

    let err = client
        .find_group_message("g-7")
        .await
        .expect_err("lookup should fail");
    assert!(matches!(err, AppError::ParseFailed(_)));
}

#[tokio::test]
async fn group_history_requires_credentials() {
    let mock = spawn_mock_platform().await;
    let config = test_config(&mock.base_url, false);
    let client = GroupMeClient::new(config.groupme);

    let err = client
        .find_group_message("g-7")
        .await
        .expect_err("lookup should fail");
    assert!(matches!(err, AppError::ConfigurationMissing(_)));
}
