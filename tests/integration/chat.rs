//! Relay endpoint integration tests
//!
//! Exercises POST /api/chat end to end against a mock upstream: validation,
//! the liveness probe short-circuit, option clamping on the forwarded
//! payload, and upstream error translation.

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{anthropic_mocks, test_data, RelayTestHarness};
use courier::RelayVariant;

#[tokio::test]
async fn test_valid_request_returns_assistant_choice() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "Hi! Doing well.").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(body["choices"][0]["message"]["content"], "Hi! Doing well.");
    assert_eq!(body["choices"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reply_text_is_trimmed() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "  padded reply  ").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "padded reply");
}

#[tokio::test]
async fn test_ping_short_circuits_without_upstream_call() {
    let harness = RelayTestHarness::new().await;
    // No mock mounted: any upstream call would show up in received_requests.

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::ping_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["choices"][0]["message"]["content"], "pong");
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");

    assert!(harness.upstream_requests().await.is_empty());
}

#[tokio::test]
async fn test_options_are_clamped_on_forwarded_payload() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "ok").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::request_with_options(5000, 250.0))
        .await;
    response.assert_status_ok();

    let requests = harness.upstream_requests().await;
    assert_eq!(requests.len(), 1);
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(forwarded["max_tokens"], 4096);
    assert_eq!(forwarded["temperature"], 1.0);
    assert!(forwarded.get("system").is_none());
    assert_eq!(forwarded["model"], crate::common::constants::TEST_MODEL);
}

#[tokio::test]
async fn test_default_options_on_forwarded_payload() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "ok").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;
    response.assert_status_ok();

    let requests = harness.upstream_requests().await;
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(forwarded["max_tokens"], 1024);
    assert_eq!(forwarded["temperature"], 0.7);
}

#[tokio::test]
async fn test_system_prompt_forwarded_when_present() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "ok").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({
            "messages": [{ "role": "user", "content": "Hello" }],
            "options": { "systemPrompt": "Answer in French." }
        }))
        .await;
    response.assert_status_ok();

    let requests = harness.upstream_requests().await;
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(forwarded["system"], "Answer in French.");
}

#[tokio::test]
async fn test_malformed_entries_are_filtered_before_forwarding() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "ok").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({
            "messages": [
                { "role": "user", "content": "  Hello  " },
                { "content": "no role" },
                { "role": "assistant" },
                { "role": "assistant", "content": "   " },
                { "role": "system", "content": "coerced to user" }
            ],
            "options": {}
        }))
        .await;
    response.assert_status_ok();

    let requests = harness.upstream_requests().await;
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = forwarded["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], json!({ "role": "user", "content": "Hello" }));
    assert_eq!(
        messages[1],
        json!({ "role": "user", "content": "coerced to user" })
    );
}

#[tokio::test]
async fn test_missing_messages_is_bad_request() {
    let harness = RelayTestHarness::new().await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "options": {} }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("error").is_some());
    assert!(harness.upstream_requests().await.is_empty());
}

#[tokio::test]
async fn test_missing_options_is_bad_request() {
    let harness = RelayTestHarness::new().await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_after_filtering_is_bad_request() {
    let harness = RelayTestHarness::new().await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({
            "messages": [{ "role": "user", "content": "   " }],
            "options": {}
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(harness.upstream_requests().await.is_empty());
}

#[tokio::test]
async fn test_assistant_first_is_rejected_before_upstream() {
    let harness = RelayTestHarness::new().await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({
            "messages": [
                { "role": "assistant", "content": "I'm ready to help!" },
                { "role": "user", "content": "Hello" }
            ],
            "options": {}
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(harness.upstream_requests().await.is_empty());
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let harness = RelayTestHarness::new().await;

    let response = harness.server.get("/api/chat").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    let response = harness.server.delete("/api/chat").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_upstream_error_message_is_extracted() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_error(&harness.upstream, 401, "invalid x-api-key").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid x-api-key");
    // 401 carries auth guidance in details, derived from the status code.
    assert!(body["details"].as_str().unwrap().contains("API key"));
}

#[tokio::test]
async fn test_upstream_rate_limit_guidance() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_error(&harness.upstream, 429, "rate limited").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["details"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn test_unparseable_upstream_error_uses_excerpt() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_error_raw(&harness.upstream, 502, "Bad Gateway from LB").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Bad Gateway from LB");
}

#[tokio::test]
async fn test_empty_content_list_is_format_error() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_empty_content(&harness.upstream).await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unexpected response from upstream provider");
}

#[tokio::test]
async fn test_non_json_success_body_is_format_error() {
    let harness = RelayTestHarness::new().await;
    anthropic_mocks::mock_messages_garbage(&harness.upstream).await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unexpected response from upstream provider");
}

#[tokio::test]
async fn test_missing_api_key_is_config_error() {
    use courier::{routes, AppState};

    let upstream = wiremock::MockServer::start().await;
    let mut config = crate::common::test_config(&upstream.uri(), RelayVariant::MultiTurn);
    config.anthropic_api_key = None;

    let state = Arc::new(AppState::new(config).unwrap());
    let server = axum_test::TestServer::new(routes::create_router(state)).unwrap();

    let response = server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Server configuration error");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_is_swappable_behind_the_trait() {
    use courier::{chat::CompletionParams, routes, AppResult, AppState, ChatBackend};

    struct CannedBackend;

    #[async_trait::async_trait]
    impl ChatBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn complete(&self, params: &CompletionParams) -> AppResult<String> {
            Ok(format!("echo of {} messages", params.messages.len()))
        }
    }

    let config = crate::common::test_config("http://unused", RelayVariant::MultiTurn);
    let state = Arc::new(AppState::new_for_testing(config, Arc::new(CannedBackend)));
    let server = axum_test::TestServer::new(routes::create_router(state)).unwrap();

    let response = server
        .post("/api/chat")
        .json(&test_data::valid_request())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "echo of 1 messages"
    );
}

#[tokio::test]
async fn test_single_turn_variant_forwards_only_last_message() {
    let harness = RelayTestHarness::with_variant(RelayVariant::SingleTurn).await;
    anthropic_mocks::mock_messages_success(&harness.upstream, "ok").await;

    let response = harness
        .server
        .post("/api/chat")
        .json(&json!({
            "messages": [
                { "role": "user", "content": "first" },
                { "role": "assistant", "content": "reply" },
                { "role": "user", "content": "last" }
            ],
            "options": {}
        }))
        .await;
    response.assert_status_ok();

    let requests = harness.upstream_requests().await;
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = forwarded["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "last");
}
