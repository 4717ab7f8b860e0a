//! Integration tests for the ElevenLabs provisioning client.
//!
//! Uses wiremock to stand in for the Conversational AI API, covering the
//! happy paths, the retry/backoff loop, and error mapping.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vishing_trainer::config::{ElevenLabsConfig, RequestConfig};
use vishing_trainer::error::ProviderError;
use vishing_trainer::provider::{prosecutor_agent_request, ElevenLabsClient};

fn client_for(server: &MockServer, max_retries: u32) -> ElevenLabsClient {
    let config = ElevenLabsConfig {
        api_key: "test_key".to_string(),
        base_url: server.uri(),
        agent_id: None,
    };
    let request_config = RequestConfig {
        timeout_ms: 5000,
        max_retries,
        retry_delay_ms: 10,
    };
    ElevenLabsClient::new(&config, request_config).unwrap()
}

#[tokio::test]
async fn test_create_agent_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/convai/agents/create"))
        .and(header("xi-api-key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agent_id": "agent_123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let request = prosecutor_agent_request().unwrap();
    let response = client.create_agent(&request).await.unwrap();

    assert_eq!(response.agent_id, "agent_123");
}

#[tokio::test]
async fn test_create_agent_retries_transient_failure() {
    let server = MockServer::start().await;

    // First attempt fails, the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/v1/convai/agents/create"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream hiccup"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/convai/agents/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agent_id": "agent_retry"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let request = prosecutor_agent_request().unwrap();
    let response = client.create_agent(&request).await.unwrap();

    assert_eq!(response.agent_id, "agent_retry");
}

#[tokio::test]
async fn test_exhausted_retries_surface_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/convai/agents/create"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let request = prosecutor_agent_request().unwrap();
    let err = client.create_agent(&request).await.unwrap_err();

    match err {
        ProviderError::Unavailable { retries, message } => {
            assert_eq!(retries, 2);
            assert!(message.contains("503"));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_signed_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/convai/conversation/get-signed-url"))
        .and(query_param("agent_id", "agent_123"))
        .and(header("xi-api-key", "test_key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"signed_url": "wss://live.example/abc"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let response = client.get_signed_url("agent_123").await.unwrap();

    assert_eq!(response.signed_url, "wss://live.example/abc");
}

#[tokio::test]
async fn test_update_agent_patches_existing() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/convai/agents/agent_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agent_id": "agent_123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let request = prosecutor_agent_request().unwrap();
    let value = client.update_agent("agent_123", &request).await.unwrap();

    assert_eq!(value["agent_id"], "agent_123");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/convai/conversation/get-signed-url"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.get_signed_url("agent_123").await.unwrap_err();

    // The retry wrapper reports the final failure; the underlying cause is
    // the parse error.
    assert!(matches!(err, ProviderError::Unavailable { .. }));
    assert!(err.to_string().contains("Failed to parse response"));
}
