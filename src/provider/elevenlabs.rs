//! ElevenLabs Conversational AI REST client.
//!
//! Used for provisioning: creating or updating the hosted agent (conversation
//! config plus workflow graph) and fetching the signed websocket URL a call
//! connects to. Transient failures are retried with exponential backoff.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::types::{CreateAgentRequest, CreateAgentResponse, SignedUrlResponse};
use crate::config::{ElevenLabsConfig, RequestConfig};
use crate::error::{ProviderError, ProviderResult};

/// Client for the ElevenLabs Conversational AI API
#[derive(Clone)]
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: String,
    request_config: RequestConfig,
}

impl ElevenLabsClient {
    /// Create a new ElevenLabs client
    pub fn new(config: &ElevenLabsConfig, request_config: RequestConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a hosted conversational agent.
    pub async fn create_agent(
        &self,
        request: &CreateAgentRequest,
    ) -> ProviderResult<CreateAgentResponse> {
        let url = format!("{}/v1/convai/agents/create", self.base_url);
        info!(agent = %request.name, "Creating conversational agent");

        self.with_retries("create_agent", || async {
            let response = self
                .client
                .post(&url)
                .header("xi-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            Self::parse_json(response).await
        })
        .await
    }

    /// Update an existing agent in place.
    pub async fn update_agent(
        &self,
        agent_id: &str,
        request: &CreateAgentRequest,
    ) -> ProviderResult<Value> {
        let url = format!("{}/v1/convai/agents/{}", self.base_url, agent_id);
        info!(agent_id = %agent_id, "Updating conversational agent");

        self.with_retries("update_agent", || async {
            let response = self
                .client
                .patch(&url)
                .header("xi-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            Self::parse_json(response).await
        })
        .await
    }

    /// Fetch the current agent definition.
    pub async fn get_agent(&self, agent_id: &str) -> ProviderResult<Value> {
        let url = format!("{}/v1/convai/agents/{}", self.base_url, agent_id);
        debug!(agent_id = %agent_id, "Fetching agent definition");

        self.with_retries("get_agent", || async {
            let response = self
                .client
                .get(&url)
                .header("xi-api-key", &self.api_key)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            Self::parse_json(response).await
        })
        .await
    }

    /// Fetch a short-lived signed websocket URL for starting a call.
    pub async fn get_signed_url(&self, agent_id: &str) -> ProviderResult<SignedUrlResponse> {
        let url = format!(
            "{}/v1/convai/conversation/get-signed-url?agent_id={}",
            self.base_url, agent_id
        );
        debug!(agent_id = %agent_id, "Fetching signed URL");

        self.with_retries("get_signed_url", || async {
            let response = self
                .client
                .get(&url)
                .header("xi-api-key", &self.api_key)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            Self::parse_json(response).await
        })
        .await
    }

    /// Run `attempt` with bounded retries and exponential backoff.
    async fn with_retries<T, F, Fut>(&self, operation: &str, attempt: F) -> ProviderResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ProviderResult<T>>,
    {
        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    operation = %operation,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying ElevenLabs request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match attempt().await {
                Ok(value) => {
                    let latency = start.elapsed();
                    info!(
                        operation = %operation,
                        latency_ms = latency.as_millis(),
                        "ElevenLabs request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    let latency = start.elapsed();
                    error!(
                        operation = %operation,
                        error = %e,
                        latency_ms = latency.as_millis(),
                        retry = retries,
                        "ElevenLabs request failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(ProviderError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else {
            ProviderError::Http(e)
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ProviderResult<T> {
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ElevenLabsConfig {
            api_key: "test_key".to_string(),
            base_url: "https://api.elevenlabs.io/".to_string(),
            agent_id: None,
        };

        let client = ElevenLabsClient::new(&config, RequestConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.elevenlabs.io");
    }
}
