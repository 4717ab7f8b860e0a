//! Voice platform glue.
//!
//! The session controller never talks to a concrete provider; it sees one
//! capability surface: start a call with a persona setup, receive transcript
//! events, stop the call. Provider SDK specifics live behind
//! [`VoiceConnector`]/[`VoiceSession`] adapters. This module also carries the
//! REST client used to provision the hosted agent and its workflow graph.

pub mod agent;
pub mod elevenlabs;
pub mod types;
pub mod vapi;

pub use agent::{prosecutor_agent_request, prosecutor_conversation_config, AgentMetadata};
pub use elevenlabs::ElevenLabsClient;
pub use types::{
    AgentConfig, AgentPrompt, AsrConfig, ConversationConfig, CreateAgentRequest,
    CreateAgentResponse, SignedUrlResponse, TtsConfig, VoiceSettings,
};
pub use vapi::{prosecutor_assistant, VapiAssistant};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ProviderResult;
use crate::session::Speaker;

/// Everything needed to start one call.
#[derive(Debug, Clone)]
pub struct CallSetup {
    /// Short-lived signed websocket URL for the hosted agent.
    pub signed_url: String,
    /// Flat token -> value map for the platform's own template engine.
    pub dynamic_variables: HashMap<String, String>,
}

/// Events delivered by a live call, in platform order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The call connected.
    Connected,
    /// The platform hung up or the connection dropped.
    Disconnected,
    /// One transcript turn.
    Message { speaker: Speaker, text: String },
    /// Presentation-only speaking indicator; not recorded.
    ModeChange { speaking: bool },
    /// Recoverable platform error.
    Error { message: String },
}

/// Handle to a live call.
#[async_trait]
pub trait VoiceSession: Send + Sync {
    /// Request platform-side teardown of the call.
    async fn end(&self) -> ProviderResult<()>;
}

/// Starts calls on a concrete voice platform.
#[async_trait]
pub trait VoiceConnector: Send + Sync {
    /// Start a call, delivering its events into `events` until disconnect.
    async fn connect(
        &self,
        setup: CallSetup,
        events: mpsc::Sender<VoiceEvent>,
    ) -> ProviderResult<Arc<dyn VoiceSession>>;
}
