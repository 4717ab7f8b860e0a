//! Hosted-agent provisioning payloads for the prosecutor scenario.

use serde::{Deserialize, Serialize};

use super::types::{
    AgentConfig, AgentPrompt, AsrConfig, ConversationConfig, CreateAgentRequest, TtsConfig,
    VoiceSettings,
};
use crate::error::ScenarioResult;
use crate::scenario::{prompts, prosecutor, ScenarioType};

/// Korean male voice (authoritative, low register). Swap for a dedicated
/// Korean voice before a real deployment.
pub const KOREAN_MALE_VOICE_ID: &str = "nPczCjzI2devNBz1zQrb";

/// Descriptive metadata about the provisioned agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub name: String,
    pub description: String,
    pub scenario_type: ScenarioType,
    pub version: String,
}

/// Metadata for the prosecutor agent.
pub fn prosecutor_agent_metadata() -> AgentMetadata {
    AgentMetadata {
        name: "검찰 사칭 보이스피싱 시뮬레이션".to_string(),
        description: "보이스피싱 예방 교육을 위한 검찰 사칭 시나리오 시뮬레이션".to_string(),
        scenario_type: ScenarioType::Prosecutor,
        version: "1.0.0".to_string(),
    }
}

/// TTS/ASR/agent configuration for the prosecutor persona.
pub fn prosecutor_conversation_config() -> ConversationConfig {
    ConversationConfig {
        tts: TtsConfig {
            voice_id: KOREAN_MALE_VOICE_ID.to_string(),
            model_id: Some("eleven_turbo_v2_5".to_string()),
            optimize_streaming_latency: Some(3),
            voice_settings: Some(VoiceSettings {
                speed: Some(1.2),
                ..Default::default()
            }),
        },
        asr: AsrConfig {
            provider: "elevenlabs".to_string(),
            model: None,
            language: Some("ko".to_string()),
        },
        agent: AgentConfig {
            prompt: AgentPrompt {
                llm: "gpt-4o-mini".to_string(),
                prompt: prompts::BASE_SYSTEM_PROMPT.to_string(),
            },
            first_message: Some(prompts::FIRST_MESSAGE.to_string()),
            language: Some("ko".to_string()),
        },
    }
}

/// Full creation payload: conversation config plus the workflow graph in
/// wire form.
pub fn prosecutor_agent_request() -> ScenarioResult<CreateAgentRequest> {
    let workflow = prosecutor::build_graph()?.to_workflow();
    Ok(CreateAgentRequest {
        name: prosecutor_agent_metadata().name,
        conversation_config: prosecutor_conversation_config(),
        workflow: Some(workflow),
    })
}
