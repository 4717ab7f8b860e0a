//! Vapi transient-assistant payloads.
//!
//! The second provider surface: instead of a pre-provisioned hosted agent,
//! Vapi takes the full assistant definition at call start. The persona prompt
//! is rendered per-trainee before the call, the rejection keyword list doubles
//! as the platform's own hangup phrases, and the session duration cap is
//! mirrored into `max_duration_seconds` so the platform enforces it too.

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::scenario::termination::REJECTION_KEYWORDS;
use crate::scenario::{prosecutor, UserContext};

/// A chat message in the custom-LLM model block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapiMessage {
    pub role: String,
    pub content: String,
}

/// Custom-LLM model block pointed at an OpenAI-compatible endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapiModel {
    pub provider: String,
    pub model: String,
    pub url: String,
    pub messages: Vec<VapiMessage>,
}

/// 11labs voice block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapiVoice {
    pub provider: String,
    pub voice_id: String,
}

/// Deepgram transcriber block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapiTranscriber {
    pub provider: String,
    pub model: String,
    pub language: String,
}

/// A complete transient assistant definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapiAssistant {
    pub name: String,
    pub model: VapiModel,
    pub voice: VapiVoice,
    pub transcriber: VapiTranscriber,
    pub first_message: String,
    /// Trainee phrases that make the platform hang up on its own.
    pub end_call_phrases: Vec<String>,
    pub max_duration_seconds: u32,
}

/// Build a transient prosecutor assistant for one trainee.
///
/// `llm_url` is the OpenAI-compatible chat endpoint driving the persona.
pub fn prosecutor_assistant(
    context: &UserContext,
    session_config: &SessionConfig,
    llm_url: &str,
) -> VapiAssistant {
    VapiAssistant {
        name: "보이스피싱 훈련 (검찰 사칭)".to_string(),
        model: VapiModel {
            provider: "custom-llm".to_string(),
            model: "gemini-2.0-flash".to_string(),
            url: llm_url.to_string(),
            messages: vec![VapiMessage {
                role: "system".to_string(),
                content: prosecutor::base_prompt(context),
            }],
        },
        voice: VapiVoice {
            provider: "11labs".to_string(),
            voice_id: super::agent::KOREAN_MALE_VOICE_ID.to_string(),
        },
        transcriber: VapiTranscriber {
            provider: "deepgram".to_string(),
            model: "nova-2".to_string(),
            language: "ko".to_string(),
        },
        first_message: crate::scenario::prompts::FIRST_MESSAGE.to_string(),
        end_call_phrases: REJECTION_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        max_duration_seconds: session_config.max_call_duration_seconds,
    }
}
