//! Training session lifecycle.
//!
//! One training attempt = one [`TrainingSession`], owned end-to-end by the
//! [`SessionController`] independent of which voice platform executes the
//! scenario graph.

mod controller;

pub use controller::SessionController;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scenario::{ScenarioOutcome, ScenarioType, UserContext};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    /// No session in flight.
    #[default]
    Idle,
    /// Session allocated, waiting for the platform to connect.
    Preparing,
    /// Call connected; transcript and timer are live.
    InCall,
    /// Call ended; debrief pending trainee acknowledgement.
    Debriefing,
    /// Debrief acknowledged and history record persisted.
    Completed,
}

impl TrainingStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Idle => "idle",
            TrainingStatus::Preparing => "preparing",
            TrainingStatus::InCall => "in_call",
            TrainingStatus::Debriefing => "debriefing",
            TrainingStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The simulated scam caller.
    Persona,
    /// The human trainee.
    Trainee,
}

/// Why a session ended.
///
/// The first three map 1:1 to the scenario's classified outcomes; the rest
/// are controller-level reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    UserRejected,
    UserSuspected,
    UserFooled,
    /// Platform disconnected without a termination signal.
    CallEnded,
    /// The duration cap forcibly ended the call.
    MaxDurationReached,
    /// The trainee hung up from the app.
    UserEnded,
}

impl EndReason {
    /// Get the reason name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::UserRejected => "user_rejected",
            EndReason::UserSuspected => "user_suspected",
            EndReason::UserFooled => "user_fooled",
            EndReason::CallEnded => "call_ended",
            EndReason::MaxDurationReached => "max_duration_reached",
            EndReason::UserEnded => "user_ended",
        }
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ScenarioOutcome> for EndReason {
    fn from(outcome: ScenarioOutcome) -> Self {
        match outcome {
            ScenarioOutcome::UserRejected => EndReason::UserRejected,
            ScenarioOutcome::UserSuspected => EndReason::UserSuspected,
            ScenarioOutcome::UserFooled => EndReason::UserFooled,
        }
    }
}

/// One training attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Opaque unique token.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub scenario_type: ScenarioType,
    /// Highest escalation stage reached; monotonically non-decreasing.
    pub reached_stage: u32,
    /// Set exactly once, at end.
    pub termination_reason: Option<EndReason>,
    pub duration_seconds: Option<u32>,
    /// Platform-side conversation id, once known.
    pub conversation_id: Option<String>,
    pub user_context: UserContext,
}

impl TrainingSession {
    /// Allocate a fresh session for a scenario.
    pub fn new(scenario_type: ScenarioType, user_context: UserContext) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            scenario_type,
            reached_stage: 0,
            termination_reason: None,
            duration_seconds: None,
            conversation_id: None,
            user_context,
        }
    }
}

/// One captured utterance. Append-only; insertion order is the canonical
/// conversation order. Persona text may still contain an unstripped
/// termination tag - stripping is a presentation concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_blank() {
        let session = TrainingSession::new(ScenarioType::Prosecutor, UserContext::default());
        assert!(!session.id.is_empty());
        assert_eq!(session.reached_stage, 0);
        assert!(session.started_at.is_none());
        assert!(session.ended_at.is_none());
        assert!(session.termination_reason.is_none());
        assert!(session.duration_seconds.is_none());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = TrainingSession::new(ScenarioType::Prosecutor, UserContext::default());
        let b = TrainingSession::new(ScenarioType::Prosecutor, UserContext::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_end_reason_from_outcome() {
        assert_eq!(
            EndReason::from(ScenarioOutcome::UserRejected),
            EndReason::UserRejected
        );
        assert_eq!(
            EndReason::from(ScenarioOutcome::UserFooled),
            EndReason::UserFooled
        );
    }

    #[test]
    fn test_status_and_reason_names() {
        assert_eq!(TrainingStatus::InCall.as_str(), "in_call");
        assert_eq!(EndReason::MaxDurationReached.as_str(), "max_duration_reached");
        assert_eq!(format!("{}", TrainingStatus::Debriefing), "debriefing");
    }
}
