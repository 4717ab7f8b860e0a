//! Scenario card metadata shown to trainees before and after a call.

use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioType;

/// A tell-tale pattern of the scam, with the explanation surfaced in the
/// debrief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionPoint {
    pub pattern: String,
    pub explanation: String,
}

/// A recommended trainee response, with its rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectResponse {
    pub action: String,
    pub description: String,
}

/// Descriptive metadata for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub id: ScenarioType,
    pub name: String,
    pub description: String,
    /// Who the persona pretends to be.
    pub impersonation: String,
    /// What the scam ultimately tries to make the trainee do.
    pub target_action: String,
    pub icon: String,
    pub detection_points: Vec<DetectionPoint>,
    pub correct_responses: Vec<CorrectResponse>,
}
