//! Scripted conversational scenario workflows.
//!
//! This module is the simulation core: the declarative node/edge graph that
//! drives the scam-caller persona through escalating stages, the prompt
//! library and trainee-context injection that parameterize it, the in-band
//! termination tag protocol, and a deterministic executor for testing graph
//! behavior against a scripted judge.

pub mod context;
pub mod executor;
pub mod graph;
pub mod metadata;
pub mod prompts;
pub mod prosecutor;
pub mod termination;
pub mod wire;

pub use context::{
    context_description, dynamic_variables, honorific, inject_context, preset_by_id, presets,
    AgeGroup, Preset, Region, UserContext,
};
pub use executor::{ScenarioWalker, ScriptedJudge, TransitionJudge, TurnOutcome};
pub use graph::{
    Edge, EndNode, Node, Position, ScenarioGraph, StageNode, StartNode, TransitionCondition,
};
pub use metadata::{CorrectResponse, DetectionPoint, ScenarioMetadata};
pub use termination::{
    detect_termination, has_end_tag, parse_end_tag, strip_end_tag, KeywordMatch, KeywordReason,
    ScenarioOutcome, TerminationSignal,
};
pub use wire::{ForwardCondition, WorkflowDefinition, WorkflowEdge, WorkflowNode};

use serde::{Deserialize, Serialize};

/// Enumerated scenario identifier. One scenario = one graph definition;
/// only the prosecutor scenario ships a graph today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    /// Prosecutor impersonation ("your account is implicated").
    Prosecutor,
    /// Bank impersonation.
    Bank,
    /// Family-emergency pretext.
    FamilyEmergency,
    /// Delivery/subsidy pretext.
    DeliverySubsidy,
}

impl ScenarioType {
    /// Get the scenario identifier as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::Prosecutor => "prosecutor",
            ScenarioType::Bank => "bank",
            ScenarioType::FamilyEmergency => "family_emergency",
            ScenarioType::DeliverySubsidy => "delivery_subsidy",
        }
    }
}

impl std::fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScenarioType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prosecutor" => Ok(ScenarioType::Prosecutor),
            "bank" => Ok(ScenarioType::Bank),
            "family_emergency" => Ok(ScenarioType::FamilyEmergency),
            "delivery_subsidy" => Ok(ScenarioType::DeliverySubsidy),
            _ => Err(format!("Unknown scenario type: {}", s)),
        }
    }
}
