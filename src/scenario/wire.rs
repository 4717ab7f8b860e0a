//! Provider wire shape for workflow graphs.
//!
//! The conversational-AI platform hosts the workflow as two flat keyed tables
//! with string-id cross-references. These types mirror that JSON shape
//! exactly; [`ScenarioGraph::to_workflow`] maps the internal model onto it,
//! dropping behavioral metadata (stage indices, outcome classification) the
//! platform has no field for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scenario::graph::{Node, Position, ScenarioGraph, TransitionCondition};

/// A node as the workflow-hosting API expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowNode {
    Start {
        position: Position,
        edge_order: Vec<String>,
    },
    /// Stage and persuasion nodes: the persona keeps its base configuration
    /// and layers this node's directive on top.
    OverrideAgent {
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        position: Position,
        additional_prompt: String,
        edge_order: Vec<String>,
    },
    End {
        position: Position,
    },
}

/// Transition condition in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForwardCondition {
    Unconditional,
    Llm { condition: String },
}

/// An edge as the workflow-hosting API expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub source: String,
    pub target: String,
    pub forward_condition: ForwardCondition,
}

/// The complete workflow payload: flat node and edge tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub nodes: BTreeMap<String, WorkflowNode>,
    pub edges: BTreeMap<String, WorkflowEdge>,
}

impl ScenarioGraph {
    /// Export this graph in the provider wire shape.
    pub fn to_workflow(&self) -> WorkflowDefinition {
        let nodes = self
            .nodes()
            .iter()
            .map(|(id, node)| {
                let wire = match node {
                    Node::Start(n) => WorkflowNode::Start {
                        position: n.position,
                        edge_order: n.edge_order.clone(),
                    },
                    Node::Stage(n) => WorkflowNode::OverrideAgent {
                        label: Some(n.label.clone()),
                        position: n.position,
                        additional_prompt: n.prompt.clone(),
                        edge_order: n.edge_order.clone(),
                    },
                    Node::End(n) => WorkflowNode::End {
                        position: n.position,
                    },
                };
                (id.clone(), wire)
            })
            .collect();

        let edges = self
            .edges()
            .iter()
            .map(|(id, edge)| {
                let forward_condition = match &edge.condition {
                    TransitionCondition::Unconditional => ForwardCondition::Unconditional,
                    TransitionCondition::Llm { predicate } => ForwardCondition::Llm {
                        condition: predicate.clone(),
                    },
                };
                (
                    id.clone(),
                    WorkflowEdge {
                        source: edge.source.clone(),
                        target: edge.target.clone(),
                        forward_condition,
                    },
                )
            })
            .collect();

        WorkflowDefinition { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::prosecutor;

    #[test]
    fn test_workflow_export_preserves_topology() {
        let graph = prosecutor::build_graph().unwrap();
        let workflow = graph.to_workflow();

        assert_eq!(workflow.nodes.len(), graph.nodes().len());
        assert_eq!(workflow.edges.len(), graph.edges().len());

        for (id, edge) in &workflow.edges {
            assert!(workflow.nodes.contains_key(&edge.source), "edge {}", id);
            assert!(workflow.nodes.contains_key(&edge.target), "edge {}", id);
        }
    }

    #[test]
    fn test_workflow_node_tagging() {
        let graph = prosecutor::build_graph().unwrap();
        let json = serde_json::to_value(graph.to_workflow()).unwrap();

        assert_eq!(json["nodes"][prosecutor::START_NODE]["type"], "start");
        assert_eq!(
            json["nodes"][prosecutor::STAGE1_CONTACT]["type"],
            "override_agent"
        );
        assert_eq!(json["nodes"][prosecutor::END_FOOLED]["type"], "end");

        // end nodes carry no prompt and no outcome field on the wire
        assert!(json["nodes"][prosecutor::END_FOOLED]
            .get("additional_prompt")
            .is_none());
        assert!(json["nodes"][prosecutor::END_FOOLED].get("outcome").is_none());
    }

    #[test]
    fn test_workflow_condition_tagging() {
        let graph = prosecutor::build_graph().unwrap();
        let json = serde_json::to_value(graph.to_workflow()).unwrap();

        assert_eq!(
            json["edges"]["start_node_to_stage1"]["forward_condition"]["type"],
            "unconditional"
        );
        assert_eq!(
            json["edges"]["stage1_to_stage2"]["forward_condition"]["type"],
            "llm"
        );
        assert!(json["edges"]["stage1_to_stage2"]["forward_condition"]["condition"]
            .as_str()
            .map_or(false, |s| !s.is_empty()));
    }
}
