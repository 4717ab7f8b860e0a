//! Scenario workflow graph model.
//!
//! A scenario is a directed graph: one start node, persona stage nodes with
//! ordered outgoing edges, and terminal end nodes. Transition conditions are
//! either unconditional or natural-language predicates judged against the
//! trainee's latest utterance by whatever drives the conversation. The graph
//! itself is pure data - it carries topology and text, never execution state.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::termination::ScenarioOutcome;

/// Layout position, display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Entry node of a scenario. Carries no prompt; its single ordered edge
/// points at the first stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartNode {
    pub position: Position,
    pub edge_order: Vec<String>,
}

/// A persona behavior node: the directive the persona follows while the
/// conversation sits on this node, plus its outgoing edges in evaluation
/// priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageNode {
    pub label: String,
    pub position: Position,
    /// Persona behavior directive, possibly containing `{{...}}` context
    /// placeholders.
    pub prompt: String,
    /// Outgoing edge ids; first matching condition wins.
    pub edge_order: Vec<String>,
    /// Escalation stage index (1-based) for advance stages. Persuasion and
    /// ending-prompt nodes carry `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<u32>,
}

/// Terminal node. No prompt, no exits; exists so the driving platform has an
/// unambiguous graph-terminal signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndNode {
    pub position: Position,
    /// Which classified outcome this terminal represents.
    pub outcome: ScenarioOutcome,
}

/// A node in the scenario graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Start(StartNode),
    Stage(StageNode),
    End(EndNode),
}

impl Node {
    /// Outgoing edge ids in evaluation order, if this node kind has exits.
    pub fn edge_order(&self) -> Option<&[String]> {
        match self {
            Node::Start(n) => Some(&n.edge_order),
            Node::Stage(n) => Some(&n.edge_order),
            Node::End(_) => None,
        }
    }

    /// The persona directive carried by this node, if any.
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Node::Stage(n) => Some(&n.prompt),
            _ => None,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Node::Start(_))
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Node::End(_))
    }
}

/// Condition under which an edge fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionCondition {
    /// Always fires when evaluated. Used as the sole exit of passthrough
    /// nodes; within a node that also has conditional exits it must be
    /// ordered last, as the fallback.
    Unconditional,
    /// Fires when a judge decides the natural-language predicate holds for
    /// the trainee's latest utterance.
    Llm { predicate: String },
}

/// A directed edge between two nodes of the owning graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub condition: TransitionCondition,
}

/// A complete, validated scenario graph.
///
/// Read-only once built; safe to share across concurrent sessions. Keyed
/// tables use [`BTreeMap`] so serialization order is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioGraph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<String, Edge>,
}

impl ScenarioGraph {
    /// Build a graph from node and edge tables, validating the structural
    /// invariants (see [`Self::validate`]).
    pub fn new(
        nodes: BTreeMap<String, Node>,
        edges: BTreeMap<String, Edge>,
    ) -> ScenarioResult<Self> {
        let graph = Self { nodes, edges };
        graph.validate()?;
        Ok(graph)
    }

    /// All nodes, keyed by id.
    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    /// All edges, keyed by id.
    pub fn edges(&self) -> &BTreeMap<String, Edge> {
        &self.edges
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Id of the unique start node.
    ///
    /// Validation guarantees exactly one exists.
    pub fn start_node_id(&self) -> &str {
        self.nodes
            .iter()
            .find(|(_, node)| node.is_start())
            .map(|(id, _)| id.as_str())
            .expect("validated graph has a start node")
    }

    /// Check the structural invariants:
    ///
    /// - exactly one start node, with no incoming edges and at least one exit
    /// - every edge endpoint names an existing node
    /// - each node's `edge_order` agrees exactly with its outgoing edge set
    /// - no conditional edge is ordered after an unconditional one
    /// - end nodes have no exits
    /// - every node is reachable from the start node
    pub fn validate(&self) -> ScenarioResult<()> {
        let start_id = self.find_single_start()?;

        for (edge_id, edge) in &self.edges {
            for node_id in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(node_id) {
                    return Err(ScenarioError::UnknownNode {
                        edge_id: edge_id.clone(),
                        node_id: node_id.clone(),
                    });
                }
            }
            if edge.target == start_id {
                return Err(ScenarioError::StartNodeEntered { node_id: start_id });
            }
        }

        self.check_edge_orders()?;
        self.check_reachability(&start_id)?;

        Ok(())
    }

    fn find_single_start(&self) -> ScenarioResult<String> {
        let mut start_id: Option<&str> = None;
        for (id, node) in &self.nodes {
            if node.is_start() {
                if let Some(first) = start_id {
                    return Err(ScenarioError::MultipleStartNodes {
                        first: first.to_string(),
                        second: id.clone(),
                    });
                }
                start_id = Some(id);
            }
        }
        let start_id = start_id.ok_or(ScenarioError::MissingStartNode)?;

        if self
            .nodes
            .get(start_id)
            .and_then(Node::edge_order)
            .map_or(true, |order| order.is_empty())
        {
            return Err(ScenarioError::StartNodeDeadEnd {
                node_id: start_id.to_string(),
            });
        }

        Ok(start_id.to_string())
    }

    fn check_edge_orders(&self) -> ScenarioResult<()> {
        for (node_id, node) in &self.nodes {
            let outgoing: HashSet<&str> = self
                .edges
                .iter()
                .filter(|(_, e)| e.source == *node_id)
                .map(|(id, _)| id.as_str())
                .collect();

            let Some(order) = node.edge_order() else {
                // End nodes declare no order and must have no exits.
                if !outgoing.is_empty() {
                    return Err(ScenarioError::EndNodeWithExits {
                        node_id: node_id.clone(),
                    });
                }
                continue;
            };

            let mut seen_unconditional = false;
            for edge_id in order {
                let Some(edge) = self.edges.get(edge_id) else {
                    return Err(ScenarioError::UnknownEdge {
                        node_id: node_id.clone(),
                        edge_id: edge_id.clone(),
                    });
                };
                if edge.source != *node_id {
                    return Err(ScenarioError::UnknownEdge {
                        node_id: node_id.clone(),
                        edge_id: edge_id.clone(),
                    });
                }
                match edge.condition {
                    TransitionCondition::Unconditional => seen_unconditional = true,
                    TransitionCondition::Llm { .. } if seen_unconditional => {
                        return Err(ScenarioError::UnreachableCondition {
                            node_id: node_id.clone(),
                            edge_id: edge_id.clone(),
                        });
                    }
                    TransitionCondition::Llm { .. } => {}
                }
            }

            let ordered: HashSet<&str> = order.iter().map(String::as_str).collect();
            for edge_id in outgoing {
                if !ordered.contains(edge_id) {
                    return Err(ScenarioError::UnorderedEdge {
                        node_id: node_id.clone(),
                        edge_id: edge_id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_reachability(&self, start_id: &str) -> ScenarioResult<()> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(start_id);
        queue.push_back(start_id);

        while let Some(id) = queue.pop_front() {
            if let Some(order) = self.nodes.get(id).and_then(Node::edge_order) {
                for edge_id in order {
                    if let Some(edge) = self.edges.get(edge_id) {
                        if visited.insert(&edge.target) {
                            queue.push_back(&edge.target);
                        }
                    }
                }
            }
        }

        for id in self.nodes.keys() {
            if !visited.contains(id.as_str()) {
                return Err(ScenarioError::UnreachableNode {
                    node_id: id.clone(),
                });
            }
        }
        Ok(())
    }
}
