//! Deterministic scenario graph execution.
//!
//! In production the hosting platform walks the graph itself, with the
//! conversational LLM acting as the transition judge. This module replays the
//! same semantics locally against any [`TransitionJudge`] implementation, so
//! graph behavior can be exercised without a live platform: edge_order gives
//! evaluation priority, the first edge whose condition holds wins, and
//! unconditional-only passthrough chains (ending prompt -> terminal) are
//! traversed without consuming a turn.

use tracing::debug;

use crate::scenario::graph::{Node, ScenarioGraph, TransitionCondition};
use crate::scenario::termination::ScenarioOutcome;

/// Decides whether a natural-language transition predicate holds for the
/// trainee's latest utterance.
///
/// Production judges delegate to an LLM; tests use scripted answers.
pub trait TransitionJudge {
    fn evaluate(&self, predicate: &str, utterance: &str) -> bool;
}

/// Any plain closure can act as a judge.
impl<F> TransitionJudge for F
where
    F: Fn(&str, &str) -> bool,
{
    fn evaluate(&self, predicate: &str, utterance: &str) -> bool {
        self(predicate, utterance)
    }
}

/// A judge with canned answers keyed by predicate substring.
///
/// The first rule whose key appears in the predicate text decides; predicates
/// matching no rule get `default_answer`.
#[derive(Debug, Default)]
pub struct ScriptedJudge {
    rules: Vec<(String, bool)>,
    default_answer: bool,
}

impl ScriptedJudge {
    /// Create a judge that answers `default_answer` for unscripted predicates.
    pub fn new(default_answer: bool) -> Self {
        Self {
            rules: Vec::new(),
            default_answer,
        }
    }

    /// Script an answer for predicates containing `predicate_fragment`.
    pub fn answer(mut self, predicate_fragment: &str, holds: bool) -> Self {
        self.rules.push((predicate_fragment.to_string(), holds));
        self
    }
}

impl TransitionJudge for ScriptedJudge {
    fn evaluate(&self, predicate: &str, _utterance: &str) -> bool {
        for (fragment, holds) in &self.rules {
            if predicate.contains(fragment.as_str()) {
                return *holds;
            }
        }
        self.default_answer
    }
}

/// Result of feeding one trainee utterance to the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// No outgoing condition held; the persona stays on the current node.
    Stayed { node: String },
    /// Moved to a new non-terminal node.
    Moved { node: String },
    /// Reached a terminal end node.
    Finished {
        outcome: ScenarioOutcome,
        reached_stage: u32,
    },
}

/// Replays a scenario graph turn-by-turn against a judge.
///
/// The walker holds the execution state the platform would normally keep in
/// its own working memory: the current node and the highest advance stage
/// entered so far.
pub struct ScenarioWalker<'a, J> {
    graph: &'a ScenarioGraph,
    judge: &'a J,
    current: String,
    reached_stage: u32,
    finished: Option<ScenarioOutcome>,
}

impl<'a, J: TransitionJudge> ScenarioWalker<'a, J> {
    /// Start a walk at the graph's start node, settling through its
    /// unconditional entry edge onto the first stage.
    pub fn new(graph: &'a ScenarioGraph, judge: &'a J) -> Self {
        let mut walker = Self {
            graph,
            judge,
            current: graph.start_node_id().to_string(),
            reached_stage: 0,
            finished: None,
        };
        walker.settle();
        walker
    }

    /// Id of the node the persona currently acts from.
    pub fn current_node(&self) -> &str {
        &self.current
    }

    /// Highest advance stage entered so far.
    pub fn reached_stage(&self) -> u32 {
        self.reached_stage
    }

    /// Outcome if the walk has reached a terminal node.
    pub fn outcome(&self) -> Option<ScenarioOutcome> {
        self.finished
    }

    /// Feed one trainee utterance and evaluate the current node's exits in
    /// priority order.
    pub fn advance(&mut self, utterance: &str) -> TurnOutcome {
        if let Some(outcome) = self.finished {
            return TurnOutcome::Finished {
                outcome,
                reached_stage: self.reached_stage,
            };
        }

        let Some(order) = self.graph.node(&self.current).and_then(Node::edge_order) else {
            // Current node is terminal; nothing to evaluate.
            return self.finish_or_stay();
        };

        let mut fired: Option<String> = None;
        for edge_id in order {
            let Some(edge) = self.graph.edge(edge_id) else {
                continue;
            };
            let holds = match &edge.condition {
                TransitionCondition::Unconditional => true,
                TransitionCondition::Llm { predicate } => {
                    self.judge.evaluate(predicate, utterance)
                }
            };
            if holds {
                debug!(edge = %edge_id, target = %edge.target, "transition fired");
                fired = Some(edge.target.clone());
                break;
            }
        }

        match fired {
            Some(target) => {
                self.enter(target);
                self.settle();
                self.finish_or_stay()
            }
            None => TurnOutcome::Stayed {
                node: self.current.clone(),
            },
        }
    }

    fn finish_or_stay(&mut self) -> TurnOutcome {
        match self.graph.node(&self.current) {
            Some(Node::End(end)) => {
                self.finished = Some(end.outcome);
                TurnOutcome::Finished {
                    outcome: end.outcome,
                    reached_stage: self.reached_stage,
                }
            }
            _ => TurnOutcome::Moved {
                node: self.current.clone(),
            },
        }
    }

    fn enter(&mut self, node_id: String) {
        if let Some(Node::Stage(stage)) = self.graph.node(&node_id) {
            if let Some(index) = stage.stage {
                self.reached_stage = self.reached_stage.max(index);
            }
        }
        self.current = node_id;
    }

    /// Chase passthrough nodes: while the current node's sole exit is
    /// unconditional, take it without consuming a turn.
    fn settle(&mut self) {
        loop {
            let Some(order) = self.graph.node(&self.current).and_then(Node::edge_order) else {
                return;
            };
            if order.len() != 1 {
                return;
            }
            let Some(edge) = self.graph.edge(&order[0]) else {
                return;
            };
            if edge.condition != TransitionCondition::Unconditional {
                return;
            }
            let target = edge.target.clone();
            self.enter(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::prosecutor;

    #[test]
    fn test_walker_settles_onto_first_stage() {
        let graph = prosecutor::build_graph().unwrap();
        let judge = ScriptedJudge::new(false);
        let walker = ScenarioWalker::new(&graph, &judge);
        assert_eq!(walker.current_node(), prosecutor::STAGE1_CONTACT);
        assert_eq!(walker.reached_stage(), 1);
        assert_eq!(walker.outcome(), None);
    }

    #[test]
    fn test_no_matching_predicate_stays_put() {
        let graph = prosecutor::build_graph().unwrap();
        let judge = ScriptedJudge::new(false);
        let mut walker = ScenarioWalker::new(&graph, &judge);
        let outcome = walker.advance("음...");
        assert_eq!(
            outcome,
            TurnOutcome::Stayed {
                node: prosecutor::STAGE1_CONTACT.to_string()
            }
        );
    }

    #[test]
    fn test_persuasion_detour_and_recovery() {
        let graph = prosecutor::build_graph().unwrap();
        // Doubt at stage 1, then willingness to continue.
        let judge = |predicate: &str, utterance: &str| match utterance {
            "사기 아니에요?" => predicate.contains("의심을 표현하지만"),
            "알겠어요" => predicate.contains("계속할 의사"),
            _ => false,
        };
        let mut walker = ScenarioWalker::new(&graph, &judge);

        assert_eq!(
            walker.advance("사기 아니에요?"),
            TurnOutcome::Moved {
                node: prosecutor::PERSUADE1_SOFT.to_string()
            }
        );
        assert_eq!(walker.reached_stage(), 1);

        assert_eq!(
            walker.advance("알겠어요"),
            TurnOutcome::Moved {
                node: prosecutor::STAGE2_FEAR.to_string()
            }
        );
        assert_eq!(walker.reached_stage(), 2);
    }

    #[test]
    fn test_finished_walker_is_inert() {
        let graph = prosecutor::build_graph().unwrap();
        let judge = ScriptedJudge::new(false).answer("명확히 거부하거나", true);
        let mut walker = ScenarioWalker::new(&graph, &judge);

        let first = walker.advance("끊을게요");
        assert_eq!(
            first,
            TurnOutcome::Finished {
                outcome: ScenarioOutcome::UserRejected,
                reached_stage: 1
            }
        );
        // Further turns keep reporting the same terminal result.
        assert_eq!(walker.advance("여보세요?"), first);
    }
}
