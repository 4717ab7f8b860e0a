//! End-to-end walks of the prosecutor scenario graph.
//!
//! Replays full conversations against scripted judges and checks which
//! classified ending the walk reaches, and at which stage. The judge stands
//! in for the conversational LLM that evaluates transition predicates in
//! production.

use vishing_trainer::scenario::graph::Node;
use vishing_trainer::scenario::{
    prosecutor, ScenarioOutcome, ScenarioWalker, ScriptedJudge, TurnOutcome,
};

#[test]
fn test_graph_is_well_formed() {
    let graph = prosecutor::build_graph().expect("prosecutor graph must validate");

    // Exactly one start node.
    let starts: Vec<_> = graph
        .nodes()
        .iter()
        .filter(|(_, node)| node.is_start())
        .collect();
    assert_eq!(starts.len(), 1);
    assert_eq!(graph.start_node_id(), prosecutor::START_NODE);

    // Every end node has zero outgoing edges.
    for (id, node) in graph.nodes() {
        if node.is_end() {
            let outgoing = graph.edges().values().filter(|e| &e.source == id).count();
            assert_eq!(outgoing, 0, "end node {} must have no exits", id);
        }
    }

    // 1 start + 5 stages + 5 persuasions + 3 ending prompts + 3 terminals.
    assert_eq!(graph.nodes().len(), 17);
    assert_eq!(graph.edges().len(), 28);
}

#[test]
fn test_full_compliance_reaches_fooled_at_stage_5() {
    let graph = prosecutor::build_graph().unwrap();
    // Answer yes to every "progress" predicate, no to everything else.
    let judge = ScriptedJudge::new(false)
        .answer("협조적인 태도", true)
        .answer("걱정하거나", true)
        .answer("수긍하거나", true)
        .answer("앱 설치하겠다고", true)
        .answer("이체하겠다고", true);

    let mut walker = ScenarioWalker::new(&graph, &judge);
    assert_eq!(walker.current_node(), prosecutor::STAGE1_CONTACT);

    let responses = [
        "네, 무슨 일이시죠?",
        "네? 제가요? 어떻게 해야 하나요?",
        "알겠습니다, 아무한테도 말 안 할게요",
        "앱 설치할게요",
        "이체하겠습니다",
    ];

    let mut last = TurnOutcome::Stayed {
        node: String::new(),
    };
    for response in responses {
        last = walker.advance(response);
    }

    assert_eq!(
        last,
        TurnOutcome::Finished {
            outcome: ScenarioOutcome::UserFooled,
            reached_stage: 5
        }
    );
}

#[test]
fn test_immediate_refusal_reaches_rejected_at_stage_1() {
    let graph = prosecutor::build_graph().unwrap();
    let judge = ScriptedJudge::new(false).answer("명확히 거부하거나 외부 확인 의사", true);

    let mut walker = ScenarioWalker::new(&graph, &judge);
    let outcome = walker.advance("끊을게요, 112에 확인하겠습니다");

    assert_eq!(
        outcome,
        TurnOutcome::Finished {
            outcome: ScenarioOutcome::UserRejected,
            reached_stage: 1
        }
    );
}

#[test]
fn test_persuasion_holdout_reaches_suspected() {
    let graph = prosecutor::build_graph().unwrap();
    // Doubt at stage 1, then holding firm through the soft persuasion.
    let judge = ScriptedJudge::new(false)
        .answer("의심을 표현하지만", true)
        .answer("계속 의심하거나", true);

    let mut walker = ScenarioWalker::new(&graph, &judge);

    assert_eq!(
        walker.advance("정말 검찰이에요? 사기 아니에요?"),
        TurnOutcome::Moved {
            node: prosecutor::PERSUADE1_SOFT.to_string()
        }
    );
    assert_eq!(
        walker.advance("아무래도 이상해요, 확인해볼게요"),
        TurnOutcome::Finished {
            outcome: ScenarioOutcome::UserSuspected,
            reached_stage: 1
        }
    );
}

#[test]
fn test_late_persuasion_can_still_recover_to_fooled() {
    let graph = prosecutor::build_graph().unwrap();
    // Comply to stage 5, balk at the transfer, then cave under final
    // pressure.
    let judge = ScriptedJudge::new(false)
        .answer("협조적인 태도", true)
        .answer("걱정하거나", true)
        .answer("수긍하거나", true)
        .answer("앱 설치하겠다고", true)
        .answer("돈을 왜 보내요", true)
        .answer("두려워서 협조하겠다고", true);

    let mut walker = ScenarioWalker::new(&graph, &judge);
    for response in ["네", "어떡하죠", "알겠습니다", "설치했어요"] {
        walker.advance(response);
    }
    assert_eq!(walker.current_node(), prosecutor::STAGE5_TRANSFER);

    assert_eq!(
        walker.advance("돈을 왜 보내요?"),
        TurnOutcome::Moved {
            node: prosecutor::PERSUADE5_FINAL.to_string()
        }
    );
    assert_eq!(
        walker.advance("알겠어요, 보낼게요..."),
        TurnOutcome::Finished {
            outcome: ScenarioOutcome::UserFooled,
            reached_stage: 5
        }
    );
}

#[test]
fn test_stage_5_direct_refusal_is_rejected_not_suspected() {
    let graph = prosecutor::build_graph().unwrap();
    let judge = ScriptedJudge::new(false)
        .answer("협조적인 태도", true)
        .answer("걱정하거나", true)
        .answer("수긍하거나", true)
        .answer("앱 설치하겠다고", true)
        .answer("명확히 거부하거나 끊겠다고", true);

    let mut walker = ScenarioWalker::new(&graph, &judge);
    for response in ["네", "어떡하죠", "알겠습니다", "설치했어요"] {
        walker.advance(response);
    }

    assert_eq!(
        walker.advance("절대 못 보냅니다. 끊어요."),
        TurnOutcome::Finished {
            outcome: ScenarioOutcome::UserRejected,
            reached_stage: 5
        }
    );
}

#[test]
fn test_silence_never_advances() {
    let graph = prosecutor::build_graph().unwrap();
    let judge = ScriptedJudge::new(false);
    let mut walker = ScenarioWalker::new(&graph, &judge);

    for _ in 0..3 {
        assert_eq!(
            walker.advance("..."),
            TurnOutcome::Stayed {
                node: prosecutor::STAGE1_CONTACT.to_string()
            }
        );
    }
    assert_eq!(walker.reached_stage(), 1);
    assert_eq!(walker.outcome(), None);
}

#[test]
fn test_every_stage_prompt_is_nonempty() {
    let graph = prosecutor::build_graph().unwrap();
    for (id, node) in graph.nodes() {
        if let Node::Stage(stage) = node {
            assert!(!stage.prompt.trim().is_empty(), "node {} has no prompt", id);
        }
    }
}
