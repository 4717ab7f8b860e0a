//! Prosecutor-impersonation scenario definition.
//!
//! Node layout:
//! - 1 start node ("start" is a reserved word on the hosting platform, so the
//!   id is `start_node`)
//! - 5 advance stages (`stage1_contact` .. `stage5_transfer`), one per
//!   escalation tactic
//! - 5 persuasion counter-stages (`persuade1_soft` .. `persuade5_final`),
//!   paired with the stage whose doubt they answer
//! - 3 ending-prompt nodes (closing persona lines) and 3 terminal end nodes,
//!   one per classified outcome
//!
//! Branch semantics per advance stage: progress on compliance, divert to the
//! paired persuasion stage on mild doubt, jump to the rejected ending on firm
//! refusal. Persuasion stages either recover to the next advance stage or
//! fall through to the suspected ending. All of it is edge data; adding a
//! scenario means a new prompt library and node/edge tables, not new code.

use std::collections::BTreeMap;

use crate::error::ScenarioResult;
use crate::scenario::context::{honorific, inject_context, UserContext};
use crate::scenario::graph::{
    Edge, EndNode, Node, Position, ScenarioGraph, StageNode, StartNode, TransitionCondition,
};
use crate::scenario::metadata::{CorrectResponse, DetectionPoint, ScenarioMetadata};
use crate::scenario::prompts;
use crate::scenario::termination::ScenarioOutcome;
use crate::scenario::ScenarioType;

/// Number of advance stages in the escalation sequence.
pub const TOTAL_STAGES: u32 = 5;

pub const START_NODE: &str = "start_node";

pub const STAGE1_CONTACT: &str = "stage1_contact";
pub const STAGE2_FEAR: &str = "stage2_fear";
pub const STAGE3_ISOLATE: &str = "stage3_isolate";
pub const STAGE4_ACTION: &str = "stage4_action";
pub const STAGE5_TRANSFER: &str = "stage5_transfer";

pub const PERSUADE1_SOFT: &str = "persuade1_soft";
pub const PERSUADE2_REASSURE: &str = "persuade2_reassure";
pub const PERSUADE3_AGGRESSIVE: &str = "persuade3_aggressive";
pub const PERSUADE4_LEGAL: &str = "persuade4_legal";
pub const PERSUADE5_FINAL: &str = "persuade5_final";

pub const END_REJECTED_PROMPT: &str = "end_rejected_prompt";
pub const END_SUSPECTED_PROMPT: &str = "end_suspected_prompt";
pub const END_FOOLED_PROMPT: &str = "end_fooled_prompt";

pub const END_REJECTED: &str = "end_rejected";
pub const END_SUSPECTED: &str = "end_suspected";
pub const END_FOOLED: &str = "end_fooled";

fn stage(
    label: &str,
    x: i32,
    y: i32,
    prompt: &str,
    stage: Option<u32>,
    edge_order: &[&str],
) -> Node {
    Node::Stage(StageNode {
        label: label.to_string(),
        position: Position { x, y },
        prompt: prompt.to_string(),
        edge_order: edge_order.iter().map(|s| s.to_string()).collect(),
        stage,
    })
}

fn llm_edge(source: &str, target: &str, predicate: &str) -> Edge {
    Edge {
        source: source.to_string(),
        target: target.to_string(),
        condition: TransitionCondition::Llm {
            predicate: predicate.to_string(),
        },
    }
}

fn unconditional_edge(source: &str, target: &str) -> Edge {
    Edge {
        source: source.to_string(),
        target: target.to_string(),
        condition: TransitionCondition::Unconditional,
    }
}

/// Build the prosecutor scenario graph: 17 nodes, 28 edges.
pub fn build_graph() -> ScenarioResult<ScenarioGraph> {
    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();

    nodes.insert(
        START_NODE.to_string(),
        Node::Start(StartNode {
            position: Position { x: 0, y: 300 },
            edge_order: vec!["start_node_to_stage1".to_string()],
        }),
    );

    // Advance stages
    nodes.insert(
        STAGE1_CONTACT.to_string(),
        stage(
            "접촉 및 신뢰 구축",
            200,
            300,
            prompts::STAGE1_CONTACT_PROMPT,
            Some(1),
            &["stage1_to_stage2", "stage1_to_persuade1", "stage1_to_rejected"],
        ),
    );
    nodes.insert(
        STAGE2_FEAR.to_string(),
        stage(
            "공포 유발",
            400,
            300,
            prompts::STAGE2_FEAR_PROMPT,
            Some(2),
            &["stage2_to_stage3", "stage2_to_persuade2", "stage2_to_rejected"],
        ),
    );
    nodes.insert(
        STAGE3_ISOLATE.to_string(),
        stage(
            "고립 유도",
            600,
            300,
            prompts::STAGE3_ISOLATE_PROMPT,
            Some(3),
            &["stage3_to_stage4", "stage3_to_persuade3", "stage3_to_rejected"],
        ),
    );
    nodes.insert(
        STAGE4_ACTION.to_string(),
        stage(
            "행동 유도",
            800,
            300,
            prompts::STAGE4_ACTION_PROMPT,
            Some(4),
            &["stage4_to_stage5", "stage4_to_persuade4", "stage4_to_rejected"],
        ),
    );
    nodes.insert(
        STAGE5_TRANSFER.to_string(),
        stage(
            "자산 이전 요구",
            1000,
            300,
            prompts::STAGE5_TRANSFER_PROMPT,
            Some(5),
            &["stage5_to_fooled", "stage5_to_persuade5", "stage5_to_rejected"],
        ),
    );

    // Persuasion counter-stages
    nodes.insert(
        PERSUADE1_SOFT.to_string(),
        stage(
            "부드러운 설득",
            200,
            100,
            prompts::PERSUADE1_SOFT_PROMPT,
            None,
            &["persuade1_to_stage2", "persuade1_to_suspected"],
        ),
    );
    nodes.insert(
        PERSUADE2_REASSURE.to_string(),
        stage(
            "회유 + 시간압박",
            400,
            100,
            prompts::PERSUADE2_REASSURE_PROMPT,
            None,
            &["persuade2_to_stage3", "persuade2_to_suspected"],
        ),
    );
    nodes.insert(
        PERSUADE3_AGGRESSIVE.to_string(),
        stage(
            "적반하장",
            600,
            100,
            prompts::PERSUADE3_AGGRESSIVE_PROMPT,
            None,
            &["persuade3_to_stage4", "persuade3_to_suspected"],
        ),
    );
    nodes.insert(
        PERSUADE4_LEGAL.to_string(),
        stage(
            "법적 협박",
            800,
            100,
            prompts::PERSUADE4_LEGAL_PROMPT,
            None,
            &["persuade4_to_stage5", "persuade4_to_suspected"],
        ),
    );
    nodes.insert(
        PERSUADE5_FINAL.to_string(),
        stage(
            "최종 압박",
            1000,
            100,
            prompts::PERSUADE5_FINAL_PROMPT,
            None,
            &["persuade5_to_fooled", "persuade5_to_suspected"],
        ),
    );

    // Ending-prompt nodes: closing persona lines, then an unconditional hop
    // to the matching terminal.
    nodes.insert(
        END_REJECTED_PROMPT.to_string(),
        stage(
            "종료 안내 (거부)",
            1100,
            500,
            prompts::END_REJECTED_PROMPT,
            None,
            &["end_rejected_prompt_to_end_rejected"],
        ),
    );
    nodes.insert(
        END_SUSPECTED_PROMPT.to_string(),
        stage(
            "종료 안내 (의심)",
            1100,
            100,
            prompts::END_SUSPECTED_PROMPT,
            None,
            &["end_suspected_prompt_to_end_suspected"],
        ),
    );
    nodes.insert(
        END_FOOLED_PROMPT.to_string(),
        stage(
            "종료 안내 (속음)",
            1100,
            300,
            prompts::END_FOOLED_PROMPT,
            None,
            &["end_fooled_prompt_to_end_fooled"],
        ),
    );

    // Terminal end nodes
    nodes.insert(
        END_REJECTED.to_string(),
        Node::End(EndNode {
            position: Position { x: 1200, y: 500 },
            outcome: ScenarioOutcome::UserRejected,
        }),
    );
    nodes.insert(
        END_SUSPECTED.to_string(),
        Node::End(EndNode {
            position: Position { x: 1200, y: 100 },
            outcome: ScenarioOutcome::UserSuspected,
        }),
    );
    nodes.insert(
        END_FOOLED.to_string(),
        Node::End(EndNode {
            position: Position { x: 1200, y: 300 },
            outcome: ScenarioOutcome::UserFooled,
        }),
    );

    let mut edges: BTreeMap<String, Edge> = BTreeMap::new();

    edges.insert(
        "start_node_to_stage1".to_string(),
        unconditional_edge(START_NODE, STAGE1_CONTACT),
    );

    // Stage 1
    edges.insert(
        "stage1_to_stage2".to_string(),
        llm_edge(
            STAGE1_CONTACT,
            STAGE2_FEAR,
            "사용자가 질문에 답하거나, 협조적인 태도를 보이거나, 무슨 일인지 물어봄",
        ),
    );
    edges.insert(
        "stage1_to_persuade1".to_string(),
        llm_edge(
            STAGE1_CONTACT,
            PERSUADE1_SOFT,
            "사용자가 \"정말 검찰이에요?\", \"사기 아니에요?\", \"어떻게 믿어요?\" 등 의심을 표현하지만 아직 끊겠다고 하지는 않음",
        ),
    );
    edges.insert(
        "stage1_to_rejected".to_string(),
        llm_edge(
            STAGE1_CONTACT,
            END_REJECTED_PROMPT,
            "사용자가 \"끊을게요\", \"112에 확인할게요\", \"가족한테 물어볼게요\" 등 명확히 거부하거나 외부 확인 의사를 밝힘",
        ),
    );

    // Persuade 1
    edges.insert(
        "persuade1_to_stage2".to_string(),
        llm_edge(
            PERSUADE1_SOFT,
            STAGE2_FEAR,
            "사용자가 \"그래요?\", \"알겠어요\", \"무슨 일인데요?\" 등 대화를 계속할 의사를 보임",
        ),
    );
    edges.insert(
        "persuade1_to_suspected".to_string(),
        llm_edge(
            PERSUADE1_SOFT,
            END_SUSPECTED_PROMPT,
            "사용자가 계속 의심하거나, 끊겠다고 하거나, 확인하겠다고 고집함",
        ),
    );

    // Stage 2
    edges.insert(
        "stage2_to_stage3".to_string(),
        llm_edge(
            STAGE2_FEAR,
            STAGE3_ISOLATE,
            "사용자가 걱정하거나, 어떻게 해야 하는지 물어보거나, 자신은 안 했다고 해명하려 함. 또는 \"네\", \"알겠습니다\", \"진행하세요\", \"빨리 하세요\" 같은 동의/협조 표현",
        ),
    );
    edges.insert(
        "stage2_to_persuade2".to_string(),
        llm_edge(
            STAGE2_FEAR,
            PERSUADE2_REASSURE,
            "사용자가 \"이거 사기 아니에요?\", \"말이 안 되는데요\", \"진짜인지 모르겠어요\" 등 의심을 표현",
        ),
    );
    edges.insert(
        "stage2_to_rejected".to_string(),
        llm_edge(
            STAGE2_FEAR,
            END_REJECTED_PROMPT,
            "사용자가 끊겠다고 하거나, 외부에 확인하겠다고 함",
        ),
    );

    // Persuade 2
    edges.insert(
        "persuade2_to_stage3".to_string(),
        llm_edge(
            PERSUADE2_REASSURE,
            STAGE3_ISOLATE,
            "사용자가 \"그럼 뭘 해야 해요?\", \"알겠어요\" 등 협조 의사를 보임",
        ),
    );
    edges.insert(
        "persuade2_to_suspected".to_string(),
        llm_edge(
            PERSUADE2_REASSURE,
            END_SUSPECTED_PROMPT,
            "사용자가 여전히 의심하거나 거부함",
        ),
    );

    // Stage 3
    edges.insert(
        "stage3_to_stage4".to_string(),
        llm_edge(
            STAGE3_ISOLATE,
            STAGE4_ACTION,
            "사용자가 수긍하거나, 다음 지시를 기다리거나, 걱정하는 반응을 보임. 또는 \"네\", \"알겠어요\", \"계속 말씀하세요\", \"확인했습니다\", \"빨리 하세요\" 같은 동의/진행 요청",
        ),
    );
    edges.insert(
        "stage3_to_persuade3".to_string(),
        llm_edge(
            STAGE3_ISOLATE,
            PERSUADE3_AGGRESSIVE,
            "사용자가 \"이상한데요\", \"왜요?\", \"그래도 확인해볼게요\" 등 의심 (특히 비밀 유지 부분)",
        ),
    );
    edges.insert(
        "stage3_to_rejected".to_string(),
        llm_edge(
            STAGE3_ISOLATE,
            END_REJECTED_PROMPT,
            "사용자가 \"가족한테 먼저 물어볼게요\", \"끊을게요\" 등 거부",
        ),
    );

    // Persuade 3
    edges.insert(
        "persuade3_to_stage4".to_string(),
        llm_edge(
            PERSUADE3_AGGRESSIVE,
            STAGE4_ACTION,
            "사용자가 당황하거나, 미안해하거나, \"아, 그게 아니라...\" 등 태도가 누그러짐",
        ),
    );
    edges.insert(
        "persuade3_to_suspected".to_string(),
        llm_edge(
            PERSUADE3_AGGRESSIVE,
            END_SUSPECTED_PROMPT,
            "사용자가 \"그래도 끊을게요\", \"확인할게요\" 등 입장을 고수",
        ),
    );

    // Stage 4
    edges.insert(
        "stage4_to_stage5".to_string(),
        llm_edge(
            STAGE4_ACTION,
            STAGE5_TRANSFER,
            "사용자가 앱 설치하겠다고 하거나, 정보를 제공하려 하거나, 지시를 따를 의사를 보임",
        ),
    );
    edges.insert(
        "stage4_to_persuade4".to_string(),
        llm_edge(
            STAGE4_ACTION,
            PERSUADE4_LEGAL,
            "사용자가 \"앱은 왜요?\", \"정보는 왜 필요해요?\" 등 의심",
        ),
    );
    edges.insert(
        "stage4_to_rejected".to_string(),
        llm_edge(
            STAGE4_ACTION,
            END_REJECTED_PROMPT,
            "사용자가 정보 제공을 거부하거나 끊겠다고 함",
        ),
    );

    // Persuade 4
    edges.insert(
        "persuade4_to_stage5".to_string(),
        llm_edge(
            PERSUADE4_LEGAL,
            STAGE5_TRANSFER,
            "사용자가 두려워하거나 협조하겠다고 함",
        ),
    );
    edges.insert(
        "persuade4_to_suspected".to_string(),
        llm_edge(
            PERSUADE4_LEGAL,
            END_SUSPECTED_PROMPT,
            "사용자가 거부를 고수하거나 끊겠다고 함",
        ),
    );

    // Stage 5
    edges.insert(
        "stage5_to_fooled".to_string(),
        llm_edge(
            STAGE5_TRANSFER,
            END_FOOLED_PROMPT,
            "사용자가 이체하겠다고 하거나, 계좌번호를 받아적거나, 협조 의사를 보임",
        ),
    );
    edges.insert(
        "stage5_to_persuade5".to_string(),
        llm_edge(
            STAGE5_TRANSFER,
            PERSUADE5_FINAL,
            "사용자가 \"돈을 왜 보내요?\", \"이상한데요\" 등 의심",
        ),
    );
    edges.insert(
        "stage5_to_rejected".to_string(),
        llm_edge(
            STAGE5_TRANSFER,
            END_REJECTED_PROMPT,
            "사용자가 명확히 거부하거나 끊겠다고 함",
        ),
    );

    // Persuade 5
    edges.insert(
        "persuade5_to_fooled".to_string(),
        llm_edge(
            PERSUADE5_FINAL,
            END_FOOLED_PROMPT,
            "사용자가 두려워서 협조하겠다고 함",
        ),
    );
    edges.insert(
        "persuade5_to_suspected".to_string(),
        llm_edge(PERSUADE5_FINAL, END_SUSPECTED_PROMPT, "사용자가 끝까지 거부"),
    );

    // Ending prompts run to their terminals unconditionally
    edges.insert(
        "end_rejected_prompt_to_end_rejected".to_string(),
        unconditional_edge(END_REJECTED_PROMPT, END_REJECTED),
    );
    edges.insert(
        "end_suspected_prompt_to_end_suspected".to_string(),
        unconditional_edge(END_SUSPECTED_PROMPT, END_SUSPECTED),
    );
    edges.insert(
        "end_fooled_prompt_to_end_fooled".to_string(),
        unconditional_edge(END_FOOLED_PROMPT, END_FOOLED),
    );

    ScenarioGraph::new(nodes, edges)
}

/// Render the base persona directive for a trainee, with the
/// relationship-appropriate address term appended.
pub fn base_prompt(context: &UserContext) -> String {
    let rendered = inject_context(prompts::BASE_SYSTEM_PROMPT, context);
    format!(
        "{}\n\n# 호칭\n상대방을 \"{}\"라고 부릅니다.",
        rendered,
        honorific(context)
    )
}

/// Scenario card metadata for the prosecutor scenario.
pub fn metadata() -> ScenarioMetadata {
    ScenarioMetadata {
        id: ScenarioType::Prosecutor,
        name: "검찰 사칭".to_string(),
        description: "검사를 사칭해 계좌가 범죄에 연루되었다며 자산 이전을 요구하는 시나리오".to_string(),
        impersonation: "서울중앙지방검찰청 검사".to_string(),
        target_action: "안전계좌로 이체".to_string(),
        icon: "gavel".to_string(),
        detection_points: vec![
            DetectionPoint {
                pattern: "전화로 수사 내용을 통보".to_string(),
                explanation: "검찰·경찰은 전화로 사건 연루를 통보하지 않습니다".to_string(),
            },
            DetectionPoint {
                pattern: "비밀 유지 요구".to_string(),
                explanation: "가족·은행에 말하지 말라는 요구는 확인 경로를 끊으려는 수법입니다".to_string(),
            },
            DetectionPoint {
                pattern: "안전계좌 이체 요구".to_string(),
                explanation: "수사기관에는 안전계좌라는 것이 존재하지 않습니다".to_string(),
            },
        ],
        correct_responses: vec![
            CorrectResponse {
                action: "일단 끊기".to_string(),
                description: "수사기관을 사칭하는 전화는 끊어도 불이익이 없습니다".to_string(),
            },
            CorrectResponse {
                action: "112에 직접 확인".to_string(),
                description: "끊은 뒤 직접 112나 해당 기관 대표번호로 확인합니다".to_string(),
            },
            CorrectResponse {
                action: "가족에게 알리기".to_string(),
                description: "혼자 판단하지 말고 바로 가족과 상의합니다".to_string(),
            },
        ],
    }
}
