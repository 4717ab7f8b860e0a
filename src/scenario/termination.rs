//! Termination tag protocol.
//!
//! The persona signals scenario completion in-band, inside its own generated
//! speech text, with a tag of the form
//! `[END_SCENARIO:{"reached_stage":3,"termination_reason":"user_rejected"}]`
//! or the bare fallback `[END_SCENARIO]`. Detection is deliberately lenient
//! (any tag-shaped marker counts) while payload parsing is strict: a malformed
//! payload is not an error, it just yields no structured signal.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Classified scenario outcome carried by the termination tag.
///
/// Maps 1:1 to the three ending branches of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// Trainee refused early or insisted on outside verification.
    UserRejected,
    /// Trainee held firm through a persuasion counter-stage.
    UserSuspected,
    /// Trainee complied all the way through the asset-transfer demand.
    UserFooled,
}

impl ScenarioOutcome {
    /// Get the outcome name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioOutcome::UserRejected => "user_rejected",
            ScenarioOutcome::UserSuspected => "user_suspected",
            ScenarioOutcome::UserFooled => "user_fooled",
        }
    }
}

impl std::fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScenarioOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_rejected" => Ok(ScenarioOutcome::UserRejected),
            "user_suspected" => Ok(ScenarioOutcome::UserSuspected),
            "user_fooled" => Ok(ScenarioOutcome::UserFooled),
            _ => Err(format!("Unknown scenario outcome: {}", s)),
        }
    }
}

/// Structured termination signal extracted from a persona utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationSignal {
    /// Highest escalation stage the trainee reached before the scenario ended.
    pub reached_stage: u32,
    /// Classified outcome.
    pub termination_reason: ScenarioOutcome,
}

impl TerminationSignal {
    /// Create a signal.
    pub fn new(reached_stage: u32, termination_reason: ScenarioOutcome) -> Self {
        Self {
            reached_stage,
            termination_reason,
        }
    }

    /// Default signal for a bare `[END_SCENARIO]` tag with no payload.
    ///
    /// Stage 0 and the worst-case `user_fooled` outcome. Policy constant
    /// pinned by tests; do not change without product sign-off.
    pub fn fallback() -> Self {
        Self {
            reached_stage: 0,
            termination_reason: ScenarioOutcome::UserFooled,
        }
    }

    /// Render the annotated wire form of this signal.
    pub fn to_tag(&self) -> String {
        format!(
            r#"[END_SCENARIO:{{"reached_stage":{},"termination_reason":"{}"}}]"#,
            self.reached_stage, self.termination_reason
        )
    }
}

/// Strict payload shape for the annotated tag. Extra fields are tolerated;
/// a non-integer stage or unknown reason string fails the whole parse.
#[derive(Debug, Deserialize)]
struct TagPayload {
    reached_stage: u32,
    termination_reason: ScenarioOutcome,
}

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[END_SCENARIO(:\{.*?\})?\]").expect("valid regex"))
}

fn payload_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[END_SCENARIO:(\{[^}]+\})\]").expect("valid regex"))
}

fn strip_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[END_SCENARIO(:\{[^}]*\})?\]").expect("valid regex"))
}

/// True if either tag form appears anywhere in `text`.
///
/// Lenient by design: this only detects *intent* to terminate, without
/// requiring a valid payload.
pub fn has_end_tag(text: &str) -> bool {
    any_tag_re().is_match(text)
}

/// Parse the termination signal out of `text`, if any.
///
/// Tries the annotated form first; a payload that is not valid JSON, has a
/// non-integer `reached_stage`, or carries an unrecognized
/// `termination_reason` yields `None` for that form. If the bare
/// `[END_SCENARIO]` tag is present instead, returns
/// [`TerminationSignal::fallback`]. Returns `None` when neither form matches.
pub fn parse_end_tag(text: &str) -> Option<TerminationSignal> {
    if let Some(caps) = payload_tag_re().captures(text) {
        if let Ok(payload) = serde_json::from_str::<TagPayload>(&caps[1]) {
            return Some(TerminationSignal {
                reached_stage: payload.reached_stage,
                termination_reason: payload.termination_reason,
            });
        }
    }

    if text.contains("[END_SCENARIO]") {
        return Some(TerminationSignal::fallback());
    }

    None
}

/// Remove either tag form from `text` for display, trimming the result.
pub fn strip_end_tag(text: &str) -> String {
    strip_tag_re().replace_all(text, "").trim().to_string()
}

// ============================================================================
// Keyword-based termination scan
// ============================================================================

/// Trainee phrases that count as an explicit refusal.
pub const REJECTION_KEYWORDS: &[&str] = &[
    "안 해요",
    "안 할게요",
    "끊을게요",
    "끊겠습니다",
    "사기",
    "신고",
    "경찰",
    "112",
];

/// Trainee phrases that signal suspicion without outright refusal.
pub const SUSPICION_KEYWORDS: &[&str] = &[
    "이상해",
    "의심",
    "확인해볼게",
    "직접 전화",
    "가족한테",
    "은행에 확인",
];

/// Markers the persona emits when the scripted scenario has run to its end.
pub const SCENARIO_END_KEYWORDS: &[&str] = &["[END_SCENARIO]"];

/// Coarse reason produced by the keyword scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordReason {
    /// The scripted scenario signalled its own end.
    ScenarioEnd,
    /// The trainee refused.
    UserRejection,
    /// The trainee voiced suspicion.
    UserSuspicion,
}

/// A keyword hit in an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch {
    pub reason: KeywordReason,
    pub keyword: &'static str,
}

/// Scan `text` for termination keywords.
///
/// Scenario-end markers are matched case-sensitively and take priority;
/// rejection and suspicion phrases are matched case-insensitively.
pub fn detect_termination(text: &str) -> Option<KeywordMatch> {
    let lower = text.to_lowercase();

    for keyword in SCENARIO_END_KEYWORDS {
        if text.contains(keyword) {
            return Some(KeywordMatch {
                reason: KeywordReason::ScenarioEnd,
                keyword,
            });
        }
    }

    for keyword in REJECTION_KEYWORDS {
        if lower.contains(&keyword.to_lowercase()) {
            return Some(KeywordMatch {
                reason: KeywordReason::UserRejection,
                keyword,
            });
        }
    }

    for keyword in SUSPICION_KEYWORDS {
        if lower.contains(&keyword.to_lowercase()) {
            return Some(KeywordMatch {
                reason: KeywordReason::UserSuspicion,
                keyword,
            });
        }
    }

    None
}
