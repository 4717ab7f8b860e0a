//! Trainee profile context and prompt parameterization.
//!
//! Scenario prompts carry `{{...}}` placeholder tokens that get resolved
//! against the trainee's profile before the persona directive is sent to the
//! driving platform. Substitution is literal string replacement: every
//! occurrence of a known token is replaced, unknown tokens are left alone,
//! and unset profile fields degrade to generic labels rather than failing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Trainee age bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "under50")]
    Under50,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60s")]
    Sixties,
    #[serde(rename = "70plus")]
    SeventyPlus,
}

impl AgeGroup {
    /// Korean display label.
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under50 => "50대 미만",
            AgeGroup::Fifties => "50대",
            AgeGroup::Sixties => "60대",
            AgeGroup::SeventyPlus => "70대 이상",
        }
    }
}

/// Trainee region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Seoul,
    Gyeonggi,
    Other,
}

impl Region {
    /// Korean display label.
    pub fn label(&self) -> &'static str {
        match self {
            Region::Seoul => "서울",
            Region::Gyeonggi => "경기",
            Region::Other => "기타 지역",
        }
    }
}

/// Trainee profile used to parameterize scenario prompts.
///
/// Everything is optional; the injector falls back to generic terms for
/// whatever is missing. Family status is carried both as flags and counts
/// because different entry surfaces collect one or the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_grandchildren: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grandchildren: Option<u32>,
}

impl UserContext {
    /// True if the profile indicates children, via flag or positive count.
    pub fn has_children(&self) -> bool {
        self.has_children.unwrap_or(false) || self.children.map_or(false, |n| n > 0)
    }

    /// True if the profile indicates grandchildren, via flag or positive count.
    pub fn has_grandchildren(&self) -> bool {
        self.has_grandchildren.unwrap_or(false) || self.grandchildren.map_or(false, |n| n > 0)
    }
}

/// Generic address term used when the age bracket is unknown.
const GENERIC_AGE_LABEL: &str = "어르신";

/// Generic region term used when the region is unknown.
const GENERIC_REGION_LABEL: &str = "해당 지역";

/// Resolve the `{{...}}` placeholder tokens in `template` against `context`.
///
/// Recognized tokens: `{{age_group}}`, `{{region}}`, `{{has_children}}`,
/// `{{has_grandchildren}}`. Unknown tokens are left untouched.
pub fn inject_context(template: &str, context: &UserContext) -> String {
    let age_label = context
        .age_group
        .map(|g| g.label())
        .unwrap_or(GENERIC_AGE_LABEL);
    let region_label = context
        .region
        .map(|r| r.label())
        .unwrap_or(GENERIC_REGION_LABEL);

    template
        .replace("{{age_group}}", age_label)
        .replace("{{region}}", region_label)
        .replace("{{has_children}}", &context.has_children().to_string())
        .replace(
            "{{has_grandchildren}}",
            &context.has_grandchildren().to_string(),
        )
}

/// Relationship-appropriate address term for the persona to use.
///
/// Grandchildren take precedence over children; with neither, a generic
/// aunt-equivalent honorific is used.
pub fn honorific(context: &UserContext) -> &'static str {
    if context.has_grandchildren() {
        return "할머니";
    }
    if context.has_children() {
        return "어머니";
    }
    "이모"
}

/// Flatten the profile into the provider's dynamic-variable map.
///
/// The platform's own template engine substitutes these into prompts at call
/// start. Unset brackets default to the 50s/Seoul labels here (the provider
/// path always needs a concrete value), unlike direct injection which uses
/// the generic terms.
pub fn dynamic_variables(context: &UserContext) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert(
        "age_group".to_string(),
        context
            .age_group
            .unwrap_or(AgeGroup::Fifties)
            .label()
            .to_string(),
    );
    vars.insert(
        "region".to_string(),
        context.region.unwrap_or(Region::Seoul).label().to_string(),
    );
    vars.insert(
        "children".to_string(),
        context.children.unwrap_or(0).to_string(),
    );
    vars.insert(
        "grandchildren".to_string(),
        context.grandchildren.unwrap_or(0).to_string(),
    );
    vars
}

/// Display string for a profile, e.g. `"50대 / 서울 / 자녀 2명"`.
pub fn context_description(context: &UserContext) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(age) = context.age_group {
        parts.push(age.label().to_string());
    }
    if let Some(region) = context.region {
        parts.push(region.label().to_string());
    }
    if context.has_children == Some(false) {
        parts.push("자녀 없음".to_string());
    } else if let Some(n) = context.children.filter(|n| *n > 0) {
        parts.push(format!("자녀 {}명", n));
    } else if context.has_children == Some(true) {
        parts.push("자녀 있음".to_string());
    }
    if context.has_grandchildren == Some(false) {
        parts.push("손주 없음".to_string());
    } else if let Some(n) = context.grandchildren.filter(|n| *n > 0) {
        parts.push(format!("손주 {}명", n));
    } else if context.has_grandchildren == Some(true) {
        parts.push("손주 있음".to_string());
    }

    parts.join(" / ")
}

// ============================================================================
// Trainee presets
// ============================================================================

/// A named trainee profile preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub context: UserContext,
}

/// Built-in trainee presets for quick session setup.
pub fn presets() -> Vec<Preset> {
    vec![
        Preset {
            id: "preset-1".to_string(),
            name: "김성철".to_string(),
            context: UserContext {
                user_name: Some("김성철".to_string()),
                age_group: Some(AgeGroup::Fifties),
                region: Some(Region::Seoul),
                has_children: Some(true),
                children: Some(2),
                has_grandchildren: Some(false),
                grandchildren: Some(0),
            },
        },
        Preset {
            id: "preset-2".to_string(),
            name: "이영희".to_string(),
            context: UserContext {
                user_name: Some("이영희".to_string()),
                age_group: Some(AgeGroup::Sixties),
                region: Some(Region::Gyeonggi),
                has_children: Some(true),
                children: Some(2),
                has_grandchildren: Some(true),
                grandchildren: Some(1),
            },
        },
        Preset {
            id: "preset-3".to_string(),
            name: "박정호".to_string(),
            context: UserContext {
                user_name: Some("박정호".to_string()),
                age_group: Some(AgeGroup::SeventyPlus),
                region: Some(Region::Other),
                has_children: Some(true),
                children: Some(2),
                has_grandchildren: Some(true),
                grandchildren: Some(2),
            },
        },
    ]
}

/// Look up a built-in preset by id.
pub fn preset_by_id(id: &str) -> Option<Preset> {
    presets().into_iter().find(|p| p.id == id)
}
