//! Reader preferences and their boundary coercion.
//!
//! Preferences arrive as loosely typed JSON. Every field is coerced to a
//! typed value on deserialization; absent or unrecognized values fall back to
//! the documented defaults:
//!
//! | Field | Default |
//! |-------|---------|
//! | `focus` | `Just the Facts` |
//! | `depth` | `2` |
//! | `tone` | `News with attitude` |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// What aspect of the story the report emphasizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Focus {
    #[default]
    #[serde(rename = "Just the Facts")]
    JustTheFacts,
    #[serde(rename = "Human Impact")]
    HumanImpact,
    #[serde(rename = "The Clash")]
    TheClash,
    #[serde(rename = "Hidden Angles")]
    HiddenAngles,
    #[serde(rename = "The Money Trail")]
    MoneyTrail,
}

impl Focus {
    pub const ALL: [Focus; 5] = [
        Focus::JustTheFacts,
        Focus::HumanImpact,
        Focus::TheClash,
        Focus::HiddenAngles,
        Focus::MoneyTrail,
    ];

    /// Case-insensitive lookup by display label.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(wanted))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Focus::JustTheFacts => "Just the Facts",
            Focus::HumanImpact => "Human Impact",
            Focus::TheClash => "The Clash",
            Focus::HiddenAngles => "Hidden Angles",
            Focus::MoneyTrail => "The Money Trail",
        }
    }
}

/// How much detail the report goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Depth {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl Depth {
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Depth::Quick),
            2 => Some(Depth::Standard),
            3 => Some(Depth::Deep),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Depth::Quick => 1,
            Depth::Standard => 2,
            Depth::Deep => 3,
        }
    }
}

impl From<Depth> for u8 {
    fn from(depth: Depth) -> Self {
        depth.level()
    }
}

impl TryFrom<u8> for Depth {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Depth::from_level(level as i64).ok_or_else(|| format!("depth must be 1, 2 or 3, got {level}"))
    }
}

/// Voice of the final edited report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Tone {
    #[serde(rename = "Grandma Mode")]
    Grandma,
    #[default]
    #[serde(rename = "News with attitude")]
    NewsWithAttitude,
    #[serde(rename = "Gen Z Mode")]
    GenZ,
    #[serde(rename = "Sharp & Snappy")]
    SharpAndSnappy,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Grandma,
        Tone::NewsWithAttitude,
        Tone::GenZ,
        Tone::SharpAndSnappy,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Grandma => "Grandma Mode",
            Tone::NewsWithAttitude => "News with attitude",
            Tone::GenZ => "Gen Z Mode",
            Tone::SharpAndSnappy => "Sharp & Snappy",
        }
    }
}

/// Validated reader preferences for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(from = "RawPreferences")]
pub struct Preferences {
    pub focus: Focus,
    #[schema(value_type = u8, minimum = 1, maximum = 3)]
    pub depth: Depth,
    pub tone: Tone,
}

/// Untyped shape accepted on the wire before coercion.
#[derive(Debug, Default, Deserialize)]
struct RawPreferences {
    #[serde(default)]
    focus: Option<Value>,
    #[serde(default)]
    depth: Option<Value>,
    #[serde(default)]
    tone: Option<Value>,
}

impl Preferences {
    /// Coerce loosely typed parts, falling back to defaults for anything unknown.
    pub fn from_parts(focus: Option<&str>, depth: Option<i64>, tone: Option<&str>) -> Self {
        let coerced_focus = focus.and_then(Focus::from_label);
        if let (Some(label), None) = (focus, coerced_focus) {
            tracing::debug!("Unrecognized focus '{}', using default", label);
        }

        let coerced_tone = tone.and_then(Tone::from_label);
        if let (Some(label), None) = (tone, coerced_tone) {
            tracing::debug!("Unrecognized tone '{}', using default", label);
        }

        Self {
            focus: coerced_focus.unwrap_or_default(),
            depth: depth.and_then(Depth::from_level).unwrap_or_default(),
            tone: coerced_tone.unwrap_or_default(),
        }
    }
}

impl From<RawPreferences> for Preferences {
    fn from(raw: RawPreferences) -> Self {
        let depth = raw.depth.as_ref().and_then(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        });

        let label = |value: &Option<Value>| value.as_ref().and_then(Value::as_str).map(str::to_owned);
        let (focus, tone) = (label(&raw.focus), label(&raw.tone));

        Self::from_parts(focus.as_deref(), depth, tone.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("Just the Facts", Focus::JustTheFacts)]
    #[case("human impact", Focus::HumanImpact)]
    #[case("The Clash", Focus::TheClash)]
    #[case("  Hidden Angles ", Focus::HiddenAngles)]
    #[case("The Money Trail", Focus::MoneyTrail)]
    fn test_focus_from_label(#[case] label: &str, #[case] expected: Focus) {
        assert_eq!(Focus::from_label(label), Some(expected));
    }

    #[rstest]
    #[case(json!({"tone": "Gen Z Mode"}), Tone::GenZ)]
    #[case(json!({"tone": "Sharp & Snappy"}), Tone::SharpAndSnappy)]
    #[case(json!({"tone": "Pirate Mode"}), Tone::NewsWithAttitude)]
    #[case(json!({}), Tone::NewsWithAttitude)]
    #[case(json!({"tone": 3}), Tone::NewsWithAttitude)]
    #[case(json!({"tone": ["Gen Z Mode"]}), Tone::NewsWithAttitude)]
    fn test_tone_coercion(#[case] input: Value, #[case] expected: Tone) {
        let prefs: Preferences = serde_json::from_value(input).unwrap();
        assert_eq!(prefs.tone, expected);
    }

    #[rstest]
    #[case(json!({"depth": 1}), Depth::Quick)]
    #[case(json!({"depth": 3}), Depth::Deep)]
    #[case(json!({"depth": "1"}), Depth::Quick)]
    #[case(json!({"depth": 7}), Depth::Standard)]
    #[case(json!({"depth": null}), Depth::Standard)]
    fn test_depth_coercion(#[case] input: Value, #[case] expected: Depth) {
        let prefs: Preferences = serde_json::from_value(input).unwrap();
        assert_eq!(prefs.depth, expected);
    }

    #[test]
    fn test_unknown_focus_defaults() {
        let prefs: Preferences =
            serde_json::from_value(json!({"focus": "Celebrity Gossip"})).unwrap();
        assert_eq!(prefs.focus, Focus::JustTheFacts);
    }

    #[test]
    fn test_non_string_focus_defaults() {
        let prefs: Preferences =
            serde_json::from_value(json!({"focus": 3, "tone": "Gen Z Mode"})).unwrap();
        assert_eq!(prefs.focus, Focus::JustTheFacts);
        assert_eq!(prefs.tone, Tone::GenZ);
    }

    #[test]
    fn test_serializes_labels() {
        let prefs = Preferences {
            focus: Focus::MoneyTrail,
            depth: Depth::Deep,
            tone: Tone::Grandma,
        };
        let value = serde_json::to_value(prefs).unwrap();
        assert_eq!(
            value,
            json!({"focus": "The Money Trail", "depth": 3, "tone": "Grandma Mode"})
        );

        // Serialized output deserializes back to the same preferences.
        let back: Preferences = serde_json::from_value(value).unwrap();
        assert_eq!(back, prefs);
    }
}
