use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How an answer for a missing field is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Enum,
    String,
}

/// A gap found by the detector, with everything needed to fill it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingField {
    /// Dotted path the resolved value is written to.
    pub path: String,
    pub question: String,
    pub hint: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Permitted answers when `kind` is [`FieldKind::Enum`].
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Fallback value; `None` means the field has no sensible default.
    pub default: Option<Value>,
}

/// Policy applied uniformly to every gap in one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Prompt for each gap, falling back to its default on an empty answer.
    Ask,
    /// Substitute every gap's default without asking.
    Default,
    /// Reject the document if anything is missing.
    #[default]
    Fail,
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingPolicy::Ask => "ask",
            MissingPolicy::Default => "default",
            MissingPolicy::Fail => "fail",
        })
    }
}
