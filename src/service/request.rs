use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Domain rules sent as the developer message on every request.
pub const SYSTEM_PROMPT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/payroll_system.md"
));

/// Name the structured-output format is registered under.
const RESULT_FORMAT_NAME: &str = "PayrollResult";

/// Model tuning passed through to the service untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub model: String,
    pub verbosity: String,
    pub reasoning_effort: String,
}

/// Request body for a structured-output response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
    pub text: TextOptions,
    pub reasoning: ReasoningOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextOptions {
    pub format: ResponseFormat,
    pub verbosity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReasoningOptions {
    pub effort: String,
}

impl ResponseRequest {
    /// Build the payroll request: fixed instructions, the document as JSON
    /// text, and a strict schema for the answer.
    pub fn payroll(
        settings: &ModelSettings,
        document: &Value,
        output_schema: &Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            model: settings.model.clone(),
            input: vec![
                InputMessage {
                    role: "developer".to_string(),
                    content: SYSTEM_PROMPT.trim().to_string(),
                },
                InputMessage {
                    role: "user".to_string(),
                    content: serde_json::to_string(document)?,
                },
            ],
            text: TextOptions {
                format: ResponseFormat {
                    kind: "json_schema".to_string(),
                    name: RESULT_FORMAT_NAME.to_string(),
                    schema: output_schema.clone(),
                    strict: true,
                },
                verbosity: settings.verbosity.clone(),
            },
            reasoning: ReasoningOptions {
                effort: settings.reasoning_effort.clone(),
            },
        })
    }
}

/// The parts of a response body the pipeline reads. Unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Pre-parsed structured output, when the service supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
}

impl ResponseBody {
    /// Wrap a bare result object as a single message with text output.
    pub fn from_structured(value: &Value) -> Self {
        Self {
            id: None,
            output: vec![OutputItem {
                kind: "message".to_string(),
                content: vec![ContentPart {
                    kind: "output_text".to_string(),
                    text: Some(value.to_string()),
                    parsed: None,
                }],
            }],
        }
    }
}
