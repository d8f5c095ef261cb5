//! Pull the structured payroll result out of a response body.
use super::ResponseBody;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response has no message with text output")]
    Missing,

    #[error("output text is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("structured output is not a JSON object")]
    NotObject,
}

/// Return the first structured payload in the response.
///
/// Looks at the first `message` item carrying an `output_text` part. A
/// pre-parsed object on that part wins; otherwise its text is parsed.
pub fn extract_structured_output(body: &ResponseBody) -> Result<Value, ExtractError> {
    let part = body
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .find_map(|item| item.content.iter().find(|part| part.kind == "output_text"))
        .ok_or(ExtractError::Missing)?;

    let value = match (&part.parsed, &part.text) {
        (Some(parsed), _) if !parsed.is_null() => parsed.clone(),
        (_, Some(text)) => parse_output_text(text)?,
        _ => return Err(ExtractError::Missing),
    };
    if !value.is_object() {
        return Err(ExtractError::NotObject);
    }
    Ok(value)
}

fn parse_output_text(text: &str) -> Result<Value, ExtractError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) => {
            let cleaned = strip_code_fences(text);
            if cleaned == text.trim() {
                return Err(ExtractError::InvalidJson(err));
            }
            serde_json::from_str(&cleaned).map_err(ExtractError::InvalidJson)
        }
    }
}

fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines
        .first()
        .is_some_and(|first| first.trim_start().starts_with("```"))
    {
        lines.remove(0);
    }
    if lines
        .last()
        .is_some_and(|last| last.trim_start().starts_with("```"))
    {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}
