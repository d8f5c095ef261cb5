//! Missing-field resolution under the `ask`, `default`, and `fail` policies.
//!
//! Each policy arm only decides values; writing them into the document is a
//! separate step, so a rejected answer never leaves a half-filled document.
use super::detect::{
    is_plus_convenio, PLUS_CONVENIO_AMOUNT_PATH, PLUS_CONVENIO_CRA_CODE, PLUS_CONVENIO_LABEL,
};
use super::error::PreflightError;
use super::prompt::PromptProvider;
use super::types::{FieldKind, MissingField, MissingPolicy};
use crate::document::{display_value, get_path, set_path};
use serde_json::{json, Value};

/// Values chosen for each gap, in detector order, plus the warnings that
/// explain automatic substitutions.
#[derive(Debug, Default)]
struct Resolution {
    values: Vec<(String, Value)>,
    warnings: Vec<String>,
}

/// Fill every gap in `missing` according to `policy`.
///
/// Returns the warnings recorded for defaulted fields. Under
/// [`MissingPolicy::Fail`] the document is left untouched and the error lists
/// every missing path.
pub fn resolve_missing(
    doc: &mut Value,
    missing: &[MissingField],
    policy: MissingPolicy,
    prompt: &mut dyn PromptProvider,
) -> Result<Vec<String>, PreflightError> {
    if missing.is_empty() {
        return Ok(Vec::new());
    }
    let resolution = match policy {
        MissingPolicy::Fail => return Err(reject_missing(missing)),
        MissingPolicy::Default => resolve_with_defaults(missing),
        MissingPolicy::Ask => resolve_with_prompt(missing, prompt)?,
    };
    for (path, value) in resolution.values {
        apply_value(doc, &path, value)?;
    }
    Ok(resolution.warnings)
}

fn reject_missing(missing: &[MissingField]) -> PreflightError {
    PreflightError::MissingCriticalData {
        paths: missing.iter().map(|field| field.path.clone()).collect(),
    }
}

fn resolve_with_defaults(missing: &[MissingField]) -> Resolution {
    let mut resolution = Resolution::default();
    for field in missing {
        let value = field.default.clone().unwrap_or(Value::Null);
        resolution.warnings.push(format!(
            "default applied at {}: {}",
            field.path,
            display_value(&value)
        ));
        resolution.values.push((field.path.clone(), value));
    }
    resolution
}

fn resolve_with_prompt(
    missing: &[MissingField],
    prompt: &mut dyn PromptProvider,
) -> Result<Resolution, PreflightError> {
    let mut resolution = Resolution::default();
    for field in missing {
        let raw = prompt
            .ask(field)
            .map_err(|source| PreflightError::Prompt {
                path: field.path.clone(),
                source,
            })?;
        let raw = raw.trim();
        let value = if raw.is_empty() {
            let default = field
                .default
                .clone()
                .ok_or_else(|| PreflightError::NotProvided {
                    path: field.path.clone(),
                })?;
            resolution.warnings.push(format!(
                "used default at {}: {}",
                field.path,
                display_value(&default)
            ));
            default
        } else {
            parse_answer(raw, field)?
        };
        resolution.values.push((field.path.clone(), value));
    }
    Ok(resolution)
}

/// Parse a non-empty answer according to the field's kind.
///
/// Numbers accept either `,` or `.` as the decimal separator.
pub fn parse_answer(raw: &str, field: &MissingField) -> Result<Value, PreflightError> {
    let trimmed = raw.trim();
    match field.kind {
        FieldKind::Number => {
            let invalid = || PreflightError::InvalidNumber {
                path: field.path.clone(),
                value: trimmed.to_string(),
            };
            let number: f64 = trimmed.replace(',', ".").parse().map_err(|_| invalid())?;
            serde_json::Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(invalid)
        }
        FieldKind::Enum => {
            if let Some(options) = &field.options {
                if !options.iter().any(|option| option == trimmed) {
                    return Err(PreflightError::NotAllowed {
                        value: trimmed.to_string(),
                        allowed: options.clone(),
                    });
                }
            }
            Ok(Value::from(trimmed))
        }
        FieldKind::String => Ok(Value::from(trimmed)),
    }
}

fn apply_value(doc: &mut Value, path: &str, value: Value) -> Result<(), PreflightError> {
    if path == PLUS_CONVENIO_AMOUNT_PATH {
        return set_allowance_amount(doc, path, &value);
    }
    set_path(doc, path, value)?;
    Ok(())
}

/// Price the allowance as a variable-pay item rather than at its synthetic
/// path, creating the item when no variable carries the label yet.
fn set_allowance_amount(doc: &mut Value, path: &str, value: &Value) -> Result<(), PreflightError> {
    let amount = coerce_amount(path, value)?;
    let mut variables = match get_path(doc, "compensation.variables") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    let existing = variables
        .iter_mut()
        .find(|item| is_plus_convenio(item))
        .and_then(Value::as_object_mut);
    match existing {
        Some(item) => {
            item.insert("amount".to_string(), json!(amount));
        }
        None => variables.push(json!({
            "name": PLUS_CONVENIO_LABEL,
            "taxable": true,
            "contributory": true,
            "cra_code": PLUS_CONVENIO_CRA_CODE,
            "amount": amount,
        })),
    }
    set_path(doc, "compensation.variables", Value::Array(variables))?;
    Ok(())
}

fn coerce_amount(path: &str, value: &Value) -> Result<f64, PreflightError> {
    let invalid = || PreflightError::InvalidAmount {
        path: path.to_string(),
        value: display_value(value),
    };
    match value {
        Value::Null => Ok(0.0),
        Value::Number(number) => number.as_f64().ok_or_else(invalid),
        Value::String(text) => text.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
