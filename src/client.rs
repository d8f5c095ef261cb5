//! Computation client: preflight a payroll document, send it to the model,
//! and reconcile the answer with the output schema.
//!
//! A call either returns a schema-valid, annotated result or a typed error;
//! nothing partial leaves this module.
use crate::preflight::{
    detect_missing, resolve_missing, MissingField, MissingPolicy, PreflightError, PromptProvider,
};
use crate::region::enrich_region_config;
use crate::schema::{SchemaError, SchemaSet};
use crate::service::{
    extract_structured_output, ComputationService, ExtractError, ModelSettings, ResponseRequest,
    ServiceError,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error("model request failed")]
    Service(#[from] ServiceError),

    #[error("could not extract model output")]
    Extraction(#[from] ExtractError),

    #[error("encode payroll document")]
    Encode(#[from] serde_json::Error),
}

/// A document ready for dispatch, with the gaps that were filled and the
/// warnings recorded while filling them. Serializes as `{document, warnings}`.
#[derive(Debug, Clone, Serialize)]
pub struct Preflight {
    pub document: Value,
    #[serde(skip)]
    pub missing: Vec<MissingField>,
    pub warnings: Vec<String>,
}

/// Validate, enrich, and complete `input` without contacting the model.
pub fn run_preflight(
    schemas: &SchemaSet,
    input: &Value,
    policy: MissingPolicy,
    prompt: &mut dyn PromptProvider,
) -> Result<Preflight, PipelineError> {
    schemas.input.validate(input)?;
    let mut document = enrich_region_config(input);
    let missing = detect_missing(&mut document);
    tracing::debug!(gaps = missing.len(), %policy, "resolving missing fields");
    let warnings = resolve_missing(&mut document, &missing, policy, prompt)?;
    schemas.input.validate(&document)?;
    Ok(Preflight {
        document,
        missing,
        warnings,
    })
}

/// Holds everything a computation needs; built once and shared by workers.
pub struct PayrollClient {
    schemas: SchemaSet,
    service: Box<dyn ComputationService>,
    settings: ModelSettings,
}

impl PayrollClient {
    pub fn new(
        schemas: SchemaSet,
        service: Box<dyn ComputationService>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            schemas,
            service,
            settings,
        }
    }

    /// Everything before dispatch: validation, enrichment and resolution.
    pub fn preflight(
        &self,
        input: &Value,
        policy: MissingPolicy,
        prompt: &mut dyn PromptProvider,
    ) -> Result<Preflight, PipelineError> {
        run_preflight(&self.schemas, input, policy, prompt)
    }

    /// Run the full pipeline for one document.
    pub fn compute(
        &self,
        input: &Value,
        policy: MissingPolicy,
        prompt: &mut dyn PromptProvider,
    ) -> Result<Value, PipelineError> {
        let preflight = self.preflight(input, policy, prompt)?;
        let request = ResponseRequest::payroll(
            &self.settings,
            &preflight.document,
            self.schemas.output.document(),
        )?;
        let body = self.service.create_response(&request)?;
        let mut output = extract_structured_output(&body)?;
        append_warnings(&mut output, preflight.warnings);
        self.schemas.output.validate(&output)?;
        Ok(output)
    }
}

/// Add preflight warnings to the result's `warnings` array, creating it when
/// absent. A non-array `warnings` is left for the output schema to reject.
fn append_warnings(output: &mut Value, warnings: Vec<String>) {
    if warnings.is_empty() {
        return;
    }
    let Some(map) = output.as_object_mut() else {
        return;
    };
    let slot = map
        .entry("warnings")
        .or_insert_with(|| Value::Array(Vec::new()));
    match slot {
        Value::Array(items) => items.extend(warnings.into_iter().map(Value::String)),
        _ => tracing::warn!("model output has a non-array warnings field"),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
