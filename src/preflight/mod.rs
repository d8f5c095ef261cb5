//! Preflight: find the fields a payroll computation cannot do without and
//! fill them according to the caller's missing-data policy.
//!
//! Detection and resolution are kept apart so the gap list can be shown,
//! logged, or rejected before anything touches the document.
mod detect;
mod error;
mod prompt;
mod resolve;
mod types;

pub use detect::{
    detect_missing, is_plus_convenio, DEFAULT_ATEP_TARIFF_PCT, DEFAULT_BASE_SALARY_CRA_CODE,
    DEFAULT_WORKER_NIF, PLUS_CONVENIO_AMOUNT_PATH, PLUS_CONVENIO_CRA_CODE, PLUS_CONVENIO_LABEL,
};
pub use error::PreflightError;
pub use prompt::{
    render_question, ConsolePrompt, NonInteractivePrompt, PromptProvider, ScriptedPrompt,
};
pub use resolve::{parse_answer, resolve_missing};
pub use types::{FieldKind, MissingField, MissingPolicy};
