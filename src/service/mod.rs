//! Remote computation service contract.
//!
//! The pipeline only needs one call: send a fully-resolved payroll document
//! and get back a Responses-API style body. [`OpenAiService`] makes that call
//! over HTTP; [`CannedService`] replays a stored body for offline runs.
mod canned;
mod extract;
mod openai;
mod request;

pub use canned::CannedService;
pub use extract::{extract_structured_output, ExtractError};
pub use openai::{OpenAiService, API_KEY_ENV};
pub use request::{
    ContentPart, ModelSettings, OutputItem, ResponseBody, ResponseRequest, SYSTEM_PROMPT,
};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode model response")]
    Decode(#[source] Box<ureq::Error>),

    #[error("read canned response {}", .path.display())]
    CannedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse canned response {}", .path.display())]
    CannedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can answer a payroll computation request.
///
/// Implementations are shared across batch workers.
pub trait ComputationService: Send + Sync {
    fn create_response(&self, request: &ResponseRequest) -> Result<ResponseBody, ServiceError>;
}
