use crate::document::DocumentError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("missing critical data: {}", .paths.join("; "))]
    MissingCriticalData { paths: Vec<String> },

    #[error("required value not provided: {path}")]
    NotProvided { path: String },

    #[error("invalid number {value:?} for {path}")]
    InvalidNumber { path: String, value: String },

    #[error("value '{value}' is not one of [{}]", .allowed.join(", "))]
    NotAllowed { value: String, allowed: Vec<String> },

    #[error("invalid amount for {path}: {value}")]
    InvalidAmount { path: String, value: String },

    #[error("read answer for {path}")]
    Prompt {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}
