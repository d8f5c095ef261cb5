use super::{ComputationService, ResponseBody, ResponseRequest, ServiceError};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Replays one stored response for every request.
#[derive(Debug, Clone)]
pub struct CannedService {
    body: ResponseBody,
}

impl CannedService {
    pub fn new(body: ResponseBody) -> Self {
        Self { body }
    }

    /// Load a stored response. A file without an `output` array is taken as
    /// a bare result object and wrapped as message text.
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let text = fs::read_to_string(path).map_err(|source| ServiceError::CannedRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |source| ServiceError::CannedParse {
            path: path.to_path_buf(),
            source,
        };
        let value: Value = serde_json::from_str(&text).map_err(parse_err)?;
        let body = if value.get("output").is_some_and(Value::is_array) {
            serde_json::from_value(value).map_err(parse_err)?
        } else {
            ResponseBody::from_structured(&value)
        };
        Ok(Self::new(body))
    }
}

impl ComputationService for CannedService {
    fn create_response(&self, request: &ResponseRequest) -> Result<ResponseBody, ServiceError> {
        tracing::debug!(model = %request.model, "serving canned response");
        Ok(self.body.clone())
    }
}
