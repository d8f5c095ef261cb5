use super::{ComputationService, ResponseBody, ResponseRequest, ServiceError};
use crate::util::truncate_string;
use std::env;
use std::time::{Duration, Instant};
use ureq::Agent;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Error bodies are cut to this many bytes before they reach logs.
const MAX_ERROR_BODY_BYTES: usize = 2000;

/// Blocking client for the `/responses` endpoint.
pub struct OpenAiService {
    agent: Agent,
    base_url: String,
    api_key: String,
}

impl OpenAiService {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Build a client with the key from [`API_KEY_ENV`].
    pub fn from_env(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let api_key = env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ServiceError::MissingApiKey)?;
        Ok(Self::new(base_url, api_key, timeout))
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

impl ComputationService for OpenAiService {
    fn create_response(&self, request: &ResponseRequest) -> Result<ResponseBody, ServiceError> {
        let url = self.endpoint();
        let start = Instant::now();
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(request)
            .map_err(|source| ServiceError::Transport {
                url: url.clone(),
                source: Box::new(source),
            })?;
        let elapsed_ms = start.elapsed().as_millis();

        let status = response.status();
        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), elapsed_ms, "model request rejected");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: truncate_string(body.trim(), MAX_ERROR_BODY_BYTES),
            });
        }

        let body: ResponseBody = response
            .body_mut()
            .read_json()
            .map_err(|source| ServiceError::Decode(Box::new(source)))?;
        tracing::info!(
            elapsed_ms,
            model = %request.model,
            output_items = body.output.len(),
            "model response received"
        );
        Ok(body)
    }
}
