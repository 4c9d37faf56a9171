//! Model gateway
//!
//! A single-turn, text+image in / text out boundary to the remote
//! generative model, plus decorators for logging and deadlines.

mod error;
mod gemini;
#[cfg(test)]
pub mod testing;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

/// Common interface for model providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Build the gateway described by the configuration: Gemini, optionally
/// bounded by a deadline, wrapped with logging.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let mut service: Arc<dyn LlmService> = Arc::new(GeminiService::new(
        config.api_key.clone(),
        &config.model,
        &config.api_base,
    )?);

    if let Some(deadline) = config.request_timeout {
        service = Arc::new(DeadlineService::new(service, deadline));
    }

    Ok(Arc::new(LoggingService::new(service)))
}

/// Logging wrapper for model services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    shape = request.shape(),
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "Model request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    shape = request.shape(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Model request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Caller-side deadline. The gateway itself never times out; this is the
/// optional outer bound.
pub struct DeadlineService {
    inner: Arc<dyn LlmService>,
    deadline: Duration,
}

impl DeadlineService {
    pub fn new(inner: Arc<dyn LlmService>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl LlmService for DeadlineService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        tokio::time::timeout(self.deadline, self.inner.complete(request))
            .await
            .unwrap_or_else(|_| {
                Err(LlmError::network(format!(
                    "No response within {}s",
                    self.deadline.as_secs_f32()
                )))
            })
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
