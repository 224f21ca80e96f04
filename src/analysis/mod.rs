//! AI-backed analysis services.
//!
//! # Data Flow
//! ```text
//! handler input
//!     → food.rs / form.rs / chat.rs (prompt + ChatRequest)
//!     → AnalysisService::complete (resilient invoker around LlmClient)
//!     → payload.rs (completion envelope, model output validation)
//! ```
//!
//! # Design Decisions
//! - Every upstream call goes through the shared invoker
//! - Payload problems surface as `PayloadError`, never as invoker failures,
//!   and are not retried

pub mod chat;
pub mod food;
pub mod form;
pub mod payload;

use thiserror::Error;

use crate::config::AppConfig;
use crate::lifecycle::Shutdown;
use crate::llm::{ChatRequest, LlmClient, LlmError};
use crate::resilience::{InvokeError, ResilientInvoker, RetryPolicy};

pub use chat::HISTORY_LIMIT;
pub use food::{FoodAnalysis, Macros};
pub use payload::PayloadError;

/// Failure of an analysis request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The upstream call failed after the invoker gave up.
    #[error(transparent)]
    Upstream(#[from] InvokeError<LlmError>),

    /// The call succeeded but the response was unusable.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Shared entry point for all model-backed features.
#[derive(Clone)]
pub struct AnalysisService {
    client: LlmClient,
    invoker: ResilientInvoker,
    vision_model: String,
    chat_model: String,
    shutdown: Shutdown,
}

impl AnalysisService {
    pub fn new(
        client: LlmClient,
        invoker: ResilientInvoker,
        vision_model: impl Into<String>,
        chat_model: impl Into<String>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            client,
            invoker,
            vision_model: vision_model.into(),
            chat_model: chat_model.into(),
            shutdown,
        }
    }

    /// Build the client and invoker described by `config`.
    pub fn from_config(config: &AppConfig, shutdown: Shutdown) -> Result<Self, LlmError> {
        let client = LlmClient::new(&config.upstream, &config.timeouts)?;
        let invoker = ResilientInvoker::new(RetryPolicy::from(&config.retries));

        Ok(Self::new(
            client,
            invoker,
            config.upstream.vision_model.clone(),
            config.upstream.chat_model.clone(),
            shutdown,
        ))
    }

    pub fn invoker(&self) -> &ResilientInvoker {
        &self.invoker
    }

    /// Send `request` through the invoker and extract the reply text.
    async fn complete(&self, request: ChatRequest) -> Result<String, ServiceError> {
        let client = &self.client;
        let request = &request;
        let mut cancel = self.shutdown.subscribe();

        let body = self
            .invoker
            .call_with_cancel(move || client.post_chat(request), &mut cancel)
            .await?;

        Ok(payload::parse_completion(&body)?)
    }
}
