//! FitFlow API gateway library.
//!
//! Proxies food analysis, exercise form analysis and the FitBro chat to an
//! OpenAI-compatible chat-completions API. Every upstream call goes through
//! [`resilience::ResilientInvoker`], which retries rate-limit and
//! unavailability responses with capped exponential backoff.

pub mod analysis;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod llm;
pub mod observability;
pub mod resilience;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{InvokeError, ResilientInvoker, RetryPolicy};
