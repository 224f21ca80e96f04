//! Upstream chat-completions client.
//!
//! # Data Flow
//! ```text
//! analysis service builds ChatRequest (types.rs)
//!     → client.rs (one POST per attempt, status check)
//!     → raw body string, or LlmError carrying the status
//! ```
//!
//! # Design Decisions
//! - One long-lived client per process, injected into the services
//! - The client never retries; the resilient invoker owns that
//! - The success body is returned undecoded so payload problems stay
//!   separate from transport failures

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmError};
pub use types::{ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent, Role};
