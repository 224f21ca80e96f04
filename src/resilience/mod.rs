//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call to the model API:
//!     → invoker.rs (run one attempt, classify the failure)
//!     → classify.rs (status code → transient / terminal)
//!     → policy.rs (stop, or retry after a delay)
//!     → backoff.rs (capped exponential delay)
//!     → error.rs (the single failure handed back to the caller)
//! ```
//!
//! # Design Decisions
//! - Only 429 and 503 are transient; everything else fails fast
//! - Attempts are sequential and bounded by the policy's attempt budget
//! - No state survives an invocation; one invoker serves every request
//! - Payload validity is the caller's concern, never retried here

pub mod backoff;
pub mod classify;
pub mod error;
pub mod invoker;
pub mod policy;

pub use classify::{classify_status, Failure, FailureClassification};
pub use error::InvokeError;
pub use invoker::{AttemptOutcome, AttemptRecord, ResilientInvoker};
pub use policy::{RetryDecision, RetryPolicy};
