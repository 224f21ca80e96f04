//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, GROQ_*)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → RetryPolicy / LlmClient built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::FeatureConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::SecurityConfig;
pub use schema::TimeoutConfig;
pub use schema::UpstreamConfig;
