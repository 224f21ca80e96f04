//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (validate input, feature gate, call analysis service)
//!     → response.rs (map outcomes to status codes and JSON bodies)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use response::{ApiError, ErrorMessages};
pub use server::{AppState, HttpServer};
