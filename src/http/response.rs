//! Response mapping.
//!
//! # Responsibilities
//! - Map analysis outcomes to status codes and JSON error bodies
//! - Keep user-facing messages friendly; never leak internals beyond an
//!   error's display string
//!
//! # Status Mapping
//! - invalid input → 400 `{ error }`
//! - AI features disabled → 503 `{ error }`
//! - last upstream failure transient → 429 `{ error, retryable: true }`
//! - cancelled during shutdown → 503 `{ error, retryable: true }`
//! - other upstream failure → 500 `{ error, details? }`
//! - unusable model output → 500 `{ error, raw }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::analysis::ServiceError;
use crate::resilience::FailureClassification;

const FEATURE_DISABLED: &str = "Feature disabled";
const SHUTTING_DOWN: &str = "Server is restarting. Please try again shortly.";
const PARSE_FAILED: &str = "Failed to parse response as JSON";

/// Per-endpoint wording for upstream failures.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMessages {
    pub rate_limited: &'static str,
    pub failed: &'static str,
    /// Attach the failure's display string as `details`.
    pub include_details: bool,
}

/// Error returned by API handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    FeatureDisabled,
    RateLimited(&'static str),
    ShuttingDown,
    Upstream {
        message: &'static str,
        details: Option<String>,
    },
    Payload {
        message: &'static str,
        raw: String,
    },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<&'a str>,
}

impl<'a> ErrorBody<'a> {
    fn plain(error: &'a str) -> Self {
        Self {
            error,
            retryable: None,
            details: None,
            raw: None,
        }
    }
}

impl ApiError {
    pub fn from_service(err: &ServiceError, messages: &ErrorMessages) -> Self {
        match err {
            ServiceError::Upstream(e) if e.is_cancelled() => ApiError::ShuttingDown,
            ServiceError::Upstream(e) => match e.classification() {
                FailureClassification::Transient => ApiError::RateLimited(messages.rate_limited),
                FailureClassification::Terminal => ApiError::Upstream {
                    message: messages.failed,
                    details: messages.include_details.then(|| e.source_ref().to_string()),
                },
            },
            ServiceError::Payload(e) => ApiError::Payload {
                message: PARSE_FAILED,
                raw: e.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::FeatureDisabled | ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream { .. } | ApiError::Payload { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody<'_> {
        match self {
            ApiError::BadRequest(message) => ErrorBody::plain(message),
            ApiError::FeatureDisabled => ErrorBody::plain(FEATURE_DISABLED),
            ApiError::RateLimited(message) => ErrorBody {
                retryable: Some(true),
                ..ErrorBody::plain(message)
            },
            ApiError::ShuttingDown => ErrorBody {
                retryable: Some(true),
                ..ErrorBody::plain(SHUTTING_DOWN)
            },
            ApiError::Upstream { message, details } => ErrorBody {
                details: details.as_deref(),
                ..ErrorBody::plain(message)
            },
            ApiError::Payload { message, raw } => ErrorBody {
                raw: Some(raw.as_str()),
                ..ErrorBody::plain(message)
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
