//! API handlers.
//!
//! Each handler validates its body, checks the AI feature flag, calls the
//! analysis service and maps the outcome through [`ApiError`]. Malformed
//! JSON bodies are reported as 400 with the same `{ error }` shape as
//! missing fields.

use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::FoodAnalysis;
use crate::http::request::request_id;
use crate::http::response::{ApiError, ErrorMessages};
use crate::http::server::AppState;
use crate::llm::ChatMessage;
use crate::observability::metrics;

const FOOD_MESSAGES: ErrorMessages = ErrorMessages {
    rate_limited: "Please try again shortly.",
    failed: "Failed to analyze food image",
    include_details: true,
};

const FORM_MESSAGES: ErrorMessages = ErrorMessages {
    rate_limited: "Rate limit reached. Please wait a moment and try again.",
    failed: "Failed to analyze form. Please try again.",
    include_details: false,
};

const CHAT_MESSAGES: ErrorMessages = ErrorMessages {
    rate_limited: "Rate limit hit, give me a sec and try again bro! 💪",
    failed: "FitBro is taking a rest day 😅 Try again shortly.",
    include_details: false,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRequest {
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
    pub exercise: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct FoodResponse {
    pub success: bool,
    pub data: FoodAnalysis,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub success: bool,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub reply: String,
}

/// `GET /`
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "FitFlow API is running" }))
}

/// `POST /api/food/analyze`
pub async fn analyze_food(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<FoodRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let result = food(&state, request_id(&headers), body).await;
    finish("food", start, result)
}

/// `POST /api/form/analyze`
pub async fn analyze_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<FormRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let result = form(&state, request_id(&headers), body).await;
    finish("form", start, result)
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let result = chat_reply(&state, request_id(&headers), body).await;
    finish("chat", start, result)
}

async fn food(
    state: &AppState,
    request_id: &str,
    body: Result<Json<FoodRequest>, JsonRejection>,
) -> Result<FoodResponse, ApiError> {
    let Json(body) = body.map_err(bad_json)?;
    let (Some(image), Some(mime_type)) = (present(body.image_base64), present(body.mime_type)) else {
        return Err(ApiError::BadRequest("imageBase64 and mimeType are required".into()));
    };
    ensure_enabled(state)?;

    tracing::debug!(request_id, mime_type = %mime_type, "Analyzing food image");
    let data = state
        .service
        .analyze_food(&image, &mime_type)
        .await
        .map_err(|e| {
            tracing::error!(request_id, error = %e, "Food analysis failed");
            ApiError::from_service(&e, &FOOD_MESSAGES)
        })?;

    Ok(FoodResponse { success: true, data })
}

async fn form(
    state: &AppState,
    request_id: &str,
    body: Result<Json<FormRequest>, JsonRejection>,
) -> Result<FormResponse, ApiError> {
    let Json(body) = body.map_err(bad_json)?;
    let Some(image) = present(body.image_base64) else {
        return Err(ApiError::BadRequest("imageBase64 is required".into()));
    };
    let Some(exercise) = present(body.exercise) else {
        return Err(ApiError::BadRequest("exercise name is required".into()));
    };
    ensure_enabled(state)?;

    tracing::debug!(request_id, exercise = %exercise, "Analyzing exercise form");
    let mime_type = present(body.mime_type);
    let feedback = state
        .service
        .analyze_form(&image, mime_type.as_deref(), &exercise)
        .await
        .map_err(|e| {
            tracing::error!(request_id, error = %e, "Form analysis failed");
            ApiError::from_service(&e, &FORM_MESSAGES)
        })?;

    Ok(FormResponse { success: true, feedback })
}

async fn chat_reply(
    state: &AppState,
    request_id: &str,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<ChatResponse, ApiError> {
    let Json(body) = body.map_err(bad_json)?;
    let Some(message) = present(body.message) else {
        return Err(ApiError::BadRequest("message is required".into()));
    };
    ensure_enabled(state)?;

    tracing::debug!(request_id, history = body.history.len(), "FitBro chat");
    let reply = state
        .service
        .chat(&message, &body.history)
        .await
        .map_err(|e| {
            tracing::error!(request_id, error = %e, "FitBro chat failed");
            ApiError::from_service(&e, &CHAT_MESSAGES)
        })?;

    Ok(ChatResponse { success: true, reply })
}

fn ensure_enabled(state: &AppState) -> Result<(), ApiError> {
    if state.features.ai_enabled {
        Ok(())
    } else {
        Err(ApiError::FeatureDisabled)
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
}

fn finish<T: Serialize>(route: &'static str, start: Instant, result: Result<T, ApiError>) -> Response {
    let response = match result {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response(),
    };
    metrics::record_request(route, response.status().as_u16(), start);
    response
}
