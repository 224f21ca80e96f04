//! End-to-end tests: gateway in front of a mock chat-completions API.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

const FOOD_JSON: &str = r#"{"foodName":"Oatmeal with berries","calories":310,"confidence":92,"macros":{"protein":9,"carbs":54,"fats":6},"suggestions":["Add Greek yogurt for protein"],"detailedAnalysis":"A fibre-rich breakfast."}"#;

fn food_body() -> Value {
    json!({ "imageBase64": "QUJD", "mimeType": "image/png" })
}

async fn post(addr: std::net::SocketAddr, path: &str, body: &Value) -> (StatusCode, Value) {
    let res = common::client()
        .post(format!("http://{}{}", addr, path))
        .json(body)
        .send()
        .await
        .expect("gateway unreachable");
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_root_reports_running() {
    let upstream = common::start_programmable_upstream(|_| (200, common::completion("unused"))).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let res = common::client().get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "FitFlow API is running" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_food_analysis_strips_fences() {
    let fenced = format!("```json\n{}\n```", FOOD_JSON);
    let upstream = common::start_programmable_upstream(move |_| (200, common::completion(&fenced))).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["foodName"], "Oatmeal with berries");
    assert_eq!(body["data"]["macros"]["carbs"], 54.0);
    assert_eq!(upstream.calls(), 1);

    let request = &upstream.requests()[0];
    assert!(request.starts_with("POST /openai/v1/chat/completions"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
    assert!(request.contains("data:image/png;base64,QUJD"));
    assert!(request.contains("meta-llama/llama-4-scout-17b-16e-instruct"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limits_are_retried_until_success() {
    let upstream = common::start_programmable_upstream(|n| {
        if n <= 2 {
            (429, r#"{"error":{"message":"rate limited"}}"#.into())
        } else {
            (200, common::completion(FOOD_JSON))
        }
    })
    .await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::OK, "should succeed after retries: {body}");
    assert_eq!(upstream.calls(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_exhausted_unavailability_returns_retryable_429() {
    let upstream = common::start_programmable_upstream(|_| (503, "overloaded".into())).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Please try again shortly.", "retryable": true }));
    assert_eq!(upstream.calls(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let upstream = common::start_programmable_upstream(|_| (500, "boom".into())).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to analyze food image");
    assert_eq!(body["details"], "upstream returned HTTP 500");
    assert!(body.get("retryable").is_none());
    assert_eq!(upstream.calls(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_single_attempt_budget_reports_rate_limit() {
    let upstream = common::start_programmable_upstream(|_| (429, "slow down".into())).await;
    let mut config = common::test_config(upstream.addr);
    config.retries.max_attempts = 1;
    let (addr, shutdown) = common::start_gateway(config).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["retryable"], true);
    assert_eq!(upstream.calls(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unparseable_model_output_is_not_retried() {
    let upstream = common::start_programmable_upstream(|_| {
        (200, common::completion("I think this is a sandwich, roughly 500 kcal."))
    })
    .await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse response as JSON");
    assert!(body["raw"].as_str().is_some_and(|raw| !raw.is_empty()));
    assert_eq!(upstream.calls(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_missing_fields_rejected_before_upstream() {
    let upstream = common::start_programmable_upstream(|_| (200, common::completion("{}"))).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &json!({ "imageBase64": "QUJD" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "imageBase64 and mimeType are required");

    let (status, body) = post(addr, "/api/form/analyze", &json!({ "imageBase64": "QUJD" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "exercise name is required");

    let (status, body) = post(addr, "/api/chat", &json!({ "message": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message is required");

    assert_eq!(upstream.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let upstream = common::start_programmable_upstream(|_| (200, common::completion("{}"))).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let res = common::client()
        .post(format!("http://{}/api/chat", addr))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    assert_eq!(upstream.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_disabled_features_short_circuit() {
    let upstream = common::start_programmable_upstream(|_| (200, common::completion("hi"))).await;
    let mut config = common::test_config(upstream.addr);
    config.features.ai_enabled = false;
    let (addr, shutdown) = common::start_gateway(config).await;

    let (status, body) = post(addr, "/api/chat", &json!({ "message": "hello" })).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "error": "Feature disabled" }));
    assert_eq!(upstream.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_chat_forwards_history() {
    let upstream =
        common::start_programmable_upstream(|_| (200, common::completion("Beast mode! 💪"))).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let body = json!({
        "message": "How many sets for hypertrophy?",
        "history": [
            { "role": "user", "content": "hey FitBro" },
            { "role": "assistant", "content": "Let's gooo!" }
        ]
    });
    let (status, reply) = post(addr, "/api/chat", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({ "success": true, "reply": "Beast mode! 💪" }));

    let request = &upstream.requests()[0];
    assert!(request.contains("llama-3.3-70b-versatile"));
    assert!(request.contains("You are FitBro"));
    assert!(request.contains("Let's gooo!"));
    assert!(request.contains("How many sets for hypertrophy?"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_form_feedback() {
    let upstream = common::start_programmable_upstream(|_| {
        (200, common::completion("✅ What's Good:\n- Neutral spine"))
    })
    .await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let body = json!({ "imageBase64": "QUJD", "exercise": "deadlift" });
    let (status, reply) = post(addr, "/api/form/analyze", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["success"], true);
    assert!(reply["feedback"].as_str().unwrap().contains("Neutral spine"));

    let request = &upstream.requests()[0];
    assert!(request.contains("data:image/jpeg;base64,QUJD"));
    assert!(request.contains("deadlift"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_form_rate_limit_message() {
    let upstream = common::start_programmable_upstream(|_| (429, "limited".into())).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let body = json!({ "imageBase64": "QUJD", "exercise": "squat" });
    let (status, reply) = post(addr, "/api/form/analyze", &body).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        reply,
        json!({
            "error": "Rate limit reached. Please wait a moment and try again.",
            "retryable": true
        })
    );
    assert_eq!(upstream.calls(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_full_retry_sequence_fits_request_timeout() {
    let upstream = common::start_programmable_upstream(|_| (429, "slow down".into())).await;
    let mut config = common::test_config(upstream.addr);
    config.retries.base_delay_ms = 400;
    config.retries.max_delay_ms = 16_000;
    config.timeouts.upstream_secs = 1;
    // 3 x 1s attempts plus 0.8s and 1.6s of backoff: the shortest timeout
    // validation accepts.
    config.timeouts.request_secs = 6;
    let (addr, shutdown) = common::start_gateway(config).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["retryable"], true);
    assert_eq!(upstream.calls(), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_timeout_status_is_terminal() {
    let upstream = common::start_programmable_upstream(|_| (408, "timeout".into())).await;
    let (addr, shutdown) = common::start_gateway(common::test_config(upstream.addr)).await;

    let (status, body) = post(addr, "/api/food/analyze", &food_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "upstream returned HTTP 408");
    assert_eq!(upstream.calls(), 1);

    shutdown.trigger();
}
