//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS)
//! - Build the upstream client and resilient invoker once, shared by all requests
//! - Bind server to listener and stop on the shutdown signal

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::analysis::AnalysisService;
use crate::config::{AppConfig, FeatureConfig};
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::llm::LlmError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
    pub features: FeatureConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only when the upstream client cannot be built.
    pub fn new(config: AppConfig, shutdown: Shutdown) -> Result<Self, LlmError> {
        let service = AnalysisService::from_config(&config, shutdown.clone())?;

        tracing::info!(
            max_attempts = service.invoker().policy().max_attempts,
            base_delay_ms = service.invoker().policy().base_delay_ms,
            max_delay_ms = service.invoker().policy().max_delay_ms,
            ai_enabled = config.features.ai_enabled,
            "Upstream retry policy configured"
        );

        let state = AppState {
            service: Arc::new(service),
            features: config.features.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, shutdown })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::root))
            .route("/api/food/analyze", post(handlers::analyze_food))
            .route("/api/form/analyze", post(handlers::analyze_form))
            .route("/api/chat", post(handlers::chat))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
            .layer(CorsLayer::permissive())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let stop = Shutdown::wait(self.shutdown.subscribe());
        axum::serve(listener, self.router)
            .with_graceful_shutdown(stop)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
