//! HTTP server setup and invocation handling.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Recover a trace context per request and run the engine under it
//! - Finalize the root segment once the request's work is complete
//!
//! # Design Decisions
//! - The trace context is built once per request and passed explicitly
//!   to every traced operation; handlers never consult ambient state
//! - Tracing unavailability (missing headers, unreachable daemon) never
//!   changes the functional outcome of a request

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::inference::InferenceEngine;
use crate::observability::metrics;
use crate::trace::{EmitterSetupError, Tracer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracer: Arc<Tracer>,
    pub engine: Arc<InferenceEngine>,
}

/// Successful invocation payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub output: String,
    pub model: String,
    pub tokens: u32,
    /// Present iff the request carried a usable trace context.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace_id: Option<String>,
}

/// Error payload for rejected or failed invocations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP server for the inference gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub async fn new(config: GatewayConfig) -> Result<Self, EmitterSetupError> {
        let tracer = Tracer::from_config(&config.trace).await?;
        let state = AppState {
            tracer: Arc::new(tracer),
            engine: Arc::new(InferenceEngine::new(config.inference.clone())),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/invocations", post(invoke_handler))
            .route("/ping", get(ping_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main invocation handler.
///
/// Recovers the trace context, runs validation and generation as traced
/// operations, and finalizes the root segment exactly once.
async fn invoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<crate::inference::InvokeRequest>,
) -> Response {
    let start_time = Instant::now();
    let ctx = state.tracer.extract_context(&headers);

    tracing::debug!(
        traced = ctx.enabled(),
        trace_id = ctx.trace_id().map(|id| id.as_str()),
        "Handling invocation"
    );

    let prompt = match state
        .tracer
        .trace(&ctx, "validate-input", None, || async {
            state.engine.validate(&request)
        })
        .await
    {
        Ok(prompt) => prompt,
        Err(e) => {
            state.tracer.finalize(&ctx, false, Some(&e.to_string())).await;
            metrics::record_request("invocations", 400, start_time);
            tracing::warn!(error = %e, "Invocation rejected");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let completion = match state
        .tracer
        .trace(&ctx, "generate", None, || async {
            state.engine.generate(&prompt).await
        })
        .await
    {
        Ok(completion) => completion,
        Err(e) => {
            state.tracer.finalize(&ctx, false, Some(&e.to_string())).await;
            metrics::record_request("invocations", 500, start_time);
            tracing::error!(error = %e, "Generation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    state.tracer.finalize(&ctx, true, None).await;
    metrics::record_request("invocations", 200, start_time);

    (
        StatusCode::OK,
        Json(InvokeResponse {
            output: completion.output,
            model: completion.model,
            tokens: completion.tokens,
            trace_id: ctx.trace_id().map(|id| id.to_string()),
        }),
    )
        .into_response()
}

/// Liveness probe.
async fn ping_handler() -> StatusCode {
    StatusCode::OK
}
