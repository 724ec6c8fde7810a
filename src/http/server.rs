//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with gateway and health handlers
//! - Wire up middleware (request ID, tracing, inbound timeout)
//! - Split `/{service}/{path}` and hand off to the forward coordinator
//! - Translate forward outcomes into client responses

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::forward::{ForwardCoordinator, ForwardOutcome, ForwardRequest};
use crate::http::request::UuidRequestId;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ForwardCoordinator>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with all subsystems wired from configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let coordinator = Arc::new(ForwardCoordinator::from_config(&config)?);
        Ok(Self::with_coordinator(config, coordinator))
    }

    /// Create a server around an existing coordinator.
    pub fn with_coordinator(config: GatewayConfig, coordinator: Arc<ForwardCoordinator>) -> Self {
        let state = AppState { coordinator };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let forward_methods = MethodFilter::GET
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT)
            .or(MethodFilter::DELETE);

        Router::new()
            .route("/health", get(health_handler))
            .route("/{service}", on(forward_methods, gateway_handler))
            .route("/{service}/{*path}", on(forward_methods, gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = self.config.services.len(),
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

/// Health check endpoint; bypasses the forward pipeline entirely.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Main gateway handler.
/// Resolves the target service from the path and forwards the request.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let method_str = method.to_string();

    let (service, path) = split_service_path(request.uri().path());
    let service = service.to_string();
    let query = request.uri().query().map(str::to_string);

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let response = translate(ForwardOutcome::Internal {
                error: format!("failed to read request body: {}", e),
            });
            metrics::record_request(&method_str, response.status().as_u16(), &service, start);
            return response;
        }
    };

    let outcome = state
        .coordinator
        .forward(ForwardRequest {
            service: service.clone(),
            path,
            query,
            method,
            headers: parts.headers,
            body,
        })
        .await;

    let response = translate(outcome);
    metrics::record_request(&method_str, response.status().as_u16(), &service, start);
    response
}

/// Split an inbound path into (service name, forwarded path).
/// The forwarded path keeps its leading slash, "/" when nothing remains.
fn split_service_path(path: &str) -> (&str, String) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.split_once('/') {
        Some((service, rest)) => (service, format!("/{}", rest)),
        None => (trimmed, "/".to_string()),
    }
}

/// Translate a forward outcome into the client-visible response.
fn translate(outcome: ForwardOutcome) -> Response {
    match outcome {
        ForwardOutcome::Response {
            status,
            headers,
            body,
        } => {
            let mut builder = Response::builder().status(status);
            if let Some(response_headers) = builder.headers_mut() {
                for (key, value) in headers.iter() {
                    // Hop-by-hop and length headers are recomputed for the
                    // buffered body
                    if key == &header::CONNECTION
                        || key == &header::TRANSFER_ENCODING
                        || key == &header::CONTENT_LENGTH
                    {
                        continue;
                    }
                    response_headers.append(key.clone(), value.clone());
                }
            }
            builder.body(Body::from(body)).unwrap_or_else(|e| {
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("failed to build response: {}", e),
                )
            })
        }
        ForwardOutcome::UnknownService { name } => error_response(
            StatusCode::NOT_FOUND,
            &format!("service '{}' not found", name),
        ),
        ForwardOutcome::BreakerOpen { service } => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &format!("service '{}' is temporarily unavailable", service),
        ),
        ForwardOutcome::Transport { error, .. } => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, &error.to_string())
        }
        ForwardOutcome::Internal { error } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error)
        }
    }
}

fn error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[test]
    fn splits_service_and_path() {
        assert_eq!(
            split_service_path("/service-a/users/42"),
            ("service-a", "/users/42".to_string())
        );
        assert_eq!(split_service_path("/service-a"), ("service-a", "/".to_string()));
        assert_eq!(
            split_service_path("/service-a/"),
            ("service-a", "/".to_string())
        );
    }

    #[test]
    fn unknown_service_translates_to_404_naming_it() {
        let response = translate(ForwardOutcome::UnknownService {
            name: "orders".into(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn breaker_open_translates_to_503() {
        let response = translate(ForwardOutcome::BreakerOpen {
            service: "orders".into(),
        });
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn backend_reply_passes_status_through() {
        let response = translate(ForwardOutcome::Response {
            status: StatusCode::IM_A_TEAPOT,
            headers: Default::default(),
            body: Bytes::from_static(b"short and stout"),
        });
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
