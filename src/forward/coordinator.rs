//! Forward coordinator.
//!
//! Orchestrates one request end to end:
//!
//! ```text
//! Received → Validated → BreakerChecked → EndpointSelected → Dispatched
//!     → Completed (backend replied, any status)
//!     → Failed    (routing rejection or transport failure)
//! ```
//!
//! Side effects per request: one breaker read, one breaker write only on
//! transport failure, at most one outbound network call, one trace span.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use tracing::{field, info_span, Instrument};
use url::Url;

use crate::config::GatewayConfig;
use crate::forward::transport::{OutboundRequest, ReqwestTransport, Transport};
use crate::forward::ForwardOutcome;
use crate::load_balancer::{Picker, UniformRandom};
use crate::observability::propagation::{RatioSampler, TraceContext};
use crate::registry::ServiceRegistry;
use crate::resilience::{BreakerConfig, BreakerRegistry};

/// One inbound request, as handed over by the HTTP layer.
#[derive(Debug)]
pub struct ForwardRequest {
    /// Target service name, resolved from the first path segment.
    pub service: String,
    /// Path to forward, with leading slash ("/" when empty).
    pub path: String,
    /// Raw query string, forwarded intact.
    pub query: Option<String>,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Orchestrates forwarding: breaker, selection, trace propagation,
/// dispatch and outcome classification.
#[derive(Debug)]
pub struct ForwardCoordinator {
    registry: Arc<ServiceRegistry>,
    breakers: Arc<BreakerRegistry>,
    picker: UniformRandom,
    transport: Arc<dyn Transport>,
    sampler: RatioSampler,
}

impl ForwardCoordinator {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        breakers: Arc<BreakerRegistry>,
        transport: Arc<dyn Transport>,
        sampler: RatioSampler,
    ) -> Self {
        Self {
            registry,
            breakers,
            picker: UniformRandom::new(),
            transport,
            sampler,
        }
    }

    /// Wire the coordinator from configuration: registry, breakers and the
    /// shared pooled transport.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let registry = Arc::new(ServiceRegistry::from_config(&config.services));
        let breakers = Arc::new(BreakerRegistry::new(BreakerConfig {
            failure_threshold: config.breaker.failure_threshold,
            reset_timeout: Duration::from_secs(config.breaker.reset_timeout_secs),
        }));
        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(
            config.timeouts.upstream_secs,
        ))?);

        Ok(Self::new(
            registry,
            breakers,
            transport,
            RatioSampler::new(config.tracing.sample_ratio),
        ))
    }

    /// Forward one request, returning a classified outcome.
    ///
    /// The span covers the whole attempt and records the outcome class and
    /// failure cause on every exit path.
    pub async fn forward(&self, request: ForwardRequest) -> ForwardOutcome {
        let span = info_span!(
            "gateway.forward",
            service = %request.service,
            method = %request.method,
            path = %request.path,
            endpoint = field::Empty,
            outcome = field::Empty,
            error = field::Empty,
        );

        async move {
            let outcome = self.dispatch(request).await;

            let span = tracing::Span::current();
            match &outcome {
                ForwardOutcome::Response { status, .. } => {
                    span.record("outcome", field::display(status.as_u16()));
                }
                ForwardOutcome::UnknownService { .. } => {
                    span.record("outcome", "unknown_service");
                }
                ForwardOutcome::BreakerOpen { .. } => {
                    span.record("outcome", "breaker_open");
                }
                ForwardOutcome::Transport { error, .. } => {
                    span.record("outcome", "transport_failure");
                    span.record("error", field::display(error));
                }
                ForwardOutcome::Internal { error } => {
                    span.record("outcome", "internal_error");
                    span.record("error", field::display(error));
                }
            }

            outcome
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: ForwardRequest) -> ForwardOutcome {
        // Received → Validated
        let Some(registration) = self.registry.get(&request.service) else {
            return ForwardOutcome::UnknownService {
                name: request.service,
            };
        };

        // Validated → BreakerChecked. Rejection is not itself a failure.
        if !self.breakers.admit(&request.service) {
            tracing::debug!(service = %request.service, "circuit breaker open, rejecting request");
            return ForwardOutcome::BreakerOpen {
                service: request.service,
            };
        }

        // BreakerChecked → EndpointSelected. Validated registrations always
        // carry at least one replica.
        let Some(endpoint) = self.picker.pick(&registration.endpoints) else {
            return ForwardOutcome::Internal {
                error: format!("service '{}' has an empty replica set", request.service),
            };
        };
        tracing::Span::current().record("endpoint", field::display(endpoint));

        // EndpointSelected → Dispatched
        let outbound = self.build_outbound(endpoint, &request);

        match self.transport.send(outbound).await {
            Ok(response) => {
                // Dispatched → Completed. Error statuses relay verbatim and
                // stay out of the breaker's books.
                self.breakers.record_success(&request.service);
                ForwardOutcome::Response {
                    status: response.status,
                    headers: response.headers,
                    body: response.body,
                }
            }
            Err(error) => {
                // Dispatched → Failed: the only path that feeds the breaker.
                self.breakers.record_failure(&request.service);
                tracing::warn!(
                    service = %request.service,
                    error = %error,
                    "transport failure forwarding request"
                );
                ForwardOutcome::Transport {
                    service: request.service,
                    error,
                }
            }
        }
    }

    /// Build the outbound request: selected endpoint base plus forwarded
    /// path and query, inbound headers minus hop-specific ones, and the
    /// gateway's own trace context injected.
    fn build_outbound(&self, endpoint: &Url, request: &ForwardRequest) -> OutboundRequest {
        let mut url = endpoint.clone();
        url.set_path(&request.path);
        url.set_query(request.query.as_deref());

        // Host derives from the target URL; content-length from the
        // buffered body.
        let mut headers = request.headers.clone();
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        let context = TraceContext::extract_or_originate(&request.headers, &self.sampler);
        context.inject(&mut headers);

        OutboundRequest {
            method: request.method.clone(),
            url,
            headers,
            body: request.body.clone(),
        }
    }
}
