//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Static service registry: routable services and their replicas.
    pub services: Vec<ServiceConfig>,

    /// Circuit breaker settings, shared by all services.
    pub breaker: BreakerSettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Distributed tracing settings.
    pub tracing: TracingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A routable service and its replica endpoints.
///
/// The service name is the routing key: requests to `/{name}/...` are
/// forwarded to one of the endpoints. Replicas are interchangeable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Unique service name.
    pub name: String,

    /// Replica base addresses (scheme + host + port).
    pub endpoints: Vec<Url>,
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerSettings {
    /// Number of recorded failures that trips the breaker.
    pub failure_threshold: u32,

    /// Cooldown in seconds before a tripped breaker admits a probe.
    pub reset_timeout_secs: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total timeout for one outbound request in seconds.
    pub upstream_secs: u64,

    /// Inbound request timeout in seconds. Kept above the upstream timeout
    /// so upstream timeouts surface as 503, not a dropped inbound request.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 30,
            request_secs: 35,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Distributed tracing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Fraction of gateway-originated traces that are sampled.
    /// Inherited unchanged for traces originated upstream.
    pub sample_ratio: f64,

    /// Deployment environment tag for log context.
    pub environment: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            sample_ratio: 0.3,
            environment: "development".to_string(),
        }
    }
}
