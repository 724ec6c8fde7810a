//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check service registry integrity (unique names, non-empty replicas)
//! - Validate value ranges (thresholds > 0, sample ratio in [0, 1])
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("duplicate service name '{0}'")]
    DuplicateService(String),

    #[error("service '{0}' has no endpoints")]
    NoEndpoints(String),

    #[error("service '{service}' endpoint '{endpoint}' must be http or https with a host")]
    InvalidEndpoint { service: String, endpoint: String },

    #[error("breaker failure_threshold must be at least 1")]
    ZeroThreshold,

    #[error("breaker reset_timeout_secs must be at least 1")]
    ZeroResetTimeout,

    #[error("timeout '{0}' must be at least 1 second")]
    ZeroTimeout(&'static str),

    #[error("tracing sample_ratio {0} is outside [0.0, 1.0]")]
    SampleRatioOutOfRange(f64),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for service in &config.services {
        if !seen.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }

        if service.endpoints.is_empty() {
            errors.push(ValidationError::NoEndpoints(service.name.clone()));
        }

        for endpoint in &service.endpoints {
            let scheme_ok = matches!(endpoint.scheme(), "http" | "https");
            if !scheme_ok || endpoint.host_str().is_none() {
                errors.push(ValidationError::InvalidEndpoint {
                    service: service.name.clone(),
                    endpoint: endpoint.to_string(),
                });
            }
        }
    }

    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    if config.breaker.reset_timeout_secs == 0 {
        errors.push(ValidationError::ZeroResetTimeout);
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let ratio = config.tracing.sample_ratio;
    if !(0.0..=1.0).contains(&ratio) || ratio.is_nan() {
        errors.push(ValidationError::SampleRatioOutOfRange(ratio));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
