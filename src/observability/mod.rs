//! Observability subsystem.
//!
//! # Responsibilities
//! - Structured logging setup (tracing-subscriber, env-filter)
//! - Prometheus-compatible metrics exposition
//! - W3C trace-context propagation across the forwarded hop
//!
//! # Design Decisions
//! - One `gateway.forward` span per forwarded request, closed on every
//!   exit path
//! - Trace context travels explicitly through the forward call chain,
//!   never via ambient state

pub mod logging;
pub mod metrics;
pub mod propagation;
