//! Resilience subsystem.
//!
//! # Responsibilities
//! - Per-service circuit breaking: stop forwarding to a service after
//!   repeated transport failures, re-probe after a cooldown
//!
//! # Design Decisions
//! - Failure is tracked at service granularity, not per endpoint
//! - Only transport-level failures count; backend error statuses do not
//! - No retries: the breaker is the sole failure-handling mechanism

pub mod circuit_breaker;

pub use circuit_breaker::{BreakerConfig, BreakerPhase, BreakerRegistry};
