//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (service, path, method, headers, body)
//!     → registry lookup (unknown service short-circuits)
//!     → breaker admission (open breaker short-circuits, records nothing)
//!     → endpoint selection (uniform random over replicas)
//!     → outbound build (trace context injected, hop headers stripped)
//!     → transport.rs (delegated network call, bounded timeout)
//!     → outcome classification → breaker update → ForwardOutcome
//! ```
//!
//! # Design Decisions
//! - Backend error statuses are relayed verbatim and never counted as
//!   breaker failures; only transport-level failures are
//! - Outcomes are explicit variants consumed by the response translation
//!   step, not an error propagation path

pub mod coordinator;
pub mod transport;

pub use coordinator::{ForwardCoordinator, ForwardRequest};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportError, UpstreamResponse};

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};

/// Outcome of one forward attempt.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// Backend replied; relayed as-is regardless of status class.
    Response {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    /// The service name is not in the registry.
    UnknownService { name: String },
    /// Admission rejected by the circuit breaker; no network call made.
    BreakerOpen { service: String },
    /// The network exchange itself failed; recorded against the breaker.
    Transport {
        service: String,
        error: TransportError,
    },
    /// Gateway-side construction or translation failure. Does not indicate
    /// backend unhealthiness and never mutates breaker state.
    Internal { error: String },
}
