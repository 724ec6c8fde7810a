//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Service resolved → replica endpoints from registry
//!     → Apply selection strategy:
//!         - random.rs (uniform random over replicas)
//!     → Return selected endpoint
//! ```
//!
//! # Design Decisions
//! - Replicas are interchangeable; health is tracked per service by the
//!   circuit breaker, not per endpoint
//! - Exactly one selection per inbound request, no retry across endpoints

pub mod random;

use url::Url;

pub use random::UniformRandom;

/// Strategy for picking one endpoint from a replica set.
pub trait Picker: Send + Sync + std::fmt::Debug {
    /// Pick an endpoint, or None if the slice is empty.
    fn pick<'a>(&self, endpoints: &'a [Url]) -> Option<&'a Url>;
}
