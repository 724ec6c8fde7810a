//! Lifecycle management.
//!
//! # Responsibilities
//! - Coordinate graceful shutdown across long-running tasks
//! - Translate process signals into the shutdown broadcast

pub mod shutdown;

pub use shutdown::Shutdown;
