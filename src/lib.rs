//! API gateway for a static set of backend services.
//!
//! Routes requests by their first path segment, guards each service with a
//! circuit breaker, balances across replica endpoints, and forwards with W3C
//! trace context attached.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                    API GATEWAY                    │
//!                      │                                                   │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│ registry │──▶│  resilience   │  │
//!                      │  │ server  │   │  lookup  │   │circuit breaker│  │
//!                      │  └─────────┘   └──────────┘   └──────┬────────┘  │
//!                      │                                      │           │
//!                      │                                      ▼           │
//!                      │                              ┌───────────────┐   │
//!                      │                              │ load_balancer │   │
//!                      │                              └──────┬────────┘   │
//!                      │                                     │            │
//!   Client Response    │  ┌─────────┐   ┌──────────┐  ┌──────▼────────┐   │
//!   ◀──────────────────┼──│response │◀──│ forward  │◀─│   transport   │◀──┼── Backend
//!                      │  │translate│   │coordin-  │  │   (reqwest)   │   │    Server
//!                      │  └─────────┘   │  ator    │  └───────────────┘   │
//!                      │                └──────────┘                      │
//!                      │  ┌─────────────────────────────────────────────┐ │
//!                      │  │            Cross-Cutting Concerns           │ │
//!                      │  │  ┌────────┐  ┌──────────────┐  ┌─────────┐  │ │
//!                      │  │  │ config │  │observability │  │lifecycle│  │ │
//!                      │  │  │        │  │logs/metrics/ │  │shutdown │  │ │
//!                      │  │  │        │  │ propagation  │  │         │  │ │
//!                      │  │  └────────┘  └──────────────┘  └─────────┘  │ │
//!                      │  └─────────────────────────────────────────────┘ │
//!                      └───────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod forward;
pub mod http;
pub mod registry;

// Traffic management
pub mod load_balancer;
pub mod resilience;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
