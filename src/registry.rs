//! Static service registry.
//!
//! # Responsibilities
//! - Map a service name to its replica endpoints
//! - Built once from validated configuration, immutable thereafter
//!
//! # Design Decisions
//! - No dynamic registration: the set of routable services is fixed at
//!   startup and shared via Arc
//! - Lookup miss means the request never touches breaker or selector

use std::collections::HashMap;

use url::Url;

use crate::config::ServiceConfig;

/// A registered service and its interchangeable replica endpoints.
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    /// Unique service name; the routing key.
    pub name: String,
    /// Replica base addresses. Non-empty for validated configs.
    pub endpoints: Vec<Url>,
}

/// Immutable name → registration lookup.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceRegistration>,
}

impl ServiceRegistry {
    /// Build the registry from configuration.
    ///
    /// Expects validated config; a duplicate name would silently keep the
    /// last entry, which validation already rejects.
    pub fn from_config(configs: &[ServiceConfig]) -> Self {
        let services = configs
            .iter()
            .map(|config| {
                (
                    config.name.clone(),
                    ServiceRegistration {
                        name: config.name.clone(),
                        endpoints: config.endpoints.clone(),
                    },
                )
            })
            .collect();

        Self { services }
    }

    /// Look up a service by name.
    pub fn get(&self, name: &str) -> Option<&ServiceRegistration> {
        self.services.get(name)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// True if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
