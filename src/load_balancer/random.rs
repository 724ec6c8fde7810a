//! Uniform random selection strategy.

use url::Url;

use crate::load_balancer::Picker;

/// Picks uniformly at random among the replicas.
///
/// Stateless; randomness comes from the thread-local generator.
#[derive(Debug, Default)]
pub struct UniformRandom;

impl UniformRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Picker for UniformRandom {
    fn pick<'a>(&self, endpoints: &'a [Url]) -> Option<&'a Url> {
        if endpoints.is_empty() {
            return None;
        }
        endpoints.get(fastrand::usize(..endpoints.len()))
    }
}
