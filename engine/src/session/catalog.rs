//! Cached model list

use std::time::{Duration, Instant};

/// When a fetched model list must be fetched again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCachePolicy {
    /// Never reuse a fetched list
    Never,

    /// Reuse the first successful fetch until invalidated
    Forever,

    /// Reuse a fetched list until it is older than the duration
    Ttl(Duration),
}

/// Model ids from the last successful fetch, filtered by prefix
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    policy: ModelCachePolicy,
    allowed_prefixes: Vec<String>,
    entry: Option<(Instant, Vec<String>)>,
}

impl ModelCatalog {
    pub fn new(policy: ModelCachePolicy) -> Self {
        Self {
            policy,
            allowed_prefixes: Vec::new(),
            entry: None,
        }
    }

    /// Keep only model ids starting with one of `prefixes`. An empty list
    /// keeps everything.
    pub fn with_allowed_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.allowed_prefixes = prefixes;
        self
    }

    /// The cached list, if one exists and is still fresh under the policy
    pub fn cached(&self) -> Option<&[String]> {
        let (fetched_at, models) = self.entry.as_ref()?;
        let fresh = match self.policy {
            ModelCachePolicy::Never => false,
            ModelCachePolicy::Forever => true,
            ModelCachePolicy::Ttl(ttl) => fetched_at.elapsed() < ttl,
        };
        fresh.then_some(models.as_slice())
    }

    /// Filter and store a freshly fetched list, returning what was stored.
    /// Server order is preserved.
    pub fn store(&mut self, models: Vec<String>) -> &[String] {
        let models: Vec<String> = if self.allowed_prefixes.is_empty() {
            models
        } else {
            models
                .into_iter()
                .filter(|id| self.allowed_prefixes.iter().any(|p| id.starts_with(p)))
                .collect()
        };

        let (_, stored) = self.entry.insert((Instant::now(), models));
        stored
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
