//! TTL Policy Module
//!
//! Maps data categories to how long their cached values stay fresh.

use std::collections::HashMap;
use std::time::Duration;

/// Built-in category TTLs. Volatile data expires quickly, slow-moving data
/// like revenue is kept longer.
pub const DEFAULT_CATEGORY_TTLS: &[(&str, Duration)] = &[
    ("realtime", Duration::from_secs(60)),
    ("overview", Duration::from_secs(5 * 60)),
    ("videos", Duration::from_secs(10 * 60)),
    ("channelHealth", Duration::from_secs(15 * 60)),
    ("revenue", Duration::from_secs(30 * 60)),
];

// == TTL Policy ==
/// Resolves a cache category to a TTL, falling back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    default_ttl: Duration,
    per_category: HashMap<String, Duration>,
}

impl TtlPolicy {
    /// Policy with no category overrides.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            per_category: HashMap::new(),
        }
    }

    /// Policy seeded with [`DEFAULT_CATEGORY_TTLS`].
    pub fn with_builtin_categories(default_ttl: Duration) -> Self {
        DEFAULT_CATEGORY_TTLS
            .iter()
            .fold(Self::new(default_ttl), |policy, (name, ttl)| {
                policy.with_category(*name, *ttl)
            })
    }

    /// Adds or replaces the TTL of one category.
    pub fn with_category(mut self, category: impl Into<String>, ttl: Duration) -> Self {
        self.per_category.insert(category.into(), ttl);
        self
    }

    // == Resolve ==
    /// TTL for `category`, or the default TTL when the category is absent or unknown.
    pub fn resolve(&self, category: Option<&str>) -> Duration {
        category
            .and_then(|name| self.per_category.get(name))
            .copied()
            .unwrap_or(self.default_ttl)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, Duration)> + '_ {
        self.per_category
            .iter()
            .map(|(name, ttl)| (name.as_str(), *ttl))
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::with_builtin_categories(Duration::from_millis(300_000))
    }
}
