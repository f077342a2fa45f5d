//! Namespaced cache keys and the TTL table.
//!
//! Keys follow `lucid:<category>:<entity_id>` so categories and tenants
//! never collide in the shared store.

/// Prefix applied to every cache key owned by this service.
pub const KEY_PREFIX: &str = "lucid";

/// Data categories cached per user, each with a fixed TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// Derived user context assembled from the database of record.
    UserContext,
    /// The user's dream list.
    DreamList,
    /// Behavioral pattern analysis.
    BehavioralPatterns,
    /// Journaling sessions.
    Sessions,
    /// Written reflections.
    Reflections,
}

impl CacheCategory {
    /// Every category, in invalidation order.
    pub const ALL: [CacheCategory; 5] = [
        CacheCategory::UserContext,
        CacheCategory::DreamList,
        CacheCategory::BehavioralPatterns,
        CacheCategory::Sessions,
        CacheCategory::Reflections,
    ];

    /// Key segment for this category.
    pub fn segment(self) -> &'static str {
        match self {
            CacheCategory::UserContext => "context",
            CacheCategory::DreamList => "dreams",
            CacheCategory::BehavioralPatterns => "patterns",
            CacheCategory::Sessions => "sessions",
            CacheCategory::Reflections => "reflections",
        }
    }

    /// Time-to-live in seconds for entries of this category.
    pub fn ttl_secs(self) -> u64 {
        match self {
            CacheCategory::UserContext => 300,
            CacheCategory::DreamList => 120,
            CacheCategory::BehavioralPatterns => 600,
            CacheCategory::Sessions => 60,
            CacheCategory::Reflections => 300,
        }
    }

    /// Build the namespaced key for an entity of this category.
    pub fn key(self, entity_id: &str) -> String {
        format!("{KEY_PREFIX}:{}:{entity_id}", self.segment())
    }
}

/// Default TTL used when a caller does not specify one.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// The full set of per-user keys, used for whole-user invalidation.
pub fn user_context_keys(user_id: &str) -> [String; 5] {
    CacheCategory::ALL.map(|category| category.key(user_id))
}
