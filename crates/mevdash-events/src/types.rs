//! Registry of event types the ingestion boundary accepts.

use dashmap::DashSet;

/// Event types recognized out of the box.
pub const DEFAULT_EVENT_TYPES: [&str; 6] = [
    "transaction",
    "opportunity",
    "metrics",
    "dashboard_update",
    "training_progress",
    "system_health",
];

/// Thread-safe set of recognized event types.
///
/// Seeded from settings at startup; producers that introduce a new type can
/// extend the set at runtime without a restart.
#[derive(Debug)]
pub struct EventTypeRegistry {
    types: DashSet<String>,
}

impl EventTypeRegistry {
    /// Empty registry. Rejects everything until types are registered.
    pub fn new() -> Self {
        Self {
            types: DashSet::new(),
        }
    }

    /// Registry seeded with `types`.
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for event_type in types {
            let _ = registry.types.insert(event_type.into());
        }
        registry
    }

    /// Registry seeded with [`DEFAULT_EVENT_TYPES`].
    pub fn with_defaults() -> Self {
        Self::with_types(DEFAULT_EVENT_TYPES)
    }

    /// Add a type. Returns `false` if it was already present.
    pub fn register(&self, event_type: impl Into<String>) -> bool {
        self.types.insert(event_type.into())
    }

    /// Whether `event_type` is accepted.
    pub fn contains(&self, event_type: &str) -> bool {
        self.types.contains(event_type)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for EventTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_recognized() {
        let registry = EventTypeRegistry::with_defaults();
        for event_type in DEFAULT_EVENT_TYPES {
            assert!(registry.contains(event_type), "missing {event_type}");
        }
    }

    #[test]
    fn unknown_type_rejected() {
        let registry = EventTypeRegistry::with_defaults();
        assert!(!registry.contains("liquidation"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn empty_registry_rejects_everything() {
        let registry = EventTypeRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("transaction"));
    }

    #[test]
    fn register_extends_the_set() {
        let registry = EventTypeRegistry::with_defaults();
        assert!(registry.register("liquidation"));
        assert!(registry.contains("liquidation"));
    }

    #[test]
    fn register_existing_returns_false() {
        let registry = EventTypeRegistry::with_defaults();
        assert!(!registry.register("transaction"));
        assert_eq!(registry.len(), DEFAULT_EVENT_TYPES.len());
    }

    #[test]
    fn with_types_seeds_exactly() {
        let registry = EventTypeRegistry::with_types(["a", "b"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(!registry.contains("transaction"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let registry = EventTypeRegistry::with_defaults();
        assert!(!registry.contains("Transaction"));
    }
}
