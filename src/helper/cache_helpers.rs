use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Collects routes whose rendered output has gone stale after a content
/// change, for a downstream cache or static-site regenerator to pick up.
/// Shared across workers; cloning is cheap.
#[derive(Clone, Default)]
pub struct CacheNotifier {
    stale_routes: Arc<RwLock<HashSet<String>>>,
}

impl CacheNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks routes stale. A poisoned lock only means a panicking writer
    /// left a partial set behind, which is still safe to extend.
    pub fn declare_stale(&self, routes: &[String]) {
        let mut guard = match self.stale_routes.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        for route in routes {
            log::debug!("Route marked stale: {}", route);
            guard.insert(route.clone());
        }
    }

    /// Drains and returns the accumulated stale routes.
    pub fn take_stale(&self) -> HashSet<String> {
        let mut guard = match self.stale_routes.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_take_drains_the_set() {
        let notifier = CacheNotifier::new();
        notifier.declare_stale(&["/".to_string(), "/noticias".to_string()]);
        notifier.declare_stale(&["/noticias".to_string()]);

        let stale = notifier.take_stale();
        assert_eq!(stale.len(), 2);
        assert!(stale.contains("/"));
        assert!(stale.contains("/noticias"));

        assert!(notifier.take_stale().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let notifier = CacheNotifier::new();
        let clone = notifier.clone();
        clone.declare_stale(&["/eventos".to_string()]);
        assert!(notifier.take_stale().contains("/eventos"));
    }
}
