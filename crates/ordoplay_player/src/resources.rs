// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resource cache of a player.
//!
//! Loads are keyed by owning host and url, so asking twice for the same url
//! reuses the first load. The player pumps the cache once per frame.

use indexmap::IndexMap;
use ordoplay_anim::{HostId, LoadState, LoaderFactory, ResourceLoader, ResourceManager};
use tracing::{debug, trace, warn};

/// Cache entry
struct CacheEntry {
    /// Loader, dropped once the load settles
    loader: Option<Box<dyn ResourceLoader>>,
    /// Last known state
    state: LoadState,
}

/// Fetch-or-reuse resource store
#[derive(Default)]
pub struct ResourceCache {
    entries: IndexMap<(HostId, String), CacheEntry>,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every pending load; returns how many are still pending
    pub fn pump(&mut self, elapsed_ms: f64) -> usize {
        let mut pending = 0;
        for ((_, url), entry) in &mut self.entries {
            let Some(loader) = entry.loader.as_mut() else {
                continue;
            };
            entry.state = loader.poll(elapsed_ms);
            match &entry.state {
                LoadState::Pending => pending += 1,
                LoadState::Ready => {
                    debug!("Loaded {url}");
                    entry.loader = None;
                }
                LoadState::Failed(reason) => {
                    warn!("Failed to load {url}: {reason}");
                    entry.loader = None;
                }
            }
        }
        pending
    }

    /// Are all loads finished, successfully or not
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(|entry| entry.state.is_settled())
    }

    /// State of one load
    #[allow(dead_code)]
    pub fn state(&self, owner: HostId, url: &str) -> Option<&LoadState> {
        self.entries
            .get(&(owner, url.to_string()))
            .map(|entry| &entry.state)
    }

    /// Number of known loads
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the cache empty
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Urls that failed to load
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|((_, url), entry)| match &entry.state {
            LoadState::Failed(reason) => Some((url.as_str(), reason.as_str())),
            _ => None,
        })
    }

    /// Forget every load of a host
    pub fn release(&mut self, owner: HostId) {
        self.entries.retain(|(host, _), _| *host != owner);
    }
}

impl ResourceManager for ResourceCache {
    fn load_or_get(&mut self, owner: HostId, url: &str, factory: LoaderFactory<'_>) {
        let key = (owner, url.to_string());
        if self.entries.contains_key(&key) {
            trace!("Reusing load of {url}");
            return;
        }
        debug!("Loading {url}");
        self.entries.insert(
            key,
            CacheEntry {
                loader: Some(factory()),
                state: LoadState::Pending,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Countdown(u32);

    impl ResourceLoader for Countdown {
        fn poll(&mut self, _elapsed_ms: f64) -> LoadState {
            if self.0 == 0 {
                return LoadState::Ready;
            }
            self.0 -= 1;
            LoadState::Pending
        }
    }

    struct Broken;

    impl ResourceLoader for Broken {
        fn poll(&mut self, _elapsed_ms: f64) -> LoadState {
            LoadState::Failed("broken".to_string())
        }
    }

    #[test]
    fn test_same_url_is_loaded_once_per_host() {
        let built = Rc::new(Cell::new(0));
        let mut cache = ResourceCache::new();
        let host = HostId::new();
        let other = HostId::new();
        let factory = || {
            built.set(built.get() + 1);
            Box::new(Countdown(1)) as Box<dyn ResourceLoader>
        };

        cache.load_or_get(host, "a.png", &factory);
        cache.load_or_get(host, "a.png", &factory);
        cache.load_or_get(other, "a.png", &factory);
        assert_eq!(built.get(), 2);
        assert_eq!(cache.len(), 2);

        cache.release(other);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_pump_until_settled() {
        let mut cache = ResourceCache::new();
        let host = HostId::new();
        cache.load_or_get(host, "slow", &|| Box::new(Countdown(2)) as Box<dyn ResourceLoader>);
        cache.load_or_get(host, "bad", &|| Box::new(Broken) as Box<dyn ResourceLoader>);
        assert!(!cache.is_settled());

        assert_eq!(cache.pump(16.0), 1);
        assert_eq!(cache.pump(16.0), 1);
        assert_eq!(cache.pump(16.0), 0);
        assert!(cache.is_settled());
        assert_eq!(cache.state(host, "slow"), Some(&LoadState::Ready));
        assert_eq!(cache.failures().collect::<Vec<_>>(), [("bad", "broken")]);
    }
}
