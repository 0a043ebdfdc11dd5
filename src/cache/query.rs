use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::models::{PageResult, QueryParameters};

/// Query identity: two requests with the same key are the same request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Browse {
        page: u32,
        page_size: u32,
    },
    Search {
        term: String,
        page: u32,
        page_size: u32,
    },
}

impl From<&QueryParameters> for CacheKey {
    fn from(params: &QueryParameters) -> Self {
        if params.is_search() {
            CacheKey::Search {
                term: params.search_term.clone(),
                page: params.page,
                page_size: params.page_size,
            }
        } else {
            CacheKey::Browse {
                page: params.page,
                page_size: params.page_size,
            }
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Browse { page, page_size } => write!(f, "movies:{}:{}", page, page_size),
            CacheKey::Search {
                term,
                page,
                page_size,
            } => write!(f, "search:{}:{}:{}", term, page, page_size),
        }
    }
}

struct CacheEntry {
    page: PageResult,
    fetched_at: Instant,
    stale: bool,
}

/// In-memory cache of fetched pages, keyed by query identity
///
/// An entry is fresh while it is younger than `stale_time` and has not been invalidated.
/// Entries older than `gc_time` are dropped whenever a new page is stored.
pub struct QueryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    stale_time: Duration,
    gc_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_time,
            gc_time,
        }
    }

    /// Returns the cached page only if it can be shown without refetching
    pub fn fresh(&self, key: &CacheKey) -> Option<&PageResult> {
        self.entries
            .get(key)
            .filter(|entry| !entry.stale && entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| &entry.page)
    }

    pub fn insert(&mut self, key: CacheKey, page: PageResult) {
        self.collect_garbage(Instant::now());
        self.entries.insert(
            key,
            CacheEntry {
                page,
                fetched_at: Instant::now(),
                stale: false,
            },
        );
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.stale = true;
        }
    }

    /// Number of stored pages, stale ones included
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn collect_garbage(&mut self, now: Instant) {
        let before = self.entries.len();
        let gc_time = self.gc_time;
        self.entries
            .retain(|_, entry| now.duration_since(entry.fetched_at) < gc_time);

        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.entries.len(), "Evicted cached pages");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    fn browse(page: u32) -> CacheKey {
        CacheKey::Browse { page, page_size: 20 }
    }

    #[test]
    fn test_cache_key_display_browse() {
        assert_eq!(format!("{}", browse(3)), "movies:3:20");
    }

    #[test]
    fn test_cache_key_display_search() {
        let key = CacheKey::Search {
            term: "batman".to_string(),
            page: 1,
            page_size: 20,
        };
        assert_eq!(format!("{}", key), "search:batman:1:20");
    }

    #[test]
    fn test_cache_key_from_parameters() {
        let mut params = QueryParameters::new(20);
        params.page = 2;
        assert_eq!(CacheKey::from(&params), browse(2));

        params.search_term = "alien".to_string();
        assert_eq!(
            CacheKey::from(&params),
            CacheKey::Search {
                term: "alien".to_string(),
                page: 2,
                page_size: 20
            }
        );
    }

    #[test]
    fn test_zero_stale_time_is_never_fresh() {
        let mut cache = QueryCache::new(Duration::ZERO, Duration::from_secs(30));
        cache.insert(browse(1), fixtures::page(&["Alien"], 1, 1));

        assert!(cache.fresh(&browse(1)).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_all_marks_every_entry() {
        let mut cache = QueryCache::new(Duration::from_secs(60), Duration::from_secs(60));
        cache.insert(browse(1), fixtures::page(&["Alien"], 1, 2));
        cache.insert(browse(2), fixtures::page(&["Brazil"], 2, 2));
        assert!(cache.fresh(&browse(1)).is_some());

        cache.invalidate_all();
        assert!(cache.fresh(&browse(1)).is_none());
        assert!(cache.fresh(&browse(2)).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_insert_evicts_expired_entries() {
        let mut cache = QueryCache::new(Duration::from_secs(60), Duration::ZERO);
        cache.insert(browse(1), fixtures::page(&["Alien"], 1, 2));
        cache.insert(browse(2), fixtures::page(&["Brazil"], 2, 2));

        assert_eq!(cache.len(), 1);
        assert!(cache.fresh(&browse(1)).is_none());
        assert!(cache.fresh(&browse(2)).is_some());
    }
}
