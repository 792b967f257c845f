use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::byteview::ByteView;
use super::lru::Lru;

/// Counters reported by [`Cache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub gets: u64,
    pub hits: u64,
    pub evictions: u64,
    pub items: usize,
    pub bytes: usize,
}

/// Thread-safe wrapper around [`Lru`], one per group.
///
/// The underlying store is created on first insert. The lock only covers
/// index and list bookkeeping.
pub struct Cache {
    lru: Mutex<Option<Lru>>,
    cache_bytes: usize,
    gets: AtomicU64,
    hits: AtomicU64,
    evictions: Arc<AtomicU64>,
}

impl Cache {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            lru: Mutex::new(None),
            cache_bytes,
            gets: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.lru.lock();
        let lru = guard.get_or_insert_with(|| {
            let evictions = self.evictions.clone();
            Lru::new(
                self.cache_bytes,
                Some(Box::new(move |_key: String, _value: ByteView| {
                    evictions.fetch_add(1, Ordering::Relaxed);
                })),
            )
        });
        lru.add(key, value);
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.gets.fetch_add(1, Ordering::Relaxed);

        let mut guard = self.lru.lock();
        let value = guard.as_mut()?.get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub fn len(&self) -> usize {
        self.lru.lock().as_ref().map(Lru::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes(&self) -> usize {
        self.lru.lock().as_ref().map(Lru::bytes).unwrap_or(0)
    }

    pub fn stats(&self) -> CacheStats {
        let (items, bytes) = self
            .lru
            .lock()
            .as_ref()
            .map(|lru| (lru.len(), lru.bytes()))
            .unwrap_or((0, 0));

        CacheStats {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            items,
            bytes,
        }
    }
}
