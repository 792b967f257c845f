use std::sync::{Arc, OnceLock};

use super::getter::Getter;
use super::peers::{PeerGetter, PeerPicker};
use crate::cache::{ByteView, Cache, CacheStats};
use crate::error::CacheError;
use crate::singleflight::Flight;
use crate::transport::protocol::Request;

/// A named cache namespace.
///
/// Reads go to the local cache first. On a miss exactly one load per key
/// runs at a time: it asks the owning peer when that is another node, and
/// falls back to the group's getter otherwise or when the peer fails.
pub struct Group {
    name: String,
    getter: Getter,
    main_cache: Cache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: Flight<Result<ByteView, CacheError>>,
}

impl Group {
    pub(crate) fn new(name: &str, cache_bytes: usize, getter: Getter) -> Self {
        Self {
            name: name.to_string(),
            getter,
            main_cache: Cache::new(cache_bytes),
            peers: OnceLock::new(),
            loader: Flight::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches the peer picker used to route misses. May only be called once.
    ///
    /// A second call is a wiring bug: debug builds panic, release builds
    /// reject it and keep the first picker.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<(), CacheError> {
        if self.peers.set(peers).is_err() {
            if cfg!(debug_assertions) {
                panic!("register_peers called more than once for group {}", self.name);
            }
            tracing::error!("register_peers called more than once for group {}", self.name);
            return Err(CacheError::PeersAlreadyRegistered);
        }
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        if let Some(value) = self.main_cache.get(key) {
            tracing::debug!("[{}] {}: hit", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.main_cache.stats()
    }

    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        self.loader
            .run(key, || async {
                if let Some(peers) = self.peers.get()
                    && let Some(peer) = peers.pick_peer(key)
                {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(e) => {
                            tracing::warn!("[{}] failed to get {} from peer: {}", self.name, key, e);
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView, CacheError> {
        let req = Request {
            group: self.name.clone(),
            key: key.to_string(),
        };
        let res = peer.get(&req).await?;
        Ok(ByteView::from(res.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let bytes = self
            .getter
            .get(key)
            .await
            .map_err(CacheError::from_getter)?;

        tracing::debug!("[{}] {}: loaded from getter ({} bytes)", self.name, key, bytes.len());

        let value = ByteView::from(bytes);
        self.main_cache.add(key, value.clone());
        Ok(value)
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("peers_registered", &self.peers.get().is_some())
            .finish()
    }
}
