//! HTTP Peer Pool
//!
//! `HttpPool` is both sides of the peer protocol for one node: it picks the
//! owning peer for a key (client side) and answers other peers' requests
//! (server side). `HttpGetter` performs the outbound fetch to one peer.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::protocol::{
    DEFAULT_BASE_PATH, DEFAULT_REPLICAS, Request, Response, normalize_base_path, parse_path,
    request_path,
};
use crate::error::CacheError;
use crate::group::{PeerFuture, PeerGetter, PeerPicker, Registry};
use crate::ring::{HashFn, HashRing};

/// Tuning knobs for an [`HttpPool`]. Every node in a deployment must use the
/// same base path, replica count and hash function.
#[derive(Clone)]
pub struct PoolOptions {
    pub base_path: String,
    pub replicas: usize,
    /// `None` selects CRC-32.
    pub hash_fn: Option<HashFn>,
    /// Per-request timeout for outbound fetches. `None` waits as long as the
    /// transport does.
    pub timeout: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash_fn: None,
            timeout: None,
        }
    }
}

struct PoolState {
    peers: HashRing,
    http_getters: HashMap<String, Arc<HttpGetter>>,
}

pub struct HttpPool {
    /// This node's own address, e.g. `http://10.0.0.2:8008`.
    self_addr: String,
    opts: PoolOptions,
    client: reqwest::Client,
    state: Mutex<PoolState>,
}

impl HttpPool {
    pub fn new(self_addr: &str) -> Self {
        Self::with_options(self_addr, PoolOptions::default())
    }

    pub fn with_options(self_addr: &str, mut opts: PoolOptions) -> Self {
        opts.base_path = normalize_base_path(&opts.base_path);
        let peers = HashRing::new(opts.replicas, opts.hash_fn);

        Self {
            self_addr: self_addr.trim_end_matches('/').to_string(),
            opts,
            client: reqwest::Client::new(),
            state: Mutex::new(PoolState {
                peers,
                http_getters: HashMap::new(),
            }),
        }
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.opts.base_path
    }

    /// Replaces the pool's peer list. The ring and the per-peer getters are
    /// rebuilt from scratch. Repeated addresses are kept once.
    pub fn set<S: AsRef<str>>(&self, raw_peers: &[S]) {
        let mut peers: Vec<String> = Vec::with_capacity(raw_peers.len());
        for peer in raw_peers {
            let peer = peer.as_ref().trim_end_matches('/');
            if !peers.iter().any(|p| p == peer) {
                peers.push(peer.to_string());
            }
        }

        let mut ring = HashRing::new(self.opts.replicas, self.opts.hash_fn);
        ring.add(peers.as_slice());

        let http_getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    peer,
                    &self.opts.base_path,
                    self.client.clone(),
                    self.opts.timeout,
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        let mut state = self.state.lock();
        state.peers = ring;
        state.http_getters = http_getters;

        tracing::info!("Peer pool of {} now has {} peer(s)", self.self_addr, peers.len());
    }

    /// Addresses of all known peers, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.state.lock().http_getters.keys().cloned().collect();
        peers.sort();
        peers
    }

    /// Address of the peer owning `key`, which may be this node.
    pub fn owner(&self, key: &str) -> Option<String> {
        self.state.lock().peers.get(key).map(str::to_string)
    }

    /// Answers a peer request for `path` using the groups in `registry`.
    /// Returns the encoded [`Response`] body.
    pub async fn serve(&self, registry: &Registry, path: &str) -> Result<Vec<u8>, CacheError> {
        let Some(rest) = path.strip_prefix(self.opts.base_path.as_str()) else {
            tracing::error!("[server {}] serving unexpected path: {}", self.self_addr, path);
            return Err(CacheError::UnexpectedPath(path.to_string()));
        };
        tracing::info!("[server {}] GET {}", self.self_addr, path);

        let (group_name, key) = parse_path(rest)?;

        let group = registry
            .get_group(&group_name)
            .ok_or(CacheError::NoSuchGroup(group_name))?;

        let view = group.get(&key).await?;

        Response {
            value: view.byte_slice(),
        }
        .encode()
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();

        let peer = state.peers.get(key)?;
        if peer == self.self_addr {
            return None;
        }

        tracing::debug!("Pick peer {} for {}", peer, key);
        state
            .http_getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}

/// Fetches values from a single peer over HTTP.
pub struct HttpGetter {
    /// Peer address, e.g. `http://10.0.0.2:8008`.
    peer: String,
    base_path: String,
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpGetter {
    pub fn new(
        peer: &str,
        base_path: &str,
        client: reqwest::Client,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            peer: peer.trim_end_matches('/').to_string(),
            base_path: normalize_base_path(base_path),
            client,
            timeout,
        }
    }

    /// Peer address joined with the base path, e.g. `http://10.0.0.2:8008/cache/`.
    #[cfg(test)]
    pub(crate) fn base_url(&self) -> String {
        format!("{}{}", self.peer, self.base_path)
    }

    pub async fn fetch(&self, req: &Request) -> Result<Response, CacheError> {
        let url = format!("{}{}", self.peer, request_path(&self.base_path, req));

        let mut request = self.client.get(&url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CacheError::Transport(format!("requesting {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(CacheError::Transport(format!(
                "server returned: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Transport(format!("reading response body: {}", e)))?;

        Response::decode(&body)
    }
}

impl PeerGetter for HttpGetter {
    fn get<'a>(&'a self, req: &'a Request) -> PeerFuture<'a> {
        Box::pin(self.fetch(req))
    }
}
