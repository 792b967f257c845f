//! Peer selection seams between a group and the transport that reaches
//! other nodes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::CacheError;
use crate::transport::protocol::{Request, Response};

pub type PeerFuture<'a> = Pin<Box<dyn Future<Output = Result<Response, CacheError>> + Send + 'a>>;

/// Picks the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns `None` when the key is owned by this node or no peers are known.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a value from one remote peer.
pub trait PeerGetter: Send + Sync {
    fn get<'a>(&'a self, req: &'a Request) -> PeerFuture<'a>;
}
