//! Distributed Read-Through Cache Library
//!
//! Peer nodes jointly serve lookups for named key spaces ("groups"). A miss is
//! routed to the single peer that owns the key; that peer answers from its own
//! bounded cache or loads from the group's backing source.
//!
//! ## Architecture Modules
//! - **`cache`**: Byte-bounded LRU store and the immutable `ByteView` values it holds.
//! - **`ring`**: Consistent hashing with virtual nodes, mapping keys to peers.
//! - **`singleflight`**: Collapses concurrent loads of one key into a single execution.
//! - **`group`**: Per-namespace orchestration of cache, loader, peers and getter, plus the `Registry`.
//! - **`transport`**: HTTP peer pool, the node-to-node wire protocol and the axum handlers.
//! - **`config`**: Command-line configuration of a node.
//! - **`error`**: The `CacheError` taxonomy.

pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod ring;
pub mod singleflight;
pub mod transport;

pub use cache::ByteView;
pub use error::CacheError;
pub use group::{Getter, Group, Registry};
