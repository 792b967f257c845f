//! Local Cache Module
//!
//! The per-group, size-bounded store that holds values this node is
//! responsible for.
//!
//! ## Core Concepts
//! - **ByteView**: Immutable snapshot handed to callers. Owned bytes are always copies.
//! - **Lru**: Arena-backed recency list with byte accounting and tail eviction.
//! - **Cache**: Mutex-guarded `Lru` with hit counters, created lazily on first insert.

pub mod byteview;
pub mod lru;
pub mod store;

pub use byteview::ByteView;
pub use store::{Cache, CacheStats};
