//! Group Orchestration Module
//!
//! A `Group` is a named cache namespace tying together its local cache, the
//! singleflight loader, peer routing, and the backing-source getter.
//!
//! ## Read Path
//! 1. **Hit**: the local cache answers immediately.
//! 2. **Remote**: on a miss, if the ring assigns the key to another peer, fetch it from there.
//! 3. **Local**: if no peer owns it (or the peer fails), call the getter and populate the cache.
//!
//! ## Submodules
//! - **`group`**: The `Group` type and its read path.
//! - **`registry`**: Name -> `Group` lookup shared with the HTTP layer.
//! - **`getter`**: Type-erased backing-source capability.
//! - **`peers`**: `PeerPicker` / `PeerGetter` traits implemented by the transport.

pub mod getter;
pub mod group;
pub mod peers;
pub mod registry;

pub use getter::Getter;
pub use group::Group;
pub use peers::{PeerFuture, PeerGetter, PeerPicker};
pub use registry::{GroupBuilder, Registry};

#[cfg(test)]
mod tests;
