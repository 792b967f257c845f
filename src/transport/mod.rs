//! Peer Transport Module
//!
//! Moves values between nodes over HTTP.
//!
//! ## Core Concepts
//! - **Routing**: `HttpPool` owns the hash ring and one `HttpGetter` per peer; it implements `PeerPicker`.
//! - **Serving**: Inbound `GET {base_path}{group}/{key}` requests are answered from the local `Registry`.
//! - **Fallback**: Any transport or decode failure is reported to the group, which then loads locally.

pub mod handlers;
pub mod pool;
pub mod protocol;

pub use handlers::{api_router, peer_router};
pub use pool::{HttpGetter, HttpPool, PoolOptions};
