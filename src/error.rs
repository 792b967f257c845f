//! Error taxonomy shared by the cache, the group orchestrator and the peer
//! protocol.
//!
//! Errors are `Clone` because a single load result is handed to every caller
//! waiting on the same in-flight key.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("key is required")]
    EmptyKey,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no such group: {0}")]
    NoSuchGroup(String),

    #[error("{0} not exist")]
    KeyNotFound(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    BackingSource(String),

    #[error("group has no getter")]
    MissingGetter,

    #[error("register_peers called more than once")]
    PeersAlreadyRegistered,

    #[error("serving unexpected path: {0}")]
    UnexpectedPath(String),
}

impl CacheError {
    /// Converts a getter failure, keeping it intact when the getter already
    /// reported a `CacheError`.
    pub fn from_getter(err: anyhow::Error) -> Self {
        match err.downcast::<CacheError>() {
            Ok(cache_err) => cache_err,
            Err(other) => CacheError::BackingSource(other.to_string()),
        }
    }

    /// Status code used when the error terminates a peer-protocol request.
    /// Anything raised by the load itself, including an empty key, is a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NoSuchGroup(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
