//! Peer Network Protocol
//!
//! A peer asks the owner of a key with `GET {base_path}{group}/{key}`, both
//! segments percent-encoded. The owner answers with a bincode-encoded
//! [`Response`]. Every node in a deployment must agree on this encoding.

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// --- API Endpoints ---

/// Prefix under which peers serve each other.
pub const DEFAULT_BASE_PATH: &str = "/cache/";
/// Client-facing read endpoint, `GET /api?key=<key>`.
pub const ENDPOINT_API: &str = "/api";
/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

// --- Messages ---

/// Arguments of a remote lookup. Only the URL path built from it travels on
/// the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub group: String,
    pub key: String,
}

/// Body of a successful peer response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub value: Vec<u8>,
}

impl Response {
    pub fn encode(&self) -> Result<Vec<u8>, CacheError> {
        bincode::serialize(self)
            .map_err(|e| CacheError::Transport(format!("encoding response body: {}", e)))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        bincode::deserialize(bytes)
            .map_err(|e| CacheError::Transport(format!("decoding response body: {}", e)))
    }
}

/// Path a peer requests for `req`, relative to its address.
pub fn request_path(base_path: &str, req: &Request) -> String {
    format!(
        "{}{}/{}",
        base_path,
        urlencoding::encode(&req.group),
        urlencoding::encode(&req.key)
    )
}

/// Splits the part of a request path after the base path into its group and
/// key, decoding both.
pub fn parse_path(rest: &str) -> Result<(String, String), CacheError> {
    let bad_request = || CacheError::BadRequest(rest.to_string());

    let (group, key) = rest.split_once('/').ok_or_else(bad_request)?;
    let group = urlencoding::decode(group).map_err(|_| bad_request())?;
    let key = urlencoding::decode(key).map_err(|_| bad_request())?;

    Ok((group.into_owned(), key.into_owned()))
}

/// Normalizes a base path to the `/segment/` form.
pub fn normalize_base_path(base_path: &str) -> String {
    let cleaned = base_path.trim_matches('/');
    if cleaned.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", cleaned)
    }
}
