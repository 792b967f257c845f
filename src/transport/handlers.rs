use axum::{
    Extension, Router,
    extract::Query,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use super::pool::HttpPool;
use super::protocol::{CONTENT_TYPE_OCTET_STREAM, ENDPOINT_API};
use crate::group::{Group, Registry};

#[derive(Debug, Deserialize)]
pub struct ApiParams {
    pub key: Option<String>,
}

/// Serves `GET {base_path}{group}/{key}` for other peers.
pub async fn handle_peer_get(
    Extension(pool): Extension<Arc<HttpPool>>,
    Extension(registry): Extension<Arc<Registry>>,
    uri: Uri,
) -> Response {
    match pool.serve(&registry, uri.path()).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Peer request {} failed: {}", uri.path(), e);
            (e.status(), e.to_string()).into_response()
        }
    }
}

/// Serves `GET /api?key=<key>` for clients, returning the raw value bytes.
pub async fn handle_api_get(
    Extension(group): Extension<Arc<Group>>,
    Query(params): Query<ApiParams>,
) -> Response {
    let key = params.key.unwrap_or_default();

    match group.get(&key).await {
        Ok(view) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            view.byte_slice(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("API request for {:?} failed: {}", key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Router answering peer requests under the pool's base path.
/// A wildcard does not match an empty tail, so the bare base path is
/// mounted separately.
pub fn peer_router(pool: Arc<HttpPool>, registry: Arc<Registry>) -> Router {
    let route = format!("{}*rest", pool.base_path());

    Router::new()
        .route(pool.base_path(), get(handle_peer_get))
        .route(&route, get(handle_peer_get))
        .layer(Extension(pool))
        .layer(Extension(registry))
}

/// Client-facing router for a single group.
pub fn api_router(group: Arc<Group>) -> Router {
    Router::new()
        .route(ENDPOINT_API, get(handle_api_get))
        .layer(Extension(group))
}
