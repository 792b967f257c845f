use peercache::config::NodeConfig;
use peercache::error::CacheError;
use peercache::group::{Getter, Group, Registry};
use peercache::transport::{HttpPool, PoolOptions, api_router, peer_router};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = NodeConfig::from_args(&args)?;

    tracing::info!("Starting node {}", config.self_addr());
    tracing::info!("Peers: {:?}", config.peers);

    // 1. Groups:
    let registry = Registry::new();
    let group = create_group(&registry, config.cache_bytes);

    // 2. Peer pool:
    let pool = Arc::new(HttpPool::with_options(
        &config.self_addr(),
        PoolOptions {
            timeout: config.peer_timeout,
            ..PoolOptions::default()
        },
    ));
    pool.set(&config.peers);
    group.register_peers(pool.clone())?;

    // 3. Client-facing API:
    if config.api {
        let api_addr = config.api_addr;
        let app = api_router(group.clone());
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(api_addr).await {
                Ok(listener) => {
                    tracing::info!("API server listening on {}", api_addr);
                    if let Err(e) = axum::serve(listener, app).await {
                        tracing::error!("API server failed: {}", e);
                    }
                }
                Err(e) => tracing::error!("Failed to bind API server on {}: {}", api_addr, e),
            }
        });
    }

    // 4. Peer server:
    let app = peer_router(pool, registry);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Cache server listening on {}", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}

/// Demo `scores` group backed by a slow in-memory table.
fn create_group(registry: &Registry, cache_bytes: usize) -> Arc<Group> {
    let db: Arc<HashMap<&'static str, &'static str>> = Arc::new(HashMap::from([
        ("Tom", "630"),
        ("Jack", "589"),
        ("Sam", "567"),
    ]));

    registry.new_group(
        "scores",
        cache_bytes,
        Getter::new(move |key: String| {
            let db = db.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                tracing::info!("[SlowDB] search key {}", key);
                match db.get(key.as_str()) {
                    Some(value) => Ok(value.as_bytes().to_vec()),
                    None => Err(anyhow::Error::new(CacheError::KeyNotFound(key))),
                }
            }
        }),
    )
}
