//! Backing Source
//!
//! The capability a group falls back to on a miss. Getters are stored
//! type-erased, the same way task handlers are, so each group can carry an
//! arbitrary async closure.

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a thread-safe, asynchronous lookup into the backing source.
pub type GetterFn =
    Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>> + Send + Sync>;

#[derive(Clone)]
pub struct Getter {
    f: GetterFn,
}

impl Getter {
    /// Wraps an async lookup function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>>> + Send + 'static,
    {
        let f: GetterFn = Arc::new(move |key: String| {
            Box::pin(f(key)) as Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>>
        });
        Self { f }
    }

    /// Wraps a synchronous lookup. It runs on the blocking pool so a slow
    /// source does not stall the runtime.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |key: String| {
            let f = f.clone();
            async move {
                tokio::task::spawn_blocking(move || (*f)(&key))
                    .await
                    .map_err(|e| anyhow::anyhow!("getter task failed: {}", e))?
            }
        })
    }

    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.f)(key.to_string()).await
    }
}

impl std::fmt::Debug for Getter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Getter")
    }
}
