use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::watch;

/// In-flight calls keyed by cache key. Each call is a `watch` channel whose
/// value turns `Some` once the leader has a result.
pub struct Flight<T> {
    calls: Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
}

impl<T: Clone> Flight<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `load` for `key` unless a load for the same key is already in
    /// flight, in which case the caller waits for that result instead.
    ///
    /// If the leading caller is cancelled before it finishes, waiters race to
    /// become the new leader, so a dropped load never leaves anyone hanging.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            let role = {
                let mut calls = self.calls.lock();
                match calls.get(key) {
                    Some(rx) => Role::Waiter(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        calls.insert(key.to_string(), rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => return self.lead(key, tx, load).await,
                Role::Waiter(mut rx) => {
                    if let Ok(done) = rx.wait_for(Option::is_some).await
                        && let Some(value) = done.as_ref()
                    {
                        return value.clone();
                    }
                    tracing::debug!("in-flight load for {} was abandoned, retrying", key);
                }
            }
        }
    }

    /// Number of keys currently being loaded.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    async fn lead<F, Fut>(&self, key: &str, tx: watch::Sender<Option<T>>, load: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _call = CallGuard { flight: self, key };

        let value = load().await;
        tx.send_replace(Some(value.clone()));
        value
    }
}

impl<T: Clone> Default for Flight<T> {
    fn default() -> Self {
        Self::new()
    }
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Waiter(watch::Receiver<Option<T>>),
}

/// Removes the call from the in-flight map when the leader finishes or is
/// dropped mid-load.
struct CallGuard<'a, T> {
    flight: &'a Flight<T>,
    key: &'a str,
}

impl<T> Drop for CallGuard<'_, T> {
    fn drop(&mut self) {
        self.flight.calls.lock().remove(self.key);
    }
}
