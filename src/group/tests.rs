//! Group Module Tests
//!
//! ## Test Scopes
//! - **Registry**: Creation, lookup, replacement and the missing-getter precondition.
//! - **Read Path**: Validation, cache hits, deduplicated loads, getter errors.
//! - **Peers**: Remote success, remote failure with local fallback, single registration.

#[cfg(test)]
mod tests {
    use crate::error::CacheError;
    use crate::group::{Getter, PeerFuture, PeerGetter, PeerPicker, Registry};
    use crate::transport::protocol::{Request, Response};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn scores_getter(calls: Arc<AtomicUsize>) -> Getter {
        let db: Arc<HashMap<&'static str, &'static str>> = Arc::new(HashMap::from([
            ("Tom", "630"),
            ("Jack", "589"),
            ("Sam", "567"),
        ]));

        Getter::new(move |key: String| {
            let db = db.clone();
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                match db.get(key.as_str()) {
                    Some(value) => Ok(value.as_bytes().to_vec()),
                    None => Err(anyhow::Error::new(CacheError::KeyNotFound(key))),
                }
            }
        })
    }

    /// Peer that either answers with a fixed value or fails like a dead node.
    struct FakePeer {
        value: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl PeerGetter for FakePeer {
        fn get<'a>(&'a self, req: &'a Request) -> PeerFuture<'a> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                match self.value {
                    Some(value) => Ok(Response {
                        value: format!("{}:{}", req.group, value).into_bytes(),
                    }),
                    None => Err(CacheError::Transport("connection refused".to_string())),
                }
            })
        }
    }

    /// Routes every key to the same peer.
    struct FakePicker {
        peer: Arc<FakePeer>,
    }

    impl PeerPicker for FakePicker {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            Some(self.peer.clone())
        }
    }

    /// Claims every key for the local node.
    struct SelfPicker;

    impl PeerPicker for SelfPicker {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            None
        }
    }

    // ============================================================
    // REGISTRY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_new_group_is_registered() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let group = registry.new_group("scores", 2 << 10, scores_getter(calls));

        assert_eq!(group.name(), "scores");
        assert!(registry.get_group("scores").is_some());
        assert!(registry.get_group("unknown").is_none());
        assert_eq!(registry.group_names(), vec!["scores".to_string()]);
    }

    #[tokio::test]
    async fn test_builder_requires_getter() {
        let registry = Registry::new();

        let result = registry.group_builder("scores").cache_bytes(64).build();

        assert_eq!(result.unwrap_err(), CacheError::MissingGetter);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_builder_with_getter() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let group = registry
            .group_builder("scores")
            .cache_bytes(64)
            .getter(scores_getter(calls))
            .build()
            .unwrap();

        assert_eq!(group.get("Jack").await.unwrap().to_string(), "589");
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_re_registering_replaces_group() {
        let registry = Registry::new();
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));

        registry.new_group("scores", 0, scores_getter(first_calls.clone()));
        registry.new_group("scores", 0, scores_getter(second_calls.clone()));

        let group = registry.get_group("scores").unwrap();
        group.get("Tom").await.unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registries_are_independent() {
        let a = Registry::new();
        let b = Registry::new();

        a.new_group("scores", 0, scores_getter(Arc::new(AtomicUsize::new(0))));

        assert!(a.get_group("scores").is_some());
        assert!(b.get_group("scores").is_none());
    }

    // ============================================================
    // READ PATH TESTS
    // ============================================================

    #[tokio::test]
    async fn test_empty_key_is_rejected_without_loading() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));

        let err = group.get("").await.unwrap_err();

        assert_eq!(err, CacheError::EmptyKey);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        // ARRANGE
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));

        // ACT
        let first = group.get("Tom").await.unwrap();
        let second = group.get("Tom").await.unwrap();

        // ASSERT
        assert_eq!(first.to_string(), "630");
        assert_eq!(second.to_string(), "630");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = group.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.items, 1);
    }

    #[tokio::test]
    async fn test_every_known_key_loads_once() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));

        for (key, value) in [("Tom", "630"), ("Jack", "589"), ("Sam", "567")] {
            for _ in 0..3 {
                assert_eq!(group.get(key).await.unwrap().to_string(), value);
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_getter_error_is_surfaced_and_not_cached() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));

        let err = group.get("unknown").await.unwrap_err();
        assert_eq!(err, CacheError::KeyNotFound("unknown".to_string()));
        assert_eq!(err.to_string(), "unknown not exist");

        group.get("unknown").await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_plain_getter_error_becomes_backing_source_error() {
        let registry = Registry::new();
        let group = registry.new_group(
            "broken",
            0,
            Getter::new(|_key: String| async {
                Err::<Vec<u8>, _>(anyhow::anyhow!("database offline"))
            }),
        );

        let err = group.get("Tom").await.unwrap_err();

        assert_eq!(err, CacheError::BackingSource("database offline".to_string()));
    }

    #[tokio::test]
    async fn test_blocking_getter() {
        let registry = Registry::new();
        let group = registry.new_group(
            "upper",
            0,
            Getter::blocking(|key: &str| {
                std::thread::sleep(Duration::from_millis(10));
                Ok(key.to_uppercase().into_bytes())
            }),
        );

        assert_eq!(group.get("tom").await.unwrap().to_string(), "TOM");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_load_once() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let slow_calls = calls.clone();
        let group = registry.new_group(
            "slow",
            2 << 10,
            Getter::new(move |key: String| {
                let calls = slow_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, anyhow::Error>(format!("value-of-{}", key).into_bytes())
                }
            }),
        );

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let group = group.clone();
                tokio::spawn(async move { group.get("Tom").await })
            })
            .collect();

        for handle in handles {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value.to_string(), "value-of-Tom");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_small_budget_evicts_old_keys() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        // Room for exactly one of the entries.
        let group = registry.new_group("scores", 7, scores_getter(calls.clone()));

        group.get("Tom").await.unwrap();
        group.get("Sam").await.unwrap();
        group.get("Tom").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(group.cache_stats().bytes <= 7);
    }

    // ============================================================
    // PEER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_value_from_remote_peer() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));
        let peer = Arc::new(FakePeer {
            value: Some("remote"),
            calls: AtomicUsize::new(0),
        });
        group
            .register_peers(Arc::new(FakePicker { peer: peer.clone() }))
            .unwrap();

        let value = group.get("Tom").await.unwrap();

        assert_eq!(value.to_string(), "scores:remote");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Values owned by another peer are not kept locally.
        group.get("Tom").await.unwrap();
        assert_eq!(peer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_peer_falls_back_to_getter() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));
        let peer = Arc::new(FakePeer {
            value: None,
            calls: AtomicUsize::new(0),
        });
        group
            .register_peers(Arc::new(FakePicker { peer: peer.clone() }))
            .unwrap();

        let value = group.get("Tom").await.unwrap();

        assert_eq!(value.to_string(), "630");
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The fallback populated the local cache.
        group.get("Tom").await.unwrap();
        assert_eq!(peer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_peer_and_failing_getter_surface_getter_error() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls));
        let peer = Arc::new(FakePeer {
            value: None,
            calls: AtomicUsize::new(0),
        });
        group.register_peers(Arc::new(FakePicker { peer })).unwrap();

        let err = group.get("Kate").await.unwrap_err();

        assert_eq!(err, CacheError::KeyNotFound("Kate".to_string()));
    }

    #[tokio::test]
    async fn test_self_owned_keys_load_locally() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let group = registry.new_group("scores", 2 << 10, scores_getter(calls.clone()));
        group.register_peers(Arc::new(SelfPicker)).unwrap();

        assert_eq!(group.get("Sam").await.unwrap().to_string(), "567");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    #[should_panic(expected = "register_peers called more than once")]
    async fn test_register_peers_twice_panics_in_debug() {
        let registry = Registry::new();
        let group = registry.new_group("scores", 0, scores_getter(Arc::new(AtomicUsize::new(0))));

        group.register_peers(Arc::new(SelfPicker)).unwrap();
        let _ = group.register_peers(Arc::new(SelfPicker));
    }

    #[cfg(not(debug_assertions))]
    #[tokio::test]
    async fn test_register_peers_twice_is_rejected() {
        let registry = Registry::new();
        let group = registry.new_group("scores", 0, scores_getter(Arc::new(AtomicUsize::new(0))));

        group.register_peers(Arc::new(SelfPicker)).unwrap();
        let err = group.register_peers(Arc::new(SelfPicker)).unwrap_err();

        assert_eq!(err, CacheError::PeersAlreadyRegistered);
    }
}
