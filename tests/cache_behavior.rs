//! Behavior-driven tests for the last-known-good endpoint cache.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::JsonFileStore;
use beacon_tests::{
    health_url, lan_registry, EndpointCache, EndpointDiscovery, HealthProbe, MemoryStore, Script,
    ScriptedHttpClient,
};

#[tokio::test]
async fn stale_cached_url_is_ignored_and_discovery_sweeps_the_full_registry() {
    // Given: the cache still holds an address from the previous Wi-Fi
    // network, which no longer answers; only localhost is healthy now
    let client = Arc::new(ScriptedHttpClient::new());
    client.on(&health_url("http://localhost:5000"), Script::ok_health());

    let cache = EndpointCache::new(Arc::new(MemoryStore::new()));
    cache.set("http://10.0.0.5:5000").await;

    let probe = HealthProbe::new(client.clone(), Duration::from_secs(3));

    // When: the cached value is re-verified before trust
    let verified = cache.get_verified(&probe).await;

    // Then: the stale value behaves as if absent
    assert!(verified.is_none());

    // And: a discovery pass proceeds through the registry from the top
    let discovery = EndpointDiscovery::new(Arc::new(lan_registry()), probe);
    let found = discovery.discover().await.expect("localhost should win");
    assert_eq!(found.candidate.base_url(), "http://localhost:5000");
    assert_eq!(found.rejected.len(), 2);
}

#[tokio::test]
async fn verified_cached_url_is_reused_without_discovery() {
    // Given: a cached URL that still answers its health probe
    let client = Arc::new(ScriptedHttpClient::new());
    client.on(&health_url("http://10.0.0.5:5000"), Script::ok_health());

    let cache = EndpointCache::new(Arc::new(MemoryStore::new()));
    cache.set("http://10.0.0.5:5000").await;

    let probe = HealthProbe::new(client.clone(), Duration::from_secs(3));

    // When: the cached value is re-verified
    let verified = cache.get_verified(&probe).await;

    // Then: it is returned directly, at the cost of exactly one probe
    assert_eq!(verified.as_deref(), Some("http://10.0.0.5:5000"));
    assert_eq!(client.requested_urls().len(), 1);
}

#[tokio::test]
async fn cache_survives_a_process_restart_via_the_file_store() {
    // Given: a cache persisted to disk by a previous "process"
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("endpoint.json");

    {
        let cache = EndpointCache::new(Arc::new(JsonFileStore::new(&path)));
        cache.set("http://10.0.2.2:5000").await;
    }

    // When: a fresh cache instance opens the same file
    let reopened = EndpointCache::new(Arc::new(JsonFileStore::new(&path)));

    // Then: the last working URL is still there
    assert_eq!(
        reopened.get().await.as_deref(),
        Some("http://10.0.2.2:5000")
    );
}

#[tokio::test]
async fn last_writer_wins_between_interleaved_actions() {
    // Given: two independent user actions sharing one cache
    let cache = EndpointCache::new(Arc::new(MemoryStore::new()));

    // When: both record a verified-good URL, in either order
    cache.set("http://192.168.18.29:5000").await;
    cache.set("http://10.0.2.2:5000").await;

    // Then: exactly one value remains, the later write
    assert_eq!(cache.get().await.as_deref(), Some("http://10.0.2.2:5000"));
}
