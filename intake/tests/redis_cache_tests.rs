//! Integration tests for `RedisCache` using testcontainers.
//!
//! # Requirements
//!
//! Docker must be running.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use eventform_core::providers::{KeyValueCache, Readiness};
use eventform_intake::stores::RedisCache;
use std::time::Duration;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::{REDIS_PORT, Redis};

async fn setup_cache() -> (ContainerAsync<Redis>, RedisCache) {
    let container = Redis::default()
        .start()
        .await
        .expect("Failed to start redis container");

    let port = container
        .get_host_port_ipv4(REDIS_PORT)
        .await
        .expect("Failed to get redis port");

    let cache = RedisCache::new(&format!("redis://127.0.0.1:{port}"), Duration::from_secs(2))
        .await
        .expect("Failed to connect to redis");

    (container, cache)
}

#[tokio::test]
#[ignore] // Requires Docker
async fn set_nx_claims_key_once() {
    let (_container, cache) = setup_cache().await;
    let ttl = Duration::from_secs(60);

    assert!(cache.set_nx_ex("marker", "1", ttl).await.unwrap());
    assert!(!cache.set_nx_ex("marker", "1", ttl).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn counters_and_values_round_trip() {
    let (_container, cache) = setup_cache().await;

    assert_eq!(cache.incr("counter").await.unwrap(), 1);
    assert_eq!(cache.incr("counter").await.unwrap(), 2);

    cache
        .set_ex("draft", r#"{"answers":{}}"#, Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(
        cache.get("draft").await.unwrap().as_deref(),
        Some(r#"{"answers":{}}"#)
    );

    cache.del("draft").await.unwrap();
    assert!(cache.get("draft").await.unwrap().is_none());
    cache.check_ready().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Docker
async fn values_expire() {
    let (_container, cache) = setup_cache().await;

    cache
        .set_ex("short", "v", Duration::from_secs(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(cache.get("short").await.unwrap().is_none());
}
