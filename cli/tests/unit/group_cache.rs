//! Unit tests for `application::services::group_cache` under concurrency.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use chefboot_cli::application::ports::RunListSource;
use chefboot_cli::application::services::group_cache::{GroupCache, with_timeout};
use chefboot_common::{CachePolicy, FailurePolicy, Group, Retention, RunList};

use crate::mocks::{MemoryInventory, run_list_cache};

fn web() -> Group {
    Group::new("web")
}

#[tokio::test]
async fn concurrent_lookups_compute_once() {
    let inventory = MemoryInventory::new()
        .with_run_list("web", &["recipe[nginx]"])
        .with_delay(Duration::from_millis(20));
    let cache = run_list_cache(&inventory, CachePolicy::default());
    let group = web();

    let outcomes = futures::future::join_all((0..16).map(|_| cache.lookup(&group))).await;

    assert_eq!(inventory.run_list_calls(), 1);
    let expected: RunList = ["recipe[nginx]"].into_iter().collect();
    for outcome in outcomes {
        assert_eq!(outcome.unwrap(), Some(expected.clone()));
    }
}

#[tokio::test]
async fn different_groups_compute_independently() {
    let inventory = MemoryInventory::new()
        .with_run_list("web", &["recipe[nginx]"])
        .with_run_list("db", &["recipe[postgresql]"]);
    let cache = run_list_cache(&inventory, CachePolicy::default());

    let (web_group, db_group) = (web(), Group::new("db"));
    let (web, db) = tokio::join!(cache.lookup(&web_group), cache.lookup(&db_group));

    assert_eq!(web.unwrap().unwrap().as_slice(), ["recipe[nginx]"]);
    assert_eq!(db.unwrap().unwrap().as_slice(), ["recipe[postgresql]"]);
    assert_eq!(inventory.run_list_calls(), 2);
    assert_eq!(cache.len().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lookups_from_many_tasks_compute_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = Arc::new(GroupCache::new(move |group: Group| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, anyhow::Error>(format!("{group}-client"))
        }
    }));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.lookup(&web()).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "web-client");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_policy_shares_failure_then_recomputes() {
    let inventory = MemoryInventory::new()
        .failing("web")
        .with_delay(Duration::from_millis(20));
    let cache = run_list_cache(&inventory, CachePolicy::default());
    let group = web();

    let (a, b) = tokio::join!(cache.lookup(&group), cache.lookup(&group));
    assert_eq!(inventory.run_list_calls(), 1);
    assert_eq!(a.unwrap_err(), b.unwrap_err());
    assert!(!cache.contains(&group).await);

    cache.lookup(&group).await.unwrap_err();
    assert_eq!(inventory.run_list_calls(), 2);
}

#[tokio::test]
async fn cache_policy_keeps_failure() {
    let inventory = MemoryInventory::new().failing("web");
    let policy = CachePolicy {
        retention: Retention::Unbounded,
        failures: FailurePolicy::Cache,
    };
    let cache = run_list_cache(&inventory, policy);
    let group = web();

    let first = cache.lookup(&group).await.unwrap_err();
    let second = cache.lookup(&group).await.unwrap_err();

    assert_eq!(first, second);
    assert!(first.message.contains("inventory unavailable"));
    assert_eq!(inventory.run_list_calls(), 1);
    assert!(cache.contains(&group).await);
}

#[tokio::test]
async fn absent_run_list_is_cached_like_a_value() {
    let inventory = MemoryInventory::new();
    let cache = run_list_cache(&inventory, CachePolicy::default());

    assert_eq!(cache.lookup(&web()).await.unwrap(), None);
    assert_eq!(cache.lookup(&web()).await.unwrap(), None);
    assert_eq!(inventory.run_list_calls(), 1);
}

#[tokio::test]
async fn cancelled_caller_hands_computation_to_waiter() {
    let inventory = MemoryInventory::new()
        .with_run_list("web", &["recipe[nginx]"])
        .with_delay(Duration::from_millis(60));
    let cache = run_list_cache(&inventory, CachePolicy::default());
    let group = web();

    let impatient = tokio::time::timeout(Duration::from_millis(20), cache.lookup(&group));
    let patient = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.lookup(&group).await
    };
    let (impatient, patient) = tokio::join!(impatient, patient);

    assert!(impatient.is_err(), "first caller should time out");
    assert!(patient.unwrap().is_some());
    assert_eq!(inventory.run_list_calls(), 2);
}

#[tokio::test]
async fn timed_out_lookup_becomes_lookup_error() {
    let inventory = MemoryInventory::new()
        .with_run_list("web", &["recipe[nginx]"])
        .with_delay(Duration::from_millis(200));
    let inventory = &inventory;
    let cache = GroupCache::new(move |group: Group| {
        async move {
            with_timeout(
                Duration::from_millis(10),
                "run list lookup",
                inventory.run_list_for_group(&group),
            )
            .await
        }
    });

    let err = cache.lookup(&web()).await.unwrap_err();

    assert_eq!(err.group, web());
    assert!(err.message.contains("timed out"), "got: {}", err.message);
}

#[tokio::test]
async fn invalidate_during_flight_leaves_waiters_served() {
    let inventory = MemoryInventory::new()
        .with_run_list("web", &["recipe[nginx]"])
        .with_delay(Duration::from_millis(30));
    let cache = run_list_cache(&inventory, CachePolicy::default());
    let group = web();

    let lookup = cache.lookup(&group);
    let invalidate = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.invalidate(&group).await
    };
    let (outcome, dropped) = tokio::join!(lookup, invalidate);

    assert!(dropped);
    assert!(outcome.unwrap().is_some());
    assert!(!cache.contains(&group).await);
}

#[tokio::test]
async fn capacity_never_evicts_in_flight_entry() {
    let inventory = MemoryInventory::new()
        .with_run_list("a", &["recipe[apache2]"])
        .with_run_list("b", &["recipe[bind]"])
        .with_delay(Duration::from_millis(50));
    let policy = CachePolicy {
        retention: Retention::Capacity(NonZeroUsize::new(1).unwrap()),
        failures: FailurePolicy::Retry,
    };
    let cache = run_list_cache(&inventory, policy);
    let (a, b) = (Group::new("a"), Group::new("b"));

    let first = cache.lookup(&a);
    let other = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.lookup(&b).await
    };
    let again = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.lookup(&a).await
    };
    let (first, other, again) = tokio::join!(first, other, again);

    assert_eq!(inventory.run_list_calls(), 2, "one computation per group");
    assert_eq!(first.unwrap(), again.unwrap());
    assert!(other.unwrap().is_some());
    assert_eq!(cache.len().await, 1);
    assert!(cache.contains(&b).await);
    assert!(!cache.contains(&a).await);
}

fn assert_send_sync<T: Send + Sync>(_: &T) {}

#[test]
fn cache_with_send_closure_is_shareable() {
    let cache = GroupCache::new(|_: Group| async { Result::<u8>::Ok(1) });
    assert_send_sync(&cache);
}
