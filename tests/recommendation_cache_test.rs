// ABOUTME: Integration tests for the per-user, per-day recommendation cache
// ABOUTME: Covers day scoping, forced refresh, superseded generations, coalescing, and failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration};
use common::{clock_at, generation_label, init_test_logging, ScriptedSource};
use daily_practice::clock::{Clock, ManualClock};
use daily_practice::config::environment::CacheConfig;
use daily_practice::models::FetchState;
use daily_practice::recommendations::{RecommendationCache, RecommendationSource};
use std::sync::Arc;
use uuid::Uuid;

fn create_cache(source: &Arc<ScriptedSource>, clock: &Arc<ManualClock>) -> Arc<RecommendationCache> {
    init_test_logging();
    let source: Arc<dyn RecommendationSource> = Arc::clone(source) as _;
    let clock: Arc<dyn Clock> = Arc::clone(clock) as _;
    Arc::new(RecommendationCache::new(
        source,
        clock,
        &CacheConfig { max_users: 16 },
    ))
}

#[tokio::test]
async fn test_same_day_requests_generate_once() {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let first = cache.get_or_generate(user, 3, false).await;
    assert!(!first.served_from_cache);
    assert_eq!(first.entries.len(), 3);
    assert_eq!(cache.state(user).await, FetchState::Ready);

    clock.advance(ChronoDuration::hours(15));
    let second = cache.get_or_generate(user, 3, false).await;

    assert!(second.served_from_cache);
    assert_eq!(second.entries, first.entries);
    assert_eq!(source.calls(), 1);

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.users, 1);
}

#[tokio::test]
async fn test_new_calendar_day_regenerates() {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T23:55:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    cache.get_or_generate(user, 3, false).await;
    // Ten minutes later is a different local day even though far less than 24h passed
    clock.advance(ChronoDuration::minutes(10));
    let next_day = cache.get_or_generate(user, 3, false).await;

    assert!(!next_day.served_from_cache);
    assert_eq!(next_day.focus_theme, Some(generation_label(2)));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_day_follows_local_offset_not_utc() -> Result<()> {
    let source = ScriptedSource::new();
    // 22:30 UTC on the 17th, already the 18th in UTC+3
    let clock = clock_at("2026-10-18T01:30:00+03:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    cache.get_or_generate(user, 3, false).await;
    clock.set(DateTime::parse_from_rfc3339("2026-10-18T23:59:00+03:00")?);
    let later = cache.get_or_generate(user, 3, false).await;

    assert!(later.served_from_cache);
    assert_eq!(source.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_different_count_is_a_miss() {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    cache.get_or_generate(user, 3, false).await;
    let five = cache.get_or_generate(user, 5, false).await;

    assert!(!five.served_from_cache);
    assert_eq!(five.entries.len(), 5);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache() {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    cache.get_or_generate(user, 3, false).await;
    let refreshed = cache.get_or_generate(user, 3, true).await;

    assert!(!refreshed.served_from_cache);
    assert_eq!(refreshed.focus_theme, Some(generation_label(2)));

    let cached = cache.get_or_generate(user, 3, false).await;
    assert!(cached.served_from_cache);
    assert_eq!(cached.focus_theme, Some(generation_label(2)));
}

#[tokio::test]
async fn test_later_request_wins_when_earlier_resolves_last() -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release_first = source.hold_next();
    let release_second = source.hold_next();

    let first = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;
    assert_eq!(cache.state(user).await, FetchState::Fetching);

    let second = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, true).await }
    });
    source.wait_for_calls(2).await;

    release_second.send(()).unwrap();
    let second = second.await?;
    assert_eq!(second.focus_theme, Some(generation_label(2)));

    release_first.send(()).unwrap();
    let first = first.await?;

    // The stale response must not overwrite the newer plan
    assert_eq!(first.focus_theme, Some(generation_label(2)));
    let cached = cache.cached(user).await.unwrap();
    assert_eq!(cached.focus_theme, Some(generation_label(2)));
    assert_eq!(cache.state(user).await, FetchState::Ready);
    assert!(cache.stats().await.discarded >= 1);
    Ok(())
}

#[tokio::test]
async fn test_superseded_caller_waits_for_newer_generation() -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release_first = source.hold_next();
    let release_second = source.hold_next();

    let first = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;
    let second = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, true).await }
    });
    source.wait_for_calls(2).await;

    // Earlier generation resolves first; its result is discarded
    release_first.send(()).unwrap();
    tokio::task::yield_now().await;
    assert_ne!(
        cache.cached(user).await.and_then(|result| result.focus_theme),
        Some(generation_label(1))
    );

    release_second.send(()).unwrap();
    let (first, second) = (first.await?, second.await?);

    assert_eq!(first.focus_theme, Some(generation_label(2)));
    assert_eq!(second.focus_theme, Some(generation_label(2)));
    assert_eq!(source.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests_coalesce() -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release = source.hold_next();
    let first = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;
    let second = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    release.send(()).unwrap();
    let (first, second) = (first.await?, second.await?);

    assert_eq!(source.calls(), 1);
    assert_eq!(first.entries, second.entries);
    assert_eq!(cache.stats().await.coalesced, 1);
    Ok(())
}

#[tokio::test]
async fn test_failure_keeps_last_good_plan() {
    let source = ScriptedSource::new();
    source.fail_call(2);
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let good = cache.get_or_generate(user, 3, false).await;
    let failed = cache.get_or_generate(user, 3, true).await;

    assert_eq!(cache.state(user).await, FetchState::Failed);
    assert_eq!(failed.entries, good.entries);
    assert!(failed.error.as_deref().unwrap().contains("call 2 failed"));
    assert!(!failed.loading);

    // A failed slot retries instead of serving the stale plan as a hit
    let retried = cache.get_or_generate(user, 3, false).await;
    assert!(!retried.served_from_cache);
    assert!(retried.error.is_none());
    assert_eq!(retried.focus_theme, Some(generation_label(3)));
    assert_eq!(cache.state(user).await, FetchState::Ready);
}

#[tokio::test]
async fn test_invalidate_forces_regeneration() {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    cache.get_or_generate(user, 3, false).await;
    cache.invalidate(user).await;
    let regenerated = cache.get_or_generate(user, 3, false).await;

    assert!(!regenerated.served_from_cache);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_invalidate_detaches_in_flight_generation() -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release = source.hold_next();
    let pending = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;

    cache.invalidate(user).await;
    release.send(()).unwrap();
    let detached = pending.await?;

    // The caller still gets its plan, but the slot does not keep it
    assert_eq!(detached.entries.len(), 3);
    assert_eq!(cache.state(user).await, FetchState::Idle);
    assert!(cache.cached(user).await.unwrap().entries.is_empty());

    let next = cache.get_or_generate(user, 3, false).await;
    assert_eq!(next.focus_theme, Some(generation_label(2)));
    Ok(())
}

#[tokio::test]
async fn test_users_are_isolated() {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    let for_alice = cache.get_or_generate(alice, 3, false).await;
    let for_bob = cache.get_or_generate(bob, 3, false).await;

    assert_ne!(for_alice.focus_theme, for_bob.focus_theme);
    assert_eq!(cache.state(Uuid::new_v4()).await, FetchState::Idle);
    assert_eq!(cache.stats().await.users, 2);
}

async fn overlapping_counts(release_newer_first: bool) -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release_three = source.hold_next();
    let release_five = source.hold_next();

    let three = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;
    let five = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 5, false).await }
    });
    source.wait_for_calls(2).await;

    if release_newer_first {
        release_five.send(()).unwrap();
        assert_eq!(five.await?.entries.len(), 5);
        release_three.send(()).unwrap();
        let three = three.await?;
        assert_eq!(three.entries.len(), 3);
        assert_eq!(three.focus_theme, Some(generation_label(1)));
    } else {
        release_three.send(()).unwrap();
        let three = three.await?;
        assert_eq!(three.entries.len(), 3);
        assert_eq!(three.focus_theme, Some(generation_label(1)));
        release_five.send(()).unwrap();
        assert_eq!(five.await?.entries.len(), 5);
    }

    // The slot belongs to the newer request
    let cached = cache.cached(user).await.unwrap();
    assert_eq!(cached.entries.len(), 5);
    assert_eq!(cache.state(user).await, FetchState::Ready);
    assert_eq!(cache.stats().await.discarded, 1);
    Ok(())
}

#[tokio::test]
async fn test_overlapping_counts_keep_their_size_newer_resolves_first() -> Result<()> {
    overlapping_counts(true).await
}

#[tokio::test]
async fn test_overlapping_counts_keep_their_size_older_resolves_first() -> Result<()> {
    overlapping_counts(false).await
}

#[tokio::test]
async fn test_day_rollover_during_fetch_starts_new_generation() -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T23:59:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release_yesterday = source.hold_next();
    let yesterday = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;

    clock.advance(ChronoDuration::minutes(2));
    let today = cache.get_or_generate(user, 3, false).await;

    assert_eq!(today.focus_theme, Some(generation_label(2)));
    assert_eq!(source.calls(), 2);
    assert_eq!(cache.stats().await.coalesced, 0);

    let again = cache.get_or_generate(user, 3, false).await;
    assert!(again.served_from_cache);
    assert_eq!(again.focus_theme, Some(generation_label(2)));

    // The late result from the previous day never lands
    release_yesterday.send(()).unwrap();
    yesterday.await?;
    let cached = cache.cached(user).await.unwrap();
    assert_eq!(cached.focus_theme, Some(generation_label(2)));
    assert_eq!(source.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_superseded_generation_is_discarded_once() -> Result<()> {
    let source = ScriptedSource::new();
    let clock = clock_at("2026-10-18T08:00:00+02:00");
    let cache = create_cache(&source, &clock);
    let user = Uuid::new_v4();

    let release_first = source.hold_next();
    let release_second = source.hold_next();

    let owner = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    source.wait_for_calls(1).await;
    let joiner = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, false).await }
    });
    while cache.stats().await.coalesced < 1 {
        tokio::task::yield_now().await;
    }
    let refresh = tokio::spawn({
        let cache = Arc::clone(&cache);
        async move { cache.get_or_generate(user, 3, true).await }
    });
    source.wait_for_calls(2).await;

    release_first.send(()).unwrap();
    release_second.send(()).unwrap();
    let (owner, joiner, refresh) = (owner.await?, joiner.await?, refresh.await?);

    for result in [&owner, &joiner, &refresh] {
        assert_eq!(result.focus_theme, Some(generation_label(2)));
    }
    let stats = cache.stats().await;
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.misses, 2);
    Ok(())
}
