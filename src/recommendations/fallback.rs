// ABOUTME: Deterministic fallback pool: favorites, then hour-of-day picks, then the shuffled catalog
// ABOUTME: Walks the pool into a bounded unique selection, skipping unknown and repeated ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::catalog::ExerciseCatalog;
use crate::constants::time_buckets;
use crate::models::{RecommendationEntry, TimeOfDayBucket};
use crate::utils::shuffle::{shuffled, UniqueSelection};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Ordered exercise ids pre-selected for each hour-of-day bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucketPlan {
    buckets: HashMap<TimeOfDayBucket, Vec<String>>,
}

impl Default for TimeBucketPlan {
    fn default() -> Self {
        Self::empty()
            .with_bucket(TimeOfDayBucket::Morning, time_buckets::MORNING.iter().copied())
            .with_bucket(TimeOfDayBucket::Afternoon, time_buckets::AFTERNOON.iter().copied())
            .with_bucket(TimeOfDayBucket::Evening, time_buckets::EVENING.iter().copied())
            .with_bucket(TimeOfDayBucket::Night, time_buckets::NIGHT.iter().copied())
    }
}

impl TimeBucketPlan {
    /// Plan with no pre-selected ids in any bucket
    #[must_use]
    pub fn empty() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Replace the list of one bucket
    #[must_use]
    pub fn with_bucket<I, S>(mut self, bucket: TimeOfDayBucket, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buckets
            .insert(bucket, ids.into_iter().map(Into::into).collect());
        self
    }

    /// Ids of one bucket in listed order
    #[must_use]
    pub fn ids_for(&self, bucket: TimeOfDayBucket) -> &[String] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bucket ids that the catalog cannot resolve
    #[must_use]
    pub fn unresolved_ids(&self, catalog: &ExerciseCatalog) -> Vec<(TimeOfDayBucket, String)> {
        TimeOfDayBucket::ALL
            .iter()
            .flat_map(|bucket| {
                self.ids_for(*bucket)
                    .iter()
                    .filter(|id| !catalog.contains(id))
                    .map(|id| (*bucket, id.clone()))
            })
            .collect()
    }
}

/// Ordered candidate ids for the fallback walk
///
/// Favorites in random order, then the bucket list as listed, then the
/// whole catalog in random order. Ids may repeat; the walk skips repeats.
pub fn candidate_pool<R: Rng + ?Sized>(
    favorites: &[String],
    bucket_ids: &[String],
    catalog: &ExerciseCatalog,
    rng: &mut R,
) -> Vec<String> {
    let catalog_ids: Vec<String> = catalog.ids().map(str::to_owned).collect();

    let mut pool = Vec::with_capacity(favorites.len() + bucket_ids.len() + catalog_ids.len());
    pool.extend(shuffled(favorites, rng));
    pool.extend(bucket_ids.iter().cloned());
    pool.extend(shuffled(&catalog_ids, rng));
    pool
}

/// Walk the pool until the selection is full or the pool runs out
///
/// Returns how many fallback entries were added.
pub fn fill_from_pool(
    pool: &[String],
    catalog: &ExerciseCatalog,
    selection: &mut UniqueSelection<RecommendationEntry>,
) -> usize {
    let mut added = 0;
    for id in pool {
        if selection.is_full() {
            break;
        }
        if selection.contains(id) {
            continue;
        }
        let Some(exercise) = catalog.get(id) else {
            debug!(exercise_id = %id, "Skipping unresolvable fallback id");
            continue;
        };
        if selection.push(id, RecommendationEntry::fallback(exercise.clone())) {
            added += 1;
        }
    }
    added
}
