// ABOUTME: Per-user favorite exercises with optimistic local toggles
// ABOUTME: Keeps tentative local state apart from the confirmed remote snapshot and reverts on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Favorites Store
//!
//! The remote store is the source of truth. A toggle is recorded as a
//! tentative value the moment it is requested, so readers see the new state
//! before the write resolves. When the write succeeds the value moves into
//! the confirmed snapshot; when it fails the tentative value is dropped and
//! the caller's previous state is restored.
//!
//! Overlapping toggles of the same `(user, exercise)` pair are resolved
//! last-write-wins: each toggle carries a revision and only the newest one
//! may clear the tentative slot.
//!
//! A remote read may start before a concurrent write lands. Every confirmed
//! write is stamped with a settle sequence, and writes confirmed after a read
//! started are replayed on top of that read's result, so a confirmed favorite
//! never drops out of the local view.

/// SQLite-backed favorites repository
pub mod sqlite;

use crate::errors::{AppError, AppResult};
use crate::utils::shuffle::dedup_preserving_order;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Remote store holding the authoritative favorite flags
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Favorited exercise ids of a user, in store order
    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<String>>;

    /// Upsert the favorite flag of one exercise
    async fn set_favorite(&self, user_id: Uuid, exercise_id: &str, is_favorite: bool)
        -> AppResult<()>;
}

#[derive(Debug, Clone, Copy)]
struct TentativeToggle {
    value: bool,
    revision: u64,
}

type FavoriteKey = (Uuid, String);

/// Confirmed snapshot of one user plus writes the last read may have missed
#[derive(Debug, Default)]
struct ConfirmedFavorites {
    ids: Vec<String>,
    /// Settle sequence observed when the applied remote read started
    read_from: u64,
    /// Confirmed writes by exercise id: (settle sequence, state)
    settled: HashMap<String, (u64, bool)>,
}

impl ConfirmedFavorites {
    fn set(&mut self, exercise_id: &str, state: bool) {
        self.ids.retain(|id| id != exercise_id);
        if state {
            self.ids.push(exercise_id.to_owned());
        }
    }

    /// Replace the snapshot with a remote read that started at `read_from`
    fn refresh(&mut self, remote_ids: &[String], read_from: u64) -> bool {
        if read_from < self.read_from {
            return false;
        }
        self.settled.retain(|_, (sequence, _)| *sequence > read_from);
        self.ids = dedup_preserving_order(remote_ids);

        let mut replay: Vec<(u64, String, bool)> = self
            .settled
            .iter()
            .map(|(id, (sequence, state))| (*sequence, id.clone(), *state))
            .collect();
        replay.sort();
        for (_, exercise_id, state) in replay {
            self.set(&exercise_id, state);
        }
        self.read_from = read_from;
        true
    }
}

/// Favorites with an explicit tentative/confirmed split
pub struct FavoritesStore {
    repository: Arc<dyn FavoritesRepository>,
    confirmed: RwLock<HashMap<Uuid, ConfirmedFavorites>>,
    tentative: RwLock<HashMap<FavoriteKey, TentativeToggle>>,
    next_revision: AtomicU64,
    settle_sequence: AtomicU64,
}

impl FavoritesStore {
    /// Create a store in front of a repository
    #[must_use]
    pub fn new(repository: Arc<dyn FavoritesRepository>) -> Self {
        Self {
            repository,
            confirmed: RwLock::new(HashMap::new()),
            tentative: RwLock::new(HashMap::new()),
            next_revision: AtomicU64::new(1),
            settle_sequence: AtomicU64::new(0),
        }
    }

    /// Flip the favorite flag of an exercise
    ///
    /// The new state is visible locally before the remote write resolves.
    /// Returns the new state once the remote store confirmed it.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceConflict` if the remote write fails; local state
    /// is reverted to `current_state` before returning.
    pub async fn toggle(
        &self,
        user_id: Uuid,
        exercise_id: &str,
        current_state: bool,
    ) -> AppResult<bool> {
        if exercise_id.trim().is_empty() {
            return Err(AppError::invalid_input("exercise id must not be empty"));
        }

        let desired = !current_state;
        let key = (user_id, exercise_id.to_owned());
        let revision = self.next_revision.fetch_add(1, Ordering::Relaxed);
        self.tentative_write().insert(
            key.clone(),
            TentativeToggle {
                value: desired,
                revision,
            },
        );

        match self
            .repository
            .set_favorite(user_id, exercise_id, desired)
            .await
        {
            Ok(()) => {
                self.settle(&key, revision, desired, true);
                debug!(user_id = %user_id, exercise_id, is_favorite = desired, "Favorite confirmed");
                Ok(desired)
            }
            Err(e) => {
                self.settle(&key, revision, current_state, false);
                warn!(
                    user_id = %user_id,
                    exercise_id,
                    error = %e,
                    "Favorite write failed, reverted local state"
                );
                Err(AppError::persistence_conflict(format!(
                    "could not update favorite '{exercise_id}': {}",
                    e.message
                ))
                .with_source(e))
            }
        }
    }

    /// Favorited ids used as input to the fallback pool
    ///
    /// Refreshes the confirmed snapshot from the remote store. If the read
    /// fails the last snapshot is served instead. Writes confirmed while the
    /// read was running and pending toggles are overlaid on the result.
    pub async fn get_favorite_ids(&self, user_id: Uuid) -> Vec<String> {
        let read_from = self.settle_sequence.load(Ordering::SeqCst);
        match self.repository.list_favorites(user_id).await {
            Ok(ids) => {
                let applied = self
                    .confirmed_write()
                    .entry(user_id)
                    .or_default()
                    .refresh(&ids, read_from);
                if !applied {
                    debug!(user_id = %user_id, "Favorites read overtaken by a newer read");
                }
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Favorites read failed, serving last snapshot");
            }
        }
        self.local_favorite_ids(user_id)
    }

    /// Local view of a user's favorites without touching the remote store
    #[must_use]
    pub fn local_favorite_ids(&self, user_id: Uuid) -> Vec<String> {
        let mut ids = self
            .confirmed_read()
            .get(&user_id)
            .map(|favorites| favorites.ids.clone())
            .unwrap_or_default();

        let mut pending: Vec<(String, bool)> = self
            .tentative_read()
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|((_, exercise_id), toggle)| (exercise_id.clone(), toggle.value))
            .collect();
        pending.sort();

        for (exercise_id, value) in pending {
            if value {
                if !ids.contains(&exercise_id) {
                    ids.push(exercise_id);
                }
            } else {
                ids.retain(|id| *id != exercise_id);
            }
        }
        ids
    }

    /// Local favorite state of one exercise, tentative value first
    #[must_use]
    pub fn is_favorite(&self, user_id: Uuid, exercise_id: &str) -> bool {
        if let Some(toggle) = self
            .tentative_read()
            .get(&(user_id, exercise_id.to_owned()))
        {
            return toggle.value;
        }
        self.confirmed_read()
            .get(&user_id)
            .is_some_and(|favorites| favorites.ids.iter().any(|id| id == exercise_id))
    }

    /// Whether a toggle for this exercise is still awaiting the remote store
    #[must_use]
    pub fn is_pending(&self, user_id: Uuid, exercise_id: &str) -> bool {
        self.tentative_read()
            .contains_key(&(user_id, exercise_id.to_owned()))
    }

    /// Resolve a toggle if it is still the newest one for its key
    ///
    /// `written` marks a state the remote store accepted.
    fn settle(&self, key: &FavoriteKey, revision: u64, state: bool, written: bool) {
        let mut tentative = self.tentative_write();
        if tentative.get(key).map(|toggle| toggle.revision) != Some(revision) {
            // A newer toggle owns the slot; it will settle the final state.
            return;
        }
        tentative.remove(key);

        let (user_id, exercise_id) = key;
        let mut confirmed = self.confirmed_write();
        let favorites = confirmed.entry(*user_id).or_default();
        favorites.set(exercise_id, state);
        if written {
            let sequence = self.settle_sequence.fetch_add(1, Ordering::SeqCst) + 1;
            favorites
                .settled
                .insert(exercise_id.clone(), (sequence, state));
        }
    }

    fn confirmed_read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, ConfirmedFavorites>> {
        self.confirmed.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn confirmed_write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, ConfirmedFavorites>> {
        self.confirmed.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn tentative_read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<FavoriteKey, TentativeToggle>> {
        self.tentative.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn tentative_write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<FavoriteKey, TentativeToggle>> {
        self.tentative.write().unwrap_or_else(PoisonError::into_inner)
    }
}
