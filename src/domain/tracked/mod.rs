//! Tracked entities — the shared shape of cryptos and cities, and the
//! favorite-aware merge applied to every fetch result.

pub mod state;

use crate::error::{FetchError, SdkError};
use crate::shared::EntityId;
use std::collections::HashSet;

pub use state::{FetchGuard, FetchOutcome, FetchTicket, TrackedState};

/// A record the dashboard tracks by id and lets the user favorite.
pub trait TrackedEntity: Clone {
    fn id(&self) -> &EntityId;
    fn is_favorite(&self) -> bool;
    fn set_favorite(&mut self, favorite: bool);
}

// ─── FavoriteSet ─────────────────────────────────────────────────────────────

/// Set of favorited ids.
///
/// Membership is what decides `is_favorite` on every entity. Insertion order
/// is kept so the persisted list is stable across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    order: Vec<EntityId>,
    members: HashSet<EntityId>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.members.contains(id)
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Returns `false` if the id was not present.
    pub fn remove(&mut self, id: &EntityId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|f| f != id);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_vec(&self) -> Vec<EntityId> {
        self.order.clone()
    }
}

impl FromIterator<EntityId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut set = FavoriteSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

// ─── Reconcile ───────────────────────────────────────────────────────────────

/// Merge a fresh fetch result with the favorite set.
///
/// Every fresh entity is kept as-is except `is_favorite`, which is recomputed
/// from `favorites`. Order follows `fresh`; anything not in `fresh` is gone.
pub fn reconcile<E: TrackedEntity>(fresh: Vec<E>, favorites: &FavoriteSet) -> Vec<E> {
    fresh
        .into_iter()
        .map(|mut entity| {
            let favorite = favorites.contains(entity.id());
            entity.set_favorite(favorite);
            entity
        })
        .collect()
}

// ─── Settle-all ──────────────────────────────────────────────────────────────

/// Collapse per-id lookup results into one batch result.
///
/// Successes are kept in input order and failures are dropped. The batch only
/// fails when there was nothing to look up or every lookup failed.
pub fn keep_successes<E>(results: Vec<(EntityId, Result<E, SdkError>)>) -> Result<Vec<E>, SdkError> {
    if results.is_empty() {
        return Err(FetchError::NoIds.into());
    }

    let attempted = results.len();
    let mut kept = Vec::with_capacity(attempted);
    let mut last_error = None;
    for (id, result) in results {
        match result {
            Ok(entity) => kept.push(entity),
            Err(e) => {
                tracing::debug!(%id, "lookup failed, dropping from batch: {}", e);
                last_error = Some(e.to_string());
            }
        }
    }

    if kept.is_empty() {
        return Err(FetchError::AllFailed {
            attempted,
            last_error: last_error.unwrap_or_default(),
        }
        .into());
    }
    Ok(kept)
}
