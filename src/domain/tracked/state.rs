//! Tracked-entity state container — app-owned, SDK-provided update logic.

use super::{reconcile, FavoriteSet, TrackedEntity};
use crate::error::SdkError;
use crate::shared::EntityId;

/// Handle for one in-flight fetch. Issued by [`FetchGuard::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// What [`TrackedState::complete_fetch`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The collection was replaced with `count` reconciled entities.
    Applied { count: usize },
    /// The fetch failed; the previous collection was kept and `error` set.
    Failed,
    /// A newer fetch was issued after this one; the result was discarded.
    Stale,
}

/// Loading/error lifecycle of a fetched collection, with stale-result
/// detection: only the newest ticket may complete.
#[derive(Debug, Clone, Default)]
pub struct FetchGuard {
    last_issued: u64,
    loading: bool,
    error: Option<String>,
}

impl FetchGuard {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a fetch. Any ticket issued earlier becomes stale.
    pub fn begin(&mut self) -> FetchTicket {
        self.last_issued += 1;
        self.loading = true;
        self.error = None;
        FetchTicket(self.last_issued)
    }

    /// Whether `ticket` is still the newest fetch.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.last_issued
    }

    /// Close out `ticket` with `result`.
    ///
    /// Returns `None` for a stale ticket, leaving everything untouched.
    /// Otherwise loading ends, a failure is recorded as the sticky error, and
    /// the result is handed back for the caller to apply.
    pub fn finish<T>(
        &mut self,
        ticket: FetchTicket,
        result: Result<T, SdkError>,
    ) -> Option<Result<T, SdkError>> {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                newest = self.last_issued,
                "discarding stale fetch result"
            );
            return None;
        }

        self.loading = false;
        if let Err(e) = &result {
            tracing::warn!("fetch failed, keeping last good data: {}", e);
            self.error = Some(e.to_string());
        }
        Some(result)
    }
}

/// Collection of tracked entities plus the user's selection and favorites.
///
/// The app owns instances of this type (one per domain). All mutation goes
/// through `&mut self` methods, so a single call is never observed half-done.
#[derive(Debug, Clone)]
pub struct TrackedState<E> {
    entities: Vec<E>,
    selected: Vec<EntityId>,
    favorites: FavoriteSet,
    fetch: FetchGuard,
}

impl<E> Default for TrackedState<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<E> TrackedState<E> {
    pub fn new(selected: Vec<EntityId>) -> Self {
        Self {
            entities: Vec::new(),
            selected,
            favorites: FavoriteSet::new(),
            fetch: FetchGuard::default(),
        }
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    /// Message of the last failed fetch. Cleared when the next fetch begins.
    pub fn error(&self) -> Option<&str> {
        self.fetch.error()
    }

    pub fn set_selected(&mut self, ids: Vec<EntityId>) {
        self.selected = ids;
    }

    /// Ids worth fetching: the selection, then favorites not already selected.
    pub fn tracked_ids(&self) -> Vec<EntityId> {
        let mut out = self.selected.clone();
        for id in self.favorites.iter() {
            if !out.contains(id) {
                out.push(id.clone());
            }
        }
        out
    }

    /// Start a fetch. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch.begin()
    }

    /// Whether `ticket` is still the newest fetch.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.fetch.is_current(ticket)
    }
}

impl<E: TrackedEntity> TrackedState<E> {
    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Replace the favorite set (e.g. when hydrating from persisted prefs)
    /// and re-sync every held entity's flag.
    pub fn set_favorites(&mut self, ids: Vec<EntityId>) {
        self.favorites = ids.into_iter().collect();
        let favorites = &self.favorites;
        for entity in &mut self.entities {
            let favorite = favorites.contains(entity.id());
            entity.set_favorite(favorite);
        }
    }

    /// Flip favorite status of `id`. Returns the new status.
    ///
    /// The set is updated even when `id` is not in the collection, so a later
    /// fetch brings it back already favorited.
    pub fn toggle_favorite(&mut self, id: &EntityId) -> bool {
        let now_favorite = if self.favorites.contains(id) {
            self.favorites.remove(id);
            false
        } else {
            self.favorites.insert(id.clone());
            true
        };

        match self.entities.iter_mut().find(|e| e.id() == id) {
            Some(entity) => entity.set_favorite(now_favorite),
            None => tracing::debug!(%id, "toggled favorite for an id not in the collection"),
        }
        now_favorite
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<E>, SdkError>,
    ) -> FetchOutcome {
        match self.fetch.finish(ticket, result) {
            None => FetchOutcome::Stale,
            Some(Ok(fresh)) => {
                self.entities = reconcile(fresh, &self.favorites);
                FetchOutcome::Applied {
                    count: self.entities.len(),
                }
            }
            Some(Err(_)) => FetchOutcome::Failed,
        }
    }

    /// Mutate one held entity in place. Returns `false` for unknown ids.
    pub fn update_entity(&mut self, id: &EntityId, f: impl FnOnce(&mut E)) -> bool {
        match self.entities.iter_mut().find(|e| e.id() == id) {
            Some(entity) => {
                f(entity);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tracked::test_support::Sample;
    use crate::error::FetchError;
    use crate::shared::ids;

    fn state_with(entities: Vec<Sample>) -> TrackedState<Sample> {
        let mut state = TrackedState::new(ids(["a", "b"]));
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(entities));
        state
    }

    fn all_failed() -> SdkError {
        SdkError::Fetch(FetchError::AllFailed {
            attempted: 2,
            last_error: "boom".into(),
        })
    }

    #[test]
    fn test_toggle_sets_flag_and_set() {
        let mut state = state_with(vec![Sample::new("a", 1.0)]);
        let id = EntityId::from("a");

        assert!(state.toggle_favorite(&id));
        assert!(state.get(&id).unwrap().is_favorite);
        assert!(state.favorites().contains(&id));

        assert!(!state.toggle_favorite(&id));
        assert!(!state.get(&id).unwrap().is_favorite);
        assert!(!state.favorites().contains(&id));
    }

    #[test]
    fn test_toggle_twice_restores_original() {
        let mut state = state_with(vec![Sample::new("a", 1.0), Sample::new("b", 2.0)]);
        state.set_favorites(ids(["b"]));
        let before_set = state.favorites().clone();
        let before_entities = state.entities().to_vec();

        for id in ["a", "b", "missing"] {
            let id = EntityId::from(id);
            state.toggle_favorite(&id);
            state.toggle_favorite(&id);
        }

        assert_eq!(state.favorites(), &before_set);
        assert_eq!(state.entities(), before_entities.as_slice());
    }

    #[test]
    fn test_toggle_unknown_id_still_updates_set() {
        let mut state = state_with(vec![Sample::new("a", 1.0)]);
        let id = EntityId::from("c");
        assert!(state.toggle_favorite(&id));
        assert!(state.favorites().contains(&id));
        assert!(state.get(&id).is_none());

        // The next fetch brings it back already favorited.
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(vec![Sample::new("a", 1.0), Sample::new("c", 3.0)]));
        assert!(state.get(&id).unwrap().is_favorite);
        assert!(!state.get(&"a".into()).unwrap().is_favorite);
    }

    #[test]
    fn test_fetch_replaces_collection_and_drops_missing() {
        let mut state = state_with(vec![Sample::new("a", 1.0), Sample::new("b", 2.0)]);
        state.toggle_favorite(&"b".into());

        let ticket = state.begin_fetch();
        assert!(state.is_loading());
        let outcome = state.complete_fetch(ticket, Ok(vec![Sample::new("b", 20.0)]));

        assert_eq!(outcome, FetchOutcome::Applied { count: 1 });
        assert!(!state.is_loading());
        assert_eq!(state.entities().len(), 1);
        let b = state.get(&"b".into()).unwrap();
        assert_eq!(b.value, 20.0);
        assert!(b.is_favorite);
    }

    #[test]
    fn test_failed_fetch_keeps_last_good_and_sets_error() {
        let mut state = state_with(vec![Sample::new("a", 1.0)]);
        let before = state.entities().to_vec();

        let ticket = state.begin_fetch();
        let outcome = state.complete_fetch(ticket, Err(all_failed()));

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(state.entities(), before.as_slice());
        assert!(state.error().unwrap().contains("boom"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_error_is_sticky_until_next_fetch() {
        let mut state = state_with(vec![]);
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Err(all_failed()));
        assert!(state.error().is_some());

        state.toggle_favorite(&"a".into());
        assert!(state.error().is_some());

        let _ticket = state.begin_fetch();
        assert!(state.error().is_none());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut state = state_with(vec![Sample::new("a", 1.0)]);

        let slow = state.begin_fetch();
        let fast = state.begin_fetch();

        let applied = state.complete_fetch(fast, Ok(vec![Sample::new("b", 2.0)]));
        assert_eq!(applied, FetchOutcome::Applied { count: 1 });

        // The slow, older response resolves last and must not clobber.
        let stale = state.complete_fetch(slow, Ok(vec![Sample::new("a", 99.0)]));
        assert_eq!(stale, FetchOutcome::Stale);
        assert_eq!(state.entities()[0].id.as_str(), "b");
    }

    #[test]
    fn test_stale_result_does_not_end_loading() {
        let mut state: TrackedState<Sample> = TrackedState::default();
        let old = state.begin_fetch();
        let new = state.begin_fetch();

        state.complete_fetch(old, Err(all_failed()));
        assert!(state.is_loading());
        assert!(state.error().is_none());

        state.complete_fetch(new, Ok(vec![]));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_fetch_guard_only_newest_ticket_finishes() {
        let mut guard = FetchGuard::default();
        let old = guard.begin();
        let new = guard.begin();
        assert!(old < new);
        assert!(!guard.is_current(old));

        assert!(guard.finish(old, Ok::<_, SdkError>(1)).is_none());
        assert!(guard.is_loading());

        let result = guard.finish(new, Err::<u32, _>(all_failed()));
        assert!(matches!(result, Some(Err(_))));
        assert!(!guard.is_loading());
        assert!(guard.error().unwrap().contains("boom"));

        guard.begin();
        assert!(guard.error().is_none());
    }

    #[test]
    fn test_tracked_ids_is_selection_then_extra_favorites() {
        let mut state: TrackedState<Sample> = TrackedState::new(ids(["a", "b"]));
        state.set_favorites(ids(["b", "c"]));
        assert_eq!(state.tracked_ids(), ids(["a", "b", "c"]));
    }

    #[test]
    fn test_set_favorites_resyncs_flags() {
        let mut state = state_with(vec![Sample::new("a", 1.0), Sample::new("b", 2.0)]);
        state.set_favorites(ids(["a"]));
        assert!(state.get(&"a".into()).unwrap().is_favorite);
        state.set_favorites(ids(["b"]));
        assert!(!state.get(&"a".into()).unwrap().is_favorite);
        assert!(state.get(&"b".into()).unwrap().is_favorite);
    }

    #[test]
    fn test_update_entity_unknown_id() {
        let mut state = state_with(vec![Sample::new("a", 1.0)]);
        assert!(state.update_entity(&"a".into(), |e| e.value = 5.0));
        assert!(!state.update_entity(&"zzz".into(), |e| e.value = 5.0));
        assert_eq!(state.get(&"a".into()).unwrap().value, 5.0);
    }
}
