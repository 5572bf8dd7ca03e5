use crate::data::{default_tournament, validate_rounds, BracketError, Round};
use crate::storage::{load_snapshot, save_snapshot, SnapshotStore};
use log::{debug, warn};

/// Working copy of the tournament plus the store it is persisted to.
pub struct TournamentStore<S: SnapshotStore> {
    rounds: Vec<Round>,
    storage: S,
}

impl<S: SnapshotStore> TournamentStore<S> {
    /// With `auto_seed` a usable stored document wins; otherwise, or when nothing
    /// usable is stored, the default tournament is adopted and written back.
    pub fn load(storage: S, auto_seed: bool) -> Self {
        let stored = if auto_seed {
            load_snapshot(&storage)
        } else {
            None
        };

        match stored {
            Some(rounds) => {
                debug!("Loaded stored bracket with {} rounds", rounds.len());
                Self { rounds, storage }
            }
            None => {
                let store = Self {
                    rounds: default_tournament(),
                    storage,
                };
                save_snapshot(&store.storage, &store.rounds);
                store
            }
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Independent copy of the working data.
    pub fn snapshot(&self) -> Vec<Round> {
        self.rounds.clone()
    }

    /// All-or-nothing: on rejection the working data is untouched.
    pub fn replace_state(&mut self, rounds: Vec<Round>) -> Result<(), BracketError> {
        validate_rounds(&rounds)?;
        self.rounds = rounds;
        save_snapshot(&self.storage, &self.rounds);
        Ok(())
    }

    pub fn replace_from_json(&mut self, raw: &str) -> Result<(), BracketError> {
        let rounds: Vec<Round> = serde_json::from_str(raw)
            .map_err(|err| BracketError::InvalidState(err.to_string()))?;
        self.replace_state(rounds)
    }

    pub fn reset_to_default(&mut self) {
        self.rounds = default_tournament();
        save_snapshot(&self.storage, &self.rounds);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: SnapshotStore> std::fmt::Debug for TournamentStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TournamentStore")
            .field("rounds", &self.rounds.len())
            .finish()
    }
}

pub(crate) fn log_rejected(err: &BracketError) {
    warn!("Ignoring bracket replacement: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Pack, Team};
    use crate::storage::{MemoryStorage, LEGACY_PACK_TITLE};
    use pretty_assertions::assert_eq;

    fn one_round(name: &str) -> Vec<Round> {
        vec![Round {
            name: name.to_owned(),
            packs: vec![Pack {
                title: "P".to_owned(),
                teams: vec![Team::named("A", "7", "Юг")],
                winners: None,
                champion_index: None,
            }],
            champion: None,
        }]
    }

    #[test]
    fn empty_store_seeds_default() {
        let store = TournamentStore::load(MemoryStorage::new(), true);
        assert_eq!(store.snapshot(), default_tournament());
        assert!(store.storage().raw().is_some());
    }

    #[test]
    fn stored_rounds_are_adopted() {
        let raw = serde_json::to_string(&one_round("Стыки")).unwrap();
        let store = TournamentStore::load(MemoryStorage::with_raw(&raw), true);
        assert_eq!(store.snapshot(), one_round("Стыки"));
    }

    #[test]
    fn legacy_rounds_are_migrated_on_load() {
        let raw = r#"{"rounds":[{"name":"R1","teams":["A","B"]}]}"#;
        let store = TournamentStore::load(MemoryStorage::with_raw(raw), true);

        assert_eq!(store.round_count(), 1);
        assert_eq!(store.rounds()[0].packs[0].title, LEGACY_PACK_TITLE);
        assert_eq!(store.rounds()[0].packs[0].teams.len(), 2);
    }

    #[test]
    fn null_labels_are_kept_and_get_fallback_labels() {
        use crate::render::{render_slides, RenderOptions};

        let raw = r#"[{"name":null,"packs":[{"title":null,"teams":[{"name":"A"}]}]}]"#;
        let store = TournamentStore::load(MemoryStorage::with_raw(raw), true);
        assert_eq!(store.round_count(), 1);
        assert_eq!(store.rounds()[0].packs[0].teams[0].name.as_deref(), Some("A"));

        let slides = render_slides(store.rounds(), &RenderOptions::default());
        assert_eq!(slides[0].label, "Раунд 1");
        assert_eq!(slides[0].packs[0].title, "Пачка 1");

        let mut replaced = TournamentStore::load(MemoryStorage::new(), true);
        replaced.replace_from_json(raw).unwrap();
        assert_eq!(replaced.snapshot(), store.snapshot());
    }

    #[test]
    fn malformed_entry_falls_back_to_default() {
        let store = TournamentStore::load(MemoryStorage::with_raw("[[[["), true);
        assert_eq!(store.snapshot(), default_tournament());
    }

    #[test]
    fn reseeding_ignores_stored_rounds() {
        let raw = serde_json::to_string(&one_round("Стыки")).unwrap();
        let store = TournamentStore::load(MemoryStorage::with_raw(&raw), false);

        assert_eq!(store.snapshot(), default_tournament());
        let persisted: Vec<Round> =
            serde_json::from_str(&store.storage().raw().unwrap()).unwrap();
        assert_eq!(persisted, default_tournament());
    }

    #[test]
    fn rejected_replace_leaves_rounds_untouched() {
        let mut store = TournamentStore::load(MemoryStorage::new(), true);
        store.replace_state(one_round("Финал")).unwrap();
        let before = store.snapshot();
        let persisted = store.storage().raw();

        assert!(store.replace_state(Vec::new()).is_err());
        assert!(store.replace_from_json("{\"rounds\": 3}").is_err());
        assert!(store.replace_from_json("not json").is_err());

        assert_eq!(store.snapshot(), before);
        assert_eq!(store.storage().raw(), persisted);
    }

    #[test]
    fn replace_persists_and_reset_restores() {
        let mut store = TournamentStore::load(MemoryStorage::new(), true);
        store.replace_state(one_round("Финал")).unwrap();

        let reloaded = TournamentStore::load(
            MemoryStorage::with_raw(&store.storage().raw().unwrap()),
            true,
        );
        assert_eq!(reloaded.snapshot(), one_round("Финал"));

        store.reset_to_default();
        assert_eq!(store.snapshot(), default_tournament());
    }

    #[test]
    fn snapshot_cannot_mutate_working_data() {
        let store = TournamentStore::load(MemoryStorage::new(), true);
        let mut copy = store.snapshot();
        copy[0].packs[0].teams.clear();
        assert_eq!(store.rounds()[0].packs[0].teams.len(), 6);
    }

    #[test]
    fn storage_failure_keeps_memory_authoritative() {
        let mut store = TournamentStore::load(MemoryStorage::read_only(None), true);
        store.replace_state(one_round("Финал")).unwrap();
        assert_eq!(store.snapshot(), one_round("Финал"));
        assert_eq!(store.storage().raw(), None);
    }
}
