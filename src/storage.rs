use crate::data::{validate_rounds, BracketError, Pack, Round, Team};
use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;

pub const DEFAULT_STORAGE_KEY: &str = "mecom_bracket_state_vX";
pub const LEGACY_PACK_TITLE: &str = "Слоты";

/// Keyed durable home of the bracket document.
pub trait SnapshotStore {
    /// `Ok(None)` when nothing is stored; `Err` when an entry exists but is unreadable.
    fn read(&self) -> Result<Option<Value>, BracketError>;

    fn write(&self, rounds: &[Round]) -> Result<(), BracketError>;
}

#[derive(Debug, Clone)]
pub struct BrowserStorage {
    key: String,
    available: bool,
}

impl BrowserStorage {
    /// Checks for `window.localStorage` once; blocked or missing storage
    /// turns every later access into a no-op instead of a JS exception.
    pub fn new(key: &str) -> Self {
        let available = local_storage_available();
        if !available {
            warn!("localStorage is unavailable; bracket changes last for this page only");
        }
        Self {
            key: key.to_owned(),
            available,
        }
    }

    /// A store that never touches the browser, as when storage is disabled.
    pub fn unavailable(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            available: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}

fn local_storage_available() -> bool {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .is_some()
}

impl SnapshotStore for BrowserStorage {
    fn read(&self) -> Result<Option<Value>, BracketError> {
        if !self.available {
            return Ok(None);
        }
        match LocalStorage::get::<Value>(&self.key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(BracketError::malformed(err)),
        }
    }

    fn write(&self, rounds: &[Round]) -> Result<(), BracketError> {
        if !self.available {
            return Err(BracketError::Storage("localStorage is unavailable".to_owned()));
        }
        LocalStorage::set(&self.key, rounds).map_err(BracketError::storage)
    }
}

/// In-process store. Holds the document as JSON text, like the browser does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    raw: RefCell<Option<String>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: RefCell::new(Some(raw.to_owned())),
            read_only: false,
        }
    }

    /// Every write fails, as with a full or disabled browser store.
    pub fn read_only(raw: Option<&str>) -> Self {
        Self {
            raw: RefCell::new(raw.map(str::to_owned)),
            read_only: true,
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl SnapshotStore for MemoryStorage {
    fn read(&self) -> Result<Option<Value>, BracketError> {
        match self.raw.borrow().as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(BracketError::malformed),
        }
    }

    fn write(&self, rounds: &[Round]) -> Result<(), BracketError> {
        if self.read_only {
            return Err(BracketError::Storage("store is read-only".to_owned()));
        }
        let text = serde_json::to_string(rounds).map_err(BracketError::storage)?;
        *self.raw.borrow_mut() = Some(text);
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Rounds(Vec<Round>),
    Legacy(LegacySnapshot),
}

/// Older documents kept one flat list of team names per round.
#[derive(Deserialize)]
struct LegacySnapshot {
    rounds: Vec<LegacyRound>,
}

#[derive(Deserialize)]
struct LegacyRound {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    teams: Vec<Option<String>>,
}

impl LegacyRound {
    fn migrate(self) -> Round {
        let teams = self
            .teams
            .into_iter()
            .map(|name| Team {
                name,
                ..Team::default()
            })
            .collect();

        Round {
            name: self.name.unwrap_or_default(),
            packs: vec![Pack {
                title: LEGACY_PACK_TITLE.to_owned(),
                teams,
                winners: None,
                champion_index: None,
            }],
            champion: None,
        }
    }
}

/// Turns a stored document into a round list, migrating the legacy shape.
pub fn decode_snapshot(value: Value) -> Result<Vec<Round>, BracketError> {
    let rounds = match serde_json::from_value(value).map_err(BracketError::malformed)? {
        StoredSnapshot::Rounds(rounds) => rounds,
        StoredSnapshot::Legacy(legacy) => legacy
            .rounds
            .into_iter()
            .map(LegacyRound::migrate)
            .collect(),
    };
    validate_rounds(&rounds).map_err(BracketError::malformed)?;
    Ok(rounds)
}

/// Reads and decodes the stored document. Anything unusable yields `None`.
pub fn load_snapshot<S: SnapshotStore>(store: &S) -> Option<Vec<Round>> {
    let value = match store.read() {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(err) => {
            warn!("Discarding stored bracket: {}", err);
            return None;
        }
    };

    match decode_snapshot(value) {
        Ok(rounds) => Some(rounds),
        Err(err) => {
            warn!("Discarding stored bracket: {}", err);
            None
        }
    }
}

/// Best-effort write; the in-memory rounds stay authoritative on failure.
pub fn save_snapshot<S: SnapshotStore>(store: &S, rounds: &[Round]) {
    if let Err(err) = store.write(rounds) {
        warn!("Failed to persist bracket: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_tournament;
    use serde_json::json;

    #[test]
    fn legacy_document_becomes_single_pack_rounds() {
        let rounds =
            decode_snapshot(json!({ "rounds": [{ "name": "R1", "teams": ["A", "B"] }] })).unwrap();

        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].name, "R1");
        assert_eq!(rounds[0].packs.len(), 1);
        let pack = &rounds[0].packs[0];
        assert_eq!(pack.title, LEGACY_PACK_TITLE);
        let names: Vec<_> = pack.teams.iter().map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec![Some("A"), Some("B")]);
    }

    #[test]
    fn current_document_is_adopted_verbatim() {
        let rounds = default_tournament();
        let value = serde_json::to_value(&rounds).unwrap();
        assert_eq!(decode_snapshot(value).unwrap(), rounds);
    }

    #[test]
    fn unusable_documents_are_rejected() {
        assert!(decode_snapshot(json!([])).is_err());
        assert!(decode_snapshot(json!({ "rounds": "nope" })).is_err());
        assert!(decode_snapshot(json!("text")).is_err());
        assert!(decode_snapshot(json!({ "other": 1 })).is_err());
    }

    #[test]
    fn unparsable_memory_entry_loads_nothing() {
        let store = MemoryStorage::with_raw("{ not json");
        assert!(store.read().is_err());
        assert_eq!(load_snapshot(&store), None);
        assert_eq!(load_snapshot(&MemoryStorage::new()), None);
    }

    #[test]
    fn saved_rounds_read_back() {
        let store = MemoryStorage::new();
        let rounds = default_tournament();
        save_snapshot(&store, &rounds);
        assert_eq!(load_snapshot(&store), Some(rounds));
    }

    #[test]
    fn disabled_browser_storage_reads_nothing_and_refuses_writes() {
        let store = BrowserStorage::unavailable(DEFAULT_STORAGE_KEY);
        assert!(!store.is_available());
        assert!(matches!(store.read(), Ok(None)));
        assert!(matches!(
            store.write(&default_tournament()),
            Err(BracketError::Storage(_))
        ));
        assert_eq!(load_snapshot(&store), None);
        save_snapshot(&store, &default_tournament());
    }

    #[test]
    fn failed_write_is_swallowed() {
        let store = MemoryStorage::read_only(None);
        save_snapshot(&store, &default_tournament());
        assert_eq!(store.raw(), None);
    }
}
