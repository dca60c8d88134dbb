//! Persistence adapter: the three containers to and from a key-value store
//!
//! Each container lives in its own JSON blob:
//!
//! | key        | contents                                   |
//! |------------|--------------------------------------------|
//! | `students` | roster array `[{id, name, number}]`        |
//! | `votes`    | tally object `{"<id>": count}`             |
//! | `voters`   | ballot log array                           |
//!
//! Loading fails open: a blob that is absent, unreadable or malformed comes
//! back as an empty container. Saving reports failures to the caller and
//! makes no attempt to roll back blobs already written.

use crate::ballot::BallotLog;
use crate::roster::Roster;
use crate::storage::KeyValueStore;
use crate::tally::Tally;
use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const ROSTER_KEY: &str = "students";
pub const TALLY_KEY: &str = "votes";
pub const BALLOTS_KEY: &str = "voters";

/// Every key the adapter owns
pub const ALL_KEYS: [&str; 3] = [ROSTER_KEY, TALLY_KEY, BALLOTS_KEY];

/// The three containers as loaded from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub roster: Roster,
    pub tally: Tally,
    pub ballots: BallotLog,
}

/// Reads and writes the containers through a [`KeyValueStore`]
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Load all three containers, substituting empty ones for bad blobs
    pub fn load(&self) -> Snapshot {
        let snapshot = Snapshot {
            roster: self.read_blob(ROSTER_KEY),
            tally: self.read_blob(TALLY_KEY),
            ballots: self.read_blob(BALLOTS_KEY),
        };

        tracing::info!(
            "📂 Loaded state from {} store: candidates={}, tally_entries={}, ballots={}",
            self.store.backend_name(),
            snapshot.roster.len(),
            snapshot.tally.len(),
            snapshot.ballots.len()
        );

        snapshot
    }

    /// Write all three containers
    ///
    /// Stops at the first failing write; earlier blobs stay written.
    pub fn save(&mut self, roster: &Roster, tally: &Tally, ballots: &BallotLog) -> Result<()> {
        self.write_blob(ROSTER_KEY, roster)?;
        self.write_blob(TALLY_KEY, tally)?;
        self.write_blob(BALLOTS_KEY, ballots)?;
        Ok(())
    }

    /// Delete every persisted blob
    pub fn erase(&mut self) -> Result<()> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        Ok(())
    }

    fn read_blob<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}; starting empty", key, e);
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Malformed {} blob ignored: {}", key, e);
            T::default()
        })
    }

    fn write_blob<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{Ballot, CandidateId, Voter};
    use chrono::Utc;

    fn populated() -> Snapshot {
        let mut snapshot = Snapshot::default();
        let alice = CandidateId::new(1_700_000_000_000);
        let bob = CandidateId::new(1_700_000_000_001);
        for (id, name, number) in [(alice, "Alice", "101"), (bob, "Bob", "102")] {
            snapshot.roster.add(id, name, number).unwrap();
            snapshot.tally.register(id);
        }
        snapshot.tally.record([alice, bob]);
        snapshot.ballots.append(Ballot {
            voter: Voter::Identified {
                voter_id: alice,
                name: "Alice".to_string(),
                number: "101".to_string(),
            },
            timestamp: Utc::now(),
            choices: [bob, alice],
        });
        snapshot
    }

    #[test]
    fn test_empty_store_loads_empty_snapshot() {
        let persistence = Persistence::new(MemoryStore::new());
        assert_eq!(persistence.load(), Snapshot::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let original = populated();
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence
            .save(&original.roster, &original.tally, &original.ballots)
            .unwrap();

        assert_eq!(persistence.load(), original);
        for key in ALL_KEYS {
            assert!(persistence.store().contains_key(key));
        }
    }

    #[test]
    fn test_malformed_blob_fails_open_per_container() {
        let original = populated();
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence
            .save(&original.roster, &original.tally, &original.ballots)
            .unwrap();
        persistence.store_mut().set(TALLY_KEY, "{not json").unwrap();

        let loaded = persistence.load();
        assert_eq!(loaded.roster, original.roster);
        assert!(loaded.tally.is_empty());
        assert_eq!(loaded.ballots, original.ballots);
    }

    #[test]
    fn test_loads_string_ids() {
        let mut store = MemoryStore::new();
        let students = concat!(
            r#"[{"id":5,"name":"Eve","number":"105"},"#,
            r#"{"id":6,"name":"Fay","number":"106"}]"#,
        );
        store.set(ROSTER_KEY, students).unwrap();
        store.set(TALLY_KEY, r#"{"5":1,"6":1}"#).unwrap();
        store
            .set(
                BALLOTS_KEY,
                concat!(
                    r#"[{"voterId":"5","name":"Eve","number":"105","#,
                    r#""timestamp":"2024-05-01T08:00:00.000Z","choices":["6","5"]}]"#,
                ),
            )
            .unwrap();

        let loaded = Persistence::new(store).load();
        assert_eq!(loaded.roster.len(), 2);
        assert_eq!(loaded.tally.count(CandidateId::new(5)), 1);
        let ballot = loaded.ballots.iter().next().unwrap();
        assert_eq!(ballot.voter_id(), Some(CandidateId::new(5)));
        assert_eq!(ballot.choices, [CandidateId::new(6), CandidateId::new(5)]);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let original = populated();
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut persistence = Persistence::new(store);

        assert!(
            persistence
                .save(&original.roster, &original.tally, &original.ballots)
                .is_err()
        );
    }

    #[test]
    fn test_erase_removes_every_blob() {
        let original = populated();
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence
            .save(&original.roster, &original.tally, &original.ballots)
            .unwrap();

        persistence.erase().unwrap();
        persistence.erase().unwrap();
        assert!(persistence.store().is_empty());
    }
}
