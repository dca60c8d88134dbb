//! Running vote counts per candidate

use crate::roster::Roster;
use crate::types::CandidateId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vote count per candidate id
///
/// Every roster candidate has an entry, possibly zero. Counts only grow,
/// except when a candidate is removed (entry deleted) or the booth is reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally {
    counts: BTreeMap<CandidateId, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a zero entry for a newly registered candidate
    pub fn register(&mut self, id: CandidateId) {
        self.counts.entry(id).or_insert(0);
    }

    /// Drop the entry of a removed candidate
    pub fn remove(&mut self, id: CandidateId) -> Option<u64> {
        self.counts.remove(&id)
    }

    /// Count one ballot: both choices gain a vote
    pub fn record(&mut self, choices: [CandidateId; 2]) {
        for id in choices {
            *self.counts.entry(id).or_insert(0) += 1;
        }
    }

    /// Votes for `id`, zero when absent
    pub fn count(&self, id: CandidateId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.counts.contains_key(&id)
    }

    /// Sum of every entry
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CandidateId, u64)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Match entries to `roster`: zero entries for missing candidates,
    /// stale ids dropped. Returns `(added, dropped)`.
    pub fn align_to(&mut self, roster: &Roster) -> (usize, usize) {
        let before = self.counts.len();
        self.counts.retain(|id, _| roster.contains(*id));
        let dropped = before - self.counts.len();

        let kept = self.counts.len();
        for candidate in roster.iter() {
            self.register(candidate.id);
        }
        (self.counts.len() - kept, dropped)
    }
}
