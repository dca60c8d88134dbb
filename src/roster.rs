//! Ordered list of registered candidates

use crate::types::{Candidate, CandidateId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Registered candidates in insertion order
///
/// Names and numbers are unique across the roster (case-sensitive, after
/// trimming). Insertion order is the default display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    candidates: Vec<Candidate>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.get(id).is_some()
    }

    /// Largest id currently on the roster
    pub fn max_id(&self) -> Option<CandidateId> {
        self.candidates.iter().map(|c| c.id).max()
    }

    /// Register a candidate under `id`
    ///
    /// Checks run in order: both fields non-blank, then name collision, then
    /// number collision. On failure the roster is unchanged.
    pub fn add(&mut self, id: CandidateId, name: &str, number: &str) -> Result<&Candidate> {
        let name = name.trim();
        let number = number.trim();

        if name.is_empty() {
            return Err(Error::validation("name"));
        }
        if number.is_empty() {
            return Err(Error::validation("number"));
        }

        if self.candidates.iter().any(|c| c.name == name) {
            return Err(Error::duplicate("name", name));
        }
        if self.candidates.iter().any(|c| c.number == number) {
            return Err(Error::duplicate("number", number));
        }
        if self.contains(id) {
            return Err(Error::internal(format!("Candidate id {id} already issued")));
        }

        self.candidates.push(Candidate::new(id, name, number));
        let index = self.candidates.len() - 1;
        Ok(&self.candidates[index])
    }

    /// Remove a candidate, returning it
    pub fn remove(&mut self, id: CandidateId) -> Result<Candidate> {
        let index = self
            .candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::not_found("Candidate", id))?;
        Ok(self.candidates.remove(index))
    }

    /// Roster minus `exclude`, in roster order
    pub fn eligible_choices(&self, exclude: Option<CandidateId>) -> Vec<Candidate> {
        self.candidates
            .iter()
            .filter(|c| Some(c.id) != exclude)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}
