//! Ballot requests, their validation, and the append-only ballot log

use crate::config::BallotVariant;
use crate::roster::Roster;
use crate::types::{Ballot, CandidateId, Voter};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cast ballots in chronological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallotLog {
    ballots: Vec<Ballot>,
}

impl BallotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ballot> {
        self.ballots.iter()
    }

    pub fn append(&mut self, ballot: Ballot) {
        self.ballots.push(ballot);
    }

    /// Whether an identified voter already has a ballot in the log
    pub fn has_voted(&self, voter_id: CandidateId) -> bool {
        self.ballots.iter().any(|b| b.voter_id() == Some(voter_id))
    }

    /// Largest candidate id referenced by any ballot, as voter or choice
    pub fn max_referenced_id(&self) -> Option<CandidateId> {
        self.ballots
            .iter()
            .flat_map(|b| b.choices.into_iter().chain(b.voter_id()))
            .max()
    }

    pub fn clear(&mut self) {
        self.ballots.clear();
    }
}

/// Raw ballot fields as supplied by the presentation layer
///
/// `voter` holds the voter's candidate id in the identified variant and the
/// grade label in the graded variant. Choices are candidate ids as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BallotRequest {
    pub voter: String,
    pub first_choice: String,
    pub second_choice: String,
}

impl BallotRequest {
    pub fn new(
        voter: impl Into<String>,
        first_choice: impl Into<String>,
        second_choice: impl Into<String>,
    ) -> Self {
        Self {
            voter: voter.into(),
            first_choice: first_choice.into(),
            second_choice: second_choice.into(),
        }
    }

    /// Request from an identified voter choosing two candidates by id
    pub fn identified(voter: CandidateId, first: CandidateId, second: CandidateId) -> Self {
        Self::new(voter.to_string(), first.to_string(), second.to_string())
    }

    /// Request from a graded voter choosing two candidates by id
    pub fn graded(grade: impl Into<String>, first: CandidateId, second: CandidateId) -> Self {
        Self::new(grade, first.to_string(), second.to_string())
    }

    /// Validate against the current roster and log, producing the ballot to
    /// append
    ///
    /// Failures, in order:
    /// 1. voter/grade missing (`Validation`)
    /// 2. a choice missing (`Validation`)
    /// 3. both choices the same (`Validation`)
    /// 4. identified voter already voted (`DuplicateVote`)
    /// 5. voter or a choice not on the roster (`NotFound`)
    /// 6. identified voter choosing themselves (`Validation`)
    pub fn validate(
        &self,
        variant: BallotVariant,
        roster: &Roster,
        log: &BallotLog,
        now: DateTime<Utc>,
    ) -> Result<Ballot> {
        let voter = self.voter.trim();
        let first = self.first_choice.trim();
        let second = self.second_choice.trim();

        if voter.is_empty() {
            return Err(Error::validation(match variant {
                BallotVariant::Identified => "voter",
                BallotVariant::Graded => "grade",
            }));
        }

        if first.is_empty() || second.is_empty() {
            return Err(Error::validation("choices"));
        }

        if first == second {
            return Err(Error::validation("choices must differ"));
        }

        let voter = match variant {
            BallotVariant::Identified => {
                let voter_id = parse_id(voter, "Voter")?;
                if log.has_voted(voter_id) {
                    return Err(Error::duplicate_vote(voter_id.to_string()));
                }
                let candidate = roster
                    .get(voter_id)
                    .ok_or_else(|| Error::not_found("Voter", voter_id))?;
                Voter::Identified {
                    voter_id,
                    name: candidate.name.clone(),
                    number: candidate.number.clone(),
                }
            }
            BallotVariant::Graded => Voter::Graded {
                grade: voter.to_string(),
            },
        };

        let first = parse_id(first, "Candidate")?;
        let second = parse_id(second, "Candidate")?;

        // "7" and "07" name the same candidate
        if first == second {
            return Err(Error::validation("choices must differ"));
        }

        for id in [first, second] {
            if !roster.contains(id) {
                return Err(Error::not_found("Candidate", id));
            }
        }

        if let Voter::Identified { voter_id, .. } = &voter {
            if *voter_id == first || *voter_id == second {
                return Err(Error::validation("cannot vote for yourself"));
            }
        }

        Ok(Ballot {
            voter,
            timestamp: now,
            choices: [first, second],
        })
    }
}

fn parse_id(raw: &str, what: &str) -> Result<CandidateId> {
    raw.parse().map_err(|_| Error::not_found(what, raw))
}
