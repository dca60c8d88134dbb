//! # Core Types for the Classroom Voting Booth
//!
//! This module defines the records that are persisted and passed across the
//! presentation boundary.
//!
//! ## Type Categories
//!
//! - [`CandidateId`]: opaque, clock-derived candidate identifier
//! - [`Candidate`]: a registered person eligible to receive votes
//! - [`Voter`]: what a ballot records about the person casting it
//! - [`Ballot`]: one voter's recorded pair of choices
//!
//! ## Usage Examples
//!
//! ```rust
//! use classvote::types::{Ballot, Candidate, CandidateId, Voter};
//! use chrono::Utc;
//!
//! let alice = Candidate::new(CandidateId::new(1), "Alice", "101");
//! let bob = Candidate::new(CandidateId::new(2), "Bob", "102");
//!
//! let ballot = Ballot {
//!     voter: Voter::Graded { grade: "3-1".to_string() },
//!     timestamp: Utc::now(),
//!     choices: [alice.id, bob.id],
//! };
//!
//! assert_eq!(ballot.voter_label(), "3-1");
//! assert!(ballot.names(alice.id));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque candidate identifier
///
/// Ids are taken from the wall clock in milliseconds when a candidate is
/// registered and never change afterwards. They serialize as JSON numbers
/// and as decimal strings when used as object keys.
///
/// Deserialization also accepts numeric strings, since stored ballots may
/// carry ids captured from form fields.
///
/// ```rust
/// use classvote::types::CandidateId;
///
/// let id: CandidateId = serde_json::from_str("\"1700000000000\"").unwrap();
/// assert_eq!(id, CandidateId::new(1_700_000_000_000));
/// assert_eq!(serde_json::to_string(&id).unwrap(), "1700000000000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidateId(i64);

impl CandidateId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Next id strictly after this one
    pub fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CandidateId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl<'de> Deserialize<'de> for CandidateId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(raw) => Ok(Self(raw)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A registered candidate
///
/// `name` and `number` (the student number) are each unique across the
/// roster; [`crate::roster::Roster`] enforces this on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub number: String,
}

impl Candidate {
    pub fn new(id: CandidateId, name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            number: number.into(),
        }
    }

    /// `Name (number)`, as shown in selection lists
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.number)
    }
}

/// The person casting a ballot
///
/// Which shape is recorded is fixed by
/// [`crate::config::BallotVariant`]; the two are never mixed in one log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Voter {
    /// A roster candidate voting in their own name. Name and number are
    /// captured at cast time so the log survives later removals.
    Identified {
        #[serde(rename = "voterId")]
        voter_id: CandidateId,
        name: String,
        number: String,
    },

    /// An anonymous voter who only states a grade/class label
    Graded { grade: String },
}

/// One voter's recorded pair of choices
///
/// Ballots are append-only. The choice ids referenced a roster candidate when
/// the ballot was cast but may dangle after a later removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(flatten)]
    pub voter: Voter,

    /// Cast time, RFC 3339 UTC
    pub timestamp: DateTime<Utc>,

    /// First and second choice, always distinct
    pub choices: [CandidateId; 2],
}

impl Ballot {
    /// Label identifying the voter in the ballot detail table
    pub fn voter_label(&self) -> &str {
        match &self.voter {
            Voter::Identified { name, .. } => name,
            Voter::Graded { grade } => grade,
        }
    }

    /// Voter id, for identified ballots
    pub fn voter_id(&self) -> Option<CandidateId> {
        match self.voter {
            Voter::Identified { voter_id, .. } => Some(voter_id),
            Voter::Graded { .. } => None,
        }
    }

    pub fn first_choice(&self) -> CandidateId {
        self.choices[0]
    }

    pub fn second_choice(&self) -> CandidateId {
        self.choices[1]
    }

    /// Whether this ballot gave a vote to `id`
    pub fn names(&self, id: CandidateId) -> bool {
        self.choices.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_candidate_id_accepts_numbers_and_strings() {
        let from_number: CandidateId = serde_json::from_str("42").unwrap();
        let from_string: CandidateId = serde_json::from_str("\" 42\"").unwrap();
        assert_eq!(from_number, from_string);

        assert!(serde_json::from_str::<CandidateId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<CandidateId>("true").is_err());
    }

    #[test]
    fn test_identified_ballot_shape() {
        let ballot = Ballot {
            voter: Voter::Identified {
                voter_id: CandidateId::new(3),
                name: "Carol".to_string(),
                number: "103".to_string(),
            },
            timestamp: fixed_time(),
            choices: [CandidateId::new(1), CandidateId::new(2)],
        };

        let json = serde_json::to_value(&ballot).unwrap();
        assert_eq!(json["voterId"], 3);
        assert_eq!(json["name"], "Carol");
        assert_eq!(json["number"], "103");
        assert_eq!(json["timestamp"], "2024-03-04T09:30:00Z");
        assert_eq!(json["choices"], serde_json::json!([1, 2]));
        assert!(json.get("grade").is_none());

        assert_eq!(ballot.voter_label(), "Carol");
        assert_eq!(ballot.voter_id(), Some(CandidateId::new(3)));
    }

    #[test]
    fn test_graded_ballot_shape() {
        let raw = r#"{"grade":"2-4","timestamp":"2024-03-04T09:30:00.000Z","choices":["1","2"]}"#;
        let ballot: Ballot = serde_json::from_str(raw).unwrap();

        assert_eq!(
            ballot.voter,
            Voter::Graded {
                grade: "2-4".to_string()
            }
        );
        assert_eq!(ballot.timestamp, fixed_time());
        assert_eq!(ballot.first_choice(), CandidateId::new(1));
        assert_eq!(ballot.second_choice(), CandidateId::new(2));
        assert_eq!(ballot.voter_id(), None);
    }

    #[test]
    fn test_identified_ballot_with_string_voter_id() {
        let raw = concat!(
            r#"{"voterId":"7","name":"Dan","number":"107","#,
            r#""timestamp":"2024-03-04T09:30:00Z","choices":[1,2]}"#,
        );
        let ballot: Ballot = serde_json::from_str(raw).unwrap();
        assert_eq!(ballot.voter_id(), Some(CandidateId::new(7)));
    }

    #[test]
    fn test_display_label() {
        let candidate = Candidate::new(CandidateId::new(1), "Alice", "101");
        assert_eq!(candidate.display_label(), "Alice (101)");
        assert_eq!(candidate.id.to_string(), "1");
    }
}
