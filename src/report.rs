//! Tally reporting: ranked results, summary statistics and ballot detail
//!
//! Everything here is a pure read over the roster, tally and ballot log.

use crate::ballot::BallotLog;
use crate::roster::Roster;
use crate::tally::Tally;
use crate::types::{Candidate, CandidateId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label shown for a choice whose candidate has since been removed
pub const UNKNOWN_LABEL: &str = "unknown";

/// One row of the ranked results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub candidate: Candidate,
    pub vote_count: u64,
    /// Share of all counted votes, 0-100
    pub percentage: f64,
}

/// Ballot and vote totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_voters: usize,
    pub total_votes: u64,
}

/// Name shown for a ballot choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceLabel {
    Known(String),
    /// Candidate removed after the ballot was cast
    Unknown(CandidateId),
}

impl fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(name) => f.write_str(name),
            Self::Unknown(_) => f.write_str(UNKNOWN_LABEL),
        }
    }
}

/// One row of the ballot detail table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotLine {
    /// 1-based position in the log
    pub position: usize,
    pub voter_label: String,
    pub first_choice: ChoiceLabel,
    pub second_choice: ChoiceLabel,
}

/// Every roster candidate with its count, most votes first
///
/// The sort is stable, so candidates with equal counts keep roster order.
pub fn ranked_results(roster: &Roster, tally: &Tally) -> Vec<RankedEntry> {
    let total = tally.total();

    let mut entries: Vec<RankedEntry> = roster
        .iter()
        .map(|candidate| {
            let vote_count = tally.count(candidate.id);
            RankedEntry {
                candidate: candidate.clone(),
                vote_count,
                percentage: percentage(vote_count, total),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    entries
}

/// Totals over the ballot log and tally
pub fn summary_stats(tally: &Tally, log: &BallotLog) -> SummaryStats {
    SummaryStats {
        total_voters: log.len(),
        total_votes: tally.total(),
    }
}

/// Ballot log rendered with candidate names, in cast order
pub fn ballot_detail(roster: &Roster, log: &BallotLog) -> Vec<BallotLine> {
    log.iter()
        .enumerate()
        .map(|(index, ballot)| BallotLine {
            position: index + 1,
            voter_label: ballot.voter_label().to_string(),
            first_choice: choice_label(roster, ballot.first_choice()),
            second_choice: choice_label(roster, ballot.second_choice()),
        })
        .collect()
}

fn choice_label(roster: &Roster, id: CandidateId) -> ChoiceLabel {
    match roster.get(id) {
        Some(candidate) => ChoiceLabel::Known(candidate.name.clone()),
        None => {
            tracing::debug!("Ballot references removed candidate {}", id);
            ChoiceLabel::Unknown(id)
        }
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Complete results view shown to the administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    /// Top two finishers (fewer when the roster is smaller)
    pub podium: Vec<RankedEntry>,
    pub stats: SummaryStats,
    pub ranked: Vec<RankedEntry>,
    pub ballots: Vec<BallotLine>,
}

impl ResultsReport {
    pub fn build(roster: &Roster, tally: &Tally, log: &BallotLog) -> Self {
        let ranked = ranked_results(roster, tally);
        let podium = ranked.iter().take(2).cloned().collect();

        Self {
            podium,
            stats: summary_stats(tally, log),
            ranked,
            ballots: ballot_detail(roster, log),
        }
    }

    pub fn winner(&self) -> Option<&RankedEntry> {
        self.podium.first()
    }

    pub fn runner_up(&self) -> Option<&RankedEntry> {
        self.podium.get(1)
    }
}
