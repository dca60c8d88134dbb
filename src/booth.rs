//! The voting booth: sole owner of the roster, tally and ballot log
//!
//! Every mutating operation takes `&mut self`, validates, updates memory and
//! then persists all three containers. If persisting fails the in-memory
//! change stands, the failure is logged and returned, and the store catches
//! up at the next successful save.
//!
//! ```rust
//! use classvote::booth::VotingBooth;
//! use classvote::ballot::BallotRequest;
//! use classvote::config::VotingConfig;
//! use classvote::storage::MemoryStore;
//!
//! # fn main() -> classvote::Result<()> {
//! let mut booth = VotingBooth::open(VotingConfig::for_testing(), MemoryStore::new())?;
//! let alice = booth.add_candidate("Alice", "101")?.id;
//! let bob = booth.add_candidate("Bob", "102")?.id;
//! let carol = booth.add_candidate("Carol", "103")?.id;
//!
//! let mut session = booth.open_session()?;
//! session.submit_ballot(&BallotRequest::identified(carol, alice, bob))?;
//!
//! let stats = booth.summary_stats();
//! assert_eq!((stats.total_voters, stats.total_votes), (1, 2));
//! # Ok(())
//! # }
//! ```

use crate::admin::AdminGate;
use crate::ballot::{BallotLog, BallotRequest};
use crate::config::{BallotVariant, VotingConfig};
use crate::persistence::{Persistence, Snapshot};
use crate::report::{self, BallotLine, RankedEntry, ResultsReport, SummaryStats};
use crate::roster::Roster;
use crate::storage::KeyValueStore;
use crate::tally::Tally;
use crate::types::{Ballot, Candidate, CandidateId};
use crate::{Error, Result, voting_error};
use chrono::Utc;

/// Owned voting state bound to a persistence backend
#[derive(Debug)]
pub struct VotingBooth<S> {
    config: VotingConfig,
    admin: AdminGate,
    roster: Roster,
    tally: Tally,
    ballots: BallotLog,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> VotingBooth<S> {
    /// Construct from whatever the store holds
    pub fn open(config: VotingConfig, store: S) -> Result<Self> {
        let admin = config.admin_gate()?;
        let persistence = Persistence::new(store);
        let Snapshot {
            roster,
            mut tally,
            ballots,
        } = persistence.load();

        let (added, dropped) = tally.align_to(&roster);
        if added + dropped > 0 {
            tracing::warn!(
                "⚠️  Tally out of step with roster: {} entries added, {} stale entries dropped",
                added,
                dropped
            );
        }

        tracing::info!(
            "🗳️  Voting booth opened: variant={}, candidates={}, ballots={}",
            config.variant.as_str(),
            roster.len(),
            ballots.len()
        );

        Ok(Self {
            config,
            admin,
            roster,
            tally,
            ballots,
            persistence,
        })
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    pub fn variant(&self) -> BallotVariant {
        self.config.variant
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.persistence.store_mut()
    }

    /// Current state as a detached copy
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            roster: self.roster.clone(),
            tally: self.tally.clone(),
            ballots: self.ballots.clone(),
        }
    }

    // --- Roster -----------------------------------------------------------

    pub fn candidates(&self) -> &[Candidate] {
        self.roster.as_slice()
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.roster.get(id)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn ballots(&self) -> &BallotLog {
        &self.ballots
    }

    /// Register a candidate with a zero tally entry
    pub fn add_candidate(&mut self, name: &str, number: &str) -> Result<Candidate> {
        let id = self.allocate_id();
        let candidate = self.roster.add(id, name, number)?.clone();
        self.tally.register(candidate.id);

        tracing::info!(
            "➕ Candidate registered: id={}, name={}, number={}",
            candidate.id,
            candidate.name,
            candidate.number
        );

        self.persist()?;
        Ok(candidate)
    }

    /// Remove a candidate and its tally entry; ballots naming it are kept
    pub fn remove_candidate(&mut self, id: CandidateId) -> Result<Candidate> {
        let candidate = self.roster.remove(id)?;
        self.tally.remove(id);

        let dangling = self.ballots.iter().filter(|b| b.names(id)).count();
        tracing::info!(
            "➖ Candidate removed: id={}, name={}, ballots_still_referencing={}",
            candidate.id,
            candidate.name,
            dangling
        );

        self.persist()?;
        Ok(candidate)
    }

    /// Fresh id from the wall clock, strictly above every id ever seen
    fn allocate_id(&self) -> CandidateId {
        let now = CandidateId::new(Utc::now().timestamp_millis());
        let floor = self
            .roster
            .max_id()
            .into_iter()
            .chain(self.ballots.max_referenced_id())
            .max()
            .map(CandidateId::successor);

        match floor {
            Some(floor) if floor > now => floor,
            _ => now,
        }
    }

    // --- Voting -----------------------------------------------------------

    /// Open a voting session if the roster is large enough
    ///
    /// The roster size is checked here only; the session borrows the booth
    /// mutably, so the roster cannot change while it is open.
    pub fn open_session(&mut self) -> Result<VotingSession<'_, S>> {
        let required = self.config.min_candidates;
        let actual = self.roster.len();
        if actual < required {
            return Err(Error::NotEnoughCandidates { required, actual });
        }

        tracing::info!("Voting session opened with {} candidates", actual);
        Ok(VotingSession { booth: self })
    }

    fn cast(&mut self, request: &BallotRequest) -> Result<Ballot> {
        let ballot =
            request.validate(self.config.variant, &self.roster, &self.ballots, Utc::now())?;

        self.tally.record(ballot.choices);
        self.ballots.append(ballot.clone());

        tracing::info!(
            "🗳️ Ballot cast: voter={}, choices=[{}, {}], total_ballots={}",
            ballot.voter_label(),
            ballot.first_choice(),
            ballot.second_choice(),
            self.ballots.len()
        );

        self.persist()?;
        Ok(ballot)
    }

    // --- Reporting --------------------------------------------------------

    pub fn ranked_results(&self) -> Vec<RankedEntry> {
        report::ranked_results(&self.roster, &self.tally)
    }

    pub fn summary_stats(&self) -> SummaryStats {
        report::summary_stats(&self.tally, &self.ballots)
    }

    pub fn ballot_detail(&self) -> Vec<BallotLine> {
        report::ballot_detail(&self.roster, &self.ballots)
    }

    /// Admin results view
    ///
    /// Requires the admin password and at least one ballot.
    pub fn results(&self, password: &str) -> Result<ResultsReport> {
        self.admin.verify(password)?;

        if self.ballots.is_empty() {
            return Err(voting_error!("No ballots have been cast yet"));
        }

        Ok(ResultsReport::build(&self.roster, &self.tally, &self.ballots))
    }

    // --- Persistence ------------------------------------------------------

    /// Write the current state to the store
    pub fn persist(&mut self) -> Result<()> {
        self.persistence
            .save(&self.roster, &self.tally, &self.ballots)
            .inspect_err(|e| {
                tracing::warn!("⚠️ Failed to persist voting state: {}", e);
            })
    }

    /// Clear every container and erase every persisted blob
    ///
    /// Repeating the call is a no-op. Confirmation is left to the caller.
    pub fn reset_all(&mut self) -> Result<()> {
        self.roster.clear();
        self.tally.clear();
        self.ballots.clear();

        self.persistence.erase().inspect_err(|e| {
            tracing::warn!("⚠️ Failed to erase persisted voting state: {}", e);
        })?;

        tracing::info!("🧹 Voting state reset");
        Ok(())
    }
}

/// An open voting session
///
/// Obtained from [`VotingBooth::open_session`]; holds the booth exclusively
/// until dropped.
#[derive(Debug)]
pub struct VotingSession<'a, S> {
    booth: &'a mut VotingBooth<S>,
}

impl<S: KeyValueStore> VotingSession<'_, S> {
    pub fn variant(&self) -> BallotVariant {
        self.booth.config.variant
    }

    /// Candidates who may cast a ballot (identified variant)
    pub fn list_voters(&self) -> Vec<Candidate> {
        self.booth.roster.eligible_choices(None)
    }

    /// Candidates offered as first/second choice, minus `exclude`
    pub fn list_eligible_choices(&self, exclude: Option<CandidateId>) -> Vec<Candidate> {
        self.booth.roster.eligible_choices(exclude)
    }

    /// Whether an identified voter already has a ballot
    pub fn has_voted(&self, voter: CandidateId) -> bool {
        self.booth.ballots.has_voted(voter)
    }

    /// Validate and record a ballot
    pub fn submit_ballot(&mut self, request: &BallotRequest) -> Result<Ballot> {
        self.booth.cast(request)
    }

    /// Running ranked results while voting is in progress
    pub fn live_results(&self) -> Vec<RankedEntry> {
        self.booth.ranked_results()
    }

    pub fn summary_stats(&self) -> SummaryStats {
        self.booth.summary_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn booth() -> VotingBooth<MemoryStore> {
        VotingBooth::open(VotingConfig::for_testing(), MemoryStore::new()).unwrap()
    }

    fn graded_booth() -> VotingBooth<MemoryStore> {
        let config = VotingConfig::for_testing().with_variant(BallotVariant::Graded);
        VotingBooth::open(config, MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut booth = booth();
        let ids: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, name)| booth.add_candidate(name, &i.to_string()).unwrap().id)
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_removed_id_is_not_reissued() {
        let mut booth = graded_booth();
        let a = booth.add_candidate("A", "1").unwrap().id;
        let b = booth.add_candidate("B", "2").unwrap().id;
        booth
            .open_session()
            .unwrap()
            .submit_ballot(&BallotRequest::graded("x", a, b))
            .unwrap();

        booth.remove_candidate(b).unwrap();
        let c = booth.add_candidate("C", "3").unwrap().id;
        assert!(c > b);
    }

    #[test]
    fn test_add_and_remove_persist() {
        let mut booth = booth();
        let alice = booth.add_candidate("Alice", "101").unwrap();
        assert_eq!(booth.tally().count(alice.id), 0);
        assert!(booth.store().contains_key("students"));

        booth.remove_candidate(alice.id).unwrap();
        assert!(booth.candidates().is_empty());
        assert!(!booth.tally().contains(alice.id));
        assert_eq!(booth.store().get("students").unwrap().as_deref(), Some("[]"));
        assert_eq!(booth.store().get("votes").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_session_requires_minimum_roster() {
        let mut booth = booth();
        booth.add_candidate("Alice", "101").unwrap();

        match booth.open_session() {
            Err(Error::NotEnoughCandidates { required, actual }) => {
                assert_eq!((required, actual), (2, 1));
            }
            other => panic!("expected NotEnoughCandidates, got {other:?}"),
        }

        booth.add_candidate("Bob", "102").unwrap();
        assert!(booth.open_session().is_ok());
    }

    #[test]
    fn test_failed_ballot_leaves_state_untouched() {
        let mut booth = booth();
        let a = booth.add_candidate("A", "1").unwrap().id;
        let b = booth.add_candidate("B", "2").unwrap().id;
        let before = booth.snapshot();

        let mut session = booth.open_session().unwrap();
        assert!(session.submit_ballot(&BallotRequest::identified(b, a, a)).is_err());
        assert!(session.submit_ballot(&BallotRequest::identified(a, a, b)).is_err());

        assert_eq!(booth.snapshot(), before);
    }

    #[test]
    fn test_results_requires_password_and_ballots() {
        let mut booth = graded_booth();
        let a = booth.add_candidate("A", "1").unwrap().id;
        let b = booth.add_candidate("B", "2").unwrap().id;

        assert!(matches!(booth.results("1234"), Err(Error::Voting { .. })));

        booth
            .open_session()
            .unwrap()
            .submit_ballot(&BallotRequest::graded("1-1", a, b))
            .unwrap();

        assert!(matches!(booth.results("0000"), Err(Error::Unauthorized)));
        let report = booth.results("1234").unwrap();
        assert_eq!(report.stats.total_voters, 1);
        assert_eq!(report.podium.len(), 2);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let mut booth = booth();
        booth.add_candidate("Alice", "101").unwrap();
        booth.store_mut().set_fail_writes(true);

        let err = booth.add_candidate("Bob", "102").unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(booth.candidates().len(), 2);

        booth.store_mut().set_fail_writes(false);
        booth.persist().unwrap();
        let reloaded = Persistence::new(booth.store().clone()).load();
        assert_eq!(reloaded.roster.len(), 2);
    }
}
