//! Team scores and point transfers
//!
//! Every change to a team's score goes through [`ScoreLedger`]. The ledger
//! journals each mutation and keeps running totals of value entering the
//! game (`minted`) and value leaving it (`forfeited`), so at any point
//! `team one + team two == minted - forfeited` and replaying the journal
//! from zero reproduces the current scores.

use std::ops::Index;

use enum_map::EnumMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::teams::Team;

/// Current score of both teams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores(EnumMap<Team, i64>);

impl TeamScores {
    /// Builds scores from explicit values
    pub fn new(team_one: i64, team_two: i64) -> Self {
        let mut scores = Self::default();
        scores.0[Team::One] = team_one;
        scores.0[Team::Two] = team_two;
        scores
    }

    /// Sum of both teams' scores
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    fn add(&mut self, team: Team, points: i64) {
        self.0[team] += points;
    }
}

impl Index<Team> for TeamScores {
    type Output = i64;

    fn index(&self, team: Team) -> &Self::Output {
        &self.0[team]
    }
}

/// A single recorded ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntry {
    /// Points added straight to a team
    Award {
        /// Team receiving the points
        team: Team,
        /// Points added
        points: i64,
    },
    /// The face-off loser's pending pool moved to the winner
    LeadTransfer {
        /// Team that won the face-off
        winner: Team,
        /// Points moved from the loser to the winner
        moved: i64,
    },
    /// A successful steal
    Steal {
        /// Team that stole the board
        stealer: Team,
        /// Points added to the stealer
        awarded: i64,
        /// Points removed from the team that struck out
        removed: i64,
        /// Board position of the answer that won the steal
        answer_index: usize,
    },
}

impl LedgerEntry {
    /// Applies this entry to a set of scores
    fn apply(&self, scores: &mut TeamScores) {
        match *self {
            Self::Award { team, points } => scores.add(team, points),
            Self::LeadTransfer { winner, moved } => {
                scores.add(winner.opponent(), -moved);
                scores.add(winner, moved);
            }
            Self::Steal {
                stealer,
                awarded,
                removed,
                answer_index: _,
            } => {
                scores.add(stealer, awarded);
                scores.add(stealer.opponent(), -removed);
            }
        }
    }
}

/// A detected inconsistency between the ledger's scores and its journal
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Replaying the journal does not reproduce the current scores
    #[error("journal replays to {replayed:?} but scores are {actual:?}")]
    Replay {
        /// Scores obtained by replaying the journal
        replayed: TeamScores,
        /// Scores currently held
        actual: TeamScores,
    },
    /// The score total does not match minted minus forfeited value
    #[error("score total {total} differs from minted {minted} minus forfeited {forfeited}")]
    Total {
        /// Sum of both teams' scores
        total: i64,
        /// Value that entered the ledger
        minted: i64,
        /// Value that left the ledger
        forfeited: i64,
    },
}

/// Owns all point mutations for a game session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreLedger {
    scores: TeamScores,
    journal: Vec<LedgerEntry>,
    minted: i64,
    forfeited: i64,
}

impl ScoreLedger {
    /// Current team scores
    pub fn scores(&self) -> TeamScores {
        self.scores
    }

    /// Every mutation recorded since the last reset, oldest first
    pub fn journal(&self) -> &[LedgerEntry] {
        &self.journal
    }

    /// Total value that entered the ledger
    pub fn minted(&self) -> i64 {
        self.minted
    }

    /// Total value that left the ledger
    pub fn forfeited(&self) -> i64 {
        self.forfeited
    }

    fn record(&mut self, entry: LedgerEntry) {
        entry.apply(&mut self.scores);
        self.journal.push(entry);
        self.verify();
    }

    /// Whether awarding `points` to `team` keeps every running total representable
    pub fn can_award(&self, team: Team, points: i64) -> bool {
        self.scores[team].checked_add(points).is_some()
            && self.scores.total().checked_add(points).is_some()
            && self.minted.checked_add(points).is_some()
    }

    /// Adds points to a team unconditionally
    pub fn award_points(&mut self, team: Team, points: i64) {
        self.minted += points;
        self.record(LedgerEntry::Award { team, points });
    }

    /// Resolves a face-off in favor of `winner`
    ///
    /// The loser's pending points move to the winner; nothing is created or
    /// destroyed.
    ///
    /// # Returns
    ///
    /// The combined pool now held by the winner.
    pub fn transfer_lead(&mut self, winner: Team, team_one_pending: i64, team_two_pending: i64) -> i64 {
        let moved = match winner {
            Team::One => team_two_pending,
            Team::Two => team_one_pending,
        };
        self.record(LedgerEntry::LeadTransfer { winner, moved });
        team_one_pending + team_two_pending
    }

    /// Applies a successful steal
    ///
    /// The stealer gains `awarded` and its opponent loses `removed`. Up to
    /// the smaller of the two amounts is a move between teams; any excess
    /// award is new value and any excess removal is forfeited.
    pub fn steal_transfer(&mut self, stealer: Team, awarded: i64, removed: i64, answer_index: usize) {
        let moved = awarded.min(removed);
        self.minted += awarded - moved;
        self.forfeited += removed - moved;
        self.record(LedgerEntry::Steal {
            stealer,
            awarded,
            removed,
            answer_index,
        });
    }

    /// Clears all scores and the journal
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Checks the ledger against its own journal
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrityViolation`] found.
    pub fn check_integrity(&self) -> Result<(), IntegrityViolation> {
        let replayed = self.journal.iter().fold(TeamScores::default(), |mut scores, entry| {
            entry.apply(&mut scores);
            scores
        });
        if replayed != self.scores {
            return Err(IntegrityViolation::Replay {
                replayed,
                actual: self.scores,
            });
        }
        if self.scores.total() != self.minted - self.forfeited {
            return Err(IntegrityViolation::Total {
                total: self.scores.total(),
                minted: self.minted,
                forfeited: self.forfeited,
            });
        }
        Ok(())
    }

    /// Fatal in debug builds, logged in release builds
    fn verify(&self) {
        if let Err(violation) = self.check_integrity() {
            tracing::error!(%violation, "score ledger integrity violation");
            debug_assert!(false, "score ledger integrity violation: {violation}");
        }
    }

    /// Total points each team received from steals, in team order
    pub fn stolen_points(&self) -> Vec<(Team, i64)> {
        self.journal
            .iter()
            .filter_map(|entry| match entry {
                LedgerEntry::Steal { stealer, awarded, .. } => Some((*stealer, *awarded)),
                _ => None,
            })
            .into_grouping_map()
            .sum()
            .into_iter()
            .sorted_by_key(|(team, _)| team.number())
            .collect_vec()
    }
}
