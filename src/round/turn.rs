//! Turn selection
//!
//! Tracks which team is live on the board and the pending points each team
//! has put up during the current question. A question opens with a
//! face-off: once two guesses have scored, the team with the larger pending
//! pool takes the lead and absorbs both pools.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::{constants::round::FACE_OFF_GUESSES, teams::Team};

/// Which team wins a face-off when both pending pools are equal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Ties go to the second team
    #[default]
    TeamTwo,
    /// Ties go to the first team
    TeamOne,
}

impl TieBreak {
    fn winner(self) -> Team {
        match self {
            Self::TeamTwo => Team::Two,
            Self::TeamOne => Team::One,
        }
    }
}

/// Outcome of a face-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lead {
    /// Team that took the lead
    pub winner: Team,
    /// Pending points team one had before the pools merged
    pub team_one_pending: i64,
    /// Pending points team two had before the pools merged
    pub team_two_pending: i64,
}

/// Per-question turn state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSelector {
    selected: Option<Team>,
    pending: EnumMap<Team, Option<i64>>,
    determine_counter: u8,
    leader: Option<Team>,
}

impl TurnSelector {
    /// Team currently allowed to answer
    pub fn selected(&self) -> Option<Team> {
        self.selected
    }

    /// Team that won the face-off, once decided
    pub fn leader(&self) -> Option<Team> {
        self.leader
    }

    /// Pending points a team has put up this question, if it has scored
    pub fn pending(&self, team: Team) -> Option<i64> {
        self.pending[team]
    }

    /// Number of face-off guesses that have scored so far
    pub fn determine_counter(&self) -> u8 {
        self.determine_counter
    }

    /// Whether the face-off is still undecided
    pub fn is_face_off(&self) -> bool {
        self.leader.is_none()
    }

    /// Makes `team` the live team
    pub fn select_team(&mut self, team: Team) {
        self.selected = Some(team);
    }

    /// Adds scored points to a team's pending pool
    ///
    /// During the face-off this counts as a guess; the guess that brings the
    /// counter to [`FACE_OFF_GUESSES`] decides the lead.
    ///
    /// # Returns
    ///
    /// The decided [`Lead`] if this guess ended the face-off.
    pub fn record_points(&mut self, team: Team, points: i64, tie_break: TieBreak) -> Option<Lead> {
        self.pending[team] = Some(self.pending[team].unwrap_or(0) + points);

        if !self.is_face_off() {
            return None;
        }
        self.determine_counter += 1;
        (self.determine_counter >= FACE_OFF_GUESSES).then(|| self.determine_lead(tie_break))
    }

    /// Decides the face-off from the current pending pools
    ///
    /// The larger pool wins; equal pools are settled by `tie_break`. The
    /// winner becomes the live team and holds the combined pool.
    pub fn determine_lead(&mut self, tie_break: TieBreak) -> Lead {
        let team_one_pending = self.pending[Team::One].unwrap_or(0);
        let team_two_pending = self.pending[Team::Two].unwrap_or(0);

        let winner = match team_one_pending.cmp(&team_two_pending) {
            std::cmp::Ordering::Greater => Team::One,
            std::cmp::Ordering::Less => Team::Two,
            std::cmp::Ordering::Equal => tie_break.winner(),
        };

        self.pending[winner] = Some(team_one_pending + team_two_pending);
        self.pending[winner.opponent()] = Some(0);
        self.selected = Some(winner);
        self.leader = Some(winner);
        self.determine_counter = FACE_OFF_GUESSES;

        tracing::debug!(%winner, team_one_pending, team_two_pending, "face-off decided");

        Lead {
            winner,
            team_one_pending,
            team_two_pending,
        }
    }

    /// Hands the board to the opponent of the live team
    ///
    /// # Returns
    ///
    /// The team that was live before the flip.
    pub fn flip(&mut self) -> Option<Team> {
        let previous = self.selected;
        self.selected = previous.map(Team::opponent);
        previous
    }
}
