//! Per-question round state machine
//!
//! A round is the play of a single question. It combines the turn
//! selector, the strike tracker and the reveal controller under one
//! [`RoundMode`], and routes the points of every revealed answer into the
//! game's [`ScoreLedger`] according to that mode.
//!
//! ```text
//! Normal ──3rd strike──▶ Steal ──steal answer──▶ EndRoundReveal
//!   │  ▲                   │                          ▲
//!   │  └──undo / reset─────┘                          │
//!   └──────────── last answer / reveal all ───────────┘
//! ```

pub mod reveal;
pub mod strikes;
pub mod turn;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ledger::ScoreLedger, teams::Team};

use self::{
    reveal::AnswerRevealController,
    strikes::{StrikeOutcome, StrikeTracker},
    turn::{Lead, TieBreak, TurnSelector},
};

/// Errors for operations that are not valid in the current round state
///
/// Every error leaves the round untouched.
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A scoring action needs a live team
    #[error("select a team first")]
    NoTeamSelected,
    /// The live team is fixed while a steal is in progress
    #[error("the stealing team cannot be changed")]
    SelectionLocked,
    /// The answer is already showing
    #[error("answer {0} is already revealed")]
    AlreadyRevealed(usize),
    /// There is no answer at that position
    #[error("answer {index} does not exist, the board has {count} answers")]
    AnswerOutOfRange {
        /// Requested position
        index: usize,
        /// Number of answers on the board
        count: usize,
    },
    /// The round has already been decided
    #[error("the round is over")]
    RoundOver,
}

/// How revealed answers are scored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundMode {
    /// The live team scores every answer it reveals
    #[default]
    Normal,
    /// The opponent of `struck_out` gets one guess to take the board
    Steal {
        /// Team that collected three strikes
        struck_out: Team,
    },
    /// The round is decided; remaining answers are shown without scoring
    EndRoundReveal,
}

/// How a successful steal is paid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StealPolicy {
    /// The stealing team takes the struck-out team's pool plus the stolen answer
    #[default]
    TakeBoard,
    /// The stealing team receives only the stolen answer; the struck-out
    /// team's pool is forfeited
    AnswerOnly,
}

/// Scoring rules applied to every round of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Rules {
    /// Face-off tie policy
    #[garde(skip)]
    pub tie_break: TieBreak,
    /// Steal payout policy
    #[garde(skip)]
    pub steal_policy: StealPolicy,
}

/// Where the points of a revealed answer went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scoring {
    /// Added to the live team
    Awarded {
        /// Team that scored
        team: Team,
        /// Points of the revealed answer
        points: i64,
        /// Set when this reveal decided the face-off
        #[serde(skip)]
        lead: Option<Lead>,
    },
    /// The reveal won a steal
    Stolen {
        /// Team that stole the board
        stealer: Team,
        /// Points added to the stealer
        awarded: i64,
        /// Points removed from the struck-out team
        removed: i64,
    },
    /// Shown without scoring
    Unscored,
}

/// Result of revealing one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevealOutcome {
    /// Board position of the revealed answer
    pub index: usize,
    /// Where its points went
    pub scoring: Scoring,
    /// Whether the round is now decided
    pub round_over: bool,
}

/// Effect of a strike operation on the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrikeEffect {
    /// Strike count changed without a mode change
    Count(u8),
    /// The third strike handed the board to the other team
    StealStarted {
        /// Team that collected three strikes
        struck_out: Team,
    },
    /// Leaving three strikes gave the board back
    StealCancelled {
        /// Team that gets the board back
        restored: Team,
    },
    /// Already at three strikes; nothing changed
    Capped,
}

/// Working state of the question being played
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    turn: TurnSelector,
    strikes: StrikeTracker,
    reveal: AnswerRevealController,
    mode: RoundMode,
}

impl RoundState {
    /// Fresh state for a board with `answer_count` answers
    pub fn new(answer_count: usize) -> Self {
        Self {
            reveal: AnswerRevealController::new(answer_count),
            ..Self::default()
        }
    }

    /// Current scoring mode
    pub fn mode(&self) -> RoundMode {
        self.mode
    }

    /// Turn state
    pub fn turn(&self) -> &TurnSelector {
        &self.turn
    }

    /// Strike state
    pub fn strikes(&self) -> StrikeTracker {
        self.strikes
    }

    /// Reveal state
    pub fn reveal(&self) -> &AnswerRevealController {
        &self.reveal
    }

    /// Makes `team` the live team
    ///
    /// # Errors
    ///
    /// `Error::SelectionLocked` while a steal is in progress.
    pub fn select_team(&mut self, team: Team) -> Result<(), Error> {
        if matches!(self.mode, RoundMode::Steal { .. }) {
            return Err(Error::SelectionLocked);
        }
        self.turn.select_team(team);
        Ok(())
    }

    /// Checks that the answer at `index` can be revealed right now
    ///
    /// # Errors
    ///
    /// Any reveal error, or `Error::NoTeamSelected` when the current mode
    /// scores the reveal and no team is live.
    pub fn check_reveal(&self, index: usize) -> Result<(), Error> {
        self.reveal.check(index)?;
        if self.mode != RoundMode::EndRoundReveal && self.turn.selected().is_none() {
            return Err(Error::NoTeamSelected);
        }
        Ok(())
    }

    /// Reveals the answer at `index` worth `points` and routes its points
    ///
    /// Points are routed first; if the reveal uncovered the last hidden
    /// answer the round then moves to [`RoundMode::EndRoundReveal`].
    ///
    /// # Errors
    ///
    /// Same as [`RoundState::check_reveal`]; nothing changes on error.
    pub fn reveal_answer(
        &mut self,
        index: usize,
        points: u32,
        ledger: &mut ScoreLedger,
        rules: Rules,
    ) -> Result<RevealOutcome, Error> {
        self.check_reveal(index)?;
        self.reveal.reveal(index)?;

        let points = i64::from(points);
        let scoring = match (self.mode, self.turn.selected()) {
            (RoundMode::Normal, Some(team)) => {
                ledger.award_points(team, points);
                let lead = self.turn.record_points(team, points, rules.tie_break);
                if let Some(lead) = lead {
                    ledger.transfer_lead(lead.winner, lead.team_one_pending, lead.team_two_pending);
                }
                Scoring::Awarded { team, points, lead }
            }
            (RoundMode::Steal { struck_out }, _) => {
                let stealer = struck_out.opponent();
                let removed = self.turn.pending(struck_out).unwrap_or(0);
                let awarded = match rules.steal_policy {
                    StealPolicy::TakeBoard => removed + points,
                    StealPolicy::AnswerOnly => points,
                };
                ledger.steal_transfer(stealer, awarded, removed, index);
                self.mode = RoundMode::EndRoundReveal;
                tracing::info!(%stealer, awarded, removed, "steal succeeded");
                Scoring::Stolen {
                    stealer,
                    awarded,
                    removed,
                }
            }
            (RoundMode::EndRoundReveal, _) | (RoundMode::Normal, None) => Scoring::Unscored,
        };

        if self.reveal.all_revealed() {
            self.mode = RoundMode::EndRoundReveal;
        }

        Ok(RevealOutcome {
            index,
            scoring,
            round_over: self.mode == RoundMode::EndRoundReveal,
        })
    }

    /// Reveals every hidden answer without scoring and ends the round
    ///
    /// # Returns
    ///
    /// The indices that were hidden before this call.
    pub fn reveal_all(&mut self) -> Vec<usize> {
        self.mode = RoundMode::EndRoundReveal;
        self.reveal.reveal_all()
    }

    /// Records a strike against the live team
    ///
    /// The strike that reaches the threshold flips the board to the
    /// opponent and starts a steal. Further strikes are capped.
    ///
    /// # Errors
    ///
    /// * `Error::RoundOver` - The round is already decided
    /// * `Error::NoTeamSelected` - No team is live
    pub fn add_strike(&mut self) -> Result<StrikeEffect, Error> {
        if self.mode == RoundMode::EndRoundReveal {
            return Err(Error::RoundOver);
        }
        if self.turn.selected().is_none() {
            return Err(Error::NoTeamSelected);
        }

        Ok(match self.strikes.add_strike() {
            StrikeOutcome::Added(count) => StrikeEffect::Count(count),
            StrikeOutcome::Capped => StrikeEffect::Capped,
            StrikeOutcome::ThresholdReached => match self.turn.flip() {
                Some(struck_out) => {
                    self.mode = RoundMode::Steal { struck_out };
                    tracing::info!(%struck_out, "three strikes, steal started");
                    StrikeEffect::StealStarted { struck_out }
                }
                None => StrikeEffect::Count(self.strikes.count()),
            },
        })
    }

    /// Removes a strike; leaving the threshold cancels a running steal
    pub fn undo_strike(&mut self) -> StrikeEffect {
        let was_full = self.strikes.undo_strike();
        self.leave_threshold(was_full)
    }

    /// Clears all strikes; leaving the threshold cancels a running steal
    pub fn reset_strikes(&mut self) -> StrikeEffect {
        let was_full = self.strikes.reset_strikes();
        self.leave_threshold(was_full)
    }

    fn leave_threshold(&mut self, was_full: bool) -> StrikeEffect {
        match self.mode {
            RoundMode::Steal { struck_out } if was_full => {
                self.mode = RoundMode::Normal;
                self.turn.select_team(struck_out);
                tracing::info!(restored = %struck_out, "steal cancelled");
                StrikeEffect::StealCancelled {
                    restored: struck_out,
                }
            }
            _ => StrikeEffect::Count(self.strikes.count()),
        }
    }
}
