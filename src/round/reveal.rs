//! Answer reveal state for the current board
//!
//! The survey answers themselves are immutable; this controller only holds
//! the per-question reveal flags. A flag that has been set stays set until
//! the controller is replaced for the next question.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::Error;

/// How much of the board has been uncovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardPhase {
    /// No answer revealed yet
    Hidden,
    /// Some, but not all, answers revealed
    PartiallyRevealed,
    /// Every answer revealed
    AllRevealed,
}

/// Reveal flags for the answers of one question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRevealController {
    revealed: Vec<bool>,
}

impl AnswerRevealController {
    /// Creates a controller with every answer hidden
    pub fn new(answer_count: usize) -> Self {
        Self {
            revealed: vec![false; answer_count],
        }
    }

    /// Reveal flags in board order
    pub fn revealed(&self) -> &[bool] {
        &self.revealed
    }

    /// Whether the answer at `index` has been revealed
    pub fn is_revealed(&self, index: usize) -> Option<bool> {
        self.revealed.get(index).copied()
    }

    /// Whether every answer has been revealed
    pub fn all_revealed(&self) -> bool {
        !self.revealed.is_empty() && self.revealed.iter().all(|r| *r)
    }

    /// Current phase of the board
    pub fn phase(&self) -> BoardPhase {
        if self.all_revealed() {
            BoardPhase::AllRevealed
        } else if self.revealed.iter().any(|r| *r) {
            BoardPhase::PartiallyRevealed
        } else {
            BoardPhase::Hidden
        }
    }

    /// Checks that the answer at `index` can be revealed
    ///
    /// # Errors
    ///
    /// * `Error::AnswerOutOfRange` - No answer at that position
    /// * `Error::AlreadyRevealed` - The answer is already showing
    pub fn check(&self, index: usize) -> Result<(), Error> {
        match self.is_revealed(index) {
            None => Err(Error::AnswerOutOfRange {
                index,
                count: self.revealed.len(),
            }),
            Some(true) => Err(Error::AlreadyRevealed(index)),
            Some(false) => Ok(()),
        }
    }

    /// Reveals the answer at `index`
    ///
    /// # Errors
    ///
    /// Same as [`AnswerRevealController::check`]; nothing changes on error.
    pub fn reveal(&mut self, index: usize) -> Result<(), Error> {
        self.check(index)?;
        self.revealed[index] = true;
        Ok(())
    }

    /// Indices of answers that are still hidden
    pub fn hidden(&self) -> Vec<usize> {
        self.revealed.iter().positions(|r| !*r).collect_vec()
    }

    /// Reveals every remaining answer
    ///
    /// # Returns
    ///
    /// The indices that were hidden before this call.
    pub fn reveal_all(&mut self) -> Vec<usize> {
        let hidden = self.hidden();
        for &index in &hidden {
            self.revealed[index] = true;
        }
        hidden
    }
}
