//! Strike counting
//!
//! Strikes are recorded wrong guesses. The count is capped at
//! [`MAX_STRIKES`]; reaching it is reported once, on the transition,
//! so callers can enter steal mode exactly once.

use serde::{Deserialize, Serialize};

use crate::constants::round::MAX_STRIKES;

/// Result of recording a strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// The strike was recorded; the count is below the threshold
    Added(u8),
    /// The strike was recorded and the count just reached the threshold
    ThresholdReached,
    /// The count was already at the threshold; nothing changed
    Capped,
}

/// Serialization helper for StrikeTracker
#[derive(Deserialize)]
struct StrikeTrackerSerde {
    strikes: u8,
}

/// Counts strikes for the current question
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StrikeTrackerSerde")]
pub struct StrikeTracker {
    strikes: u8,
}

impl From<StrikeTrackerSerde> for StrikeTracker {
    fn from(serde: StrikeTrackerSerde) -> Self {
        Self::clamped(serde.strikes)
    }
}

impl StrikeTracker {
    /// Current number of strikes
    pub fn count(&self) -> u8 {
        self.strikes
    }

    /// Whether the count is at the threshold
    pub fn is_full(&self) -> bool {
        self.strikes >= MAX_STRIKES
    }

    /// Records a strike, capped at the threshold
    pub fn add_strike(&mut self) -> StrikeOutcome {
        if self.is_full() {
            return StrikeOutcome::Capped;
        }
        self.strikes += 1;
        if self.is_full() {
            StrikeOutcome::ThresholdReached
        } else {
            StrikeOutcome::Added(self.strikes)
        }
    }

    /// Removes a strike, never going below zero
    ///
    /// # Returns
    ///
    /// `true` if the count was at the threshold before this call.
    pub fn undo_strike(&mut self) -> bool {
        let was_full = self.is_full();
        self.strikes = self.strikes.saturating_sub(1);
        was_full
    }

    /// Clears all strikes
    ///
    /// # Returns
    ///
    /// `true` if the count was at the threshold before this call.
    pub fn reset_strikes(&mut self) -> bool {
        let was_full = self.is_full();
        self.strikes = 0;
        was_full
    }

    /// Restores a count read from outside the engine, clamping it to range
    pub fn clamped(strikes: u8) -> Self {
        if strikes > MAX_STRIKES {
            tracing::error!(strikes, "strike count out of range, clamping");
            debug_assert!(strikes <= MAX_STRIKES, "strike count {strikes} out of range");
        }
        Self {
            strikes: strikes.min(MAX_STRIKES),
        }
    }
}
