//! Configuration constants for the Feud game system
//!
//! This module contains the limits and defaults used throughout the
//! engine to keep question sets, team names and round state within
//! consistent boundaries.

/// Question set configuration constants
pub mod question {
    /// Maximum number of questions in a single game session
    pub const MAX_QUESTION_COUNT: usize = 200;
    /// Minimum length of a question prompt in characters
    pub const MIN_PROMPT_LENGTH: usize = 1;
    /// Maximum length of a question prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 200;
    /// Minimum number of survey answers on a board
    pub const MIN_ANSWER_COUNT: usize = 1;
    /// Maximum number of survey answers on a board
    pub const MAX_ANSWER_COUNT: usize = 8;
}

/// Survey answer configuration constants
pub mod answer {
    /// Maximum length of answer text in characters
    pub const MAX_TEXT_LENGTH: usize = 100;
    /// Maximum points a single survey answer may carry
    pub const MAX_POINTS: u32 = 100;
}

/// Team configuration constants
pub mod team {
    /// Maximum length of a team name in characters
    pub const MAX_NAME_LENGTH: usize = 40;
    /// Name given to the first team before the host enters the game
    pub const DEFAULT_TEAM_ONE_NAME: &str = "Team 1";
    /// Name given to the second team before the host enters the game
    pub const DEFAULT_TEAM_TWO_NAME: &str = "Team 2";
}

/// Round configuration constants
pub mod round {
    /// Number of strikes that hands the board to the other team
    pub const MAX_STRIKES: u8 = 3;
    /// Number of scored face-off guesses after which the lead is decided
    pub const FACE_OFF_GUESSES: u8 = 2;
    /// Minimum time in seconds the strike overlay stays on screen
    pub const MIN_STRIKE_OVERLAY: u64 = 0;
    /// Maximum time in seconds the strike overlay stays on screen
    pub const MAX_STRIKE_OVERLAY: u64 = 10;
    /// Default time in seconds the strike overlay stays on screen
    pub const DEFAULT_STRIKE_OVERLAY: u64 = 2;
    /// Largest manual score adjustment, in either direction, the host may make at once
    pub const MAX_MANUAL_AWARD: i64 = 10_000;
}

/// Connection configuration constants
pub mod watcher {
    /// Maximum number of connections (host and viewers) in one session
    pub const MAX_WATCHER_COUNT: usize = 1000;
}

/// External store constants
pub mod persistence {
    /// Id of the single shared settings row
    pub const SETTINGS_ROW_ID: u64 = 1;
}
