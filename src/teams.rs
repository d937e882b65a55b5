//! The two competing teams
//!
//! A Feud game always has exactly two teams. They are identified by the
//! [`Team`] enum, which doubles as an [`enum_map::Enum`] key so per-team
//! values live in fixed two-slot maps rather than string-keyed lookups.

use std::fmt::Display;

use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};

use crate::{constants, names};

/// One of the two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Team {
    /// The first team (shown on the left of the board)
    One,
    /// The second team (shown on the right of the board)
    Two,
}

impl Team {
    /// Returns the team competing against this one
    pub fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Returns the 1-based team number used in persisted records
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team {}", self.number())
    }
}

/// Display names of both teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamNames(EnumMap<Team, String>);

impl Default for TeamNames {
    fn default() -> Self {
        Self(enum_map! {
            Team::One => constants::team::DEFAULT_TEAM_ONE_NAME.to_owned(),
            Team::Two => constants::team::DEFAULT_TEAM_TWO_NAME.to_owned(),
        })
    }
}

impl TeamNames {
    /// Validates and builds a pair of team names
    ///
    /// # Errors
    ///
    /// Returns a [`names::Error`] if either name is rejected or both
    /// names are the same.
    pub fn new(first: &str, second: &str) -> Result<Self, names::Error> {
        let (first, second) = names::validate_pair(first, second)?;
        Ok(Self(enum_map! {
            Team::One => first.clone(),
            Team::Two => second.clone(),
        }))
    }

    /// Generates a pair of random team names in the given style
    pub fn random(style: names::NameStyle) -> Self {
        let (first, second) = style.get_team_names();
        Self(enum_map! {
            Team::One => first.clone(),
            Team::Two => second.clone(),
        })
    }

    /// Gets the name of a team
    pub fn get(&self, team: Team) -> &str {
        &self.0[team]
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Team::One.opponent(), Team::Two);
        assert_eq!(Team::Two.opponent(), Team::One);
        assert_eq!(Team::One.opponent().opponent(), Team::One);
    }

    #[test]
    fn test_display() {
        assert_eq!(Team::One.to_string(), "team 1");
        assert_eq!(Team::Two.to_string(), "team 2");
    }

    #[test]
    fn test_default_names() {
        let names = TeamNames::default();
        assert_eq!(names.get(Team::One), "Team 1");
        assert_eq!(names.get(Team::Two), "Team 2");
    }

    #[test]
    fn test_new_names_are_trimmed() {
        let names = TeamNames::new(" The Lightning Bolts ", "The Thunder Hawks").unwrap();
        assert_eq!(names.get(Team::One), "The Lightning Bolts");
        assert_eq!(names.get(Team::Two), "The Thunder Hawks");
    }

    #[test]
    fn test_new_names_rejected() {
        assert_eq!(TeamNames::new("", "Hawks"), Err(names::Error::Empty));
        assert_eq!(TeamNames::new("Hawks", "Hawks"), Err(names::Error::Used));
    }

    #[test]
    fn test_random_names_differ() {
        let names = TeamNames::random(names::NameStyle::Roman(2));
        assert_ne!(names.get(Team::One), names.get(Team::Two));
    }

    #[test]
    fn test_serialization() {
        let names = TeamNames::default();
        let json = serde_json::to_string(&names).unwrap();
        let back: TeamNames = serde_json::from_str(&json).unwrap();
        assert_eq!(back, names);
    }
}
