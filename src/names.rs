//! Team name validation and generation
//!
//! Team names are typed in by the host when entering a game, or generated
//! on demand for a quick setup. Either way they go through the same
//! validation: whitespace trimming, length limits, content filtering and
//! a uniqueness check between the two teams.

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Defines the style of automatically generated team names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, garde::Validate)]
pub enum NameStyle {
    /// Roman-style names (praenomen + nomen, optionally + cognomen)
    Roman(#[garde(range(min = 2, max = 3))] usize),
    /// Pet-style names (adjective + animal combinations)
    Petname(#[garde(range(min = 2, max = 3))] usize),
}

impl Default for NameStyle {
    /// Default name style is Petname with 2 words
    fn default() -> Self {
        Self::Petname(2)
    }
}

impl NameStyle {
    /// Generates a random name according to this style
    ///
    /// # Returns
    ///
    /// A randomly generated, title-cased name.
    pub fn get_name(&self) -> String {
        match self {
            Self::Roman(count) => romanname::romanname(romanname::NameConfig {
                praenomen: *count > 2,
            }),
            Self::Petname(count) => petname::petname(*count as u8, " ").unwrap_or_default(),
        }
        .to_title_case()
    }

    /// Generates a team name, e.g. "The Brave Otters"
    ///
    /// Team names are plural ("The Lightning Bolts"), so the generated name
    /// is pluralized and prefixed with an article.
    pub fn get_team_name(&self) -> String {
        let plural = pluralizer::pluralize(&self.get_name(), 2, false);
        format!("The {plural}")
    }

    /// Generates a pair of distinct, valid team names
    pub fn get_team_names(&self) -> (String, String) {
        loop {
            let first = self.get_team_name();
            let second = self.get_team_name();

            if let (Ok(first), Ok(second)) = (validate_name(&first), validate_name(&second)) {
                if first != second {
                    return (first, second);
                }
            }
        }
    }
}

/// Errors that can occur during team name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Both teams were given the same name
    #[error("team names must differ")]
    Used,
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Validates a single team name
///
/// # Returns
///
/// The trimmed name on success.
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds [`constants::team::MAX_NAME_LENGTH`] characters
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::Sinful` - Name contains inappropriate content
pub fn validate_name(name: &str) -> Result<String, Error> {
    let name = rustrict::trim_whitespace(name);
    if name.chars().count() > constants::team::MAX_NAME_LENGTH {
        return Err(Error::TooLong);
    }
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_owned())
}

/// Validates both team names and checks they differ
///
/// # Errors
///
/// Any error from [`validate_name`], or `Error::Used` when the trimmed
/// names are identical.
pub fn validate_pair(first: &str, second: &str) -> Result<(String, String), Error> {
    let first = validate_name(first)?;
    let second = validate_name(second)?;
    if first == second {
        return Err(Error::Used);
    }
    Ok((first, second))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims_whitespace() {
        assert_eq!(
            validate_name("  The Lightning Bolts  "),
            Ok("The Lightning Bolts".to_string())
        );
    }

    #[test]
    fn test_validate_name_empty() {
        assert_eq!(validate_name(""), Err(Error::Empty));
        assert_eq!(validate_name("   "), Err(Error::Empty));
        assert_eq!(validate_name("\t\n"), Err(Error::Empty));
    }

    #[test]
    fn test_validate_name_length() {
        let max_name = "a".repeat(constants::team::MAX_NAME_LENGTH);
        assert_eq!(validate_name(&max_name), Ok(max_name.clone()));

        let long_name = "a".repeat(constants::team::MAX_NAME_LENGTH + 1);
        assert_eq!(validate_name(&long_name), Err(Error::TooLong));
    }

    #[test]
    fn test_validate_name_inappropriate_content() {
        for name in ["damn", "fuck", "shit"] {
            assert_eq!(
                validate_name(name),
                Err(Error::Sinful),
                "Expected '{name}' to be flagged as inappropriate"
            );
        }
    }

    #[test]
    fn test_validate_pair() {
        assert_eq!(
            validate_pair("The Lightning Bolts", "The Thunder Hawks"),
            Ok((
                "The Lightning Bolts".to_string(),
                "The Thunder Hawks".to_string()
            ))
        );
        assert_eq!(validate_pair("Hawks", " Hawks "), Err(Error::Used));
        assert_eq!(validate_pair("", "Hawks"), Err(Error::Empty));
    }

    #[test]
    fn test_unicode_names() {
        let unicode_name = "Плеер测试🎮";
        assert_eq!(validate_name(unicode_name), Ok(unicode_name.to_string()));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Used.to_string(), "team names must differ");
        assert_eq!(Error::Empty.to_string(), "name cannot be empty");
        assert_eq!(Error::Sinful.to_string(), "name is inappropriate");
        assert_eq!(Error::TooLong.to_string(), "name is too long");
    }

    #[test]
    fn test_name_style_default() {
        assert_eq!(NameStyle::default(), NameStyle::Petname(2));
    }

    #[test]
    fn test_roman_name_generation() {
        let name = NameStyle::Roman(3).get_name();
        assert!(!name.is_empty());
        assert!(name.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_team_name_generation() {
        let name = NameStyle::Petname(2).get_team_name();
        assert!(name.starts_with("The "));
        assert!(name.len() > "The ".len());
    }

    #[test]
    fn test_team_names_are_distinct() {
        let (first, second) = NameStyle::default().get_team_names();
        assert_ne!(first, second);
        assert!(validate_name(&first).is_ok());
        assert!(validate_name(&second).is_ok());
    }
}
