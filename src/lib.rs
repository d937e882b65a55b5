//! # Feud Round Engine
//!
//! This library provides the game logic for a two-team "Family Feud" style
//! survey game. It handles the face-off between the teams, strikes and
//! steals, answer reveals with point routing, the score ledger, and keeping
//! the host console and any number of board displays in sync.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod game;
pub mod ledger;
pub mod names;
pub mod persistence;
pub mod question;
pub mod round;
pub mod session;
pub mod teams;
pub mod watcher;

/// Messages sent to bring a screen fully up to date
///
/// Sent when a screen connects or reconnects.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Game synchronization messages
    Game(game::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages sent to screens after the game changes
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Game update messages
    Game(game::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed events
///
/// The embedding application delivers these back to
/// [`game::Game::receive_alarm`] once their delay has passed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Game alarms
    Game(game::AlarmMessage),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_update_message_to_message() {
        let update_msg = UpdateMessage::from(game::UpdateMessage::HideStrikes);
        let json_str = update_msg.to_message();

        assert!(json_str.contains("Game"));
        assert!(json_str.contains("HideStrikes"));
    }

    #[test]
    fn test_rejection_to_message() {
        let update_msg = UpdateMessage::from(game::UpdateMessage::Rejected(
            round::Error::NoTeamSelected.into(),
        ));
        let json_str = update_msg.to_message();

        assert!(json_str.contains("Rejected"));
        assert!(json_str.contains("NoTeamSelected"));
    }

    #[test]
    fn test_sync_message_to_message() {
        let game = game::Game::new(
            question::QuestionSet::default(),
            game::Options::default(),
            watcher::Id::new(),
        )
        .unwrap();
        let sync_msg = game.state_message(watcher::ValueKind::Viewer);
        let json_str = sync_msg.to_message();

        assert!(json_str.contains("Board"));
        assert!(json_str.contains("NotEntered"));
        // viewers never see a question before the game begins
        assert!(!json_str.contains("prompt"));
    }

    #[test]
    fn test_alarm_message_round_trip() {
        let alarm = AlarmMessage::from(game::AlarmMessage::HideStrikes {
            round: 2,
            generation: 7,
        });
        let json = serde_json::to_string(&alarm).unwrap();
        let back: AlarmMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(back, alarm);
    }
}
