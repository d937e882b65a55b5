//! Durable writes
//!
//! Some engine operations must be recorded by an external store before they
//! take effect locally: revealing answers and flipping the shared "game
//! begun" flag. The engine describes each write as a [`Write`] and hands it
//! to a [`Persistence`] sink; only if the sink accepts the write is the
//! local state changed.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::constants;

/// The stored record kind a write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Entity {
    /// Survey answers and their reveal flags
    #[display("answers")]
    Answers,
    /// The shared game settings row
    #[display("settings")]
    Settings,
}

/// A single update to the external store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Write {
    /// Record kind being updated
    pub entity: Entity,
    /// Columns and their new values
    pub fields: Value,
    /// Columns identifying the records to update; an empty object matches all
    pub match_keys: Value,
}

impl Write {
    /// Marks one answer of a question as revealed
    pub fn answer_revealed(question_id: u64, answer_index: usize) -> Self {
        Self {
            entity: Entity::Answers,
            fields: json!({ "revealed": true }),
            match_keys: json!({ "question_id": question_id, "position": answer_index }),
        }
    }

    /// Marks every answer of a question as revealed
    pub fn question_revealed(question_id: u64) -> Self {
        Self {
            entity: Entity::Answers,
            fields: json!({ "revealed": true }),
            match_keys: json!({ "question_id": question_id }),
        }
    }

    /// Hides every answer of every question
    pub fn answers_reset() -> Self {
        Self {
            entity: Entity::Answers,
            fields: json!({ "revealed": false }),
            match_keys: json!({}),
        }
    }

    /// Sets the shared "game begun" flag
    pub fn game_begun(begun: bool) -> Self {
        Self {
            entity: Entity::Settings,
            fields: json!({ "is_game_begin": begun }),
            match_keys: json!({ "id": constants::persistence::SETTINGS_ROW_ID }),
        }
    }
}

/// Errors reported by a persistence sink
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The store refused the write
    #[error("{entity} write rejected: {reason}")]
    Rejected {
        /// Record kind that was targeted
        entity: Entity,
        /// Reason given by the store
        reason: String,
    },
    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A sink that durably records engine writes
pub trait Persistence {
    /// Records `write`, returning once the store has confirmed it
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the write was not recorded; the engine then
    /// leaves its own state unchanged.
    fn persist(&mut self, write: &Write) -> Result<(), Error>;
}

impl<P: Persistence + ?Sized> Persistence for &mut P {
    fn persist(&mut self, write: &Write) -> Result<(), Error> {
        (**self).persist(write)
    }
}

/// A sink that accepts and discards every write
///
/// Used when the game is played without an external store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ephemeral;

impl Persistence for Ephemeral {
    fn persist(&mut self, write: &Write) -> Result<(), Error> {
        tracing::trace!(entity = %write.entity, "discarding write");
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    /// Records writes and optionally fails them
    #[derive(Debug, Default)]
    pub(crate) struct Recording {
        pub(crate) writes: Vec<Write>,
        pub(crate) fail: bool,
    }

    impl Recording {
        pub(crate) fn failing() -> Self {
            Self {
                writes: Vec::new(),
                fail: true,
            }
        }
    }

    impl Persistence for Recording {
        fn persist(&mut self, write: &Write) -> Result<(), Error> {
            if self.fail {
                return Err(Error::Unavailable("connection refused".to_owned()));
            }
            self.writes.push(write.clone());
            Ok(())
        }
    }

    #[test]
    fn test_ephemeral_accepts_everything() {
        assert!(Ephemeral.persist(&Write::answers_reset()).is_ok());
    }

    #[test]
    fn test_game_begun_targets_settings_row() {
        let write = Write::game_begun(true);
        assert_eq!(write.entity, Entity::Settings);
        assert_eq!(write.fields["is_game_begin"], json!(true));
        assert_eq!(write.match_keys["id"], json!(1));
    }

    #[test]
    fn test_answer_revealed_match_keys() {
        let write = Write::answer_revealed(12, 3);
        assert_eq!(write.entity, Entity::Answers);
        assert_eq!(write.match_keys, json!({ "question_id": 12, "position": 3 }));
    }

    #[test]
    fn test_mutable_reference_forwards() {
        let mut recording = Recording::default();
        {
            let mut sink = &mut recording;
            sink.persist(&Write::question_revealed(4)).unwrap();
        }
        assert_eq!(recording.writes, vec![Write::question_revealed(4)]);
    }

    #[test]
    fn test_error_display() {
        let error = Error::Rejected {
            entity: Entity::Answers,
            reason: "row locked".to_owned(),
        };
        assert_eq!(error.to_string(), "answers write rejected: row locked");
    }
}
