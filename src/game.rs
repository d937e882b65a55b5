//! Game lifecycle and host command surface
//!
//! This module contains the [`Game`] struct, which owns everything a Feud
//! session needs: the immutable question set, the round being played, the
//! score ledger, team names and the connected screens. Host commands come
//! in either through the direct methods or as [`IncomingHostMessage`]s;
//! every command returns the new [`BoardSnapshot`] or an [`Error`] that
//! leaves the game untouched.

use std::fmt::Debug;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::Duration;

use crate::{
    constants,
    ledger::{ScoreLedger, TeamScores},
    names::{self, NameStyle},
    persistence::{self, Persistence, Write},
    question::{self, IdRange, Question, QuestionSet},
    round::{self, RoundMode, RoundState, Rules, StrikeEffect, reveal::BoardPhase},
    session::Tunnel,
    teams::{Team, TeamNames},
    watcher::{self, Id, Value, ValueKind, Watchers},
};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No teams have been entered
    #[default]
    NotEntered,
    /// Team names are set; the board waits for the game to begin
    Entered,
    /// This client controls the game and may begin it
    HostLobby,
    /// Questions are being played
    InProgress,
    /// The game was ended; behaves like [`Phase::NotEntered`]
    Ended,
}

type ValidationResult = garde::Result;

/// Validates how long the strike overlay stays on screen
fn validate_strike_overlay(val: &Duration) -> ValidationResult {
    const MIN: u64 = constants::round::MIN_STRIKE_OVERLAY;
    const MAX: u64 = constants::round::MAX_STRIKE_OVERLAY;

    if (Duration::from_secs(MIN)..=Duration::from_secs(MAX)).contains(val) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "strike_overlay is outside of the bounds [{MIN},{MAX}]",
        )))
    }
}

/// Session configuration
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Options {
    /// Tie-break and steal policies
    #[garde(dive)]
    pub rules: Rules,
    /// How long the strike overlay stays up after a strike; zero disables it
    #[garde(custom(|v, _| validate_strike_overlay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub strike_overlay: Duration,
    /// Style of generated team names
    #[garde(dive)]
    pub name_style: NameStyle,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            strike_overlay: Duration::from_secs(constants::round::DEFAULT_STRIKE_OVERLAY),
            name_style: NameStyle::default(),
        }
    }
}

/// Commands the host can send
#[derive(Debug, Deserialize, Clone)]
pub enum IncomingHostMessage {
    /// Enter the game with the given team names
    EnterGame {
        /// Name of the first team
        team_one: String,
        /// Name of the second team
        team_two: String,
    },
    /// Enter the game with generated team names
    EnterGameWithRandomNames,
    /// Take control of the game
    HostLobby,
    /// Begin the game, optionally restricted to an id range
    BeginGame(Option<IdRange>),
    /// Make a team live
    SelectTeam(Team),
    /// Reveal the answer at a board position
    RevealAnswer(usize),
    /// Reveal every remaining answer
    RevealAll,
    /// Record a wrong guess
    AddStrike,
    /// Take back a strike
    UndoStrike,
    /// Clear all strikes
    ResetStrikes,
    /// Manually adjust a team's score
    AwardPoints {
        /// Team to adjust
        team: Team,
        /// Points to add, may be negative
        points: i64,
    },
    /// Move on to the next question
    NextQuestion,
    /// End the game and reset everything
    EndGame,
}

/// Signals pushed from the shared realtime channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealtimeEvent {
    /// The shared "game begun" flag changed
    GameBegun(bool),
}

/// Operations that are not valid in the current state
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum InvalidOperation {
    /// Rejected by the round state machine
    #[error(transparent)]
    Round(#[from] round::Error),
    /// Rejected question selection
    #[error(transparent)]
    Questions(#[from] question::Error),
    /// Rejected team name
    #[error(transparent)]
    TeamName(#[from] names::Error),
    /// The current question is the final one
    #[error("there is no question after the final one")]
    LastQuestion,
    /// A manual award is larger than the engine accepts
    #[error("cannot award {0} points at once")]
    PointsOutOfRange(i64),
    /// Session options failed validation
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// The command does not apply to the current phase
    #[error("cannot {action} while the game is {phase:?}")]
    WrongPhase {
        /// Phase the game is in
        phase: Phase,
        /// What was attempted
        action: &'static str,
    },
    /// Only the host connection may send commands
    #[error("only the host can control the game")]
    NotHost,
}

/// Errors returned by game commands
///
/// Either way, the game state is left exactly as it was.
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The command is not valid right now
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    /// The external store did not record the change
    #[error("external write failed: {0}")]
    ExternalWriteFailure(#[from] persistence::Error),
}

impl From<round::Error> for Error {
    fn from(error: round::Error) -> Self {
        Self::InvalidOperation(error.into())
    }
}

impl From<question::Error> for Error {
    fn from(error: question::Error) -> Self {
        Self::InvalidOperation(error.into())
    }
}

impl From<names::Error> for Error {
    fn from(error: names::Error) -> Self {
        Self::InvalidOperation(error.into())
    }
}

/// Content that a screen may or may not be allowed to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PossiblyHidden<T> {
    /// Content is visible to the recipient
    Visible(T),
    /// Content is hidden from the recipient
    Hidden,
}

/// An answer as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    /// Answer text
    pub text: String,
    /// Points the answer is worth
    pub points: u32,
    /// Whether the answer has been revealed this round
    pub revealed: bool,
}

/// The current question as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Question id
    pub id: u64,
    /// Survey prompt
    pub prompt: String,
    /// Answers in board order
    pub answers: Vec<PossiblyHidden<AnswerView>>,
}

/// Observable state of the game
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// Lifecycle phase
    pub phase: Phase,
    /// Position of the current question within the active questions
    pub question_index: usize,
    /// The current question, if the recipient may see it
    pub question: Option<QuestionView>,
    /// Team scores
    pub scores: TeamScores,
    /// Strikes on the current question
    pub strikes: u8,
    /// Whether the strike overlay is showing
    pub show_strikes: bool,
    /// 1-based round counter
    pub current_round: usize,
    /// Number of active questions
    pub total_rounds: usize,
    /// Team display names
    pub team_names: TeamNames,
    /// Live team
    pub selected_team: Option<Team>,
    /// Scoring mode of the round
    pub mode: RoundMode,
    /// How much of the current board is uncovered
    pub board_phase: BoardPhase,
    /// Whether the recipient controls the game
    pub is_host: bool,
    /// Whether questions are being played
    pub is_game_begun: bool,
}

/// Update messages sent to connected screens
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// New board state after a command
    Board(BoardSnapshot),
    /// The strike overlay timed out
    HideStrikes,
    /// The host's last command was rejected
    Rejected(Error),
}

/// Sync messages sent when a screen connects or reconnects
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Full board state
    Board(BoardSnapshot),
}

/// Alarms scheduled by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Hide the strike overlay shown for a particular strike
    HideStrikes {
        /// Round the strike happened in
        round: usize,
        /// Strike generation; any later strike or question change supersedes it
        generation: u64,
    },
}

/// A Feud game session
#[derive(Serialize, Deserialize)]
pub struct Game {
    /// Every question of the session, immutable
    questions: QuestionSet,
    /// Positions in `questions` of the questions being played
    active: Vec<usize>,
    /// Position in `active` of the current question
    position: usize,
    /// State of the current question
    round: RoundState,
    ledger: ScoreLedger,
    team_names: TeamNames,
    phase: Phase,
    /// Whether the local client took control through the host lobby
    host: bool,
    current_round: usize,
    show_strikes: bool,
    /// Bumped on every strike and question change to expire pending alarms
    strike_generation: u64,
    options: Options,
    /// Connected screens
    pub watchers: Watchers,
}

impl Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("current_round", &self.current_round)
            .field("scores", &self.ledger.scores())
            .finish_non_exhaustive()
    }
}

// Accessors
impl Game {
    /// Lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Team scores
    pub fn scores(&self) -> TeamScores {
        self.ledger.scores()
    }

    /// The score ledger, including its journal
    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// State of the current question
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Reveal flags of the current question
    pub fn revealed_flags(&self) -> &[bool] {
        self.round.reveal().revealed()
    }

    /// 1-based round counter
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Number of active questions
    pub fn total_rounds(&self) -> usize {
        self.active.len()
    }

    /// Team display names
    pub fn team_names(&self) -> &TeamNames {
        &self.team_names
    }

    /// Session configuration
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The question being played
    pub fn current_question(&self) -> Option<&Question> {
        self.active
            .get(self.position)
            .and_then(|index| self.questions.get(*index))
    }

    /// Whether questions are being played
    pub fn is_game_begun(&self) -> bool {
        self.phase == Phase::InProgress
    }

    /// Board state as seen by the host
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board(ValueKind::Host)
    }

    /// Board state as seen by a screen with the given role
    ///
    /// Viewers only see the question once the game has begun, and only
    /// see the text and points of revealed answers.
    pub fn board(&self, kind: ValueKind) -> BoardSnapshot {
        let is_host = kind == ValueKind::Host;

        let question = self
            .current_question()
            .filter(|_| is_host || self.is_game_begun())
            .map(|question| QuestionView {
                id: question.id,
                prompt: question.prompt.clone(),
                answers: question
                    .answers
                    .iter()
                    .zip(self.revealed_flags())
                    .map(|(answer, revealed)| {
                        if is_host || *revealed {
                            PossiblyHidden::Visible(AnswerView {
                                text: answer.text.clone(),
                                points: answer.points,
                                revealed: *revealed,
                            })
                        } else {
                            PossiblyHidden::Hidden
                        }
                    })
                    .collect_vec(),
            });

        BoardSnapshot {
            phase: self.phase,
            question_index: self.position,
            question,
            scores: self.scores(),
            strikes: self.round.strikes().count(),
            show_strikes: self.show_strikes,
            current_round: self.current_round,
            total_rounds: self.total_rounds(),
            team_names: self.team_names.clone(),
            selected_team: self.round.turn().selected(),
            mode: self.round.mode(),
            board_phase: self.round.reveal().phase(),
            is_host: is_host && self.host,
            is_game_begun: self.is_game_begun(),
        }
    }
}

// Internal helpers
impl Game {
    fn require(&self, allowed: &[Phase], action: &'static str) -> Result<(), InvalidOperation> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(InvalidOperation::WrongPhase {
                phase: self.phase,
                action,
            })
        }
    }

    fn answer_count(&self) -> usize {
        self.current_question().map_or(0, |question| question.answers.len())
    }

    /// Starts a fresh board for the current question
    fn load_question(&mut self) {
        self.round = RoundState::new(self.answer_count());
        self.show_strikes = false;
        self.strike_generation += 1;
    }

    /// Begins play over the given questions
    fn start(&mut self, active: Vec<usize>) {
        self.active = active;
        self.position = 0;
        self.current_round = 1;
        self.phase = Phase::InProgress;
        self.load_question();

        tracing::info!(total_rounds = self.total_rounds(), "game begun");
    }

    /// Returns every piece of state to its initial value over the full set
    fn reset(&mut self, phase: Phase) {
        self.active = (0..self.questions.len()).collect_vec();
        self.position = 0;
        self.current_round = 1;
        self.ledger.reset();
        self.team_names = TeamNames::default();
        self.host = false;
        self.phase = phase;
        self.load_question();
    }
}

impl Game {
    /// Creates a new session
    ///
    /// # Arguments
    ///
    /// * `questions` - The validated question source
    /// * `options` - Scoring rules and display settings
    /// * `host_id` - Connection that controls the game
    ///
    /// # Errors
    ///
    /// `InvalidOperation::InvalidOptions` if `options` fail validation.
    pub fn new(questions: QuestionSet, options: Options, host_id: Id) -> Result<Self, Error> {
        options
            .validate()
            .map_err(|report| InvalidOperation::InvalidOptions(report.to_string()))?;

        let mut game = Self {
            questions,
            active: Vec::new(),
            position: 0,
            round: RoundState::default(),
            ledger: ScoreLedger::default(),
            team_names: TeamNames::default(),
            phase: Phase::NotEntered,
            host: false,
            current_round: 1,
            show_strikes: false,
            strike_generation: 0,
            options,
            watchers: Watchers::with_host_id(host_id),
        };
        game.reset(Phase::NotEntered);
        Ok(game)
    }

    /// Enters the game with two team names
    ///
    /// # Errors
    ///
    /// * `InvalidOperation::WrongPhase` - A game has already been entered
    /// * `InvalidOperation::TeamName` - A name is empty, too long,
    ///   inappropriate, or both names are the same
    pub fn enter_game(&mut self, team_one: &str, team_two: &str) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::NotEntered, Phase::Ended], "enter the game")?;
        let team_names = TeamNames::new(team_one, team_two)?;

        self.team_names = team_names;
        self.phase = Phase::Entered;
        tracing::info!(
            team_one = self.team_names.get(Team::One),
            team_two = self.team_names.get(Team::Two),
            "game entered"
        );
        Ok(self.snapshot())
    }

    /// Enters the game with generated team names
    ///
    /// # Errors
    ///
    /// `InvalidOperation::WrongPhase` if a game has already been entered.
    pub fn enter_game_with_random_names(&mut self) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::NotEntered, Phase::Ended], "enter the game")?;

        self.team_names = TeamNames::random(self.options.name_style);
        self.phase = Phase::Entered;
        Ok(self.snapshot())
    }

    /// Takes control of the entered game
    ///
    /// # Errors
    ///
    /// `InvalidOperation::WrongPhase` unless the game was just entered.
    pub fn host_lobby(&mut self) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::Entered], "open the host lobby")?;

        self.host = true;
        self.phase = Phase::HostLobby;
        Ok(self.snapshot())
    }

    /// Begins the game
    ///
    /// The "game begun" flag is written before anything changes locally.
    ///
    /// # Arguments
    ///
    /// * `range` - Inclusive question id range to play; `None` plays every question
    /// * `persistence` - Sink for the "game begun" write
    ///
    /// # Errors
    ///
    /// * `InvalidOperation::WrongPhase` - Not in the host lobby
    /// * `InvalidOperation::Questions` - The range is inverted or matches nothing
    /// * `Error::ExternalWriteFailure` - The write was not recorded
    pub fn begin_game<P: Persistence>(
        &mut self,
        range: Option<IdRange>,
        mut persistence: P,
    ) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::HostLobby], "begin the game")?;
        let active = self.questions.select(range)?;

        persistence.persist(&Write::game_begun(true))?;

        self.start(active);
        Ok(self.snapshot())
    }

    /// Applies a signal from the shared realtime channel
    ///
    /// `GameBegun(true)` behaves like [`Game::begin_game`] over every
    /// question, without writing the flag back. It is idempotent once the
    /// game is in progress. `GameBegun(false)` is ignored; ending the game
    /// is a host decision.
    ///
    /// # Errors
    ///
    /// `InvalidOperation::WrongPhase` if no game has been entered.
    pub fn apply_realtime(&mut self, event: RealtimeEvent) -> Result<BoardSnapshot, Error> {
        match event {
            RealtimeEvent::GameBegun(true) => match self.phase {
                Phase::InProgress => {}
                Phase::Entered | Phase::HostLobby => {
                    let active = self.questions.select(None)?;
                    self.start(active);
                }
                Phase::NotEntered | Phase::Ended => {
                    return Err(InvalidOperation::WrongPhase {
                        phase: self.phase,
                        action: "begin the game",
                    }
                    .into());
                }
            },
            RealtimeEvent::GameBegun(false) => {
                tracing::debug!(phase = ?self.phase, "ignoring cleared game begun flag");
            }
        }
        Ok(self.snapshot())
    }

    /// Makes a team live
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside of play, or `SelectionLocked` during a steal.
    pub fn select_team(&mut self, team: Team) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "select a team")?;
        self.round.select_team(team)?;

        tracing::debug!(%team, "team selected");
        Ok(self.snapshot())
    }

    /// Reveals one answer and scores it according to the round mode
    ///
    /// The reveal is written before any local change.
    ///
    /// # Arguments
    ///
    /// * `index` - Board position of the answer
    /// * `persistence` - Sink for the reveal write
    ///
    /// # Errors
    ///
    /// * `InvalidOperation::Round` - Already revealed, out of range, or no live team
    /// * `Error::ExternalWriteFailure` - The write was not recorded
    pub fn reveal_answer<P: Persistence>(
        &mut self,
        index: usize,
        mut persistence: P,
    ) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "reveal an answer")?;
        self.round.check_reveal(index)?;

        let (question_id, points) = self
            .current_question()
            .and_then(|question| Some((question.id, question.answers.get(index)?.points)))
            .ok_or(round::Error::AnswerOutOfRange {
                index,
                count: self.answer_count(),
            })?;

        persistence.persist(&Write::answer_revealed(question_id, index))?;

        let outcome = self
            .round
            .reveal_answer(index, points, &mut self.ledger, self.options.rules)?;

        tracing::debug!(?outcome, question_id, "answer revealed");
        if outcome.round_over {
            tracing::info!(round = self.current_round, scores = ?self.scores(), "round decided");
        }
        Ok(self.snapshot())
    }

    /// Reveals every remaining answer without scoring
    ///
    /// Calling this again once everything is showing changes nothing and
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// * `InvalidOperation::WrongPhase` - Not in play
    /// * `Error::ExternalWriteFailure` - The write was not recorded
    pub fn reveal_all<P: Persistence>(&mut self, mut persistence: P) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "reveal all answers")?;

        let done = self.round.reveal().hidden().is_empty()
            && self.round.mode() == RoundMode::EndRoundReveal;
        if done {
            return Ok(self.snapshot());
        }

        if let Some(question) = self.current_question() {
            persistence.persist(&Write::question_revealed(question.id))?;
        }

        let revealed = self.round.reveal_all();
        tracing::debug!(?revealed, "remaining answers revealed");
        Ok(self.snapshot())
    }

    /// Records a strike against the live team
    ///
    /// A recorded strike raises the strike overlay, unless the overlay
    /// duration is zero.
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside of play, `NoTeamSelected` without a live team,
    /// or `RoundOver` once the round is decided.
    pub fn add_strike(&mut self) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "add a strike")?;
        let effect = self.round.add_strike()?;

        if effect != StrikeEffect::Capped {
            self.show_strikes = !self.options.strike_overlay.is_zero();
            self.strike_generation += 1;
        }
        tracing::debug!(?effect, "strike added");
        Ok(self.snapshot())
    }

    /// Takes back a strike
    ///
    /// # Errors
    ///
    /// `InvalidOperation::WrongPhase` outside of play.
    pub fn undo_strike(&mut self) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "undo a strike")?;
        let effect = self.round.undo_strike();

        tracing::debug!(?effect, "strike undone");
        Ok(self.snapshot())
    }

    /// Clears all strikes
    ///
    /// # Errors
    ///
    /// `InvalidOperation::WrongPhase` outside of play.
    pub fn reset_strikes(&mut self) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "reset strikes")?;
        let effect = self.round.reset_strikes();

        tracing::debug!(?effect, "strikes reset");
        Ok(self.snapshot())
    }

    /// Adds points to a team outside of the reveal flow
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside of play, or `PointsOutOfRange` when `points`
    /// exceeds [`constants::round::MAX_MANUAL_AWARD`] in either direction.
    pub fn award_points(&mut self, team: Team, points: i64) -> Result<BoardSnapshot, Error> {
        const MAX: i64 = constants::round::MAX_MANUAL_AWARD;

        self.require(&[Phase::InProgress], "award points")?;
        if !(-MAX..=MAX).contains(&points) || !self.ledger.can_award(team, points) {
            return Err(InvalidOperation::PointsOutOfRange(points).into());
        }
        self.ledger.award_points(team, points);

        tracing::info!(%team, points, "points awarded by host");
        Ok(self.snapshot())
    }

    /// Moves on to the next question
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside of play, or `LastQuestion` on the final question.
    pub fn next_question(&mut self) -> Result<BoardSnapshot, Error> {
        self.require(&[Phase::InProgress], "advance to the next question")?;
        if self.position + 1 >= self.active.len() {
            return Err(InvalidOperation::LastQuestion.into());
        }

        self.position += 1;
        self.current_round += 1;
        self.load_question();

        tracing::info!(
            round = self.current_round,
            question_id = self.current_question().map(|question| question.id),
            "next question"
        );
        Ok(self.snapshot())
    }

    /// Ends the game and resets everything over the full question set
    ///
    /// Answer reveal flags and the "game begun" flag are cleared in the
    /// store first; the local reset happens only once both writes succeed.
    ///
    /// # Errors
    ///
    /// * `InvalidOperation::WrongPhase` - No game has been entered
    /// * `Error::ExternalWriteFailure` - A write was not recorded
    pub fn end_game<P: Persistence>(&mut self, mut persistence: P) -> Result<BoardSnapshot, Error> {
        self.require(
            &[Phase::Entered, Phase::HostLobby, Phase::InProgress],
            "end the game",
        )?;

        persistence.persist(&Write::answers_reset())?;
        persistence.persist(&Write::game_begun(false))?;

        self.reset(Phase::Ended);
        tracing::info!("game ended");
        Ok(self.snapshot())
    }

    /// Runs a host command
    ///
    /// # Errors
    ///
    /// Whatever the corresponding direct method returns.
    pub fn apply_host_message<P: Persistence>(
        &mut self,
        message: IncomingHostMessage,
        persistence: P,
    ) -> Result<BoardSnapshot, Error> {
        match message {
            IncomingHostMessage::EnterGame { team_one, team_two } => {
                self.enter_game(&team_one, &team_two)
            }
            IncomingHostMessage::EnterGameWithRandomNames => self.enter_game_with_random_names(),
            IncomingHostMessage::HostLobby => self.host_lobby(),
            IncomingHostMessage::BeginGame(range) => self.begin_game(range, persistence),
            IncomingHostMessage::SelectTeam(team) => self.select_team(team),
            IncomingHostMessage::RevealAnswer(index) => self.reveal_answer(index, persistence),
            IncomingHostMessage::RevealAll => self.reveal_all(persistence),
            IncomingHostMessage::AddStrike => self.add_strike(),
            IncomingHostMessage::UndoStrike => self.undo_strike(),
            IncomingHostMessage::ResetStrikes => self.reset_strikes(),
            IncomingHostMessage::AwardPoints { team, points } => self.award_points(team, points),
            IncomingHostMessage::NextQuestion => self.next_question(),
            IncomingHostMessage::EndGame => self.end_game(persistence),
        }
    }
}

// Network
impl Game {
    /// Returns the message that brings a screen up to date
    pub fn state_message(&self, watcher_kind: ValueKind) -> crate::SyncMessage {
        SyncMessage::Board(self.board(watcher_kind)).into()
    }

    /// Sends every screen the board as its role may see it
    fn announce_board<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) {
        self.watchers.announce_with(
            |_, kind| Some(UpdateMessage::Board(self.board(kind)).into()),
            tunnel_finder,
        );
    }

    /// Registers a connection and sends it the current board
    ///
    /// # Errors
    ///
    /// Returns a [`watcher::Error`] if the session is full or a second host
    /// tries to join.
    pub fn add_watcher<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        watcher_value: Value,
        tunnel_finder: F,
    ) -> Result<(), watcher::Error> {
        self.watchers.add_watcher(watcher_id, watcher_value)?;
        self.watchers.send_state(
            &self.state_message(watcher_value.kind()),
            watcher_id,
            tunnel_finder,
        );
        Ok(())
    }

    /// Resends the board to a reconnected screen
    pub fn update_session<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        let Some(watcher_value) = self.watchers.get_watcher_value(watcher_id) else {
            return;
        };
        self.watchers.send_state(
            &self.state_message(watcher_value.kind()),
            watcher_id,
            tunnel_finder,
        );
    }

    /// Closes a screen's tunnel and forgets it
    pub fn remove_watcher<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        watcher_id: Id,
        tunnel_finder: F,
    ) {
        self.watchers.remove_watcher_session(watcher_id, tunnel_finder);
        self.watchers.remove_watcher(watcher_id);
    }

    /// Handles a command from a connection
    ///
    /// Only the host connection may send commands. On success every screen
    /// receives the new board; on failure the host alone is told why.
    ///
    /// # Arguments
    ///
    /// * `watcher_id` - Connection that sent the command
    /// * `message` - The command
    /// * `persistence` - Sink for durable writes
    /// * `schedule_message` - Schedules the strike overlay alarm
    /// * `tunnel_finder` - Function to find communication tunnels for connections
    pub fn receive_message<
        T: Tunnel,
        F: Fn(Id) -> Option<T>,
        S: FnMut(crate::AlarmMessage, web_time::Duration),
        P: Persistence,
    >(
        &mut self,
        watcher_id: Id,
        message: IncomingHostMessage,
        persistence: P,
        mut schedule_message: S,
        tunnel_finder: F,
    ) {
        let Some(watcher_value) = self.watchers.get_watcher_value(watcher_id) else {
            return;
        };

        if watcher_value.kind() != ValueKind::Host {
            tracing::warn!(%watcher_id, "ignoring command from a viewer");
            self.watchers.send_message(
                &UpdateMessage::Rejected(InvalidOperation::NotHost.into()).into(),
                watcher_id,
                tunnel_finder,
            );
            return;
        }

        let generation = self.strike_generation;
        match self.apply_host_message(message, persistence) {
            Ok(_) => {
                if self.show_strikes && self.strike_generation != generation {
                    schedule_message(
                        AlarmMessage::HideStrikes {
                            round: self.current_round,
                            generation: self.strike_generation,
                        }
                        .into(),
                        self.options.strike_overlay,
                    );
                }
                self.announce_board(&tunnel_finder);
            }
            Err(error) => {
                tracing::warn!(%error, "host command rejected");
                self.watchers.send_message(
                    &UpdateMessage::Rejected(error).into(),
                    watcher_id,
                    tunnel_finder,
                );
            }
        }
    }

    /// Handles a signal from the shared realtime channel and updates screens
    pub fn receive_realtime<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        event: RealtimeEvent,
        tunnel_finder: F,
    ) {
        match self.apply_realtime(event) {
            Ok(_) => self.announce_board(tunnel_finder),
            Err(error) => tracing::warn!(%error, ?event, "realtime event rejected"),
        }
    }

    /// Handles a scheduled alarm
    ///
    /// Alarms superseded by a later strike or question are ignored.
    pub fn receive_alarm<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        message: crate::AlarmMessage,
        tunnel_finder: F,
    ) {
        match message {
            crate::AlarmMessage::Game(AlarmMessage::HideStrikes { round, generation }) => {
                if !self.show_strikes
                    || round != self.current_round
                    || generation != self.strike_generation
                {
                    tracing::debug!(round, generation, "stale strike alarm");
                    return;
                }

                self.show_strikes = false;
                self.watchers
                    .announce_with(|_, _| Some(UpdateMessage::HideStrikes.into()), tunnel_finder);
            }
        }
    }
}
