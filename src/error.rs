use serde::Serialize;
use thiserror::Error;

/// Fatal problems found while replaying a game.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ScoreError {
    /// Input that falls outside the fixed event grammar.
    #[error("grammar mismatch in {field}: `{found}`")]
    GrammarMismatch { field: &'static str, found: String },

    /// The record is well formed but contradicts the reconstructed state.
    #[error("state inconsistency: expected {expected}, found {actual}")]
    StateInconsistency { expected: String, actual: String },
}

impl ScoreError {
    pub(crate) fn grammar(field: &'static str, found: impl Into<String>) -> Self {
        ScoreError::GrammarMismatch { field, found: found.into() }
    }

    pub(crate) fn state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ScoreError::StateInconsistency { expected: expected.into(), actual: actual.into() }
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;

/// A `ScoreError` annotated with where it happened and what the game looked
/// like at that point.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("game {} record {record_index} `{record}`: {kind}", .game_id.as_deref().unwrap_or("-"))]
pub struct ReplayError {
    pub game_id: Option<String>,
    pub record_index: usize,
    pub record: String,
    /// Lineups and base state at the time of failure.
    pub diagnosis: String,
    pub kind: ScoreError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MismatchKind {
    /// The declared batter was not the one due up, and the play was accepted.
    BattingOutOfOrder,
    /// A fielding credit named a position nobody on the defense holds.
    UnresolvedFielder,
    /// A substitution named a player who was already on the roster.
    ReusedPlayer,
}

/// A condition that was noticed and recorded without stopping the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoverableMismatch {
    pub game_id: String,
    pub record_index: usize,
    pub kind: MismatchKind,
    pub message: String,
}
