extern crate self as scorekeeper;

use regex::Regex;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod game_state;
mod roster;
mod rules;
mod stats;

pub use api::{
    Context, Options, ReplayDetails, ReplayResult, ReplayResultVerbose, replay, replay_verbose_with, replay_with,
};
pub use engine::{
    Advance, Finish, GameMetrics, GameStateMachine, LineupEntry, PlayEvent, PlayRecord, Record, ReplayMetrics, Start,
    classify, tokenize,
};
pub use error::{MismatchKind, RecoverableMismatch, ReplayError, Result, ScoreError};
pub use game_state::{
    BaseOccupant, Bases, Count, FinalGame, GameState, Half, PendingState, PlayerGameLine, ReliefMarker, Snapshot,
    SnapshotTrigger,
};
pub use roster::{Player, Position, Roster, Team};
pub use stats::{BattingLine, FieldingLine, PitchingLine};

// --- Play categories --------------------------------------------------------

/// Every kind of event the play grammar can describe.
///
/// Classification picks exactly one of these per play code; see
/// `rules/play/rules.rs` for the ordered pattern list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum PlayCategory {
    SingleFielderOut,
    ForceOut,
    FieldedOut,
    DoublePlay,
    TriplePlay,
    CatcherInterference,
    Single,
    Double,
    Triple,
    GroundRuleDouble,
    Error,
    FieldersChoice,
    FoulFlyError,
    HomeRun,
    HitByPitch,
    Strikeout,
    NoPlay,
    Walk,
    Balk,
    CaughtStealing,
    DefensiveIndifference,
    OtherAdvance,
    PassedBall,
    WildPitch,
    Pickoff,
    PickoffCaughtStealing,
    StolenBase,
}

impl PlayCategory {
    /// Human readable name used in logs and snapshots.
    pub fn label(self) -> &'static str {
        match self {
            PlayCategory::SingleFielderOut => "Single Fielder Out",
            PlayCategory::ForceOut => "Force Out",
            PlayCategory::FieldedOut => "Out",
            PlayCategory::DoublePlay => "Double Play",
            PlayCategory::TriplePlay => "Triple Play",
            PlayCategory::CatcherInterference => "Catcher Interference",
            PlayCategory::Single => "Single",
            PlayCategory::Double => "Double",
            PlayCategory::Triple => "Triple",
            PlayCategory::GroundRuleDouble => "Ground Rule Double",
            PlayCategory::Error => "Error",
            PlayCategory::FieldersChoice => "Fielders Choice",
            PlayCategory::FoulFlyError => "Error on Foul Fly",
            PlayCategory::HomeRun => "Homerun",
            PlayCategory::HitByPitch => "Hit by Pitch",
            PlayCategory::Strikeout => "Strikeout",
            PlayCategory::NoPlay => "No Play",
            PlayCategory::Walk => "Walk",
            PlayCategory::Balk => "Balk",
            PlayCategory::CaughtStealing => "Caught Stealing",
            PlayCategory::DefensiveIndifference => "Defensive Indifference",
            PlayCategory::OtherAdvance => "Other Advancement",
            PlayCategory::PassedBall => "Passed Ball",
            PlayCategory::WildPitch => "Wild Pitch",
            PlayCategory::Pickoff => "Pickoff",
            PlayCategory::PickoffCaughtStealing => "Pickoff Off Base",
            PlayCategory::StolenBase => "Stolen Base",
        }
    }

    /// Whether the event finishes the batter's plate appearance.
    ///
    /// Categories that return `false` leave the batting-order index alone:
    /// the same batter is still at the plate when the next record arrives.
    pub fn ends_plate_appearance(self) -> bool {
        !matches!(
            self,
            PlayCategory::NoPlay
                | PlayCategory::FoulFlyError
                | PlayCategory::Balk
                | PlayCategory::CaughtStealing
                | PlayCategory::DefensiveIndifference
                | PlayCategory::OtherAdvance
                | PlayCategory::PassedBall
                | PlayCategory::WildPitch
                | PlayCategory::Pickoff
                | PlayCategory::PickoffCaughtStealing
                | PlayCategory::StolenBase
        )
    }

    /// Categories allowed after the `+` of a strikeout or walk code.
    pub(crate) fn is_trailing_event(self) -> bool {
        matches!(
            self,
            PlayCategory::StolenBase
                | PlayCategory::CaughtStealing
                | PlayCategory::OtherAdvance
                | PlayCategory::Pickoff
                | PlayCategory::PickoffCaughtStealing
                | PlayCategory::PassedBall
                | PlayCategory::WildPitch
                | PlayCategory::Error
                | PlayCategory::DefensiveIndifference
        )
    }
}

impl std::fmt::Display for PlayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// --- Rules ------------------------------------------------------------------

/// A classification rule: a name, an anchored regular expression over the
/// play code, the category it selects, and the coarse code shape the input
/// must have before the regex is even attempted.
///
/// Rules live in an ordered list. Several patterns overlap (a force-out code
/// also looks like a fielded out with a parenthetical), so the position of a
/// rule in the list is its priority.
pub(crate) struct PlayRule {
    pub name: &'static str,
    pub pattern: &'static Regex,
    pub category: PlayCategory,
    /// Shape bits that must all be present in the scanned code.
    pub shape: u8,
}

impl std::fmt::Debug for PlayRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("category", &self.category)
            .field("shape", &self.shape)
            .finish()
    }
}
