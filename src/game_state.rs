//! On-field state of one game, the pending state a play produces, and the
//! serializable views handed back to callers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, ScoreError};
use crate::roster::Team;
use crate::stats::{BattingLine, FieldingLine, PitchingLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Half {
    #[default]
    Top,
    Bottom,
}

impl Half {
    /// Decode the `0|1` team field of a play record.
    pub fn from_batting_team(code: &str) -> Result<Self> {
        match code {
            "0" => Ok(Half::Top),
            "1" => Ok(Half::Bottom),
            other => Err(ScoreError::grammar("batting team", other)),
        }
    }

    /// Index (0 away, 1 home) of the team at bat.
    pub fn batting_side(self) -> usize {
        match self {
            Half::Top => 0,
            Half::Bottom => 1,
        }
    }

    pub fn fielding_side(self) -> usize {
        1 - self.batting_side()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

impl Count {
    /// Decode the two-character count field; `??` means unknown and reads as 0-0.
    pub fn parse(field: &str) -> Result<Self> {
        let bytes = field.as_bytes();
        if bytes.len() != 2 {
            return Err(ScoreError::grammar("count", field));
        }
        let digit = |b: u8| -> Result<u8> {
            match b {
                b'?' => Ok(0),
                b'0'..=b'3' => Ok(b - b'0'),
                _ => Err(ScoreError::grammar("count", field)),
            }
        };
        Ok(Count { balls: digit(bytes[0])?, strikes: digit(bytes[1])? })
    }

    /// Counts at which the pitcher who leaves mid plate-appearance is charged
    /// with a resulting walk.
    pub fn is_hitters_count(self) -> bool {
        matches!((self.balls, self.strikes), (2, 0) | (2, 1) | (3, 0) | (3, 1) | (3, 2))
    }
}

/// A runner on base, and the pitcher responsible for him if he scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseOccupant {
    pub runner: String,
    pub pitcher: Option<String>,
}

impl BaseOccupant {
    pub fn new(runner: impl Into<String>, pitcher: Option<String>) -> Self {
        BaseOccupant { runner: runner.into(), pitcher }
    }
}

/// First, second and third base. Bases are addressed 1..=3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bases([Option<BaseOccupant>; 3]);

impl Bases {
    fn slot(base: u8) -> usize {
        debug_assert!((1..=3).contains(&base), "base {base} out of range");
        usize::from(base.clamp(1, 3) - 1)
    }

    pub fn get(&self, base: u8) -> Option<&BaseOccupant> {
        self.0[Self::slot(base)].as_ref()
    }

    pub fn get_mut(&mut self, base: u8) -> Option<&mut BaseOccupant> {
        self.0[Self::slot(base)].as_mut()
    }

    pub fn is_occupied(&self, base: u8) -> bool {
        self.get(base).is_some()
    }

    pub fn take(&mut self, base: u8) -> Option<BaseOccupant> {
        self.0[Self::slot(base)].take()
    }

    /// Put a runner on an empty base.
    pub fn place(&mut self, base: u8, occupant: BaseOccupant) -> Result<()> {
        let slot = &mut self.0[Self::slot(base)];
        if let Some(existing) = slot {
            return Err(ScoreError::state(
                format!("base {base} empty for {}", occupant.runner),
                format!("occupied by {}", existing.runner),
            ));
        }
        *slot = Some(occupant);
        Ok(())
    }

    pub fn occupied_count(&self) -> u32 {
        self.0.iter().filter(|b| b.is_some()).count() as u32
    }

    pub fn is_loaded(&self) -> bool {
        self.occupied_count() == 3
    }

    pub fn occupancy(&self) -> [bool; 3] {
        [self.0[0].is_some(), self.0[1].is_some(), self.0[2].is_some()]
    }

    pub fn base_of(&self, runner: &str) -> Option<u8> {
        (1..=3).find(|&b| self.get(b).is_some_and(|o| o.runner == runner))
    }

    pub fn clear(&mut self) {
        self.0 = Default::default();
    }

    /// `1B:abc(p) 2B:- 3B:-` style summary for logs and diagnoses.
    pub fn describe(&self) -> String {
        (1..=3)
            .map(|b| match self.get(b) {
                Some(o) => format!("{b}B:{}({})", o.runner, o.pitcher.as_deref().unwrap_or("-")),
                None => format!("{b}B:-"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Bookkeeping for a pitching change in the middle of a plate appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReliefMarker {
    /// Set by a no-play record at a hitter's count.
    pub armed: bool,
    /// The pitcher charged with a walk issued in this plate appearance.
    pub walk_owner: Option<String>,
}

impl ReliefMarker {
    pub fn clear(&mut self) {
        *self = ReliefMarker::default();
    }
}

/// The state a play is building toward. Handed by value into play
/// resolution and returned from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingState {
    pub outs: u8,
    pub score: [u32; 2],
    pub bases: Bases,
    pub next_bpos: usize,
    pub relief: ReliefMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapshotTrigger {
    Play,
    Substitution,
}

/// The post-event state of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub record_index: usize,
    pub trigger: SnapshotTrigger,
    pub inning: u32,
    pub half: Half,
    pub outs: u8,
    pub score: [u32; 2],
    pub bases: [bool; 3],
    pub batter: Option<String>,
    pub pitcher: Option<String>,
    pub batting_index: usize,
    pub event: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub id: String,
    pub season: Option<u16>,
    pub date: Option<NaiveDate>,
    pub teams: [Option<Team>; 2],
    pub inning: u32,
    pub half: Half,
    pub outs: u8,
    pub score: [u32; 2],
    pub bases: Bases,
    pub batter: Option<String>,
    pub count: Count,
    /// Whether `batter` is still at the plate after the last play record.
    pub plate_appearance_open: bool,
    pub info: BTreeMap<String, String>,
    pub snapshots: Vec<Snapshot>,
}

impl GameState {
    /// A fresh game. The season comes from characters 4-7 of the id
    /// (`BOS201704030` -> 2017).
    pub fn new(id: &str) -> Self {
        GameState {
            id: id.to_string(),
            season: id.get(3..7).and_then(|s| s.parse().ok()),
            date: None,
            teams: [None, None],
            inning: 0,
            half: Half::Top,
            outs: 0,
            score: [0, 0],
            bases: Bases::default(),
            batter: None,
            count: Count::default(),
            plate_appearance_open: false,
            info: BTreeMap::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn team(&self, side: usize) -> Result<&Team> {
        self.teams
            .get(side)
            .and_then(Option::as_ref)
            .ok_or_else(|| ScoreError::state(format!("team {side} declared by info"), "no such team"))
    }

    pub fn team_mut(&mut self, side: usize) -> Result<&mut Team> {
        self.teams
            .get_mut(side)
            .and_then(Option::as_mut)
            .ok_or_else(|| ScoreError::state(format!("team {side} declared by info"), "no such team"))
    }

    /// Mutable access to the batting and fielding teams at once.
    pub fn sides_mut(&mut self, half: Half) -> Result<(&mut Team, &mut Team)> {
        let [away, home] = &mut self.teams;
        let (offense, defense) = match half {
            Half::Top => (away, home),
            Half::Bottom => (home, away),
        };
        match (offense.as_mut(), defense.as_mut()) {
            (Some(o), Some(d)) => Ok((o, d)),
            _ => Err(ScoreError::state("both teams declared by info", "missing team")),
        }
    }

    /// Lineups and bases, one line each, for error diagnoses.
    pub fn describe(&self, pending: &PendingState) -> String {
        let mut lines = vec![format!(
            "inning {} {:?}, outs {}, score {}-{}, bases [{}], pending [{}] outs {}",
            self.inning,
            self.half,
            self.outs,
            self.score[0],
            self.score[1],
            self.bases.describe(),
            pending.bases.describe(),
            pending.outs
        )];
        for team in self.teams.iter().flatten() {
            lines.push(format!("{}: {}", team.id, team.lineup_summary()));
        }
        lines.join("\n")
    }
}

/// Everything one player accumulated in one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerGameLine {
    pub player_id: String,
    pub game_id: String,
    pub date: Option<NaiveDate>,
    pub team_id: String,
    pub name: String,
    pub batting: Option<BattingLine>,
    pub pitching: Option<PitchingLine>,
    pub fielding: Option<FieldingLine>,
}

/// A completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalGame {
    pub id: String,
    pub season: Option<u16>,
    pub date: Option<NaiveDate>,
    pub teams: [String; 2],
    pub final_score: [u32; 2],
    pub innings: u32,
    pub info: BTreeMap<String, String>,
    pub snapshots: Vec<Snapshot>,
    pub players: Vec<PlayerGameLine>,
}

impl FinalGame {
    pub(crate) fn from_state(game: GameState) -> Self {
        let mut players = Vec::new();
        let mut teams = [String::new(), String::new()];
        for (side, team) in game.teams.iter().enumerate() {
            let Some(team) = team else { continue };
            teams[side] = team.id.clone();
            players.extend(team.roster.iter().map(|p| PlayerGameLine {
                player_id: p.id.clone(),
                game_id: game.id.clone(),
                date: game.date,
                team_id: team.id.clone(),
                name: p.name.clone(),
                batting: p.batting.clone(),
                pitching: p.pitching.clone(),
                fielding: p.fielding.clone(),
            }));
        }
        FinalGame {
            id: game.id,
            season: game.season,
            date: game.date,
            teams,
            final_score: game.score,
            innings: game.inning,
            info: game.info,
            snapshots: game.snapshots,
            players,
        }
    }
}
