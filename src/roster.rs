//! Teams, players, lineups and the substitution state machine.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::LineupEntry;
use crate::error::{Result, ScoreError};
use crate::game_state::{Bases, Count, ReliefMarker};
use crate::stats::{BattingLine, FieldingLine, PitchingLine};

/// Scorer's position numbers. 1-9 are fielding positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
    DesignatedHitter,
    PinchHitter,
    PinchRunner,
}

impl Position {
    const ALL: [Position; 12] = [
        Position::Pitcher,
        Position::Catcher,
        Position::FirstBase,
        Position::SecondBase,
        Position::ThirdBase,
        Position::Shortstop,
        Position::LeftField,
        Position::CenterField,
        Position::RightField,
        Position::DesignatedHitter,
        Position::PinchHitter,
        Position::PinchRunner,
    ];

    pub fn from_code(code: u8) -> Result<Self> {
        code.checked_sub(1)
            .and_then(|i| Self::ALL.get(usize::from(i)).copied())
            .ok_or_else(|| ScoreError::grammar("position", code.to_string()))
    }

    pub fn code(self) -> u8 {
        Self::ALL.iter().position(|&p| p == self).map_or(0, |i| i as u8 + 1)
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::Pitcher => "P",
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::Shortstop => "SS",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::DesignatedHitter => "DH",
            Position::PinchHitter => "PH",
            Position::PinchRunner => "PR",
        }
    }

    pub fn is_fielding(self) -> bool {
        self.code() <= 9
    }

    /// DH, PH and PR do not occupy a place in the field.
    pub fn is_offensive_only(self) -> bool {
        !self.is_fielding()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub position: Option<Position>,
    pub batting: Option<BattingLine>,
    pub pitching: Option<PitchingLine>,
    pub fielding: Option<FieldingLine>,
    /// Set on a pinch hitter who took over a two-strike count; a strikeout
    /// in that plate appearance belongs to this player.
    pub strikeout_owner: Option<String>,
}

impl Player {
    fn new(id: &str, name: &str) -> Self {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            position: None,
            batting: Some(BattingLine { g: 1, ..Default::default() }),
            pitching: None,
            fielding: None,
            strikeout_owner: None,
        }
    }

    fn take_position(&mut self, position: Position) {
        self.position = Some(position);
        if position.is_fielding() && self.fielding.is_none() {
            self.fielding = Some(FieldingLine { g: 1, ..Default::default() });
        }
    }

    /// Open a pitching line if the player has none. Returns true when opened.
    fn open_pitching(&mut self) -> bool {
        if self.pitching.is_some() {
            return false;
        }
        self.pitching = Some(PitchingLine { g: 1, ..Default::default() });
        true
    }
}

/// Insertion-ordered players, looked up by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    players: Vec<Player>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Roster {
    pub fn get(&self, id: &str) -> Option<&Player> {
        self.index.get(id).map(|&i| &self.players[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.index.get(id).map(|&i| &mut self.players[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn insert(&mut self, player: Player) -> &mut Player {
        let slot = self.players.len();
        self.index.insert(player.id.clone(), slot);
        self.players.push(player);
        &mut self.players[slot]
    }

    /// Clear `position` from everyone except `keep`.
    fn vacate(&mut self, position: Position, keep: &str) {
        for p in self.players.iter_mut().filter(|p| p.id != keep && p.position == Some(position)) {
            p.position = None;
        }
    }
}

/// The parts of the game a substitution can touch besides the roster.
pub(crate) struct SubstitutionScene<'a> {
    /// Pending bases, where a pinch runner takes over.
    pub bases: &'a mut Bases,
    pub batter: &'a mut Option<String>,
    pub plate_appearance_open: bool,
    pub count: Count,
    pub relief: &'a mut ReliefMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SubstitutionOutcome {
    /// A player already in the game changed position.
    Switch { redundant: bool },
    /// The pitcher entered the batting order, ending the DH.
    DhTermination { replaced: Option<String> },
    /// A player entered the game.
    Replacement { replaced: Option<String>, reused: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub roster: Roster,
    pub lineup: [Option<String>; 9],
    pub pitcher: Option<String>,
    /// Batting-order index (0-8) saved while the team is in the field.
    pub bpos: usize,
}

impl Team {
    pub fn new(id: &str, name: &str) -> Self {
        Team {
            id: id.to_string(),
            name: name.to_string(),
            roster: Roster::default(),
            lineup: Default::default(),
            pitcher: None,
            bpos: 0,
        }
    }

    pub fn player(&self, id: &str) -> Result<&Player> {
        self.roster.get(id).ok_or_else(|| self.missing(id))
    }

    pub fn player_mut(&mut self, id: &str) -> Result<&mut Player> {
        match self.roster.index.get(id) {
            Some(&i) => Ok(&mut self.roster.players[i]),
            None => Err(self.missing(id)),
        }
    }

    fn missing(&self, id: &str) -> ScoreError {
        ScoreError::state(format!("player {id} on the {} roster", self.id), "not found")
    }

    pub(crate) fn batting_mut(&mut self, id: &str) -> Result<&mut BattingLine> {
        let team = self.id.clone();
        self.player_mut(id)?
            .batting
            .as_mut()
            .ok_or_else(|| ScoreError::state(format!("batting line for {id} ({team})"), "none"))
    }

    pub(crate) fn pitching_mut(&mut self, id: &str) -> Result<&mut PitchingLine> {
        let team = self.id.clone();
        self.player_mut(id)?
            .pitching
            .as_mut()
            .ok_or_else(|| ScoreError::state(format!("pitching line for {id} ({team})"), "none"))
    }

    /// The pitcher of record.
    pub fn pitcher_id(&self) -> Result<&str> {
        self.pitcher.as_deref().ok_or_else(|| ScoreError::state(format!("a pitcher for {}", self.id), "none"))
    }

    pub fn fielder_at(&self, position: Position) -> Option<&str> {
        self.roster.iter().find(|p| p.position == Some(position)).map(|p| p.id.as_str())
    }

    /// Fielding line of whoever plays `position`; `None` if the spot is empty.
    pub(crate) fn fielding_at_mut(&mut self, position: Position) -> Option<&mut FieldingLine> {
        let player = self.roster.players.iter_mut().find(|p| p.position == Some(position))?;
        Some(player.fielding.get_or_insert_with(|| FieldingLine { g: 1, ..Default::default() }))
    }

    pub fn lineup_summary(&self) -> String {
        let slots: Vec<String> = self
            .lineup
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let marker = if i == self.bpos { "*" } else { "" };
                format!("{}{marker}:{}", i + 1, id.as_deref().unwrap_or("-"))
            })
            .collect();
        format!("[{}] P:{}", slots.join(" "), self.pitcher.as_deref().unwrap_or("-"))
    }

    /// Apply a `start` record.
    pub(crate) fn start(&mut self, entry: &LineupEntry) -> Result<()> {
        if self.roster.contains(&entry.player_id) {
            return Err(ScoreError::state(
                format!("a single start record for {}", entry.player_id),
                "player already on the roster",
            ));
        }
        let player = self.roster.insert(Player::new(&entry.player_id, &entry.name));
        player.take_position(entry.position);
        if entry.position == Position::Pitcher {
            player.open_pitching();
            if let Some(pitching) = player.pitching.as_mut() {
                pitching.gs = 1;
            }
            self.pitcher = Some(entry.player_id.clone());
        }
        if let Some(slot) = entry.lineup_slot() {
            self.lineup[slot] = Some(entry.player_id.clone());
        }
        Ok(())
    }

    /// Apply a `sub` record.
    pub(crate) fn substitute(
        &mut self,
        entry: &LineupEntry,
        scene: &mut SubstitutionScene<'_>,
    ) -> Result<SubstitutionOutcome> {
        let incoming = entry.player_id.as_str();
        let replaced = match entry.lineup_slot() {
            Some(slot) => self.lineup[slot].clone(),
            None => self.pitcher.clone(),
        };

        if replaced.as_deref() == Some(incoming) {
            return self.switch_position(entry, scene);
        }

        let returning_pitcher = self.pitcher.as_deref() == Some(incoming)
            || self.roster.get(incoming).is_some_and(|p| p.pitching.is_some());
        if returning_pitcher {
            if let Some(slot) = entry.lineup_slot() {
                self.lineup[slot] = Some(entry.player_id.clone());
            }
            if let Some(old) = replaced.as_deref().and_then(|id| self.roster.get_mut(id)) {
                old.position = None;
            }
            if !entry.position.is_offensive_only() {
                self.roster.vacate(entry.position, incoming);
                self.player_mut(incoming)?.take_position(entry.position);
            }
            return Ok(SubstitutionOutcome::DhTermination { replaced });
        }

        let reused = self.roster.contains(incoming);
        if !reused {
            self.roster.insert(Player::new(incoming, &entry.name));
        }
        if entry.position != Position::PinchHitter && entry.position != Position::PinchRunner {
            self.roster.vacate(entry.position, incoming);
        }
        self.player_mut(incoming)?.take_position(entry.position);

        match entry.lineup_slot() {
            Some(slot) => self.lineup[slot] = Some(entry.player_id.clone()),
            None if entry.position != Position::Pitcher => {
                return Err(ScoreError::state(
                    format!("batting slot 1-9 for {} at {}", incoming, entry.position.abbreviation()),
                    "slot 0",
                ));
            }
            None => {}
        }

        if let Some(old) = replaced.as_deref() {
            if let Some(old_player) = self.roster.get_mut(old) {
                old_player.position = None;
            }
            if scene.plate_appearance_open && scene.batter.as_deref() == Some(old) {
                *scene.batter = Some(entry.player_id.clone());
                if scene.count.strikes == 2 {
                    self.player_mut(incoming)?.strikeout_owner = Some(old.to_string());
                }
            }
            if let Some(base) = scene.bases.base_of(old) {
                if let Some(occupant) = scene.bases.get_mut(base) {
                    occupant.runner = entry.player_id.clone();
                }
            }
        }

        if entry.position == Position::Pitcher {
            self.take_mound(incoming, scene)?;
        }

        Ok(SubstitutionOutcome::Replacement { replaced, reused })
    }

    fn switch_position(
        &mut self,
        entry: &LineupEntry,
        scene: &mut SubstitutionScene<'_>,
    ) -> Result<SubstitutionOutcome> {
        let id = entry.player_id.as_str();
        if self.player(id)?.position == Some(entry.position) {
            return Ok(SubstitutionOutcome::Switch { redundant: true });
        }
        self.roster.vacate(entry.position, id);
        self.player_mut(id)?.take_position(entry.position);
        if entry.position == Position::Pitcher {
            self.take_mound(id, scene)?;
        }
        Ok(SubstitutionOutcome::Switch { redundant: false })
    }

    /// Make `id` the pitcher of record and charge him with the runners on base.
    /// With relief armed, the departing pitcher keeps the walk.
    fn take_mound(&mut self, id: &str, scene: &mut SubstitutionScene<'_>) -> Result<()> {
        let player = self.player_mut(id)?;
        player.open_pitching();
        if let Some(pitching) = player.pitching.as_mut() {
            pitching.ir += scene.bases.occupied_count();
        }
        let departing = self.pitcher.replace(id.to_string());
        if scene.relief.armed {
            scene.relief.walk_owner = departing;
        }
        Ok(())
    }
}
