//! Decoding of one comma-delimited event record.

use crate::error::{Result, ScoreError};
use crate::game_state::{Count, Half};
use crate::roster::Position;

/// A `start` or `sub` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupEntry {
    pub player_id: String,
    pub name: String,
    /// 0 visiting, 1 home.
    pub team: usize,
    /// 1-9, or 0 for a pitcher who does not bat.
    pub batting_slot: u8,
    pub position: Position,
}

impl LineupEntry {
    /// Zero-based lineup index, `None` for a non-batting pitcher.
    pub fn lineup_slot(&self) -> Option<usize> {
        self.batting_slot.checked_sub(1).map(usize::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub inning: u32,
    pub half: Half,
    pub batter: String,
    pub count: Count,
    pub pitches: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Id { game_id: String },
    Info { key: String, value: String },
    Start(LineupEntry),
    Sub(LineupEntry),
    Play(PlayRecord),
    /// `radj`: a runner placed on base before the first pitch.
    RunnerAdjustment { player_id: String, base: u8 },
    /// `ladj`: the team bats out of order from `slot`.
    LineupAdjustment { team: usize, slot: u8 },
    /// Records that carry nothing the replay needs (`version`, `com`, `data`, ...).
    Ignored { kind: String },
}

impl Record {
    pub fn kind(&self) -> &str {
        match self {
            Record::Id { .. } => "id",
            Record::Info { .. } => "info",
            Record::Start(_) => "start",
            Record::Sub(_) => "sub",
            Record::Play(_) => "play",
            Record::RunnerAdjustment { .. } => "radj",
            Record::LineupAdjustment { .. } => "ladj",
            Record::Ignored { kind } => kind,
        }
    }

    pub fn decode(line: &str) -> Result<Record> {
        let line = line.trim_end();
        let fields = split_fields(line);
        let kind = fields.first().map(String::as_str).unwrap_or_default();
        let field = |i: usize, name: &'static str| -> Result<&str> {
            fields.get(i).map(String::as_str).ok_or_else(|| ScoreError::grammar(name, line))
        };

        match kind {
            "id" => Ok(Record::Id { game_id: field(1, "game id")?.to_string() }),
            "info" => Ok(Record::Info {
                key: field(1, "info key")?.to_string(),
                value: fields.get(2).cloned().unwrap_or_default(),
            }),
            "start" | "sub" => {
                let entry = LineupEntry {
                    player_id: field(1, "player id")?.to_string(),
                    name: field(2, "player name")?.to_string(),
                    team: parse_team(field(3, "team")?)?,
                    batting_slot: parse_number(field(4, "batting slot")?, "batting slot", 0..=9)? as u8,
                    position: Position::from_code(parse_number(field(5, "position")?, "position", 1..=12)? as u8)?,
                };
                Ok(if kind == "start" { Record::Start(entry) } else { Record::Sub(entry) })
            }
            "play" => Ok(Record::Play(PlayRecord {
                inning: parse_number(field(1, "inning")?, "inning", 1..=u32::MAX)?,
                half: Half::from_batting_team(field(2, "batting team")?)?,
                batter: field(3, "batter")?.to_string(),
                count: Count::parse(field(4, "count")?)?,
                pitches: field(5, "pitches")?.to_string(),
                event: field(6, "event")?.to_string(),
            })),
            "radj" => Ok(Record::RunnerAdjustment {
                player_id: field(1, "runner")?.to_string(),
                base: parse_number(field(2, "base")?, "base", 1..=3)? as u8,
            }),
            "ladj" => Ok(Record::LineupAdjustment {
                team: parse_team(field(1, "team")?)?,
                slot: parse_number(field(2, "batting slot")?, "batting slot", 1..=9)? as u8,
            }),
            "version" | "com" | "data" | "badj" | "padj" | "presadj" => Ok(Record::Ignored { kind: kind.to_string() }),
            _ => Err(ScoreError::grammar("record kind", line)),
        }
    }
}

fn parse_team(field: &str) -> Result<usize> {
    match field {
        "0" => Ok(0),
        "1" => Ok(1),
        other => Err(ScoreError::grammar("team", other)),
    }
}

fn parse_number(field: &str, name: &'static str, range: std::ops::RangeInclusive<u32>) -> Result<u32> {
    field.parse::<u32>().ok().filter(|n| range.contains(n)).ok_or_else(|| ScoreError::grammar(name, field))
}

/// Split on commas outside double quotes; quotes are dropped.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
