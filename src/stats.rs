//! Counting-stat lines credited to players during a game.

use serde::Serialize;

/// A stat that both the batter and the pitcher facing him receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tally {
    /// Plate appearance for the batter, batter faced for the pitcher.
    Pa,
    Ab,
    H,
    Tb,
    Double,
    Triple,
    Hr,
    Hr4,
    Bb,
    Ibb,
    So,
    Gdp,
    Hp,
    Sh,
    Sf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct BattingLine {
    pub g: u32,
    pub pa: u32,
    pub ab: u32,
    pub r: u32,
    pub h: u32,
    pub tb: u32,
    #[serde(rename = "2B")]
    pub doubles: u32,
    #[serde(rename = "3B")]
    pub triples: u32,
    pub hr: u32,
    pub hr4: u32,
    pub rbi: u32,
    pub bb: u32,
    pub ibb: u32,
    pub so: u32,
    pub gdp: u32,
    pub hp: u32,
    pub sh: u32,
    pub sf: u32,
    pub sb: u32,
    pub cs: u32,
}

impl BattingLine {
    pub(crate) fn tally(&mut self, stat: Tally) {
        let field = match stat {
            Tally::Pa => &mut self.pa,
            Tally::Ab => &mut self.ab,
            Tally::H => &mut self.h,
            Tally::Tb => &mut self.tb,
            Tally::Double => &mut self.doubles,
            Tally::Triple => &mut self.triples,
            Tally::Hr => &mut self.hr,
            Tally::Hr4 => &mut self.hr4,
            Tally::Bb => &mut self.bb,
            Tally::Ibb => &mut self.ibb,
            Tally::So => &mut self.so,
            Tally::Gdp => &mut self.gdp,
            Tally::Hp => &mut self.hp,
            Tally::Sh => &mut self.sh,
            Tally::Sf => &mut self.sf,
        };
        *field += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PitchingLine {
    pub g: u32,
    pub gs: u32,
    pub out: u32,
    pub tbf: u32,
    pub ab: u32,
    pub r: u32,
    pub er: u32,
    pub h: u32,
    pub tb: u32,
    #[serde(rename = "2B")]
    pub doubles: u32,
    #[serde(rename = "3B")]
    pub triples: u32,
    pub hr: u32,
    pub hr4: u32,
    pub bb: u32,
    pub ibb: u32,
    pub so: u32,
    pub gdp: u32,
    pub hp: u32,
    pub sh: u32,
    pub sf: u32,
    pub wp: u32,
    pub bk: u32,
    pub ir: u32,
    pub irs: u32,
    pub go: u32,
    pub ao: u32,
    pub pitch: u32,
    pub strike: u32,
}

impl PitchingLine {
    pub(crate) fn tally(&mut self, stat: Tally) {
        let field = match stat {
            Tally::Pa => &mut self.tbf,
            Tally::Ab => &mut self.ab,
            Tally::H => &mut self.h,
            Tally::Tb => &mut self.tb,
            Tally::Double => &mut self.doubles,
            Tally::Triple => &mut self.triples,
            Tally::Hr => &mut self.hr,
            Tally::Hr4 => &mut self.hr4,
            Tally::Bb => &mut self.bb,
            Tally::Ibb => &mut self.ibb,
            Tally::So => &mut self.so,
            Tally::Gdp => &mut self.gdp,
            Tally::Hp => &mut self.hp,
            Tally::Sh => &mut self.sh,
            Tally::Sf => &mut self.sf,
        };
        *field += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct FieldingLine {
    pub g: u32,
    pub po: u32,
    pub a: u32,
    pub e: u32,
}
