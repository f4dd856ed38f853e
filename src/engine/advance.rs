//! Runner advancement.
//!
//! Resolves the advancement list a handler produced (explicit tokens from the
//! event plus implicit ones) against the pending bases. Outs, runs, RBI,
//! earned runs and inherited runners are all settled here.

use std::cmp::Reverse;

use super::handlers::PlayContext;
use crate::error::{Result, ScoreError};
use crate::game_state::{BaseOccupant, Bases};
use crate::rules::play::helpers::{fielding_credits, indicators, is_error_indicator, is_putout_indicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    Batter,
    Base(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Base(u8),
    Home,
}

/// One parsed advancement token, e.g. `2XH(E2)(UR)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub start: Start,
    pub finish: Finish,
    /// Written with `X` rather than `-`.
    pub marked_out: bool,
    pub indicators: Vec<String>,
    pub raw: String,
}

impl Advance {
    pub fn parse(token: &str) -> Result<Self> {
        let bad = || ScoreError::grammar("advancement", token);
        let bytes = token.as_bytes();
        if bytes.len() < 3 {
            return Err(bad());
        }
        let start = match bytes[0] {
            b'B' => Start::Batter,
            b @ b'1'..=b'3' => Start::Base(b - b'0'),
            _ => return Err(bad()),
        };
        let marked_out = match bytes[1] {
            b'-' => false,
            b'X' => true,
            _ => return Err(bad()),
        };
        let finish = match bytes[2] {
            b @ b'1'..=b'3' => Finish::Base(b - b'0'),
            b'H' => Finish::Home,
            _ => return Err(bad()),
        };
        let rest = &token[3..];
        if !rest.is_empty() && !(rest.starts_with('(') && rest.ends_with(')')) {
            return Err(bad());
        }
        Ok(Advance { start, finish, marked_out, indicators: indicators(rest), raw: token.to_string() })
    }

    fn start_rank(&self) -> u8 {
        match self.start {
            Start::Batter => 0,
            Start::Base(b) => b,
        }
    }

    pub fn has_indicator(&self, tag: &str) -> bool {
        self.indicators.iter().any(|i| i == tag)
    }

    fn has_putout(&self) -> bool {
        self.indicators.iter().any(|i| is_putout_indicator(i))
    }

    /// An error indicator names a fielder's error (`E5`, `2E4/TH`).
    fn has_error_indicator(&self) -> bool {
        self.indicators.iter().any(|i| is_fielding_error(i))
    }

    /// An `X` token is an out unless an error let the runner reach safely
    /// with no separate putout recorded.
    pub fn is_out(&self) -> bool {
        let has_error = self.indicators.iter().any(|i| is_error_indicator(i));
        self.marked_out && (!has_error || self.has_putout())
    }
}

fn is_fielding_error(indicator: &str) -> bool {
    let head = indicator.split('/').next().unwrap_or_default();
    regex!(r"^(\d+)?E\d$").is_match(head)
}

const NO_RBI_INDICATORS: [&str; 5] = ["NORBI", "NR", "WP", "PB", "DI"];

pub(crate) fn advance_runners(ctx: &mut PlayContext<'_>) -> Result<()> {
    let mut advances = std::mem::take(&mut ctx.advances)
        .iter()
        .map(|token| Advance::parse(token))
        .collect::<Result<Vec<_>>>()?;
    advances.sort_by_key(|a| Reverse(a.start_rank()));

    // First retired base runner: (base, owning pitcher).
    let mut swap: Option<(u8, Option<String>)> = None;

    for adv in &advances {
        if adv.has_indicator("WP") {
            ctx.pitching()?.wp += 1;
        }
        let out = adv.is_out();
        if ctx.pending.outs >= 3 && (out || adv.finish != Finish::Home) {
            continue;
        }

        if out {
            if let Start::Base(b) = adv.start {
                if ctx.owner_swap && swap.is_none() {
                    swap = Some((b, ctx.before.get(b).and_then(|o| o.pitcher.clone())));
                }
            }
            ctx.pending.outs += 1;
        }

        let occupant = match adv.start {
            Start::Batter => BaseOccupant::new(ctx.batter.clone(), Some(ctx.batter_owner.clone())),
            Start::Base(b) => ctx.pending.bases.take(b).ok_or_else(|| {
                ScoreError::state(format!("a runner on {b} for {}", adv.raw), ctx.pending.bases.describe())
            })?,
        };
        credit_indicators(adv, out, ctx);

        if out {
            continue;
        }
        match adv.finish {
            Finish::Base(b) => ctx.pending.bases.place(b, occupant)?,
            Finish::Home => score_run(adv, occupant, ctx)?,
        }
    }

    if let Some((base, Some(owner))) = swap {
        cascade_ownership(&mut ctx.pending.bases, base, owner);
    }
    Ok(())
}

fn credit_indicators(adv: &Advance, out: bool, ctx: &mut PlayContext<'_>) {
    for indicator in &adv.indicators {
        if (out && is_putout_indicator(indicator)) || is_fielding_error(indicator) {
            ctx.credit_fielding(&fielding_credits(indicator));
        }
    }
}

fn score_run(adv: &Advance, occupant: BaseOccupant, ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.pending.score[ctx.side] += 1;
    ctx.offense.batting_mut(&occupant.runner)?.r += 1;

    if let Some(owner) = occupant.pitcher.as_deref() {
        let line = ctx.defense.pitching_mut(owner)?;
        line.r += 1;
        if !adv.has_indicator("UR") {
            line.er += 1;
        }
        if owner != ctx.pitcher {
            ctx.pitching()?.irs += 1;
        }
    }

    let no_rbi = NO_RBI_INDICATORS.iter().any(|tag| adv.has_indicator(tag))
        || adv.has_error_indicator()
        || (ctx.is_error && adv.start != Start::Base(3));
    if ctx.rbi_eligible && !no_rbi {
        ctx.batting()?.rbi += 1;
    }
    Ok(())
}

/// Hand the retired runner's pitcher to the runners behind him.
///
/// Starting at `from` and walking toward first, each occupied base takes the
/// carried owner and passes its own owner on. A runner with no owner ends
/// the walk.
fn cascade_ownership(bases: &mut Bases, from: u8, mut carried: String) {
    for base in (1..=from).rev() {
        let Some(occupant) = bases.get_mut(base) else { continue };
        match occupant.pitcher.replace(carried) {
            Some(displaced) => carried = displaced,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens() {
        let adv = Advance::parse("2XH(E2/TH)(UR)").unwrap();
        assert_eq!(adv.start, Start::Base(2));
        assert_eq!(adv.finish, Finish::Home);
        assert!(adv.marked_out);
        assert!(!adv.is_out());
        assert!(adv.has_indicator("UR"));
        assert!(adv.has_error_indicator());

        assert!(Advance::parse("1X3(E4)(64)").unwrap().is_out());
        assert!(Advance::parse("BX1").unwrap().is_out());
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["", "B-", "4-H", "B+1", "1-4", "1-2x"] {
            assert!(matches!(Advance::parse(token), Err(ScoreError::GrammarMismatch { .. })), "{token}");
        }
    }

    #[test]
    fn ownership_cascades_toward_first() {
        let mut bases = Bases::default();
        bases.place(1, BaseOccupant::new("batter", Some("new".into()))).unwrap();
        bases.place(2, BaseOccupant::new("r2", Some("old2".into()))).unwrap();
        cascade_ownership(&mut bases, 2, "old1".into());
        assert_eq!(bases.get(2).unwrap().pitcher.as_deref(), Some("old1"));
        assert_eq!(bases.get(1).unwrap().pitcher.as_deref(), Some("old2"));
    }

    #[test]
    fn ownership_cascade_passes_through_same_owner() {
        let mut bases = Bases::default();
        bases.place(1, BaseOccupant::new("batter", Some("new".into()))).unwrap();
        bases.place(2, BaseOccupant::new("r2", Some("old".into()))).unwrap();
        cascade_ownership(&mut bases, 2, "old".into());
        assert_eq!(bases.get(2).unwrap().pitcher.as_deref(), Some("old"));
        assert_eq!(bases.get(1).unwrap().pitcher.as_deref(), Some("old"));
    }

    #[test]
    fn ownership_cascade_stops_at_unowned_runner() {
        let mut bases = Bases::default();
        bases.place(1, BaseOccupant::new("r1", Some("new".into()))).unwrap();
        bases.place(2, BaseOccupant::new("placed", None)).unwrap();
        cascade_ownership(&mut bases, 2, "old".into());
        assert_eq!(bases.get(2).unwrap().pitcher.as_deref(), Some("old"));
        assert_eq!(bases.get(1).unwrap().pitcher.as_deref(), Some("new"));
    }
}
