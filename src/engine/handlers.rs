//! Per-category play handlers.
//!
//! A handler credits the counting stats that follow from the play code and
//! its modifiers, then schedules what happens on the bases: outs it already
//! knows about go straight into the pending state, and base movement goes
//! into the advancement list for `advance.rs` to resolve.

use crate::engine::compiled_rules::CompiledRules;
use crate::engine::tokenizer::PlayEvent;
use crate::error::{Result, ScoreError};
use crate::game_state::{Bases, Count, PendingState};
use crate::roster::{Position, Team};
use crate::rules::play::helpers::{
    FieldingCredits, base_token, fielding_credits, first_fielder, indicators, retired_bases, target_base,
};
use crate::rules::play::predicates::{
    has_modifier, is_air_ball, is_bunt, is_ground_ball, is_ground_into_double_play, is_ground_into_triple_play,
    is_intentional_walk, is_line_drive_double_play, is_line_drive_triple_play, is_sacrifice, is_sacrifice_fly,
    is_sacrifice_hit,
};
use crate::stats::{BattingLine, FieldingLine, PitchingLine, Tally};
use crate::PlayCategory;

/// Everything one play can touch.
pub(crate) struct PlayContext<'g> {
    pub offense: &'g mut Team,
    pub defense: &'g mut Team,
    /// Index of the batting team in the score pair.
    pub side: usize,
    pub batter: String,
    /// Pitcher on the mound.
    pub pitcher: String,
    /// Pitcher responsible for the batter if he reaches base.
    pub batter_owner: String,
    /// Bases as they stood before the play.
    pub before: Bases,
    pub outs_before: u8,
    pub count: Count,
    pub pending: PendingState,
    pub advances: Vec<String>,
    pub rbi_eligible: bool,
    /// The batter reached on an error; only a runner from third earns an RBI.
    pub is_error: bool,
    /// The play can retire a runner while the batter reaches, which moves
    /// pitcher responsibility between runners.
    pub owner_swap: bool,
    pub label: String,
    /// Positions named in fielding credits that nobody on defense holds.
    pub unresolved: Vec<u8>,
}

impl<'g> PlayContext<'g> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        offense: &'g mut Team,
        defense: &'g mut Team,
        side: usize,
        batter: String,
        pitcher: String,
        before: Bases,
        outs_before: u8,
        count: Count,
        pending: PendingState,
        advances: Vec<String>,
    ) -> Self {
        PlayContext {
            offense,
            defense,
            side,
            batter_owner: pitcher.clone(),
            batter,
            pitcher,
            before,
            outs_before,
            count,
            pending,
            advances,
            rbi_eligible: true,
            is_error: false,
            owner_swap: false,
            label: String::new(),
            unresolved: Vec::new(),
        }
    }

    /// Credit `stats` to the batter and the pitcher on the mound.
    pub fn tally(&mut self, stats: &[Tally]) -> Result<()> {
        let batter = self.batter.clone();
        let pitcher = self.pitcher.clone();
        self.tally_pair(&batter, &pitcher, stats)
    }

    fn tally_pair(&mut self, batter: &str, pitcher: &str, stats: &[Tally]) -> Result<()> {
        let batting = self.offense.batting_mut(batter)?;
        for &stat in stats {
            batting.tally(stat);
        }
        let pitching = self.defense.pitching_mut(pitcher)?;
        for &stat in stats {
            pitching.tally(stat);
        }
        Ok(())
    }

    pub fn batting(&mut self) -> Result<&mut BattingLine> {
        self.offense.batting_mut(&self.batter)
    }

    pub fn pitching(&mut self) -> Result<&mut PitchingLine> {
        self.defense.pitching_mut(&self.pitcher)
    }

    pub fn has_token_from(&self, start: char) -> bool {
        self.advances.iter().any(|a| a.starts_with(start))
    }

    /// Send the batter to `base` unless the event already says where he went.
    fn advance_batter(&mut self, base: u8) {
        if !self.has_token_from('B') {
            self.advances.push(format!("B-{}", base_token(base)));
        }
    }

    /// Move runners forced by the batter being awarded first base.
    fn force_runners(&mut self) {
        for base in 1..=3u8 {
            if !self.pending.bases.is_occupied(base) {
                break;
            }
            if !self.has_token_from(char::from(b'0' + base)) {
                self.advances.push(format!("{base}-{}", base_token(base + 1)));
            }
        }
    }

    pub fn credit_fielding(&mut self, credits: &FieldingCredits) {
        for &f in &credits.putouts {
            self.credit_fielder(f, |line| line.po += 1);
        }
        for &f in &credits.assists {
            self.credit_fielder(f, |line| line.a += 1);
        }
        for &f in &credits.errors {
            self.credit_fielder(f, |line| line.e += 1);
        }
    }

    /// Credit every parenthesised fielding group of `code`.
    fn credit_code_indicators(&mut self, code: &str) {
        for group in indicators(code) {
            self.credit_fielding(&fielding_credits(&group));
        }
    }

    fn credit_fielder(&mut self, fielder: u8, apply: impl FnOnce(&mut FieldingLine)) {
        let line = Position::from_code(fielder).ok().and_then(|pos| self.defense.fielding_at_mut(pos));
        match line {
            Some(line) => apply(line),
            None => self.unresolved.push(fielder),
        }
    }

    fn add_outs(&mut self, outs: u8) -> Result<()> {
        self.pending.outs += outs;
        if self.pending.outs > 3 {
            return Err(ScoreError::state("at most 3 outs", format!("{} outs after {}", self.pending.outs, self.label)));
        }
        Ok(())
    }

    /// Runner standing on `base` before the play.
    fn runner_on(&self, base: u8, code: &str) -> Result<String> {
        self.before
            .get(base)
            .map(|o| o.runner.clone())
            .ok_or_else(|| ScoreError::state(format!("a runner on {base} for {code}"), self.before.describe()))
    }
}

pub(crate) fn handle(
    category: PlayCategory,
    event: &PlayEvent,
    rules: &CompiledRules<'_>,
    ctx: &mut PlayContext<'_>,
) -> Result<()> {
    let code = event.code.as_str();
    let mods = event.modifiers.as_slice();
    ctx.label = category.label().to_string();

    match category {
        PlayCategory::SingleFielderOut => single_fielder_out(code, mods, ctx),
        PlayCategory::ForceOut => force_out(code, mods, ctx),
        PlayCategory::FieldedOut => fielded_out(code, mods, ctx),
        PlayCategory::DoublePlay => double_play(code, mods, ctx),
        PlayCategory::TriplePlay => triple_play(code, mods, ctx),
        PlayCategory::CatcherInterference => catcher_interference(mods, ctx),
        PlayCategory::Single => hit(1, ctx),
        PlayCategory::Double | PlayCategory::GroundRuleDouble => hit(2, ctx),
        PlayCategory::Triple => hit(3, ctx),
        PlayCategory::Error => reached_on_error(code, mods, ctx),
        PlayCategory::FieldersChoice => fielders_choice(mods, ctx),
        PlayCategory::FoulFlyError => {
            ctx.credit_fielding(&fielding_credits(code));
            Ok(())
        }
        PlayCategory::HomeRun => home_run(ctx),
        PlayCategory::HitByPitch => {
            ctx.tally(&[Tally::Pa, Tally::Hp])?;
            ctx.advance_batter(1);
            ctx.force_runners();
            Ok(())
        }
        PlayCategory::Strikeout => strikeout(code, rules, ctx),
        PlayCategory::NoPlay => {
            if ctx.count.is_hitters_count() {
                ctx.pending.relief.armed = true;
            }
            Ok(())
        }
        PlayCategory::Walk => walk(code, rules, ctx),
        PlayCategory::Balk => {
            ctx.rbi_eligible = false;
            ctx.pitching()?.bk += 1;
            Ok(())
        }
        PlayCategory::CaughtStealing => {
            ctx.rbi_eligible = false;
            caught_stealing(code, ctx)
        }
        PlayCategory::DefensiveIndifference | PlayCategory::OtherAdvance | PlayCategory::PassedBall => {
            ctx.rbi_eligible = false;
            Ok(())
        }
        PlayCategory::WildPitch => {
            ctx.rbi_eligible = false;
            ctx.pitching()?.wp += 1;
            Ok(())
        }
        PlayCategory::Pickoff => {
            ctx.rbi_eligible = false;
            pickoff(code, ctx)
        }
        PlayCategory::PickoffCaughtStealing => {
            ctx.rbi_eligible = false;
            pickoff_caught_stealing(code, ctx)
        }
        PlayCategory::StolenBase => {
            ctx.rbi_eligible = false;
            stolen_bases(code, ctx)
        }
    }
}

// --- Shared pieces ------------------------------------------------------------

/// Credit an explicit ground or air out. Returns true if one was credited.
fn credit_batted_ball(mods: &[String], ctx: &mut PlayContext<'_>) -> Result<bool> {
    let air = is_air_ball(mods);
    let ground = is_ground_ball(mods);
    let pitching = ctx.pitching()?;
    if air {
        pitching.ao += 1;
    }
    if ground {
        pitching.go += 1;
    }
    Ok(air || ground)
}

fn sacrifice_or_at_bat(mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    if is_sacrifice_fly(mods) {
        ctx.tally(&[Tally::Sf])
    } else if is_sacrifice_hit(mods) {
        ctx.tally(&[Tally::Sh])
    } else {
        ctx.tally(&[Tally::Ab])
    }
}

/// Ground or air out of a multi-out play. An explicit batted-ball modifier
/// wins; bunts and sacrifices are not inferred.
fn credit_multi_out_type(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    if credit_batted_ball(mods, ctx)? || is_bunt(mods) || is_sacrifice(mods) {
        return Ok(());
    }
    let outfielder = first_fielder(code).is_some_and(|f| (7..=9).contains(&f));
    let batter_first = code.chars().nth(2) == Some('B');
    if outfielder && batter_first {
        ctx.pitching()?.ao += 1;
    } else if !outfielder {
        ctx.pitching()?.go += 1;
    }
    Ok(())
}

fn base_number(c: char, code: &str) -> Result<u8> {
    match c {
        '1'..='3' => Ok(c as u8 - b'0'),
        _ => Err(ScoreError::grammar("retired base", code)),
    }
}

// --- Batted-ball outs -----------------------------------------------------------

fn single_fielder_out(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa])?;
    if is_ground_into_double_play(mods) {
        ctx.tally(&[Tally::Gdp])?;
    }
    if !credit_batted_ball(mods, ctx)? && !is_bunt(mods) && !is_sacrifice(mods) {
        let fielder = code.trim_end_matches('!');
        if regex!(r"^[1456]E3").is_match(code) {
            ctx.pitching()?.go += 1;
        } else if matches!(fielder, "7" | "8" | "9") || has_modifier(mods, "DP") || has_modifier(mods, "BINT") {
            ctx.pitching()?.ao += 1;
        }
    }
    if is_sacrifice_fly(mods) {
        ctx.tally(&[Tally::Sf])?;
        if !is_air_ball(mods) {
            ctx.pitching()?.ao += 1;
        }
    } else if is_sacrifice_hit(mods) {
        ctx.tally(&[Tally::Sh])?;
    } else {
        ctx.tally(&[Tally::Ab])?;
    }

    if code.contains('E') {
        ctx.advance_batter(1);
    } else if !ctx.has_token_from('B') {
        ctx.add_outs(1)?;
    }
    ctx.credit_fielding(&fielding_credits(code));
    Ok(())
}

fn fielded_out(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa])?;
    sacrifice_or_at_bat(mods, ctx)?;
    if !credit_batted_ball(mods, ctx)?
        && !is_bunt(mods)
        && !is_sacrifice(mods)
        && (regex!(r"^[1456][1-6]?3$").is_match(code) || has_modifier(mods, "BINT"))
    {
        ctx.pitching()?.go += 1;
    }
    ctx.add_outs(1)?;
    ctx.credit_fielding(&fielding_credits(code));
    Ok(())
}

fn force_out(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa])?;
    ctx.tally(&[if is_sacrifice_fly(mods) { Tally::Sf } else { Tally::Ab }])?;
    if is_ground_into_double_play(mods) {
        ctx.tally(&[Tally::Gdp])?;
    }
    if is_air_ball(mods) {
        ctx.pitching()?.ao += 1;
    } else if !(is_bunt(mods) || is_sacrifice(mods)) {
        ctx.pitching()?.go += 1;
    }

    let forced = retired_bases(code).first().copied().ok_or_else(|| ScoreError::grammar("forced base", code))?;
    let base = base_number(forced, code)?;
    if !ctx.pending.bases.is_occupied(base) {
        return Err(ScoreError::state(format!("a runner forced from {base}"), ctx.pending.bases.describe()));
    }
    if !ctx.has_token_from(forced) {
        ctx.advances.push(format!("{base}X{}", base_token(base + 1)));
    }
    ctx.advance_batter(1);
    ctx.owner_swap = true;
    ctx.credit_fielding(&fielding_credits(code));
    Ok(())
}

fn double_play(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    let mut stats = vec![Tally::Pa];
    if is_ground_into_double_play(mods) {
        stats.push(Tally::Gdp);
    }
    stats.push(if is_sacrifice_fly(mods) { Tally::Sf } else { Tally::Ab });
    ctx.tally(&stats)?;
    credit_multi_out_type(code, mods, ctx)?;
    if is_ground_into_double_play(mods) {
        ctx.label = "Ground Ball Double Play".to_string();
    } else if is_line_drive_double_play(mods) {
        ctx.label = "Line Out Double Play".to_string();
    }

    let bases = retired_bases(code);
    if !(1..=2).contains(&bases.len()) {
        return Err(ScoreError::grammar("double play", code));
    }
    for &b in &bases {
        if b == 'B' {
            if !ctx.has_token_from('B') {
                ctx.advances.push("BX1".to_string());
            }
            continue;
        }
        let base = base_number(b, code)?;
        if !ctx.pending.bases.is_occupied(base) {
            return Err(ScoreError::state(format!("a runner on {base} for {code}"), ctx.pending.bases.describe()));
        }
        if !ctx.has_token_from(b) {
            ctx.advances.push(format!("{base}X{}", base_token(base + 1)));
        }
    }
    if bases.len() == 1 && bases[0] != 'B' && !ctx.has_token_from('B') {
        ctx.advances.push("BX1".to_string());
    }
    if bases.len() == 2 && !bases.contains(&'B') {
        ctx.advance_batter(1);
    }

    if !is_sacrifice_fly(mods) {
        ctx.rbi_eligible = false;
    }
    ctx.owner_swap = true;
    ctx.credit_fielding(&fielding_credits(code));
    Ok(())
}

fn triple_play(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa, Tally::Ab])?;
    credit_multi_out_type(code, mods, ctx)?;
    if is_ground_into_triple_play(mods) {
        ctx.label = "Ground Ball Triple Play".to_string();
    } else if is_line_drive_triple_play(mods) {
        ctx.label = "Line Out Triple Play".to_string();
    }

    ctx.add_outs(3)?;
    for b in retired_bases(code).into_iter().filter(|&b| b != 'B') {
        let base = base_number(b, code)?;
        ctx.pending
            .bases
            .take(base)
            .ok_or_else(|| ScoreError::state(format!("a runner on {base} for {code}"), ctx.before.describe()))?;
    }
    ctx.credit_fielding(&fielding_credits(code));
    Ok(())
}

// --- Batter reaches -------------------------------------------------------------

fn catcher_interference(mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa])?;
    ctx.advance_batter(1);
    if !ctx.before.is_loaded() {
        ctx.rbi_eligible = false;
    }
    ctx.force_runners();
    let fielders: Vec<u8> = mods
        .iter()
        .filter(|m| regex!(r"^E[1-3]$").is_match(m))
        .filter_map(|m| first_fielder(&m[1..]))
        .collect();
    let credits = if fielders.is_empty() {
        FieldingCredits { errors: vec![2], ..Default::default() }
    } else {
        FieldingCredits { errors: fielders, ..Default::default() }
    };
    ctx.credit_fielding(&credits);
    Ok(())
}

fn hit(bases: u8, ctx: &mut PlayContext<'_>) -> Result<()> {
    let mut stats = vec![Tally::Pa, Tally::Ab, Tally::H];
    match bases {
        2 => stats.push(Tally::Double),
        3 => stats.push(Tally::Triple),
        _ => {}
    }
    stats.extend(std::iter::repeat_n(Tally::Tb, usize::from(bases)));
    ctx.tally(&stats)?;
    ctx.advance_batter(bases);
    Ok(())
}

fn reached_on_error(code: &str, mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa])?;
    if is_sacrifice_hit(mods) {
        ctx.tally(&[Tally::Sh])?;
    } else if is_sacrifice_fly(mods) {
        ctx.tally(&[Tally::Sf])?;
    } else {
        ctx.tally(&[Tally::Ab])?;
    }
    ctx.advance_batter(1);
    ctx.is_error = true;

    if is_sacrifice_fly(mods) {
        ctx.rbi_eligible = true;
    } else if ctx.outs_before == 2 || has_modifier(mods, "F") || (has_modifier(mods, "FO") && !ctx.before.is_occupied(3))
    {
        ctx.rbi_eligible = false;
    }
    ctx.credit_fielding(&fielding_credits(code));
    Ok(())
}

fn fielders_choice(mods: &[String], ctx: &mut PlayContext<'_>) -> Result<()> {
    ctx.tally(&[Tally::Pa])?;
    if is_sacrifice_hit(mods) {
        ctx.tally(&[Tally::Sh])?;
    } else if is_sacrifice_fly(mods) {
        ctx.tally(&[Tally::Sf])?;
    } else {
        ctx.tally(&[Tally::Ab])?;
    }
    if has_modifier(mods, "GDP") {
        ctx.tally(&[Tally::Gdp])?;
        ctx.rbi_eligible = false;
    }
    ctx.advance_batter(1);
    ctx.owner_swap = true;
    Ok(())
}

fn home_run(ctx: &mut PlayContext<'_>) -> Result<()> {
    let mut stats = vec![Tally::Pa, Tally::Ab, Tally::H, Tally::Hr];
    stats.extend([Tally::Tb; 4]);
    if ctx.before.is_loaded() {
        stats.push(Tally::Hr4);
    }
    ctx.tally(&stats)?;

    if !ctx.has_token_from('B') {
        ctx.pending.score[ctx.side] += 1;
        let batting = ctx.batting()?;
        batting.r += 1;
        batting.rbi += 1;
        let pitching = ctx.pitching()?;
        pitching.r += 1;
        pitching.er += 1;
    }
    for base in 1..=3u8 {
        if ctx.pending.bases.is_occupied(base) && !ctx.has_token_from(char::from(b'0' + base)) {
            ctx.advances.push(format!("{base}-H"));
        }
    }
    Ok(())
}

// --- Strikeouts, walks and the events that can follow them ----------------------

/// Handle the event after `+` in a strikeout or walk code.
fn trailing_event(code: &str, rules: &CompiledRules<'_>, ctx: &mut PlayContext<'_>) -> Result<Option<PlayCategory>> {
    let Some((_, suffix)) = code.split_once('+') else {
        return Ok(None);
    };
    let class = rules.classify(suffix)?;
    if !class.category.is_trailing_event() {
        return Err(ScoreError::grammar("trailing event", suffix));
    }
    ctx.label = format!("{} w/ {}", ctx.label, class.category.label());

    match class.category {
        PlayCategory::StolenBase => stolen_bases(suffix, ctx)?,
        PlayCategory::CaughtStealing => caught_stealing(suffix, ctx)?,
        PlayCategory::Pickoff => pickoff(suffix, ctx)?,
        PlayCategory::PickoffCaughtStealing => pickoff_caught_stealing(suffix, ctx)?,
        PlayCategory::WildPitch => ctx.pitching()?.wp += 1,
        PlayCategory::Error => ctx.credit_fielding(&fielding_credits(suffix)),
        _ => {}
    }
    Ok(Some(class.category))
}

fn strikeout(code: &str, rules: &CompiledRules<'_>, ctx: &mut PlayContext<'_>) -> Result<()> {
    let owner = ctx.offense.player(&ctx.batter)?.strikeout_owner.clone().unwrap_or_else(|| ctx.batter.clone());
    let pitcher = ctx.pitcher.clone();
    ctx.tally_pair(&owner, &pitcher, &[Tally::Pa, Tally::Ab, Tally::So])?;
    ctx.rbi_eligible = false;

    if !ctx.has_token_from('B') {
        ctx.add_outs(1)?;
        let fielders = code[1..].split('+').next().unwrap_or_default();
        let credits = if fielders.is_empty() {
            FieldingCredits { putouts: vec![2], ..Default::default() }
        } else {
            fielding_credits(fielders)
        };
        ctx.credit_fielding(&credits);
    }
    trailing_event(code, rules, ctx)?;
    Ok(())
}

fn walk(code: &str, rules: &CompiledRules<'_>, ctx: &mut PlayContext<'_>) -> Result<()> {
    let charged = ctx.pending.relief.walk_owner.clone().unwrap_or_else(|| ctx.pitcher.clone());
    let mut stats = vec![Tally::Pa, Tally::Bb];
    if is_intentional_walk(code) {
        stats.push(Tally::Ibb);
    }
    let batter = ctx.batter.clone();
    ctx.tally_pair(&batter, &charged, &stats)?;
    ctx.batter_owner = charged;
    ctx.advance_batter(1);

    match trailing_event(code, rules, ctx)? {
        Some(PlayCategory::StolenBase) => ctx.rbi_eligible = false,
        Some(PlayCategory::WildPitch) => {
            if ctx.before.is_loaded() {
                ctx.batting()?.rbi += 1;
            }
            ctx.rbi_eligible = false;
        }
        _ => {}
    }
    ctx.force_runners();
    Ok(())
}

// --- Base running ---------------------------------------------------------------

fn caught_stealing(code: &str, ctx: &mut PlayContext<'_>) -> Result<()> {
    let target = code.chars().nth(2).and_then(target_base).ok_or_else(|| ScoreError::grammar("caught stealing", code))?;
    let start = target - 1;
    let runner = ctx.runner_on(start, code)?;
    ctx.offense.batting_mut(&runner)?.cs += 1;

    if !code.contains('E') {
        ctx.pending.bases.take(start);
        ctx.add_outs(1)?;
        ctx.credit_code_indicators(code);
    } else if !ctx.has_token_from(char::from(b'0' + start)) {
        ctx.advances.push(format!("{start}-{}{}", base_token(target), &code[3..]));
    } else {
        ctx.credit_code_indicators(code);
    }
    Ok(())
}

fn pickoff(code: &str, ctx: &mut PlayContext<'_>) -> Result<()> {
    let base = code
        .chars()
        .nth(2)
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
        .filter(|b| (1..=3).contains(b))
        .ok_or_else(|| ScoreError::grammar("pickoff", code))?;
    if !code.contains('E') {
        ctx.runner_on(base, code)?;
        ctx.pending.bases.take(base);
        ctx.add_outs(1)?;
    }
    ctx.credit_code_indicators(code);
    Ok(())
}

fn pickoff_caught_stealing(code: &str, ctx: &mut PlayContext<'_>) -> Result<()> {
    let target = code.chars().nth(4).and_then(target_base).ok_or_else(|| ScoreError::grammar("pickoff", code))?;
    let start = target - 1;
    let runner = ctx.runner_on(start, code)?;
    ctx.offense.batting_mut(&runner)?.cs += 1;

    if !code.contains('E') {
        ctx.pending.bases.take(start);
        ctx.add_outs(1)?;
    } else if !ctx.has_token_from(char::from(b'0' + start)) {
        ctx.advances.push(format!("{start}-{}", base_token(target)));
    }
    ctx.credit_code_indicators(code);
    Ok(())
}

fn stolen_bases(code: &str, ctx: &mut PlayContext<'_>) -> Result<()> {
    let mut steals = Vec::new();
    for steal in code.split(';') {
        let target = steal.chars().nth(2).and_then(target_base).ok_or_else(|| ScoreError::grammar("stolen base", code))?;
        steals.push((target - 1, steal));
    }
    steals.sort_by(|a, b| b.0.cmp(&a.0));

    for (start, steal) in steals {
        let runner = ctx.runner_on(start, code)?;
        ctx.offense.batting_mut(&runner)?.sb += 1;
        if !ctx.has_token_from(char::from(b'0' + start)) {
            ctx.advances.push(format!("{start}-{}", &steal[2..]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LineupEntry;
    use crate::engine::compiled_rules::default_rules;
    use crate::engine::tokenizer::tokenize;
    use crate::game_state::BaseOccupant;

    fn team(prefix: &str) -> Team {
        let mut team = Team::new(prefix, prefix);
        for (slot, pos) in (1..=9u8).zip([8, 6, 4, 3, 9, 5, 7, 2, 1]) {
            let entry = LineupEntry {
                player_id: format!("{prefix}{slot}"),
                name: format!("{prefix} {slot}"),
                team: 0,
                batting_slot: slot,
                position: Position::from_code(pos).unwrap(),
            };
            team.start(&entry).unwrap();
        }
        team
    }

    fn run(event: &str, bases: &[(u8, &str)], outs: u8, offense: &mut Team, defense: &mut Team) -> (Vec<String>, PendingState, String, bool) {
        let mut before = Bases::default();
        for &(b, r) in bases {
            before.place(b, BaseOccupant::new(r, Some("h9".into()))).unwrap();
        }
        let pending = PendingState { outs, bases: before.clone(), ..Default::default() };
        let parsed = tokenize(event).unwrap();
        let class = default_rules().classify(&parsed.code).unwrap();
        let mut ctx = PlayContext::new(
            offense,
            defense,
            0,
            "a1".into(),
            "h9".into(),
            before,
            outs,
            Count::default(),
            pending,
            parsed.advances.clone(),
        );
        handle(class.category, &parsed, default_rules(), &mut ctx).unwrap();
        (ctx.advances, ctx.pending, ctx.label, ctx.rbi_eligible)
    }

    #[test]
    fn force_out_schedules_runner_and_batter() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, pending, _, _) = run("64(1)/FO/G", &[(1, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["1X2", "B-1"]);
        assert_eq!(pending.outs, 0);
        assert_eq!(h.pitching_mut("h9").unwrap().go, 1);
        // 6 is h2 and 4 is h3 in this alignment.
        assert_eq!(h.player("h3").unwrap().fielding.as_ref().unwrap().po, 1);
        assert_eq!(h.player("h2").unwrap().fielding.as_ref().unwrap().a, 1);
    }

    #[test]
    fn double_play_implies_batter_out() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, _, label, rbi) = run("64(1)3/GDP", &[(1, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["1X2", "BX1"]);
        assert_eq!(label, "Ground Ball Double Play");
        assert!(!rbi);
        assert_eq!(a.batting_mut("a1").unwrap().gdp, 1);
    }

    #[test]
    fn strikeout_with_stolen_base() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, pending, label, _) = run("K+SB2", &[(1, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["1-2"]);
        assert_eq!(pending.outs, 1);
        assert_eq!(label, "Strikeout w/ Stolen Base");
        assert_eq!(a.batting_mut("a9").unwrap().sb, 1);
        assert_eq!(h.player("h8").unwrap().fielding.as_ref().unwrap().po, 1);
    }

    #[test]
    fn walk_forces_runners() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, _, _, _) = run("W", &[(1, "a8"), (2, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["B-1", "1-2", "2-3"]);

        let (adv, _, _, _) = run("IW", &[(2, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["B-1"]);
        assert_eq!(a.batting_mut("a1").unwrap().ibb, 1);
    }

    #[test]
    fn caught_stealing_with_error_carries_indicators() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, pending, _, rbi) = run("CSH(E5)(UR)", &[(3, "a9")], 1, &mut a, &mut h);
        assert_eq!(adv, vec!["3-H(E5)(UR)"]);
        assert_eq!(pending.outs, 1);
        assert!(!rbi);
        assert_eq!(a.batting_mut("a9").unwrap().cs, 1);
    }

    #[test]
    fn stolen_bases_descend() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, _, _, _) = run("SB2;SB3", &[(1, "a8"), (2, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["2-3", "1-2"]);
    }

    #[test]
    fn home_run_sends_everyone_home() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (adv, pending, _, _) = run("HR/F7", &[(1, "a7"), (2, "a8"), (3, "a9")], 0, &mut a, &mut h);
        assert_eq!(adv, vec!["1-H", "2-H", "3-H"]);
        assert_eq!(pending.score, [1, 0]);
        let batting = a.batting_mut("a1").unwrap();
        assert_eq!((batting.hr, batting.hr4, batting.tb, batting.r, batting.rbi), (1, 1, 4, 1, 1));
    }

    #[test]
    fn force_error_needs_runner_on_third_for_rbi() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (_, _, _, rbi) = run("E6/FO", &[(1, "a9")], 0, &mut a, &mut h);
        assert!(!rbi);
        let (_, _, _, rbi) = run("E6/FO", &[(1, "a8"), (3, "a9")], 0, &mut a, &mut h);
        assert!(rbi);
    }

    #[test]
    fn bunted_triple_play_infers_no_ground_out() {
        let (mut a, mut h) = (team("a"), team("h"));
        let (_, pending, _, _) = run("1(B)5(2)4(1)/BP1", &[(1, "a8"), (2, "a9")], 0, &mut a, &mut h);
        assert_eq!(pending.outs, 3);
        let pitching = h.pitching_mut("h9").unwrap();
        assert_eq!((pitching.go, pitching.ao), (0, 0));

        let (mut a, mut h) = (team("a"), team("h"));
        run("5(2)4(1)3", &[(1, "a8"), (2, "a9")], 0, &mut a, &mut h);
        assert_eq!(h.pitching_mut("h9").unwrap().go, 1);
    }

    #[test]
    fn triple_play_past_three_outs_is_inconsistent() {
        let (mut a, mut h) = (team("a"), team("h"));
        let parsed = tokenize("5(2)4(1)3").unwrap();
        let mut before = Bases::default();
        before.place(1, BaseOccupant::new("a8", None)).unwrap();
        before.place(2, BaseOccupant::new("a9", None)).unwrap();
        let pending = PendingState { outs: 1, bases: before.clone(), ..Default::default() };
        let mut ctx =
            PlayContext::new(&mut a, &mut h, 0, "a1".into(), "h9".into(), before, 1, Count::default(), pending, vec![]);
        let err = handle(PlayCategory::TriplePlay, &parsed, default_rules(), &mut ctx).unwrap_err();
        assert!(matches!(err, ScoreError::StateInconsistency { .. }));
    }

    #[test]
    fn trailing_event_must_be_base_running() {
        let (mut a, mut h) = (team("a"), team("h"));
        let parsed = tokenize("K+S8").unwrap();
        let pending = PendingState::default();
        let mut ctx = PlayContext::new(
            &mut a,
            &mut h,
            0,
            "a1".into(),
            "h9".into(),
            Bases::default(),
            0,
            Count::default(),
            pending,
            vec![],
        );
        let err = handle(PlayCategory::Strikeout, &parsed, default_rules(), &mut ctx).unwrap_err();
        assert!(matches!(err, ScoreError::GrammarMismatch { field: "trailing event", .. }));
    }
}
