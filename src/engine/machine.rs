//! The per-game state machine.
//!
//! Records are fed in one at a time. `id` starts a game (and finalizes the
//! previous one), `info`/`start`/`sub` build the teams, and each `play` runs
//! the pipeline
//!
//! ```text
//! tokenize -> verify batting order -> classify -> handler -> advance_runners -> commit
//! ```
//!
//! Play resolution works on a `PendingState` taken by value from the machine
//! and handed back when the play is done. The committed `GameState` fields
//! only catch up with it at the start of the next play, so a failing play
//! never leaves half of its effects behind in the committed view.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::advance::advance_runners;
use super::compiled_rules::{CompiledRules, default_rules};
use super::handlers::{self, PlayContext};
use super::metrics::{GameMetrics, ReplayMetrics};
use super::record::{LineupEntry, PlayRecord, Record};
use super::tokenizer::tokenize;
use crate::api::{Context, Options};
use crate::error::{MismatchKind, RecoverableMismatch, ReplayError, Result, ScoreError};
use crate::game_state::{BaseOccupant, FinalGame, GameState, PendingState, Snapshot, SnapshotTrigger};
use crate::roster::{SubstitutionOutcome, SubstitutionScene, Team};
use crate::rules::play::helpers::count_pitches;
use crate::rules::play::predicates::has_modifier;
use crate::PlayCategory;

/// What a resolved play reports back besides the new pending state.
struct PlayOutcome {
    category: PlayCategory,
    label: String,
    attempts: usize,
    out_of_order: Option<String>,
    unresolved: Vec<u8>,
}

pub struct GameStateMachine {
    context: Context,
    options: Options,
    rules: &'static CompiledRules<'static>,
    game: Option<GameState>,
    pending: PendingState,
    /// Side (0 away, 1 home) due to bat next.
    at_bat: usize,
    record_index: usize,
    mismatches: Vec<RecoverableMismatch>,
    metrics: ReplayMetrics,
    started: Option<Instant>,
}

impl GameStateMachine {
    pub fn new(context: Context, options: Options) -> Self {
        GameStateMachine {
            context,
            options,
            rules: default_rules(),
            game: None,
            pending: PendingState::default(),
            at_bat: 0,
            record_index: 0,
            mismatches: Vec::new(),
            metrics: ReplayMetrics::default(),
            started: None,
        }
    }

    /// The game in progress, if any.
    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    pub fn metrics(&self) -> &ReplayMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> ReplayMetrics {
        self.metrics
    }

    /// Drain the recoverable mismatches noticed so far.
    pub fn take_mismatches(&mut self) -> Vec<RecoverableMismatch> {
        std::mem::take(&mut self.mismatches)
    }

    /// Decode and apply one raw record line.
    ///
    /// Returns the previous game when an `id` record finalizes it.
    pub fn apply_line(&mut self, line: &str) -> std::result::Result<Option<FinalGame>, ReplayError> {
        self.record_index += 1;
        let result = Record::decode(line).and_then(|record| self.route(&record));
        self.metrics.record_line();
        result.map_err(|kind| self.wrap(line, kind))
    }

    /// Apply an already decoded record.
    pub fn apply(&mut self, record: &Record) -> std::result::Result<Option<FinalGame>, ReplayError> {
        self.record_index += 1;
        let result = self.route(record);
        self.metrics.record_line();
        result.map_err(|kind| self.wrap(record.kind(), kind))
    }

    /// Finalize the game in progress at end of input.
    pub fn finish(&mut self) -> Option<FinalGame> {
        self.finalize()
    }

    /// Drop the game in progress after a fatal error; returns its id.
    pub fn abort_game(&mut self) -> Option<String> {
        let game = self.game.take()?;
        self.close_metrics(true);
        self.pending = PendingState::default();
        warn!(game = %game.id, "game abandoned");
        Some(game.id)
    }

    fn wrap(&self, line: &str, kind: ScoreError) -> ReplayError {
        let err = ReplayError {
            game_id: self.game.as_ref().map(|g| g.id.clone()),
            record_index: self.record_index,
            record: line.trim_end().to_string(),
            diagnosis: self.game.as_ref().map(|g| g.describe(&self.pending)).unwrap_or_default(),
            kind,
        };
        error!(game = err.game_id.as_deref().unwrap_or("-"), record = %err.record, "{}", err.kind);
        err
    }

    fn route(&mut self, record: &Record) -> Result<Option<FinalGame>> {
        debug!(index = self.record_index, kind = record.kind(), "record");
        match record {
            Record::Id { game_id } => {
                let finished = self.finalize();
                self.begin(game_id);
                return Ok(finished);
            }
            Record::Ignored { .. } => {}
            Record::Info { key, value } => self.info(key, value)?,
            Record::Start(entry) => self.game_mut()?.team_mut(entry.team)?.start(entry)?,
            Record::Sub(entry) => self.substitute(entry)?,
            Record::Play(play) => self.play(play)?,
            Record::RunnerAdjustment { player_id, base } => {
                self.game_mut()?;
                self.pending.bases.place(*base, BaseOccupant::new(player_id.as_str(), None))?;
                debug!(runner = %player_id, base, "runner placed");
            }
            Record::LineupAdjustment { team, slot } => {
                let index = slot
                    .checked_sub(1)
                    .map(usize::from)
                    .filter(|&i| i < 9)
                    .ok_or_else(|| ScoreError::grammar("batting slot", slot.to_string()))?;
                let at_bat = self.at_bat;
                let game = self.game_mut()?;
                let team_ref = game.team_mut(*team)?;
                team_ref.bpos = index;
                if *team == at_bat {
                    self.pending.next_bpos = index;
                }
                debug!(team, slot, "batting order adjusted");
            }
        }
        Ok(None)
    }

    fn game_mut(&mut self) -> Result<&mut GameState> {
        self.game.as_mut().ok_or_else(|| ScoreError::state("an id record first", "no game in progress"))
    }

    fn begin(&mut self, game_id: &str) {
        self.game = Some(GameState::new(game_id));
        self.pending = PendingState::default();
        self.at_bat = 0;
        self.started = Some(Instant::now());
        self.metrics.games.push(GameMetrics { game_id: game_id.to_string(), ..Default::default() });
        info!(game = %game_id, "game started");
    }

    fn finalize(&mut self) -> Option<FinalGame> {
        let mut game = self.game.take()?;
        game.score = self.pending.score;
        self.close_metrics(false);
        self.pending = PendingState::default();
        info!(
            game = %game.id,
            away = game.score[0],
            home = game.score[1],
            innings = game.inning,
            plays = game.snapshots.len(),
            "game final"
        );
        Some(FinalGame::from_state(game))
    }

    fn close_metrics(&mut self, failed: bool) {
        let duration = self.started.take().map(|t| t.elapsed()).unwrap_or_default();
        if let Some(game) = self.metrics.games.last_mut() {
            game.duration = duration;
            game.failed = failed;
        }
    }

    fn info(&mut self, key: &str, value: &str) -> Result<()> {
        let name = self.context.team_names.get(value).cloned();
        let game = self.game_mut()?;
        match key {
            "visteam" | "hometeam" => {
                let side = usize::from(key == "hometeam");
                game.teams[side] = Some(Team::new(value, name.as_deref().unwrap_or(value)));
            }
            "date" => {
                let date = chrono::NaiveDate::parse_from_str(value, "%Y/%m/%d")
                    .map_err(|_| ScoreError::grammar("date", value))?;
                game.date = Some(date);
            }
            _ => {
                game.info.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn substitute(&mut self, entry: &LineupEntry) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            return Err(ScoreError::state("an id record first", "no game in progress"));
        };
        let Some(team) = game.teams.get_mut(entry.team).and_then(Option::as_mut) else {
            return Err(ScoreError::state(format!("team {} declared by info", entry.team), "no such team"));
        };
        let mut scene = SubstitutionScene {
            bases: &mut self.pending.bases,
            batter: &mut game.batter,
            plate_appearance_open: game.plate_appearance_open,
            count: game.count,
            relief: &mut self.pending.relief,
        };
        let outcome = team.substitute(entry, &mut scene)?;

        match &outcome {
            SubstitutionOutcome::Switch { redundant: true } => {
                debug!(player = %entry.player_id, position = entry.position.abbreviation(), "redundant switch");
            }
            SubstitutionOutcome::Switch { redundant: false } => {
                debug!(player = %entry.player_id, position = entry.position.abbreviation(), "position switch");
            }
            SubstitutionOutcome::DhTermination { replaced } => {
                debug!(player = %entry.player_id, replaced = replaced.as_deref().unwrap_or("-"), "designated hitter ended");
            }
            SubstitutionOutcome::Replacement { replaced, reused } => {
                debug!(
                    player = %entry.player_id,
                    replaced = replaced.as_deref().unwrap_or("-"),
                    position = entry.position.abbreviation(),
                    "substitution"
                );
                if *reused {
                    let message = format!("{} re-entered at {}", entry.player_id, entry.position.abbreviation());
                    self.mismatch(MismatchKind::ReusedPlayer, message);
                }
            }
        }

        if self.options.checkpoint_substitutions {
            let event = format!("sub {} {}", entry.player_id, entry.position.abbreviation());
            self.snapshot(SnapshotTrigger::Substitution, event, "Substitution".to_string());
        }
        Ok(())
    }

    fn play(&mut self, play: &PlayRecord) -> Result<()> {
        let Some(game) = self.game.as_mut() else {
            return Err(ScoreError::state("an id record first", "no game in progress"));
        };
        commit(game, &self.pending, play);

        let pending = self.pending.clone();
        let (mut pending, outcome) = resolve_play(game, pending, play, self.rules, &self.options)?;

        let side = play.half.batting_side();
        let ends_half = pending.outs == 3;
        game.plate_appearance_open = !outcome.category.ends_plate_appearance() && !ends_half;
        self.pending = pending.clone();
        self.metrics.record_play(outcome.category.label(), outcome.attempts);

        if let Some(detail) = outcome.out_of_order {
            self.mismatch(MismatchKind::BattingOutOfOrder, detail);
        }
        for position in outcome.unresolved {
            self.mismatch(MismatchKind::UnresolvedFielder, format!("no defender at position {position}"));
        }
        self.snapshot(SnapshotTrigger::Play, play.event.clone(), outcome.label.clone());
        debug!(
            event = %play.event,
            label = %outcome.label,
            outs = pending.outs,
            score = ?pending.score,
            bases = %pending.bases.describe(),
            "play"
        );

        if ends_half {
            let Some(game) = self.game.as_mut() else { return Ok(()) };
            let (offense, defense) = game.sides_mut(play.half)?;
            offense.bpos = pending.next_bpos;
            pending.next_bpos = defense.bpos;
            pending.outs = 0;
            pending.bases.clear();
            pending.relief.clear();
            self.pending = pending;
            self.at_bat = 1 - side;
            debug!(inning = play.inning, half = ?play.half, "side retired");
        } else {
            self.at_bat = side;
        }
        Ok(())
    }

    fn mismatch(&mut self, kind: MismatchKind, message: String) {
        let game_id = self.game.as_ref().map(|g| g.id.clone()).unwrap_or_default();
        warn!(game = %game_id, record = self.record_index, kind = ?kind, "{message}");
        self.mismatches.push(RecoverableMismatch { game_id, record_index: self.record_index, kind, message });
    }

    fn snapshot(&mut self, trigger: SnapshotTrigger, event: String, label: String) {
        let record_index = self.record_index;
        let Some(game) = self.game.as_mut() else { return };
        let pitcher = game.teams[game.half.fielding_side()].as_ref().and_then(|t| t.pitcher.clone());
        game.snapshots.push(Snapshot {
            record_index,
            trigger,
            inning: game.inning,
            half: game.half,
            outs: self.pending.outs,
            score: self.pending.score,
            bases: self.pending.bases.occupancy(),
            batter: game.batter.clone(),
            pitcher,
            batting_index: self.pending.next_bpos,
            event,
            label,
        });
    }
}

/// Bring the committed view up to date with the pending state before a play.
fn commit(game: &mut GameState, pending: &PendingState, play: &PlayRecord) {
    game.inning = play.inning;
    game.half = play.half;
    game.outs = pending.outs;
    game.score = pending.score;
    game.bases = pending.bases.clone();
    game.batter = Some(play.batter.clone());
    game.count = play.count;
}

fn resolve_play(
    game: &mut GameState,
    pending: PendingState,
    play: &PlayRecord,
    rules: &CompiledRules<'_>,
    options: &Options,
) -> Result<(PendingState, PlayOutcome)> {
    let event = tokenize(&play.event)?;
    let before = game.bases.clone();
    let outs_before = game.outs;
    let side = play.half.batting_side();
    let (offense, defense) = game.sides_mut(play.half)?;

    offense.bpos = pending.next_bpos;
    let due = offense.lineup[pending.next_bpos].clone();
    let mut out_of_order = None;
    if due.as_deref() != Some(play.batter.as_str()) {
        let detail = format!(
            "{} batted in slot {} where {} was due, lineup {}",
            play.batter,
            pending.next_bpos + 1,
            due.as_deref().unwrap_or("nobody"),
            offense.lineup_summary()
        );
        if has_modifier(&event.modifiers, "BOOT") || !options.enforce_batting_order {
            out_of_order = Some(detail);
        } else {
            return Err(ScoreError::state(
                format!("batter {} in slot {}", due.as_deref().unwrap_or("-"), pending.next_bpos + 1),
                detail,
            ));
        }
    }
    offense.player(&play.batter)?;

    let pitcher = defense.pitcher_id()?.to_string();
    let class = rules.classify(&event.code)?;
    let mut ctx = PlayContext::new(
        offense,
        defense,
        side,
        play.batter.clone(),
        pitcher,
        before,
        outs_before,
        play.count,
        pending,
        event.advances.clone(),
    );
    handlers::handle(class.category, &event, rules, &mut ctx)?;
    advance_runners(&mut ctx)?;
    if ctx.pending.outs > 3 {
        return Err(ScoreError::state("at most 3 outs", format!("{} outs after {}", ctx.pending.outs, play.event)));
    }

    let ends_pa = class.category.ends_plate_appearance();
    if ends_pa {
        ctx.pending.next_bpos = (ctx.pending.next_bpos + 1) % 9;
        ctx.offense.player_mut(&play.batter)?.strikeout_owner = None;
    }
    if ends_pa || ctx.pending.outs == 3 {
        let (pitches, strikes) = count_pitches(&play.pitches);
        let line = ctx.pitching()?;
        line.pitch += pitches;
        line.strike += strikes;
        ctx.pending.relief.clear();
    }
    let made = ctx.pending.outs.saturating_sub(outs_before);
    ctx.pitching()?.out += u32::from(made);

    let outcome = PlayOutcome {
        category: class.category,
        label: ctx.label,
        attempts: class.attempts,
        out_of_order,
        unresolved: ctx.unresolved,
    };
    Ok((ctx.pending, outcome))
}
