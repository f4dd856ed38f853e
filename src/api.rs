use crate::engine::{GameStateMachine, ReplayMetrics};
use crate::error::{RecoverableMismatch, ReplayError};
use crate::game_state::FinalGame;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Replay context.
///
/// Reference data the event stream itself does not carry.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Display names keyed by team id (`BOS` -> `Boston Red Sox`). Teams not
    /// listed are named by their id.
    pub team_names: HashMap<String, String>,
}

/// Options that affect replay behavior.
#[derive(Debug, Clone)]
pub struct Options {
    /// Treat a batter who is not due up as fatal unless the play carries `BOOT`.
    /// When false every out-of-order batter is accepted and recorded as a
    /// mismatch.
    pub enforce_batting_order: bool,
    /// Also take a snapshot after every `sub` record.
    pub checkpoint_substitutions: bool,
    /// Stop at the first failed game instead of skipping to the next `id`.
    pub stop_on_error: bool,
    /// Replay only the game with this id.
    pub only_game: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self { enforce_batting_order: true, checkpoint_substitutions: false, stop_on_error: false, only_game: None }
    }
}

/// Result from [`replay`] and [`replay_with`].
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResult {
    /// Finalized games, in input order.
    pub games: Vec<FinalGame>,
    /// One entry per game abandoned on a fatal error.
    pub failures: Vec<ReplayError>,
    pub mismatches: Vec<RecoverableMismatch>,
    pub elapsed: Duration,
}

/// Additional details returned by [`replay_verbose_with`].
#[derive(Debug, Clone, Serialize)]
pub struct ReplayDetails {
    pub metrics: ReplayMetrics,
}

/// Result from [`replay_verbose_with`].
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResultVerbose {
    pub games: Vec<FinalGame>,
    pub failures: Vec<ReplayError>,
    pub mismatches: Vec<RecoverableMismatch>,
    pub elapsed: Duration,
    pub details: ReplayDetails,
}

/// Replay an event stream with a default [`Context`] and [`Options`].
///
/// # Example
/// ```
/// use scorekeeper::replay;
///
/// let out = replay("id,BOS201704030\ninfo,visteam,PIT\ninfo,hometeam,BOS\n");
/// assert_eq!(out.games.len(), 1);
/// assert!(out.failures.is_empty());
/// ```
pub fn replay(input: &str) -> ReplayResult {
    replay_with(input, &Context::default(), &Options::default())
}

/// Replay an event stream with the provided `context`/`options`.
pub fn replay_with(input: &str, context: &Context, options: &Options) -> ReplayResult {
    let (result, _) = drive(input, context, options);
    result
}

/// Replay an event stream and also return run metrics.
pub fn replay_verbose_with(input: &str, context: &Context, options: &Options) -> ReplayResultVerbose {
    let (result, metrics) = drive(input, context, options);
    ReplayResultVerbose {
        games: result.games,
        failures: result.failures,
        mismatches: result.mismatches,
        elapsed: result.elapsed,
        details: ReplayDetails { metrics },
    }
}

/// Feed every line to one machine. A fatal error abandons the current game
/// and the records up to the next `id` are skipped.
fn drive(input: &str, context: &Context, options: &Options) -> (ReplayResult, ReplayMetrics) {
    let start = Instant::now();
    let mut machine = GameStateMachine::new(context.clone(), options.clone());
    let mut games = Vec::new();
    let mut failures = Vec::new();
    let mut skipping = false;
    let mut selected = options.only_game.is_none();

    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(id) = line.strip_prefix("id,") {
            skipping = false;
            if let Some(only) = options.only_game.as_deref() {
                selected = id.trim() == only;
            }
        }
        if skipping || !selected {
            continue;
        }
        match machine.apply_line(line) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => {}
            Err(err) => {
                failures.push(err);
                machine.abort_game();
                if options.stop_on_error {
                    break;
                }
                skipping = true;
            }
        }
    }
    if let Some(game) = machine.finish() {
        games.push(game);
    }

    let mismatches = machine.take_mismatches();
    let mut metrics = machine.into_metrics();
    metrics.total = start.elapsed();
    let result = ReplayResult { games, failures, mismatches, elapsed: metrics.total };
    (result, metrics)
}
