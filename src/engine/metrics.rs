//! Replay metrics.
//!
//! Collected by the replay driver and the state machine and returned by
//! `replay_verbose_with`. Useful for spotting slow games and checking which
//! play categories a file exercises.
//!
//! ## Design notes
//!
//! - There is no per-record timing; a game is the smallest timed unit.
//! - `categories` counts top-level categories only. A trailing event after `+`
//!   is folded into its strikeout or walk.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReplayMetrics {
    /// Total elapsed time for the whole stream.
    pub total: Duration,
    /// One entry per game that reached an `id` record, in input order.
    pub games: Vec<GameMetrics>,
    /// Records decoded, including ignored kinds.
    pub records: usize,
    pub plays: usize,
    /// Play records by category label.
    pub categories: BTreeMap<&'static str, usize>,
    /// Regexes attempted during classification, summed over all plays.
    pub rule_attempts: usize,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct GameMetrics {
    pub game_id: String,
    pub duration: Duration,
    pub records: usize,
    pub plays: usize,
    pub failed: bool,
}

impl ReplayMetrics {
    pub(crate) fn record_play(&mut self, category: &'static str, attempts: usize) {
        self.plays += 1;
        self.rule_attempts += attempts;
        *self.categories.entry(category).or_default() += 1;
        if let Some(game) = self.games.last_mut() {
            game.plays += 1;
        }
    }

    pub(crate) fn record_line(&mut self) {
        self.records += 1;
        if let Some(game) = self.games.last_mut() {
            game.records += 1;
        }
    }
}
