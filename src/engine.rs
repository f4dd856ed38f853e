//! Play-by-play replay engine.
//!
//! The engine lives in focused submodules under `src/engine/` while this file
//! keeps the public paths stable (for example `crate::engine::GameStateMachine`
//! and `crate::engine::CodeShape`).
//!
//! ## How the parts work together
//!
//! Every raw line becomes a [`Record`]; play records then run a fixed
//! pipeline against the game's pending state:
//!
//! ```text
//! line ── Record::decode (record.rs)
//!              │
//!              v
//!     GameStateMachine::route (machine.rs)
//!       id / info / start / sub / radj / ladj ──> GameState, Team
//!       play
//!         │  tokenize                         (tokenizer.rs)
//!         │  ShapeInfo::scan                  (trigger.rs)
//!         │  CompiledRules::classify          (compiled_rules.rs)
//!         │     first matching rule wins
//!         v
//!     handlers::handle (handlers.rs)
//!       - counting stats for batter, pitcher, fielders
//!       - known outs, implicit advancement tokens
//!         │
//!         v
//!     advance_runners (advance.rs)
//!       - bases, outs, runs, RBI, earned runs, inherited runners
//!         │
//!         v
//!     commit, snapshot, half-inning reset (machine.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `record.rs`: comma-delimited record decoding.
//! - `tokenizer.rs`: splits an event into code, modifiers and advancements.
//! - `trigger.rs`: scans a play code for its coarse shape.
//! - `compiled_rules.rs`: indexes the ordered play rules by shape so that a
//!   code is only tried against rules it could match.
//! - `handlers.rs`: one handler per `PlayCategory`.
//! - `advance.rs`: the advancement token grammar and its resolution.
//! - `machine.rs`: record routing and the per-game lifecycle.
//! - `metrics.rs`: timing and counts for `replay_verbose_with`.
//!
//! ## Adding a play category
//!
//! - Add the variant to `PlayCategory` and a rule in `src/rules/play/rules.rs`
//!   at the right priority. Rules declare the shape bits they need.
//! - Add its arm to `handlers::handle`; the match is exhaustive.
//!
//! ## Debugging
//!
//! Set `SCOREKEEPER_LOG=scorekeeper=debug` to log every record and play.

#[path = "engine/advance.rs"]
mod advance;
#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/handlers.rs"]
mod handlers;
#[path = "engine/machine.rs"]
mod machine;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/record.rs"]
mod record;
#[path = "engine/tokenizer.rs"]
mod tokenizer;
#[path = "engine/trigger.rs"]
mod trigger;

#[cfg(test)]
#[path = "engine/fixtures.rs"]
pub(crate) mod fixtures;
#[cfg(test)]
#[path = "engine/scenarios.rs"]
mod scenarios;

pub use advance::{Advance, Finish, Start};
pub use compiled_rules::CodeShape;
pub use machine::GameStateMachine;
pub use metrics::{GameMetrics, ReplayMetrics};
pub use record::{LineupEntry, PlayRecord, Record};
pub use tokenizer::{PlayEvent, tokenize};

/// Category of a bare play code (the part before any `/` or `.`) under the
/// default rule set.
pub fn classify(code: &str) -> crate::error::Result<crate::PlayCategory> {
    compiled_rules::default_rules().classify(code).map(|c| c.category)
}
