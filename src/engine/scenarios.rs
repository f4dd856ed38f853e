//! Whole-game behavior of the state machine, driven through raw records.

use super::fixtures::{OPENING_DAY, game_with};
use super::machine::GameStateMachine;
use crate::api::{Context, Options};
use crate::error::{MismatchKind, ScoreError};
use crate::game_state::SnapshotTrigger;
use crate::stats::{BattingLine, PitchingLine};

fn run_with(options: Options, plays: &[&str]) -> GameStateMachine {
    let mut machine = GameStateMachine::new(Context::default(), options);
    for line in game_with("BOS201704040", plays).lines() {
        if let Err(err) = machine.apply_line(line) {
            panic!("{err}\n{}", err.diagnosis);
        }
    }
    machine
}

fn run(plays: &[&str]) -> GameStateMachine {
    run_with(Options::default(), plays)
}

fn batting(machine: &GameStateMachine, side: usize, id: &str) -> BattingLine {
    let team = machine.game().unwrap().team(side).unwrap();
    team.player(id).unwrap().batting.clone().unwrap()
}

fn pitching(machine: &GameStateMachine, side: usize, id: &str) -> PitchingLine {
    let team = machine.game().unwrap().team(side).unwrap();
    team.player(id).unwrap().pitching.clone().unwrap()
}

#[test]
fn single_puts_batter_on_first() {
    let machine = run(&["play,1,0,a1,00,X,S7"]);
    let line = batting(&machine, 0, "a1");
    assert_eq!((line.pa, line.ab, line.h, line.tb), (1, 1, 1, 1));

    let pending = machine.pending();
    assert_eq!(pending.outs, 0);
    let runner = pending.bases.get(1).unwrap();
    assert_eq!(runner.runner, "a1");
    assert_eq!(runner.pitcher.as_deref(), Some("h9"));
    assert_eq!(pending.next_bpos, 1);
}

#[test]
fn double_play_retires_runner_and_batter() {
    let machine = run(&["play,1,0,a1,00,X,S7", "play,1,0,a2,00,X,64(1)3"]);
    let pending = machine.pending();
    assert_eq!(pending.outs, 2);
    assert_eq!(pending.bases.occupancy(), [false; 3]);
    assert_eq!(batting(&machine, 0, "a2").rbi, 0);
    assert_eq!(pitching(&machine, 1, "h9").out, 2);

    let home = machine.game().unwrap().team(1).unwrap();
    let fielding = |id: &str| home.player(id).unwrap().fielding.clone().unwrap();
    assert_eq!(fielding("h1").po, 1);
    assert_eq!(fielding("h7").a, 1);
    assert_eq!(fielding("h5").po, 1);
}

#[test]
fn grand_slam_clears_loaded_bases() {
    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-2",
        "play,1,0,a3,00,X,S7.2-3;1-2",
        "play,1,0,a4,00,X,HR",
    ]);
    let hitter = batting(&machine, 0, "a4");
    assert_eq!((hitter.hr, hitter.hr4, hitter.tb, hitter.rbi, hitter.r), (1, 1, 4, 4, 1));
    for runner in ["a1", "a2", "a3"] {
        assert_eq!(batting(&machine, 0, runner).r, 1, "{runner}");
    }
    assert_eq!(machine.pending().score, [4, 0]);
    assert_eq!(machine.pending().bases.occupied_count(), 0);
    let pitcher = pitching(&machine, 1, "h9");
    assert_eq!((pitcher.r, pitcher.er, pitcher.hr4), (4, 4, 1));
}

#[test]
fn unearned_run_on_home_run() {
    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-2",
        "play,1,0,a3,00,X,S7.2-3;1-2",
        "play,1,0,a4,00,X,HR.3-H(UR)",
    ]);
    let pitcher = pitching(&machine, 1, "h9");
    assert_eq!((pitcher.r, pitcher.er), (4, 3));
}

#[test]
fn strikeout_charged_to_replaced_batter_with_two_strikes() {
    let machine = run(&[
        "play,1,0,a1,12,CBS,NP",
        "sub,a10,\"Pinch Hitter\",0,1,11",
        "play,1,0,a10,12,CBSS,K",
    ]);
    let replaced = batting(&machine, 0, "a1");
    let pinch = batting(&machine, 0, "a10");
    assert_eq!((replaced.so, replaced.pa, replaced.ab), (1, 1, 1));
    assert_eq!((pinch.so, pinch.pa), (0, 0));
    assert_eq!(machine.game().unwrap().team(0).unwrap().player("a10").unwrap().strikeout_owner, None);
    assert_eq!(machine.pending().outs, 1);
}

#[test]
fn strikeout_stays_with_pinch_hitter_before_two_strikes() {
    let machine = run(&[
        "play,1,0,a1,11,CB,NP",
        "sub,a10,\"Pinch Hitter\",0,1,11",
        "play,1,0,a10,12,CBSS,K",
    ]);
    assert_eq!(batting(&machine, 0, "a1").so, 0);
    assert_eq!(batting(&machine, 0, "a10").so, 1);
}

#[test]
fn placed_runner_can_advance() {
    let machine = run(&["radj,a9,2", "play,1,0,a1,00,X,S7.2-H"]);
    assert_eq!(machine.pending().score, [1, 0]);
    assert_eq!(batting(&machine, 0, "a9").r, 1);
    assert_eq!(batting(&machine, 0, "a1").rbi, 1);
    // The placed runner belongs to no pitcher.
    assert_eq!(pitching(&machine, 1, "h9").r, 0);
}

#[test]
fn batting_order_carries_across_half_innings() {
    let lines: Vec<&str> = OPENING_DAY.lines().filter(|l| l.starts_with("play,1,")).collect();
    let machine = run(&lines);
    let game = machine.game().unwrap();
    assert_eq!(game.team(0).unwrap().bpos, 4);
    assert_eq!(game.team(1).unwrap().bpos, 6);
    assert_eq!(machine.pending().next_bpos, 4);
    assert_eq!(machine.pending().outs, 0);
    assert_eq!(machine.pending().score, [0, 2]);
}

#[test]
fn runs_match_batter_credits() {
    let mut machine = GameStateMachine::new(Context::default(), Options::default());
    for line in OPENING_DAY.lines() {
        machine.apply_line(line).unwrap();
    }
    let game = machine.finish().unwrap();
    for (side, team) in game.teams.iter().enumerate() {
        let runs: u32 =
            game.players.iter().filter(|p| &p.team_id == team).filter_map(|p| p.batting.as_ref()).map(|b| b.r).sum();
        assert_eq!(runs, game.final_score[side], "{team}");
    }
    assert!(game.snapshots.iter().all(|s| s.outs <= 3));
    assert_eq!(game.snapshots.iter().filter(|s| s.outs == 3).count(), 2);
}

#[test]
fn pitches_counted_at_end_of_plate_appearance() {
    let mut machine = GameStateMachine::new(Context::default(), Options::default());
    for line in OPENING_DAY.lines() {
        machine.apply_line(line).unwrap();
    }
    let game = machine.finish().unwrap();
    let line = |id: &str| game.players.iter().find(|p| p.player_id == id).unwrap().pitching.clone().unwrap();
    let starter = line("h9");
    assert_eq!((starter.pitch, starter.strike), (14, 9));
    let reliever = line("h10");
    assert_eq!((reliever.pitch, reliever.strike, reliever.out), (4, 4, 1));
}

#[test]
fn no_play_without_tokens_leaves_state_unchanged() {
    let mut machine = run(&["play,1,0,a1,00,X,S7"]);
    let before = machine.pending().clone();
    machine.apply_line("play,1,0,a2,00,,NP").unwrap();
    assert_eq!(machine.pending(), &before);
    assert!(machine.game().unwrap().plate_appearance_open);
}

#[test]
fn fourth_out_is_rejected() {
    let mut machine = run(&["play,1,0,a1,00,X,S7", "play,1,0,a2,00,X,S7.1-2", "play,1,0,a3,00,SSS,K"]);
    let err = machine.apply_line("play,1,0,a4,00,X,5(2)4(1)3").unwrap_err();
    assert!(matches!(err.kind, ScoreError::StateInconsistency { .. }), "{err}");
    assert_eq!(err.game_id.as_deref(), Some("BOS201704040"));
    assert_eq!(machine.pending().outs, 1);
}

#[test]
fn out_of_order_batter_is_fatal_without_boot() {
    let mut machine = run(&[]);
    let err = machine.apply_line("play,1,0,a2,00,X,S7").unwrap_err();
    assert!(matches!(err.kind, ScoreError::StateInconsistency { .. }));
    assert!(err.kind.to_string().contains("1*:a1"), "{}", err.kind);

    machine.apply_line("play,1,0,a2,00,X,S7/BOOT").unwrap();
    let mismatches = machine.take_mismatches();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].kind, MismatchKind::BattingOutOfOrder);
}

#[test]
fn lineup_adjustment_moves_batting_index() {
    let machine = run(&["ladj,0,3", "play,1,0,a3,00,X,S7"]);
    assert_eq!(machine.pending().next_bpos, 3);
    assert_eq!(batting(&machine, 0, "a3").h, 1);
}

#[test]
fn relief_mid_plate_appearance_charges_walk_to_departing_pitcher() {
    let machine = run(&[
        "play,1,0,a1,30,BBB,NP",
        "sub,h10,\"Home Reliever\",1,9,1",
        "play,1,0,a1,30,BBBB,W",
    ]);
    assert_eq!(pitching(&machine, 1, "h9").bb, 1);
    assert_eq!(pitching(&machine, 1, "h10").bb, 0);
    let runner = machine.pending().bases.get(1).unwrap();
    assert_eq!(runner.pitcher.as_deref(), Some("h9"));
    assert_eq!(machine.pending().relief.walk_owner, None);
}

#[test]
fn empty_position_is_recorded_not_fatal() {
    let mut machine = run(&["sub,h10,\"Pinch Hitter\",1,1,11", "play,1,0,a1,00,X,43/G"]);
    assert_eq!(machine.pending().outs, 1);
    let mismatches = machine.take_mismatches();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].kind, MismatchKind::UnresolvedFielder);
}

#[test]
fn substitution_checkpoints() {
    let options = Options { checkpoint_substitutions: true, ..Options::default() };
    let machine = run_with(options, &["play,1,0,a1,00,X,S7", "sub,a10,\"Pinch Runner\",0,1,12"]);
    let game = machine.game().unwrap();
    let last = game.snapshots.last().unwrap();
    assert_eq!(last.trigger, SnapshotTrigger::Substitution);
    assert_eq!(machine.pending().bases.get(1).unwrap().runner, "a10");
}

#[test]
fn records_before_id_are_rejected() {
    let mut machine = GameStateMachine::new(Context::default(), Options::default());
    let err = machine.apply_line("info,visteam,PIT").unwrap_err();
    assert_eq!(err.game_id, None);
    assert!(machine.apply_line("version,2").is_ok());
}

#[test]
fn duplicate_start_is_rejected() {
    let mut machine = run(&[]);
    assert!(machine.apply_line("start,a1,\"Away One\",0,1,4").is_err());
}

#[test]
fn fielders_choice_after_relief_keeps_runners_with_starter() {
    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-2",
        "sub,h10,\"Home Reliever\",1,9,1",
        "play,1,0,a3,00,X,FC6/G.2X3(65);1-2;B-1",
    ]);
    let bases = &machine.pending().bases;
    assert_eq!(bases.get(2).unwrap().runner, "a2");
    assert_eq!(bases.get(2).unwrap().pitcher.as_deref(), Some("h9"));
    assert_eq!(bases.get(1).unwrap().runner, "a3");
    assert_eq!(bases.get(1).unwrap().pitcher.as_deref(), Some("h9"));

    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-2",
        "sub,h10,\"Home Reliever\",1,9,1",
        "play,1,0,a3,00,X,FC6/G.2X3(65);1-2;B-1",
        "play,1,0,a4,00,X,D7.2-H;1-H",
    ]);
    let starter = pitching(&machine, 1, "h9");
    assert_eq!((starter.r, starter.er), (2, 2));
    let reliever = pitching(&machine, 1, "h10");
    assert_eq!((reliever.r, reliever.er, reliever.ir, reliever.irs), (0, 0, 2, 2));
    assert_eq!(batting(&machine, 0, "a4").rbi, 2);
    assert_eq!(machine.pending().bases.get(2).unwrap().pitcher.as_deref(), Some("h10"));
}

#[test]
fn sacrifice_fly_on_error_earns_rbi_with_two_outs() {
    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-3",
        "play,1,0,a3,02,CCS,K",
        "play,1,0,a4,02,CCS,K",
        "play,1,0,a5,00,X,E9/SF.3-H",
    ]);
    let line = batting(&machine, 0, "a5");
    assert_eq!((line.sf, line.ab, line.rbi), (1, 0, 1));
    assert_eq!(machine.pending().score, [1, 0]);
}

#[test]
fn error_with_two_outs_earns_no_rbi() {
    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-3",
        "play,1,0,a3,02,CCS,K",
        "play,1,0,a4,02,CCS,K",
        "play,1,0,a5,00,X,E6/G6.3-H;1-2",
    ]);
    assert_eq!(batting(&machine, 0, "a5").rbi, 0);
    assert_eq!(batting(&machine, 0, "a1").r, 1);
    assert_eq!(machine.pending().score, [1, 0]);
}

#[test]
fn error_on_fly_earns_no_rbi() {
    let machine = run(&["play,1,0,a1,00,X,S7", "play,1,0,a2,00,X,S7.1-3", "play,1,0,a3,00,X,E8/F.3-H"]);
    assert_eq!(batting(&machine, 0, "a3").rbi, 0);
    assert_eq!(machine.pending().score, [1, 0]);
}

#[test]
fn error_run_earns_rbi_only_from_third() {
    let machine = run(&["play,1,0,a1,00,X,S7", "play,1,0,a2,00,X,D7.1-3", "play,1,0,a3,00,X,E6/G6.3-H;2-H"]);
    assert_eq!(machine.pending().score, [2, 0]);
    assert_eq!(batting(&machine, 0, "a3").rbi, 1);
    assert_eq!(batting(&machine, 0, "a2").r, 1);

    let machine = run(&["play,1,0,a1,00,X,S7", "play,1,0,a2,00,X,S7.1-2", "play,1,0,a3,00,X,E6/G6.2-H;1-2"]);
    assert_eq!(machine.pending().score, [1, 0]);
    assert_eq!(batting(&machine, 0, "a3").rbi, 0);
}

#[test]
fn catcher_interference_earns_rbi_only_with_bases_loaded() {
    let machine = run(&[
        "play,1,0,a1,00,X,S7",
        "play,1,0,a2,00,X,S7.1-2",
        "play,1,0,a3,00,X,S7.2-3;1-2",
        "play,1,0,a4,00,X,C/E2",
    ]);
    let line = batting(&machine, 0, "a4");
    assert_eq!((line.pa, line.ab, line.rbi), (1, 0, 1));
    assert_eq!(machine.pending().score, [1, 0]);
    assert_eq!(machine.pending().bases.occupied_count(), 3);

    let machine = run(&["play,1,0,a1,00,X,S7", "play,1,0,a2,00,X,S7.1-3", "play,1,0,a3,00,X,C/E2.3-H;1-2"]);
    assert_eq!(machine.pending().score, [1, 0]);
    assert_eq!(batting(&machine, 0, "a3").rbi, 0);
}
