use crate::PlayCategory;
use crate::engine::tokenize;
use crate::rules::play::rules;

fn classify(event: &str) -> PlayCategory {
    let event = tokenize(event).unwrap();
    crate::engine::classify(&event.code).unwrap()
}

#[test]
fn play_examples_classify() {
    // Array of (expected_category, event)
    let cases: Vec<(PlayCategory, &str)> = vec![
        (PlayCategory::SingleFielderOut, "8/F"),
        (PlayCategory::SingleFielderOut, "8!/F8XD"),
        (PlayCategory::SingleFielderOut, "3/P3F"),
        (PlayCategory::ForceOut, "54(1)/FO/G5"),
        (PlayCategory::ForceOut, "6(1)/FO/G6.B-1"),
        (PlayCategory::FieldedOut, "63/G6"),
        (PlayCategory::FieldedOut, "163/BG"),
        (PlayCategory::FieldedOut, "3(B)/G"),
        (PlayCategory::DoublePlay, "64(1)3/GDP"),
        (PlayCategory::DoublePlay, "8(B)84(2)/LDP/L8"),
        (PlayCategory::DoublePlay, "3(B)3(1)/LDP"),
        (PlayCategory::TriplePlay, "1(B)16(2)63(1)/LTP/L1"),
        (PlayCategory::TriplePlay, "5(2)4(1)3/GTP"),
        (PlayCategory::CatcherInterference, "C/E2.B-1"),
        (PlayCategory::Single, "S7/L7LD.1-2"),
        (PlayCategory::Single, "S"),
        (PlayCategory::Double, "D8/L.2-H"),
        (PlayCategory::Triple, "T9/F9LD"),
        (PlayCategory::GroundRuleDouble, "DGR/L9LS"),
        (PlayCategory::Error, "E6/G6.B-1"),
        (PlayCategory::Error, "E1/TH/BG"),
        (PlayCategory::FieldersChoice, "FC5/G5.3XH(52)"),
        (PlayCategory::FoulFlyError, "FLE5/P5F"),
        (PlayCategory::HomeRun, "HR/F78XD"),
        (PlayCategory::HomeRun, "H9/F9"),
        (PlayCategory::HitByPitch, "HP.1-2"),
        (PlayCategory::Strikeout, "K"),
        (PlayCategory::Strikeout, "K23"),
        (PlayCategory::Strikeout, "K+SB2"),
        (PlayCategory::Strikeout, "K+WP.B-1"),
        (PlayCategory::NoPlay, "NP"),
        (PlayCategory::Walk, "W"),
        (PlayCategory::Walk, "IW"),
        (PlayCategory::Walk, "I"),
        (PlayCategory::Walk, "W+PB.1-2"),
        (PlayCategory::Balk, "BK.3-H;1-2"),
        (PlayCategory::CaughtStealing, "CS2(24)"),
        (PlayCategory::CaughtStealing, "CSH(1E2).3-H(UR)"),
        (PlayCategory::DefensiveIndifference, "DI.1-2"),
        (PlayCategory::OtherAdvance, "OA.2-3"),
        (PlayCategory::PassedBall, "PB.2-3"),
        (PlayCategory::WildPitch, "WP.3-H;1-2"),
        (PlayCategory::Pickoff, "PO1(13)"),
        (PlayCategory::Pickoff, "PO2(E2/TH).2-3"),
        (PlayCategory::PickoffCaughtStealing, "POCS2(1361)"),
        (PlayCategory::StolenBase, "SB2"),
        (PlayCategory::StolenBase, "SB3;SB2"),
        (PlayCategory::StolenBase, "SBH;SB3;SB2"),
    ];

    for (expected, event) in cases {
        assert_eq!(classify(event), expected, "event: {event}");
    }
}

#[test]
fn unknown_codes_are_rejected() {
    for event in ["Q9", "SB4", "PO4(13)", "CS1(24)", "KK", "9(4)(4)"] {
        let event = tokenize(event).unwrap();
        assert!(crate::engine::classify(&event.code).is_err(), "code: {}", event.code);
    }
}

#[test]
fn rule_names_are_unique() {
    let all = rules::get();
    let mut names: Vec<&str> = all.iter().map(|r| r.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), all.len());
}

#[test]
fn plate_appearance_boundaries() {
    let continuing = [
        PlayCategory::NoPlay,
        PlayCategory::StolenBase,
        PlayCategory::CaughtStealing,
        PlayCategory::WildPitch,
        PlayCategory::PickoffCaughtStealing,
        PlayCategory::FoulFlyError,
    ];
    for category in continuing {
        assert!(!category.ends_plate_appearance(), "{category}");
    }
    for category in [PlayCategory::Walk, PlayCategory::Strikeout, PlayCategory::ForceOut, PlayCategory::Error] {
        assert!(category.ends_plate_appearance(), "{category}");
    }
}
