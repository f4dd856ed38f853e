use crate::engine::CodeShape;
use crate::{PlayCategory, PlayRule};

const DIGIT: u8 = CodeShape::LEADING_DIGIT.bits();
const ALPHA: u8 = CodeShape::LEADING_ALPHA.bits();
const PAREN: u8 = CodeShape::HAS_PAREN.bits();
const PLUS: u8 = CodeShape::HAS_PLUS.bits();

// Batted-ball outs

pub fn rule_single_fielder_out() -> PlayRule {
    rule! {
        name: "single fielder out",
        pattern: r"^(\d!?)(E.)?(!+)?$",
        category: PlayCategory::SingleFielderOut,
        shape: DIGIT,
    }
}

pub fn rule_force_out() -> PlayRule {
    rule! {
        name: "force out",
        pattern: r"^(\d(!+)?)+\(\d\)(!+)?$",
        category: PlayCategory::ForceOut,
        shape: DIGIT | PAREN,
    }
}

pub fn rule_multi_fielder_out() -> PlayRule {
    rule! {
        name: "multi fielder out",
        pattern: r"^(\d+(!+)?)+$",
        category: PlayCategory::FieldedOut,
        shape: DIGIT,
    }
}

pub fn rule_batter_put_out() -> PlayRule {
    rule! {
        name: "batter put out",
        pattern: r"^(\d!?)+\(B\)$",
        category: PlayCategory::FieldedOut,
        shape: DIGIT | PAREN,
    }
}

pub fn rule_double_play() -> PlayRule {
    rule! {
        name: "double play",
        pattern: r"^(\d!?)+\([B123]\)(!+)?(\d!?)+(\([B123]\))?$",
        category: PlayCategory::DoublePlay,
        shape: DIGIT | PAREN,
    }
}

pub fn rule_triple_play() -> PlayRule {
    rule! {
        name: "triple play",
        pattern: r"^\d+\([B123]\)\d+\([B123]\)\d+(\([B123]\))?$",
        category: PlayCategory::TriplePlay,
        shape: DIGIT | PAREN,
    }
}

// Batter reaches

pub fn rule_catcher_interference() -> PlayRule {
    rule! {
        name: "catcher interference",
        pattern: r"^C(/E[1-3])?$",
        category: PlayCategory::CatcherInterference,
        shape: ALPHA,
    }
}

pub fn rule_single() -> PlayRule {
    rule! {
        name: "single",
        pattern: r"^S(!+)?((\d!?)+)?$",
        category: PlayCategory::Single,
        shape: ALPHA,
    }
}

pub fn rule_double() -> PlayRule {
    rule! {
        name: "double",
        pattern: r"^D((\d+(!+)?)+)?$",
        category: PlayCategory::Double,
        shape: ALPHA,
    }
}

pub fn rule_triple() -> PlayRule {
    rule! {
        name: "triple",
        pattern: r"^T(\d+)?$",
        category: PlayCategory::Triple,
        shape: ALPHA,
    }
}

pub fn rule_ground_rule_double() -> PlayRule {
    rule! {
        name: "ground rule double",
        pattern: r"^DGR(\d+)?$",
        category: PlayCategory::GroundRuleDouble,
        shape: ALPHA,
    }
}

/// `E6` or `5E3`: the leading fielder list is optional, so no shape is required.
pub fn rule_error() -> PlayRule {
    rule! {
        name: "error",
        pattern: r"^(\d+)?E\d$",
        category: PlayCategory::Error,
    }
}

pub fn rule_fielders_choice() -> PlayRule {
    rule! {
        name: "fielder's choice",
        pattern: r"^FC(\d!?)?$",
        category: PlayCategory::FieldersChoice,
        shape: ALPHA,
    }
}

pub fn rule_foul_fly_error() -> PlayRule {
    rule! {
        name: "foul fly error",
        pattern: r"^FLE\d#?$",
        category: PlayCategory::FoulFlyError,
        shape: ALPHA,
    }
}

pub fn rule_home_run() -> PlayRule {
    rule! {
        name: "home run",
        pattern: r"^HR?(\d+)?$",
        category: PlayCategory::HomeRun,
        shape: ALPHA,
    }
}

pub fn rule_hit_by_pitch() -> PlayRule {
    rule! {
        name: "hit by pitch",
        pattern: r"^HP$",
        category: PlayCategory::HitByPitch,
        shape: ALPHA,
    }
}

pub fn rule_strikeout() -> PlayRule {
    rule! {
        name: "strikeout",
        pattern: r"^K((\d!?)+)?$",
        category: PlayCategory::Strikeout,
        shape: ALPHA,
    }
}

pub fn rule_strikeout_with_event() -> PlayRule {
    rule! {
        name: "strikeout + event",
        pattern: r"^K((\d!?)+)?\+",
        category: PlayCategory::Strikeout,
        shape: ALPHA | PLUS,
    }
}

pub fn rule_no_play() -> PlayRule {
    rule! {
        name: "no play",
        pattern: r"^NP$",
        category: PlayCategory::NoPlay,
        shape: ALPHA,
    }
}

pub fn rule_walk() -> PlayRule {
    rule! {
        name: "walk",
        pattern: r"^(I|IW|W)$",
        category: PlayCategory::Walk,
        shape: ALPHA,
    }
}

pub fn rule_walk_with_event() -> PlayRule {
    rule! {
        name: "walk + event",
        pattern: r"^I?W\+",
        category: PlayCategory::Walk,
        shape: ALPHA | PLUS,
    }
}

// Base running

pub fn rule_balk() -> PlayRule {
    rule! {
        name: "balk",
        pattern: r"^BK$",
        category: PlayCategory::Balk,
        shape: ALPHA,
    }
}

pub fn rule_caught_stealing() -> PlayRule {
    rule! {
        name: "caught stealing",
        pattern: r"^CS[23H]",
        category: PlayCategory::CaughtStealing,
        shape: ALPHA,
    }
}

pub fn rule_defensive_indifference() -> PlayRule {
    rule! {
        name: "defensive indifference",
        pattern: r"^DI$",
        category: PlayCategory::DefensiveIndifference,
        shape: ALPHA,
    }
}

pub fn rule_other_advance() -> PlayRule {
    rule! {
        name: "other advance",
        pattern: r"^OA$",
        category: PlayCategory::OtherAdvance,
        shape: ALPHA,
    }
}

pub fn rule_passed_ball() -> PlayRule {
    rule! {
        name: "passed ball",
        pattern: r"^PB$",
        category: PlayCategory::PassedBall,
        shape: ALPHA,
    }
}

pub fn rule_wild_pitch() -> PlayRule {
    rule! {
        name: "wild pitch",
        pattern: r"^WP$",
        category: PlayCategory::WildPitch,
        shape: ALPHA,
    }
}

pub fn rule_pickoff() -> PlayRule {
    rule! {
        name: "pickoff",
        pattern: r"^PO[123](\(.+\))?$",
        category: PlayCategory::Pickoff,
        shape: ALPHA,
    }
}

pub fn rule_pickoff_caught_stealing() -> PlayRule {
    rule! {
        name: "pickoff caught stealing",
        pattern: r"^POCS[23H]",
        category: PlayCategory::PickoffCaughtStealing,
        shape: ALPHA,
    }
}

pub fn rule_stolen_base() -> PlayRule {
    rule! {
        name: "stolen base",
        pattern: r"^SB[23H](\(.+?\))?(;SB[23H](\(.+?\))?){0,2}$",
        category: PlayCategory::StolenBase,
        shape: ALPHA,
    }
}

/// The ordered play rule list. Position is priority.
pub fn get() -> Vec<PlayRule> {
    vec![
        rule_single_fielder_out(),
        rule_force_out(),
        rule_multi_fielder_out(),
        rule_batter_put_out(),
        rule_double_play(),
        rule_triple_play(),
        rule_catcher_interference(),
        rule_single(),
        rule_double(),
        rule_triple(),
        rule_ground_rule_double(),
        rule_error(),
        rule_fielders_choice(),
        rule_foul_fly_error(),
        rule_home_run(),
        rule_hit_by_pitch(),
        rule_strikeout(),
        rule_strikeout_with_event(),
        rule_no_play(),
        rule_walk(),
        rule_walk_with_event(),
        rule_balk(),
        rule_caught_stealing(),
        rule_defensive_indifference(),
        rule_other_advance(),
        rule_passed_ball(),
        rule_wild_pitch(),
        rule_pickoff(),
        rule_pickoff_caught_stealing(),
        rule_stolen_base(),
    ]
}
