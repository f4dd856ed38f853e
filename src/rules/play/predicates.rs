//! Modifier predicates.
//!
//! A play's modifiers (`/G`, `/SF`, `/BP5`, `/GDP`, ...) decide batted-ball
//! type credits and sacrifice handling. Every predicate takes the full
//! modifier list of one play.

fn any(modifiers: &[String], pred: impl Fn(&str) -> bool) -> bool {
    modifiers.iter().any(|m| pred(m.as_str()))
}

/// Returns true when a modifier equals `tag` exactly.
pub fn has_modifier(modifiers: &[String], tag: &str) -> bool {
    any(modifiers, |m| m == tag)
}

/// Bunt grounder or bunt pop (`BG`, `BP5`, `BGDP`, ...).
pub fn is_bunt(modifiers: &[String]) -> bool {
    any(modifiers, |m| regex!(r"^B[GP]\d?(DP)?(LF)?$").is_match(m))
}

pub fn is_sacrifice_hit(modifiers: &[String]) -> bool {
    has_modifier(modifiers, "SH")
}

pub fn is_sacrifice_fly(modifiers: &[String]) -> bool {
    has_modifier(modifiers, "SF")
}

pub fn is_sacrifice(modifiers: &[String]) -> bool {
    is_sacrifice_hit(modifiers) || is_sacrifice_fly(modifiers)
}

/// Ground ball that is neither a bunt nor a sacrifice.
pub fn is_ground_ball(modifiers: &[String]) -> bool {
    if is_sacrifice(modifiers) || is_bunt(modifiers) {
        return false;
    }
    any(modifiers, |m| regex!(r"^G(\d+[A-Z]*)?#?[+-]?$").is_match(m) || regex!(r"^G[DT]P#?$").is_match(m))
}

/// Fly ball, line drive or pop up that is not a bunt.
pub fn is_air_ball(modifiers: &[String]) -> bool {
    if is_bunt(modifiers) {
        return false;
    }
    any(modifiers, |m| {
        regex!(r"^\d?F(\d?[A-NP-Z]*)?[+-]?$").is_match(m)
            || regex!(r"^L(\d*[A-Z]*)?[+-]?$").is_match(m)
            || regex!(r"^[FL]DP$").is_match(m)
            || regex!(r"^P(\d*[A-Z]*)?[+-]?$").is_match(m)
            || m == "IF"
    })
}

pub fn is_ground_into_double_play(modifiers: &[String]) -> bool {
    any(modifiers, |m| m == "GDP" || m == "GDP#")
}

pub fn is_ground_into_triple_play(modifiers: &[String]) -> bool {
    any(modifiers, |m| m == "GTP" || m == "GTP#")
}

pub fn is_line_drive_double_play(modifiers: &[String]) -> bool {
    has_modifier(modifiers, "LDP")
}

pub fn is_line_drive_triple_play(modifiers: &[String]) -> bool {
    has_modifier(modifiers, "LTP")
}

/// Intentional walk code (`I` or `IW`, with or without a trailing event).
pub fn is_intentional_walk(code: &str) -> bool {
    code.starts_with('I')
}
