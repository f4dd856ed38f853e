//! Splitting of a raw play event into its three sections.
//!
//! `64(1)3/GDP/G6.2-3;3-H(NR)` becomes code `64(1)3`, modifiers
//! `[GDP, G6]` and advances `[2-3, 3-H(NR)]`. Separators inside parentheses
//! belong to the enclosing part.

use crate::error::{Result, ScoreError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayEvent {
    pub code: String,
    pub modifiers: Vec<String>,
    pub advances: Vec<String>,
}

pub fn tokenize(event: &str) -> Result<PlayEvent> {
    let mut depth: usize = 0;
    let mut modifiers_at: Option<usize> = None;
    let mut advances_at: Option<usize> = None;

    for (i, c) in event.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| ScoreError::grammar("event parentheses", event))?;
            }
            '/' if depth == 0 && modifiers_at.is_none() && advances_at.is_none() => modifiers_at = Some(i),
            '.' if depth == 0 => {
                if advances_at.is_some() {
                    return Err(ScoreError::grammar("event separators", event));
                }
                advances_at = Some(i);
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ScoreError::grammar("event parentheses", event));
    }

    let code_end = modifiers_at.or(advances_at).unwrap_or(event.len());
    let code = &event[..code_end];
    if code.is_empty() {
        return Err(ScoreError::grammar("play code", event));
    }

    let modifiers = match modifiers_at {
        Some(start) => split_top_level(&event[start + 1..advances_at.unwrap_or(event.len())], '/'),
        None => Vec::new(),
    };
    let advances = match advances_at {
        Some(start) => split_top_level(&event[start + 1..], ';'),
        None => Vec::new(),
    };

    Ok(PlayEvent { code: code.to_string(), modifiers, advances })
}

fn split_top_level(section: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in section.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&section[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&section[start..]);
    parts.into_iter().filter(|p| !p.is_empty()).map(str::to_string).collect()
}
