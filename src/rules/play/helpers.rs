//! Small parsing helpers shared by the play handlers and the advancement engine.

/// Parenthesised groups of a code or advancement token, innermost text only.
pub fn indicators(text: &str) -> Vec<String> {
    regex!(r"\((.*?)\)").captures_iter(text).map(|c| c[1].to_string()).collect()
}

/// A putout indicator names the fielders that retired a runner (`(25)`,
/// `(8!2)`, `(3/TH)`).
pub fn is_putout_indicator(indicator: &str) -> bool {
    regex!(r"^(\d+!?)+(/TH)?$").is_match(indicator)
}

/// An error indicator charges a fielder (`E5`, `2E4/TH`).
pub fn is_error_indicator(indicator: &str) -> bool {
    indicator.contains('E')
}

/// Bases named inside parentheses of an out code, in order (`64(1)3` -> `['1']`).
pub fn retired_bases(code: &str) -> Vec<char> {
    indicators(code).iter().filter_map(|i| i.chars().next()).filter(|c| matches!(c, 'B' | '1' | '2' | '3')).collect()
}

/// First fielder of a code, if the code starts with a digit.
pub fn first_fielder(code: &str) -> Option<u8> {
    code.chars().next().and_then(|c| c.to_digit(10)).map(|d| d as u8)
}

/// Target base of a steal-like code (`SB2`, `CS3(25)`, `POCSH(1361)`).
/// `H` maps to 4.
pub fn target_base(c: char) -> Option<u8> {
    match c {
        '2' => Some(2),
        '3' => Some(3),
        'H' => Some(4),
        _ => None,
    }
}

/// Written form of a base number inside an advancement token.
pub fn base_token(base: u8) -> String {
    if base >= 4 { "H".to_string() } else { base.to_string() }
}

const PITCH_CODES: &str = "BCFHIKLMOPQRSTUVXY";
const STRIKE_CODES: &str = "CFKLMOQRSTXY";

/// Number of pitches and strikes in a pitch sequence. Pickoff throws,
/// catcher blocks and other non-pitch markers are ignored.
pub fn count_pitches(sequence: &str) -> (u32, u32) {
    sequence.chars().fold((0, 0), |(pitches, strikes), c| {
        (pitches + u32::from(PITCH_CODES.contains(c)), strikes + u32::from(STRIKE_CODES.contains(c)))
    })
}

/// Putouts, assists and errors described by a fielding string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldingCredits {
    pub putouts: Vec<u8>,
    pub assists: Vec<u8>,
    pub errors: Vec<u8>,
}

impl FieldingCredits {
    fn close_segment(&mut self, segment: &mut Vec<u8>) {
        if let Some((&last, rest)) = segment.split_last() {
            self.putouts.push(last);
            self.assists.extend(rest.iter().copied());
        }
        segment.clear();
    }

    fn dedup_assists(&mut self) {
        let mut seen = Vec::with_capacity(self.assists.len());
        self.assists.retain(|f| {
            if seen.contains(f) {
                false
            } else {
                seen.push(*f);
                true
            }
        });
    }
}

/// Split a fielding string into credits.
///
/// Each run of digits closed by a parenthetical (or the end of the string) is
/// one out: the last fielder made the putout and the others assisted. `E<n>`
/// charges an error to `n` and turns the fielders before it into assists
/// without a putout. Letters and markers (`!`, `#`, `/TH`) are skipped.
pub fn fielding_credits(text: &str) -> FieldingCredits {
    let mut credits = FieldingCredits::default();
    let mut segment: Vec<u8> = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '0'..='9' => segment.push(c as u8 - b'0'),
            'E' => {
                if let Some(d) = chars.peek().and_then(|n| n.to_digit(10)) {
                    chars.next();
                    credits.errors.push(d as u8);
                    credits.assists.append(&mut segment);
                }
            }
            '(' => {
                credits.close_segment(&mut segment);
                for inner in chars.by_ref() {
                    if inner == ')' {
                        break;
                    }
                }
            }
            '/' => break,
            _ => {}
        }
    }
    credits.close_segment(&mut segment);
    credits.dedup_assists();
    credits
}
