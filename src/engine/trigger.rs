//! Shape scanning (play-code pre-classification).
//!
//! Before any regular expression runs, the play code is scanned once for a
//! handful of coarse features. Rules declare the features they need, and the
//! classifier only attempts rules whose requirements are all present.
//!
//! ## Design notes
//!
//! - The scan is a *filter*, never a decision. A false positive only costs one
//!   extra regex attempt; a false negative would hide a valid rule, so every
//!   bit here must be a strict necessary condition for the rules that use it.
//! - Play codes are short ASCII strings, so the scan works on bytes.

use super::compiled_rules::CodeShape;

/// Coarse features of one play code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeInfo {
    pub shape: CodeShape,
}

impl ShapeInfo {
    pub fn scan(code: &str) -> Self {
        let mut shape = CodeShape::empty();
        let bytes = code.as_bytes();

        match bytes.first() {
            Some(b) if b.is_ascii_digit() => shape |= CodeShape::LEADING_DIGIT,
            Some(b) if b.is_ascii_uppercase() => shape |= CodeShape::LEADING_ALPHA,
            _ => {}
        }

        if bytes.contains(&b'(') {
            shape |= CodeShape::HAS_PAREN;
        }
        if bytes.contains(&b'+') {
            shape |= CodeShape::HAS_PLUS;
        }

        ShapeInfo { shape }
    }
}
