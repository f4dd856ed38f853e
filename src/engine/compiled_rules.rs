//! Rule compilation, indexing and classification.
//!
//! This module holds the *static* side of the classifier: the structures
//! derived from the ordered rule list that let a single play code be matched
//! without walking every pattern.
//!
//! Classification is split into two phases:
//!
//! 1. **Compile/index rules** (once per process): build `CompiledRules` from
//!    the rule list and index every rule by the shape bits it requires.
//! 2. **Classify** (per play): scan the code (`trigger.rs`), collect the rules
//!    enabled by the scan, and try them *in list order*. First match wins.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `CompiledRules::rules` and `CompiledRules::metas`.
//!   Those vectors must stay aligned.
//! - The active set is always visited in ascending `RuleId` order, so gating
//!   never changes which rule wins.
//! - `RuleIndex::by_shape` uses fixed indices (`SHAPE_*`) to avoid `HashMap`
//!   overhead in the hot path.

use super::trigger::ShapeInfo;
use crate::error::{Result, ScoreError};
use crate::{PlayCategory, PlayRule};
use once_cell::sync::Lazy;

/// Rule identifier (index into the rules vector).
pub(crate) type RuleId = usize;

bitflags::bitflags! {
    /// Coarse shape features of a play code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CodeShape: u8 {
        const LEADING_DIGIT = 1 << 0;
        const LEADING_ALPHA = 1 << 1;
        const HAS_PAREN     = 1 << 2;
        const HAS_PLUS      = 1 << 3;
    }
}

pub const SHAPE_COUNT: usize = 4;
pub const SHAPE_LEADING_DIGIT: usize = 0;
pub const SHAPE_LEADING_ALPHA: usize = 1;
pub const SHAPE_HAS_PAREN: usize = 2;
pub const SHAPE_HAS_PLUS: usize = 3;

const SHAPE_SLOTS: [(CodeShape, usize); SHAPE_COUNT] = [
    (CodeShape::LEADING_DIGIT, SHAPE_LEADING_DIGIT),
    (CodeShape::LEADING_ALPHA, SHAPE_LEADING_ALPHA),
    (CodeShape::HAS_PAREN, SHAPE_HAS_PAREN),
    (CodeShape::HAS_PLUS, SHAPE_HAS_PLUS),
];

#[derive(Clone, Copy, Debug)]
pub struct RuleMeta {
    pub shape: CodeShape,
}

#[derive(Default, Debug)]
pub struct RuleIndex {
    pub always_on: Vec<RuleId>,
    pub by_shape: [Vec<RuleId>; SHAPE_COUNT],
}

/// Pre-compiled rule set with metadata and indexes.
#[derive(Debug)]
pub struct CompiledRules<'a> {
    pub(crate) rules: Vec<&'a PlayRule>,
    pub metas: Vec<RuleMeta>,
    pub index: RuleIndex,
}

/// The outcome of classifying one play code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: PlayCategory,
    pub rule: &'static str,
    /// How many regexes were attempted before the match.
    pub attempts: usize,
}

impl<'a> CompiledRules<'a> {
    pub(crate) fn new(rules: &'a [PlayRule]) -> Self {
        let rule_refs: Vec<&PlayRule> = rules.iter().collect();
        let metas: Vec<RuleMeta> = rule_refs
            .iter()
            .map(|r| RuleMeta { shape: CodeShape::from_bits_truncate(r.shape) })
            .collect();

        let mut index = RuleIndex::default();
        for (id, meta) in metas.iter().enumerate() {
            if meta.shape.is_empty() {
                index.always_on.push(id);
                continue;
            }
            for (bit, slot) in SHAPE_SLOTS {
                if meta.shape.contains(bit) {
                    index.by_shape[slot].push(id);
                }
            }
        }

        CompiledRules { rules: rule_refs, metas, index }
    }

    /// Rule ids worth attempting for `info`, in priority order.
    pub fn active_rules(&self, info: &ShapeInfo) -> Vec<RuleId> {
        let mut active = self.index.always_on.clone();
        for (bit, slot) in SHAPE_SLOTS {
            if info.shape.contains(bit) {
                active.extend(self.index.by_shape[slot].iter().copied().filter(|&id| info.shape.contains(self.metas[id].shape)));
            }
        }
        active.sort_unstable();
        active.dedup();
        active
    }

    /// Select the category of a play code. The first matching rule wins.
    pub fn classify(&self, code: &str) -> Result<Classification> {
        let info = ShapeInfo::scan(code);
        let mut attempts = 0;
        for id in self.active_rules(&info) {
            let rule = self.rules[id];
            attempts += 1;
            if rule.pattern.is_match(code) {
                return Ok(Classification { category: rule.category, rule: rule.name, attempts });
            }
        }
        Err(ScoreError::grammar("play code", code))
    }
}

static DEFAULT_RULES: Lazy<Vec<PlayRule>> = Lazy::new(crate::rules::play::rules::get);
static COMPILED_DEFAULT_RULES: Lazy<CompiledRules<'static>> = Lazy::new(|| CompiledRules::new(&DEFAULT_RULES));

/// The process-wide compiled play rule set.
pub(crate) fn default_rules() -> &'static CompiledRules<'static> {
    &COMPILED_DEFAULT_RULES
}
