//! Threshold filtering and deterministic ordering of scored skills.

use crate::index::SkillDescriptor;
use crate::matcher::MatchEvidence;
use std::cmp::Ordering;

/// A skill with its confidence for one message. Borrows from the index snapshot.
#[derive(Debug, Clone)]
pub struct ScoredSkill<'a> {
    pub skill: &'a SkillDescriptor,
    pub confidence: f64,
    pub evidence: MatchEvidence,
}

impl<'a> ScoredSkill<'a> {
    pub fn id(&self) -> &'a str {
        &self.skill.id
    }
}

/// Whether a scored skill clears the threshold that applies to it.
///
/// `threshold_override` replaces per-skill thresholds, but a skill whose own
/// threshold is not positive stays ineligible either way.
fn is_eligible(scored: &ScoredSkill<'_>, threshold_override: Option<f64>) -> bool {
    if !scored.skill.has_valid_threshold() {
        return false;
    }
    let threshold = threshold_override.unwrap_or(scored.skill.confidence_threshold);
    scored.confidence > threshold
}

/// Confidence descending, then priority (high first), then id ascending.
fn rank_order(a: &ScoredSkill<'_>, b: &ScoredSkill<'_>) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.skill.priority.rank().cmp(&b.skill.priority.rank()))
        .then_with(|| a.skill.id.cmp(&b.skill.id))
}

/// Drop skills at or below their threshold and sort the rest. No truncation.
pub fn rank<'a>(scored: Vec<ScoredSkill<'a>>) -> Vec<ScoredSkill<'a>> {
    rank_with_threshold(scored, None)
}

pub fn rank_with_threshold<'a>(
    scored: Vec<ScoredSkill<'a>>,
    threshold_override: Option<f64>,
) -> Vec<ScoredSkill<'a>> {
    let mut ranked: Vec<ScoredSkill<'a>> = scored
        .into_iter()
        .filter(|s| is_eligible(s, threshold_override))
        .collect();
    ranked.sort_by(rank_order);
    ranked
}
