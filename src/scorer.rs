//! Confidence scoring: weight table, primary-keyword boost, priority multiplier.

use crate::index::SkillDescriptor;
use crate::matcher::{MatchEvidence, MatchKind};

// ============================================================================
// Scoring Weights
// ============================================================================

/// Base weight of each match kind. Single source of truth for scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    /// Single-word keyword, whole word
    pub exact: f64,
    /// Multi-word keyword phrase
    pub compound: f64,
    /// Use-case word overlap
    pub use_case: f64,
    /// Category tag
    pub tag: f64,
    /// Keyword as word prefix only
    pub partial: f64,
    /// Intent regex hit
    pub intent: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            exact: 3.0,
            compound: 2.5,
            use_case: 2.5,
            tag: 2.0,
            partial: 1.5,
            intent: 2.5,
        }
    }
}

impl MatchWeights {
    pub fn weight(&self, kind: MatchKind) -> f64 {
        match kind {
            MatchKind::Exact => self.exact,
            MatchKind::Compound => self.compound,
            MatchKind::UseCase => self.use_case,
            MatchKind::Tag => self.tag,
            MatchKind::Partial => self.partial,
            MatchKind::Intent => self.intent,
        }
    }
}

/// Extra factor added to an entry derived from a primary keyword (1.0 = doubled)
const PRIMARY_BOOST: f64 = 1.0;

// ============================================================================
// Scoring
// ============================================================================

/// Sum of evidence weights (primary entries doubled) times the priority multiplier.
///
/// The result is unbounded; it is an ordinal, not a probability.
pub fn score(evidence: &MatchEvidence, skill: &SkillDescriptor) -> f64 {
    let base: f64 = evidence
        .entries()
        .iter()
        .map(|e| {
            if e.primary {
                e.weight + e.weight * PRIMARY_BOOST
            } else {
                e.weight
            }
        })
        .sum();

    base * skill.priority.multiplier()
}

/// Calculate relative score (0.0 to 1.0) against a caller-chosen normalizer
pub fn relative_score(confidence: f64, normalizer: f64) -> f64 {
    if normalizer <= 0.0 {
        return 0.0;
    }
    (confidence / normalizer).min(1.0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Priority;
    use crate::matcher::match_skill;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_weight_table() {
        let w = MatchWeights::default();
        assert_eq!(w.weight(MatchKind::Exact), 3.0);
        assert_eq!(w.weight(MatchKind::Compound), 2.5);
        assert_eq!(w.weight(MatchKind::UseCase), 2.5);
        assert_eq!(w.weight(MatchKind::Tag), 2.0);
        assert_eq!(w.weight(MatchKind::Partial), 1.5);
        assert_eq!(w.weight(MatchKind::Intent), 2.5);
    }

    #[test]
    fn test_primary_keywords_doubled() {
        let skill = SkillDescriptor::new("debugging")
            .with_keywords(["debug", "error", "fix"])
            .with_priority(Priority::High);
        let evidence = match_skill("help me debug this error", &skill);
        assert_close(score(&evidence, &skill), 18.0);
    }

    #[test]
    fn test_moving_keyword_out_of_primary_window_lowers_score() {
        let inside = SkillDescriptor::new("s").with_keywords(["deploy", "a", "b", "c"]);
        let outside = SkillDescriptor::new("s").with_keywords(["a", "b", "c", "deploy"]);
        let message = "deploy now";

        let s_inside = score(&match_skill(message, &inside), &inside);
        let s_outside = score(&match_skill(message, &outside), &outside);
        assert_close(s_inside, 6.0);
        assert_close(s_outside, 3.0);
    }

    #[test]
    fn test_primary_boost_applies_to_partial() {
        let skill = SkillDescriptor::new("s").with_keywords(["deploy"]);
        let evidence = match_skill("deployment failed", &skill);
        assert_close(score(&evidence, &skill), 3.0);
    }

    #[test]
    fn test_priority_multiplier_applied_once() {
        let base = SkillDescriptor::new("s")
            .with_keywords(["x1", "x2", "x3", "alpha", "beta"])
            .with_tags(["ops"]);
        let message = "alpha beta ops";

        let high = base.clone().with_priority(Priority::High);
        let low = base.with_priority(Priority::Low);

        let s_high = score(&match_skill(message, &high), &high);
        let s_low = score(&match_skill(message, &low), &low);
        assert_close(s_high, 8.0 * 1.5);
        assert_close(s_low, 8.0 * 0.7);
        assert_close(s_high / s_low, 1.5 / 0.7);
    }

    #[test]
    fn test_no_evidence_scores_zero() {
        let skill = SkillDescriptor::new("s").with_keywords(["docker"]);
        assert_eq!(score(&match_skill("hello world", &skill), &skill), 0.0);
    }

    #[test]
    fn test_calculate_relative_score() {
        assert_eq!(relative_score(5.0, 10.0), 0.5);
        assert_eq!(relative_score(10.0, 10.0), 1.0);
        assert_eq!(relative_score(20.0, 10.0), 1.0);
        assert_eq!(relative_score(0.0, 10.0), 0.0);
        assert_eq!(relative_score(5.0, 0.0), 0.0);
    }
}
