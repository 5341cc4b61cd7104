//! Enforcement-aware selection of what to surface from a ranked list.
//!
//! | mode     | required present | result                                     |
//! |----------|------------------|--------------------------------------------|
//! | classic  | ignored          | top candidate only                         |
//! | enhanced | yes              | best required candidate, alone             |
//! | enhanced | no               | suggested then optional, `max_count` total |

use crate::index::Enforcement;
use crate::ranker::ScoredSkill;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Single best match, enforcement ignored
    #[default]
    Classic,
    /// Required-alone or grouped suggested/optional
    Enhanced,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Classic => "classic",
            OutputMode::Enhanced => "enhanced",
        }
    }
}

/// Presentation group a selected skill belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Required,
    Suggested,
    Optional,
}

/// What the presentation layer receives. Branches are mutually exclusive, so a
/// required skill can never appear next to suggestions.
#[derive(Debug, Clone)]
pub enum SelectionResult<'a> {
    Classic {
        best: Option<ScoredSkill<'a>>,
    },
    Required(ScoredSkill<'a>),
    Grouped {
        suggested: Vec<ScoredSkill<'a>>,
        optional: Vec<ScoredSkill<'a>>,
    },
}

impl<'a> SelectionResult<'a> {
    pub fn mode(&self) -> OutputMode {
        match self {
            SelectionResult::Classic { .. } => OutputMode::Classic,
            _ => OutputMode::Enhanced,
        }
    }

    pub fn required(&self) -> Option<&ScoredSkill<'a>> {
        match self {
            SelectionResult::Required(skill) => Some(skill),
            _ => None,
        }
    }

    /// Classic mode exposes its single pick here.
    pub fn suggested(&self) -> &[ScoredSkill<'a>] {
        match self {
            SelectionResult::Classic { best } => best.as_slice(),
            SelectionResult::Grouped { suggested, .. } => suggested,
            SelectionResult::Required(_) => &[],
        }
    }

    pub fn optional(&self) -> &[ScoredSkill<'a>] {
        match self {
            SelectionResult::Grouped { optional, .. } => optional,
            _ => &[],
        }
    }

    /// Every selected skill with its bucket, in presentation order.
    pub fn items(&self) -> Vec<(Bucket, &ScoredSkill<'a>)> {
        let mut items: Vec<(Bucket, &ScoredSkill<'a>)> = Vec::new();
        if let Some(required) = self.required() {
            items.push((Bucket::Required, required));
        }
        items.extend(self.suggested().iter().map(|s| (Bucket::Suggested, s)));
        items.extend(self.optional().iter().map(|s| (Bucket::Optional, s)));
        items
    }

    pub fn len(&self) -> usize {
        usize::from(self.required().is_some()) + self.suggested().len() + self.optional().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decide the visible subset of an already-ranked candidate list.
pub fn select(ranked: Vec<ScoredSkill<'_>>, mode: OutputMode, max_count: usize) -> SelectionResult<'_> {
    match mode {
        OutputMode::Classic => SelectionResult::Classic {
            best: ranked.into_iter().next(),
        },
        OutputMode::Enhanced => select_enhanced(ranked, max_count),
    }
}

fn select_enhanced(mut ranked: Vec<ScoredSkill<'_>>, max_count: usize) -> SelectionResult<'_> {
    let max_count = if max_count == 0 {
        warn!("max_suggestions must be at least 1, using 1");
        1
    } else {
        max_count
    };

    // Ranked order means the first required candidate is the best one
    if let Some(pos) = ranked
        .iter()
        .position(|s| s.skill.enforcement == Enforcement::Required)
    {
        return SelectionResult::Required(ranked.swap_remove(pos));
    }

    let (mut suggested, mut optional): (Vec<_>, Vec<_>) = ranked
        .into_iter()
        .partition(|s| s.skill.enforcement == Enforcement::Suggested);

    // Combined cap, suggested first
    suggested.truncate(max_count);
    optional.truncate(max_count - suggested.len());

    SelectionResult::Grouped {
        suggested,
        optional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SkillDescriptor;
    use crate::matcher::MatchEvidence;

    fn skill(id: &str, enforcement: Enforcement) -> SkillDescriptor {
        SkillDescriptor::new(id).with_enforcement(enforcement)
    }

    /// Scores descend in list order.
    fn ranked(skills: &[SkillDescriptor]) -> Vec<ScoredSkill<'_>> {
        skills
            .iter()
            .enumerate()
            .map(|(i, skill)| ScoredSkill {
                skill,
                confidence: 100.0 - i as f64,
                evidence: MatchEvidence::default(),
            })
            .collect()
    }

    fn ids(skills: &[ScoredSkill<'_>]) -> Vec<String> {
        skills.iter().map(|s| s.id().to_string()).collect()
    }

    fn fixture() -> Vec<SkillDescriptor> {
        vec![
            skill("s1", Enforcement::Suggested),
            skill("o1", Enforcement::Optional),
            skill("r1", Enforcement::Required),
            skill("s2", Enforcement::Suggested),
            skill("r2", Enforcement::Required),
            skill("o2", Enforcement::Optional),
        ]
    }

    #[test]
    fn test_classic_returns_top_and_ignores_enforcement() {
        let skills = fixture();
        let result = select(ranked(&skills), OutputMode::Classic, 5);
        assert_eq!(result.mode(), OutputMode::Classic);
        assert!(result.required().is_none());
        assert_eq!(ids(result.suggested()), vec!["s1"]);
        assert!(result.optional().is_empty());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_classic_with_required_on_top_is_still_suggested() {
        let skills = vec![skill("r1", Enforcement::Required)];
        let result = select(ranked(&skills), OutputMode::Classic, 3);
        assert!(result.required().is_none());
        assert_eq!(ids(result.suggested()), vec!["r1"]);
    }

    #[test]
    fn test_required_suppresses_everything_else() {
        let skills = fixture();
        let result = select(ranked(&skills), OutputMode::Enhanced, 5);
        assert_eq!(result.required().map(|s| s.id()), Some("r1"));
        assert!(result.suggested().is_empty());
        assert!(result.optional().is_empty());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_grouped_keeps_buckets_and_caps_total() {
        let skills: Vec<SkillDescriptor> = fixture()
            .into_iter()
            .filter(|s| s.enforcement != Enforcement::Required)
            .collect();

        let result = select(ranked(&skills), OutputMode::Enhanced, 3);
        assert_eq!(ids(result.suggested()), vec!["s1", "s2"]);
        assert_eq!(ids(result.optional()), vec!["o1"]);
        assert_eq!(result.len(), 3);

        let result = select(ranked(&skills), OutputMode::Enhanced, 1);
        assert_eq!(ids(result.suggested()), vec!["s1"]);
        assert!(result.optional().is_empty());
    }

    #[test]
    fn test_suggested_fill_before_optional_even_when_optional_scores_higher() {
        let skills = vec![
            skill("o1", Enforcement::Optional),
            skill("o2", Enforcement::Optional),
            skill("s1", Enforcement::Suggested),
        ];
        let result = select(ranked(&skills), OutputMode::Enhanced, 2);
        assert_eq!(ids(result.suggested()), vec!["s1"]);
        assert_eq!(ids(result.optional()), vec!["o1"]);
    }

    #[test]
    fn test_never_exceeds_max_count() {
        let skills: Vec<SkillDescriptor> = (0..10)
            .map(|i| {
                let enforcement = if i % 2 == 0 {
                    Enforcement::Suggested
                } else {
                    Enforcement::Optional
                };
                skill(&format!("k{}", i), enforcement)
            })
            .collect();
        for max in 1..=12 {
            let result = select(ranked(&skills), OutputMode::Enhanced, max);
            assert!(result.len() <= max);
            assert_eq!(result.len(), max.min(10));
        }
    }

    #[test]
    fn test_zero_max_count_treated_as_one() {
        let skills = fixture();
        let no_required: Vec<SkillDescriptor> = skills
            .into_iter()
            .filter(|s| s.enforcement != Enforcement::Required)
            .collect();
        let result = select(ranked(&no_required), OutputMode::Enhanced, 0);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_empty_ranked_list() {
        let classic = select(Vec::new(), OutputMode::Classic, 3);
        assert!(classic.is_empty());

        let enhanced = select(Vec::new(), OutputMode::Enhanced, 3);
        assert!(enhanced.is_empty());
        assert_eq!(enhanced.mode(), OutputMode::Enhanced);
    }

    #[test]
    fn test_items_carry_buckets() {
        let skills = vec![
            skill("s1", Enforcement::Suggested),
            skill("o1", Enforcement::Optional),
        ];
        let result = select(ranked(&skills), OutputMode::Enhanced, 3);
        let buckets: Vec<(Bucket, String)> = result
            .items()
            .into_iter()
            .map(|(b, s)| (b, s.id().to_string()))
            .collect();
        assert_eq!(
            buckets,
            vec![
                (Bucket::Suggested, "s1".to_string()),
                (Bucket::Optional, "o1".to_string()),
            ]
        );
    }
}
