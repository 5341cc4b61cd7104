//! Machine-readable diagnostics for the `rank --json` and `list --json` modes.

use crate::engine::Evaluation;
use crate::index::{Enforcement, Priority, SkillDescriptor, SkillIndex};
use crate::matcher::Evidence;
use crate::selector::OutputMode;
use serde::Serialize;

/// Ranked list with raw scores, plus what the selector kept.
#[derive(Debug, Serialize)]
pub struct RankReport {
    pub message: String,
    /// RFC 3339 local time of the evaluation
    pub evaluated_at: String,
    pub mode: OutputMode,
    pub ranked: Vec<RankedEntry>,
    pub selection: SelectionReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RankedEntry {
    pub id: String,
    pub confidence: f64,
    pub threshold: f64,
    pub priority: Priority,
    pub enforcement: Enforcement,
    pub description: String,
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Default, Serialize)]
pub struct SelectionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    pub suggested: Vec<String>,
    pub optional: Vec<String>,
}

impl RankReport {
    pub fn new(message: &str, evaluation: &Evaluation<'_>) -> Self {
        let selection = &evaluation.selection;
        Self {
            message: message.to_string(),
            evaluated_at: chrono::Local::now().to_rfc3339(),
            mode: selection.mode(),
            ranked: evaluation
                .ranked
                .iter()
                .map(|s| RankedEntry {
                    id: s.skill.id.clone(),
                    confidence: s.confidence,
                    threshold: s.skill.confidence_threshold,
                    priority: s.skill.priority,
                    enforcement: s.skill.enforcement,
                    description: s.skill.description.clone(),
                    evidence: s.evidence.entries().to_vec(),
                })
                .collect(),
            selection: SelectionReport {
                required: selection.required().map(|s| s.skill.id.clone()),
                suggested: selection
                    .suggested()
                    .iter()
                    .map(|s| s.skill.id.clone())
                    .collect(),
                optional: selection
                    .optional()
                    .iter()
                    .map(|s| s.skill.id.clone())
                    .collect(),
            },
            warnings: evaluation.warnings.clone(),
        }
    }
}

/// One row of `list` output.
#[derive(Debug, Serialize)]
pub struct SkillListing {
    pub id: String,
    pub priority: Priority,
    pub enforcement: Enforcement,
    pub confidence_threshold: f64,
    pub auto_activate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub keywords: usize,
    pub description: String,
}

impl From<&SkillDescriptor> for SkillListing {
    fn from(skill: &SkillDescriptor) -> Self {
        Self {
            id: skill.id.clone(),
            priority: skill.priority,
            enforcement: skill.enforcement,
            confidence_threshold: skill.confidence_threshold,
            auto_activate: skill.auto_activate,
            source: skill.source.clone(),
            keywords: skill.keywords.len(),
            description: skill.description.clone(),
        }
    }
}

pub fn list_skills(index: &SkillIndex) -> Vec<SkillListing> {
    index.skills().map(SkillListing::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuggesterConfig;
    use crate::engine::evaluate_with_diagnostics;

    #[test]
    fn test_rank_report_json() {
        let index = SkillIndex::from_descriptors([SkillDescriptor::new("debugging")
            .with_keywords(["debug"])
            .with_description("Debug things")]);
        let evaluation =
            evaluate_with_diagnostics("debug it", &index, &SuggesterConfig::default());
        let report = RankReport::new("debug it", &evaluation);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["mode"], "classic");
        assert_eq!(value["ranked"][0]["id"], "debugging");
        assert_eq!(value["ranked"][0]["confidence"], 6.0);
        assert_eq!(value["ranked"][0]["evidence"][0]["kind"], "exact");
        assert_eq!(value["ranked"][0]["evidence"][0]["primary"], true);
        assert_eq!(value["selection"]["suggested"][0], "debugging");
        assert!(value.get("warnings").is_none());
        assert!(value["selection"].get("required").is_none());
    }

    #[test]
    fn test_list_skills_in_id_order() {
        let index = SkillIndex::from_descriptors([
            SkillDescriptor::new("zeta"),
            SkillDescriptor::new("alpha").with_keywords(["a1", "a2"]),
        ]);
        let listing = list_skills(&index);
        let ids: Vec<&str> = listing.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(listing[0].keywords, 2);
    }
}
