//! Engine entry points: match + score every skill, rank, select.
//!
//! Stateless per call. The only thing shared between calls is the borrowed,
//! read-only [`SkillIndex`]; scoring fans out across skills on the rayon pool.

use crate::config::SuggesterConfig;
use crate::index::SkillIndex;
use crate::matcher::{match_prepared, PreparedMessage};
use crate::ranker::{rank_with_threshold, ScoredSkill};
use crate::scorer::score;
use crate::selector::{select, SelectionResult};
use rayon::prelude::*;
use tracing::debug;

/// Full diagnostic view of one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    /// Every eligible candidate, ranked, untruncated
    pub ranked: Vec<ScoredSkill<'a>>,
    pub selection: SelectionResult<'a>,
    /// Non-fatal problems met while matching (e.g. invalid intent patterns)
    pub warnings: Vec<String>,
}

/// Match and score every auto-activating skill. Skills without evidence are dropped.
///
/// Returns the scored skills (index order) and any matcher warnings.
pub fn score_all<'a>(message: &str, index: &'a SkillIndex) -> (Vec<ScoredSkill<'a>>, Vec<String>) {
    let prepared = PreparedMessage::new(message);
    if prepared.is_blank() {
        return (Vec::new(), Vec::new());
    }

    let results: Vec<ScoredSkill<'a>> = index
        .par_skills()
        .filter(|skill| skill.auto_activate)
        .map(|skill| {
            let evidence = match_prepared(&prepared, skill);
            let confidence = score(&evidence, skill);
            ScoredSkill {
                skill,
                confidence,
                evidence,
            }
        })
        .collect();

    let warnings: Vec<String> = results
        .iter()
        .flat_map(|s| s.evidence.warnings().iter().cloned())
        .collect();

    let scored: Vec<ScoredSkill<'a>> = results
        .into_iter()
        .filter(|s| !s.evidence.is_empty())
        .collect();

    (scored, warnings)
}

/// Evaluate one message and return only what should be surfaced.
pub fn evaluate<'a>(
    message: &str,
    index: &'a SkillIndex,
    config: &SuggesterConfig,
) -> SelectionResult<'a> {
    let (scored, _) = score_all(message, index);
    let ranked = rank_with_threshold(scored, config.threshold_override);
    select(ranked, config.output_format, config.max_suggestions)
}

/// Evaluate one message, keeping the full ranked list and warnings.
pub fn evaluate_with_diagnostics<'a>(
    message: &str,
    index: &'a SkillIndex,
    config: &SuggesterConfig,
) -> Evaluation<'a> {
    let (scored, warnings) = score_all(message, index);
    let matched = scored.len();
    let ranked = rank_with_threshold(scored, config.threshold_override);
    debug!(
        skills = index.len(),
        matched,
        eligible = ranked.len(),
        "Evaluated message"
    );
    let selection = select(
        ranked.clone(),
        config.output_format,
        config.max_suggestions,
    );
    Evaluation {
        ranked,
        selection,
        warnings,
    }
}
