//! Claude Code `UserPromptSubmit` hook payloads.
//!
//! # Input (via stdin)
//! JSON with fields: prompt, cwd, sessionId, transcriptPath, permissionMode
//!
//! # Output (via stdout)
//! JSON with an additionalContext array holding the selected skills, each
//! tagged with its bucket (required / suggested / optional).

use crate::scorer::relative_score;
use crate::selector::{Bucket, OutputMode, SelectionResult};
use serde::{Deserialize, Serialize};

/// Hook protocol version
pub const HOOK_VERSION: &str = "1.0";

/// Reminder attached to a required skill
const REQUIRED_COMMITMENT: &str =
    "Activate this skill with the Skill tool before responding to the user.";

// ============================================================================
// Input Types (from Claude Code hook)
// ============================================================================

/// Input payload from Claude Code UserPromptSubmit hook
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookInput {
    /// The user's prompt text
    pub prompt: String,

    /// Current working directory
    #[serde(default)]
    pub cwd: String,

    /// Session ID
    #[serde(default)]
    pub session_id: String,

    /// Path to conversation transcript
    #[serde(default)]
    pub transcript_path: String,

    /// Permission mode (ask, auto, etc.)
    #[serde(default)]
    pub permission_mode: String,
}

// ============================================================================
// Output Types (Claude Code hook response)
// ============================================================================

/// Output payload for Claude Code hook
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    /// Always "1.0" for Claude Code hooks
    pub version: String,

    /// Output mode the selection was made in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<OutputMode>,

    /// Additional context to inject into Claude's context
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_context: Vec<ContextItem>,
}

impl HookOutput {
    /// The response for "nothing to suggest" and for every error path.
    pub fn empty() -> Self {
        Self {
            version: HOOK_VERSION.to_string(),
            mode: None,
            additional_context: Vec::new(),
        }
    }

    pub fn from_selection(selection: &SelectionResult<'_>) -> Self {
        let items = selection.items();
        if items.is_empty() {
            return Self::empty();
        }

        // Relative scores are against the best selected skill
        let max_confidence = items
            .iter()
            .map(|(_, s)| s.confidence)
            .fold(0.0_f64, f64::max);

        let additional_context = items
            .into_iter()
            .map(|(bucket, scored)| ContextItem {
                item_type: "skill".to_string(),
                name: scored.skill.id.clone(),
                description: scored.skill.description.clone(),
                source: scored.skill.source.clone(),
                bucket,
                raw_score: scored.confidence,
                score: relative_score(scored.confidence, max_confidence),
                match_count: scored.evidence.len(),
                evidence: scored.evidence.labels(),
                commitment: (bucket == Bucket::Required).then(|| REQUIRED_COMMITMENT.to_string()),
            })
            .collect();

        Self {
            version: HOOK_VERSION.to_string(),
            mode: Some(selection.mode()),
            additional_context,
        }
    }
}

/// A context item to inject
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextItem {
    /// Always "skill"
    #[serde(rename = "type")]
    pub item_type: String,

    /// Skill id
    pub name: String,

    /// Description of when to use
    pub description: String,

    /// Where the skill came from, if the index says
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// required, suggested or optional
    pub bucket: Bucket,

    /// Unbounded engine confidence
    pub raw_score: f64,

    /// Confidence relative to the best selected skill (0.0 to 1.0)
    pub score: f64,

    /// Number of evidence entries (for debugging)
    pub match_count: usize,

    /// Match evidence (what triggered this suggestion)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,

    /// Commitment reminder for required skills
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
}

/// Check if prompt should be skipped (simple words, task notifications)
pub fn is_skip_prompt(prompt: &str) -> bool {
    // Skip task notifications
    if prompt.contains("<task-notification>") {
        return true;
    }

    // Skip simple words
    let simple_words = [
        "continue", "yes", "no", "ok", "okay", "thanks", "sure", "done", "stop", "got it",
        "y", "n", "yep", "nope", "thank you", "thx", "ty", "next", "go", "proceed",
    ];

    let trimmed = prompt.trim().to_lowercase();
    simple_words.contains(&trimmed.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Enforcement, SkillDescriptor};
    use crate::matcher::MatchEvidence;
    use crate::ranker::ScoredSkill;
    use crate::selector::select;

    fn scored(skill: &SkillDescriptor, confidence: f64) -> ScoredSkill<'_> {
        ScoredSkill {
            skill,
            confidence,
            evidence: MatchEvidence::default(),
        }
    }

    #[test]
    fn test_skip_prompts() {
        assert!(is_skip_prompt("yes"));
        assert!(is_skip_prompt("  No "));
        assert!(is_skip_prompt("continue"));
        assert!(is_skip_prompt("<task-notification>something</task-notification>"));
        assert!(!is_skip_prompt("help me deploy"));
    }

    #[test]
    fn test_hook_input_parses_camel_case() {
        let input: HookInput = serde_json::from_str(
            r#"{"prompt": "fix the bug", "sessionId": "abc", "permissionMode": "ask"}"#,
        )
        .unwrap();
        assert_eq!(input.prompt, "fix the bug");
        assert_eq!(input.session_id, "abc");
        assert!(input.cwd.is_empty());
    }

    #[test]
    fn test_empty_output_shape() {
        let json = serde_json::to_string(&HookOutput::empty()).unwrap();
        assert_eq!(json, r#"{"version":"1.0"}"#);
    }

    #[test]
    fn test_output_from_grouped_selection() {
        let s = SkillDescriptor::new("writing").with_description("Write docs");
        let o = SkillDescriptor::new("style").with_enforcement(Enforcement::Optional);
        let selection = select(
            vec![scored(&s, 8.0), scored(&o, 4.0)],
            OutputMode::Enhanced,
            3,
        );

        let output = HookOutput::from_selection(&selection);
        assert_eq!(output.mode, Some(OutputMode::Enhanced));
        assert_eq!(output.additional_context.len(), 2);

        let first = &output.additional_context[0];
        assert_eq!(first.bucket, Bucket::Suggested);
        assert_eq!(first.score, 1.0);
        assert!(first.commitment.is_none());

        let second = &output.additional_context[1];
        assert_eq!(second.bucket, Bucket::Optional);
        assert_eq!(second.score, 0.5);

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["additionalContext"][0]["rawScore"], 8.0);
        assert_eq!(value["additionalContext"][1]["bucket"], "optional");
    }

    #[test]
    fn test_required_output_has_commitment() {
        let r = SkillDescriptor::new("security").with_enforcement(Enforcement::Required);
        let selection = select(vec![scored(&r, 3.0)], OutputMode::Enhanced, 3);
        let output = HookOutput::from_selection(&selection);
        assert_eq!(output.additional_context[0].bucket, Bucket::Required);
        assert!(output.additional_context[0].commitment.is_some());
    }
}
