//! Word-boundary-aware matching of a message against one skill descriptor.
//!
//! Produces [`MatchEvidence`]: every keyword, tag, use-case and intent hit is
//! recorded (no first-match-wins). Scoring happens elsewhere.

use crate::index::SkillDescriptor;
use crate::scorer::MatchWeights;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Keywords shorter than this never match partially
const PARTIAL_MIN_CHARS: usize = 4;

/// Use-case words shorter than this are not significant
const USE_CASE_MIN_CHARS: usize = 3;

lazy_static! {
    /// Words that carry no meaning when comparing use cases to a message
    static ref STOPWORDS: HashSet<&'static str> = [
        "the", "and", "for", "this", "that", "with", "from", "use", "when", "should", "will",
        "can", "are", "was", "were", "been", "have", "has", "had", "not", "but", "what", "all",
        "your", "you", "they", "them", "their", "which", "who", "whom", "how", "any", "some",
        "such", "more", "most", "other", "into", "over", "only", "than", "then", "also", "just",
        "about", "using", "before", "after", "during", "like", "need", "needs", "help", "want",
        "please", "make", "new",
    ]
    .into_iter()
    .collect();
}

// ============================================================================
// Evidence Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Single-word keyword, whole word
    Exact,
    /// Multi-word keyword, whole phrase
    Compound,
    UseCase,
    Tag,
    /// Keyword found as a word prefix only
    Partial,
    Intent,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Compound => "compound",
            MatchKind::UseCase => "use_case",
            MatchKind::Tag => "tag",
            MatchKind::Partial => "partial",
            MatchKind::Intent => "intent",
        }
    }
}

/// One piece of evidence: what matched, how, and its base weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub kind: MatchKind,
    pub text: String,
    pub weight: f64,
    /// Derived from one of the skill's primary keywords
    pub primary: bool,
}

impl Evidence {
    /// Short label used in diagnostics, e.g. `exact*:debug` (`*` = primary)
    pub fn label(&self) -> String {
        let marker = if self.primary { "*" } else { "" };
        format!("{}{}:{}", self.kind.as_str(), marker, self.text)
    }
}

/// All evidence gathered for one (message, skill) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchEvidence {
    entries: Vec<Evidence>,
    warnings: Vec<String>,
}

impl MatchEvidence {
    /// Record a hit unless the same span was already recorded for this kind.
    fn record(&mut self, kind: MatchKind, text: &str, weight: f64, primary: bool) {
        if self
            .entries
            .iter()
            .any(|e| e.kind == kind && e.text == text)
        {
            return;
        }
        self.entries.push(Evidence {
            kind,
            text: text.to_string(),
            weight,
            primary,
        });
    }

    pub fn entries(&self) -> &[Evidence] {
        &self.entries
    }

    /// Non-fatal problems hit while matching (broken intent patterns).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(Evidence::label).collect()
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

/// Lowercase and collapse whitespace runs to single spaces.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c)).filter(|t| !t.is_empty())
}

/// A message prepared once and matched against many skills.
#[derive(Debug, Clone)]
pub struct PreparedMessage<'a> {
    raw: &'a str,
    normalized: String,
    tokens: HashSet<String>,
}

impl<'a> PreparedMessage<'a> {
    pub fn new(raw: &'a str) -> Self {
        let normalized = normalize_text(raw);
        let tokens = tokenize(&normalized).map(str::to_string).collect();
        Self {
            raw,
            normalized,
            tokens,
        }
    }

    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occurrence {
    /// Bounded by non-word characters or string edges on both sides
    WholeWord,
    /// Starts at a word boundary but runs into a longer word
    Prefix,
    Absent,
}

/// Best occurrence of `needle` in `haystack`, checking every start position.
fn locate(haystack: &str, needle: &str) -> Occurrence {
    if needle.is_empty() {
        return Occurrence::Absent;
    }

    let mut found_prefix = false;
    let mut from = 0;

    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();

        let left_bounded = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let right_bounded = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));

        if left_bounded && right_bounded {
            return Occurrence::WholeWord;
        }
        if left_bounded {
            found_prefix = true;
        }

        // Advance one character so overlapping occurrences are still seen
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }

    if found_prefix {
        Occurrence::Prefix
    } else {
        Occurrence::Absent
    }
}

/// Significant words of a use case, in authored order, deduplicated.
fn significant_words(use_case: &str) -> Vec<String> {
    let lowered = use_case.to_lowercase();
    let mut seen = HashSet::new();
    tokenize(&lowered)
        .filter(|w| w.chars().count() >= USE_CASE_MIN_CHARS && !STOPWORDS.contains(w))
        .filter(|w| seen.insert(w.to_string()))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Matching
// ============================================================================

/// Match a raw message against one skill.
pub fn match_skill(message: &str, skill: &SkillDescriptor) -> MatchEvidence {
    match_prepared(&PreparedMessage::new(message), skill)
}

/// Match an already-prepared message against one skill.
pub fn match_prepared(message: &PreparedMessage<'_>, skill: &SkillDescriptor) -> MatchEvidence {
    let weights = MatchWeights::default();
    let mut evidence = MatchEvidence::default();

    if message.is_blank() {
        return evidence;
    }

    // Keywords: exact / compound, falling back to prefix-only partial
    for (position, keyword) in skill.keywords.iter().enumerate() {
        let primary = skill.is_primary_keyword(position);
        match locate(&message.normalized, keyword) {
            Occurrence::WholeWord => {
                let kind = if keyword.contains(' ') {
                    MatchKind::Compound
                } else {
                    MatchKind::Exact
                };
                evidence.record(kind, keyword, weights.weight(kind), primary);
            }
            Occurrence::Prefix if keyword.chars().count() >= PARTIAL_MIN_CHARS => {
                let kind = MatchKind::Partial;
                evidence.record(kind, keyword, weights.weight(kind), primary);
            }
            _ => {}
        }
    }

    // Tags: whole word only
    for tag in &skill.tags {
        if locate(&message.normalized, tag) == Occurrence::WholeWord {
            let kind = MatchKind::Tag;
            evidence.record(kind, tag, weights.weight(kind), false);
        }
    }

    // Use cases: bag-of-words overlap
    for use_case in &skill.use_cases {
        let overlap: Vec<String> = significant_words(use_case)
            .into_iter()
            .filter(|w| message.tokens.contains(w))
            .collect();
        if !overlap.is_empty() {
            let kind = MatchKind::UseCase;
            evidence.record(kind, &overlap.join(" "), weights.weight(kind), false);
        }
    }

    // Intent patterns on the raw message (compiled case-insensitive)
    for pattern in &skill.intent_patterns {
        match pattern.regex() {
            Ok(re) => {
                // Evidence is the matched span, so patterns hitting the same text count once
                if let Some(found) = re.find(message.raw) {
                    let span = normalize_text(found.as_str());
                    let text = if span.is_empty() {
                        pattern.source()
                    } else {
                        span.as_str()
                    };
                    let kind = MatchKind::Intent;
                    evidence.record(kind, text, weights.weight(kind), false);
                }
            }
            Err(e) => {
                debug!(skill = %skill.id, pattern = %pattern.source(), "Skipping invalid intent pattern");
                evidence.warnings.push(format!(
                    "skill '{}': invalid intent pattern '{}': {}",
                    skill.id,
                    pattern.source(),
                    e
                ));
            }
        }
    }

    evidence
}

// ============================================================================
// Tests
// ============================================================================
