//! Skill index: descriptor types and the YAML/JSON loader.
//!
//! The index is produced offline (AI-assisted extraction from SKILL.md files)
//! and is read-only here. Two document shapes are accepted:
//!
//! ```yaml
//! version: "1.0"
//! primary_language: english
//! skills:
//!   debugging:
//!     keywords: { english: [debug, error, fix] }
//!     priority: high
//! ```
//!
//! or a bare mapping of skill id to descriptor. Unknown fields are ignored.

use crate::error::{Result, SuggesterError};
use crate::matcher::normalize_text;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Index file name inside a skills directory
pub const INDEX_FILE: &str = "INDEX.yaml";

/// Skills directory under ~/.claude/
const SKILLS_DIR: &str = "skills";

/// Language whose keywords lead the flattened keyword list
pub const DEFAULT_PRIMARY_LANGUAGE: &str = "english";

/// Threshold used when a descriptor does not carry one
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Number of leading keywords that count as primary
pub const PRIMARY_KEYWORD_COUNT: usize = 3;

/// Compiled-program size cap for intent patterns (bytes)
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

// ============================================================================
// Policy enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Multiplier applied once to a skill's summed evidence weight.
    pub const fn multiplier(self) -> f64 {
        match self {
            Priority::High => 1.5,
            Priority::Medium => 1.0,
            Priority::Low => 0.7,
        }
    }

    /// Tie-break rank, lower sorts first.
    pub const fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly a matched skill is pushed to the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforcement {
    /// Must be activated; shown alone
    Required,
    #[default]
    Suggested,
    Optional,
}

impl Enforcement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Enforcement::Required => "required",
            Enforcement::Suggested => "suggested",
            Enforcement::Optional => "optional",
        }
    }
}

impl FromStr for Enforcement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "required" => Ok(Enforcement::Required),
            "suggested" => Ok(Enforcement::Suggested),
            "optional" => Ok(Enforcement::Optional),
            other => Err(format!("unknown enforcement '{}'", other)),
        }
    }
}

impl fmt::Display for Enforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Descriptor Types
// ============================================================================

/// An intent regex, compiled once when the index is loaded.
///
/// A pattern that fails to compile is kept with its error so the matcher can
/// report it instead of silently losing it.
#[derive(Debug, Clone)]
pub struct IntentPattern {
    source: String,
    compiled: std::result::Result<Regex, String>,
}

impl IntentPattern {
    pub fn compile(source: &str) -> Self {
        let compiled = RegexBuilder::new(source)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| e.to_string());
        Self {
            source: source.to_string(),
            compiled,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> std::result::Result<&Regex, &str> {
        self.compiled.as_ref().map_err(String::as_str)
    }

    pub fn is_broken(&self) -> bool {
        self.compiled.is_err()
    }
}

/// One skill as the engine sees it. Immutable after loading.
#[derive(Debug, Clone)]
pub struct SkillDescriptor {
    pub id: String,
    /// Flattened, normalized keywords; primary language first
    pub keywords: Vec<String>,
    /// Normalized (lowercase) category tags
    pub tags: Vec<String>,
    pub use_cases: Vec<String>,
    pub intent_patterns: Vec<IntentPattern>,
    pub priority: Priority,
    pub enforcement: Enforcement,
    pub confidence_threshold: f64,
    pub description: String,
    /// Skills with auto_activate=false are never scored
    pub auto_activate: bool,
    /// Where the skill came from (project, user, system...), for display only
    pub source: Option<String>,
}

impl SkillDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            keywords: Vec::new(),
            tags: Vec::new(),
            use_cases: Vec::new(),
            intent_patterns: Vec::new(),
            priority: Priority::default(),
            enforcement: Enforcement::default(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            description: String::new(),
            auto_activate: true,
            source: None,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = normalize_list(keywords);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_list(tags);
        self
    }

    pub fn with_use_cases<I, S>(mut self, use_cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.use_cases = use_cases
            .into_iter()
            .map(|u| u.as_ref().to_string())
            .collect();
        self
    }

    pub fn with_intent_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.intent_patterns = patterns
            .into_iter()
            .map(|p| IntentPattern::compile(p.as_ref()))
            .collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_enforcement(mut self, enforcement: Enforcement) -> Self {
        self.enforcement = enforcement;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Position-based: the first [`PRIMARY_KEYWORD_COUNT`] authored keywords.
    pub fn primary_keywords(&self) -> &[String] {
        let end = self.keywords.len().min(PRIMARY_KEYWORD_COUNT);
        &self.keywords[..end]
    }

    pub fn is_primary_keyword(&self, position: usize) -> bool {
        position < PRIMARY_KEYWORD_COUNT
    }

    /// A non-positive threshold means the skill can never be suggested.
    pub fn has_valid_threshold(&self) -> bool {
        self.confidence_threshold > 0.0
    }
}

fn normalize_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // First occurrence keeps its position, so duplicates can't take a primary slot
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| normalize_text(s.as_ref()))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

// ============================================================================
// Raw document types (serde)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum RawKeywords {
    ByLanguage(BTreeMap<String, Vec<String>>),
    Flat(Vec<String>),
    #[default]
    None,
}

#[derive(Debug, Deserialize)]
struct RawSkill {
    #[serde(default)]
    keywords: RawKeywords,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    use_cases: Vec<String>,

    #[serde(default)]
    intent_patterns: Vec<String>,

    #[serde(default)]
    priority: Option<String>,

    #[serde(default)]
    enforcement: Option<String>,

    #[serde(default)]
    confidence_threshold: Option<f64>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default = "default_auto_activate")]
    auto_activate: bool,

    #[serde(default)]
    source: Option<String>,
}

fn default_auto_activate() -> bool {
    true
}

/// Decode every entry, skipping (with a warning) the ones that aren't a valid skill.
fn decode_entries(entries: Map<String, Value>) -> Vec<(String, RawSkill)> {
    entries
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<RawSkill>(value) {
            Ok(raw) => Some((id, raw)),
            Err(e) => {
                warn!(skill = %id, "Skipping malformed skill entry: {}", e);
                None
            }
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

impl RawKeywords {
    /// Primary language first, then the others in tag order.
    fn flatten(self, primary_language: &str) -> Vec<String> {
        match self {
            RawKeywords::None => Vec::new(),
            RawKeywords::Flat(list) => list,
            RawKeywords::ByLanguage(mut by_lang) => {
                let mut flat = by_lang.remove(primary_language).unwrap_or_default();
                for (_, list) in by_lang {
                    flat.extend(list);
                }
                flat
            }
        }
    }
}

impl RawSkill {
    fn into_descriptor(self, id: String, primary_language: &str) -> SkillDescriptor {
        let priority = match self.priority.as_deref() {
            None => Priority::default(),
            Some(raw) => raw.parse::<Priority>().unwrap_or_else(|e| {
                warn!(skill = %id, "{}, using medium", e);
                Priority::default()
            }),
        };
        let enforcement = match self.enforcement.as_deref() {
            None => Enforcement::default(),
            Some(raw) => raw.parse::<Enforcement>().unwrap_or_else(|e| {
                warn!(skill = %id, "{}, using suggested", e);
                Enforcement::default()
            }),
        };

        SkillDescriptor {
            keywords: normalize_list(self.keywords.flatten(primary_language)),
            tags: normalize_list(self.tags),
            use_cases: self.use_cases,
            intent_patterns: self
                .intent_patterns
                .iter()
                .map(|p| IntentPattern::compile(p))
                .collect(),
            priority,
            enforcement,
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            description: self.description.unwrap_or_default(),
            auto_activate: self.auto_activate,
            source: self.source,
            id,
        }
    }
}

// ============================================================================
// Skill Index
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// The loaded, immutable collection of skill descriptors, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SkillIndex {
    skills: BTreeMap<String, SkillDescriptor>,
}

impl SkillIndex {
    pub fn from_descriptors<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = SkillDescriptor>,
    {
        let mut skills = BTreeMap::new();
        for descriptor in descriptors {
            // First definition wins, matching merge precedence
            skills.entry(descriptor.id.clone()).or_insert(descriptor);
        }
        let index = Self { skills };
        index.report_load_warnings();
        index
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        let doc: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        Self::from_document(doc)
    }

    pub fn from_json_str(content: &str) -> std::result::Result<Self, String> {
        let doc: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        Self::from_document(doc)
    }

    /// The shape is decided by a top-level `skills` key. Each entry is then
    /// decoded on its own so one malformed skill only costs that skill.
    fn from_document(doc: Value) -> std::result::Result<Self, String> {
        let Value::Object(mut root) = doc else {
            return Err("index document must be a mapping".to_string());
        };

        let (primary_language, entries) = match root.remove("skills") {
            Some(Value::Object(skills)) => {
                let language = root
                    .get("primary_language")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PRIMARY_LANGUAGE)
                    .to_string();
                (language, skills)
            }
            Some(other) => {
                return Err(format!("'skills' must be a mapping, found {}", value_kind(&other)))
            }
            None => (DEFAULT_PRIMARY_LANGUAGE.to_string(), root),
        };

        let total = entries.len();
        let skills: BTreeMap<String, SkillDescriptor> = decode_entries(entries)
            .into_iter()
            .map(|(id, raw)| {
                let descriptor = raw.into_descriptor(id.clone(), &primary_language);
                (id, descriptor)
            })
            .collect();

        if total > 0 && skills.is_empty() {
            return Err(format!("none of the {} skill entries could be read", total));
        }

        let index = Self { skills };
        index.report_load_warnings();
        Ok(index)
    }

    /// Load one index file. YAML unless the extension is `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SuggesterError::IndexNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| SuggesterError::IndexRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let parsed = match DocumentFormat::for_path(path) {
            DocumentFormat::Json => Self::from_json_str(&content),
            DocumentFormat::Yaml => Self::from_yaml_str(&content),
        };

        let index = parsed.map_err(|message| SuggesterError::IndexParse {
            path: path.to_path_buf(),
            message,
        })?;

        info!(path = %path.display(), skills = index.len(), "Loaded skill index");
        Ok(index)
    }

    /// Load several sources in precedence order (first = highest).
    ///
    /// Missing sources are skipped as long as at least one loads; a source
    /// that exists but cannot be read or parsed is an error.
    pub fn load_merged(paths: &[PathBuf]) -> Result<Self> {
        if paths.is_empty() {
            return Err(SuggesterError::NoIndexSources);
        }

        let mut merged: Option<SkillIndex> = None;
        let mut last_missing = None;

        for path in paths {
            match Self::load(path) {
                Ok(index) => {
                    merged = Some(match merged {
                        Some(higher) => higher.merge(index),
                        None => index,
                    });
                }
                Err(SuggesterError::IndexNotFound(missing)) => {
                    debug!(path = %missing.display(), "Index source not found, skipping");
                    last_missing = Some(missing);
                }
                Err(e) => return Err(e),
            }
        }

        match (merged, last_missing) {
            (Some(index), _) => Ok(index),
            (None, Some(missing)) => Err(SuggesterError::IndexNotFound(missing)),
            (None, None) => Err(SuggesterError::NoIndexSources),
        }
    }

    /// Combine with a lower-precedence index. On duplicate ids `self` wins.
    pub fn merge(mut self, lower: SkillIndex) -> Self {
        for (id, descriptor) in lower.skills {
            if self.skills.contains_key(&id) {
                debug!(skill = %id, "Duplicate skill id, keeping higher-precedence entry");
                continue;
            }
            self.skills.insert(id, descriptor);
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&SkillDescriptor> {
        self.skills.get(id)
    }

    /// Descriptors in ascending id order.
    pub fn skills(&self) -> impl Iterator<Item = &SkillDescriptor> {
        self.skills.values()
    }

    /// Descriptors as a rayon parallel iterator.
    pub fn par_skills(&self) -> impl ParallelIterator<Item = &SkillDescriptor> {
        self.skills.par_iter().map(|(_, skill)| skill)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Configuration problems that do not stop loading, one line each.
    pub fn load_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for skill in self.skills.values() {
            if !skill.has_valid_threshold() {
                warnings.push(format!(
                    "skill '{}' has confidence_threshold {} <= 0 and will never match",
                    skill.id, skill.confidence_threshold
                ));
            }
            for pattern in &skill.intent_patterns {
                if let Err(e) = pattern.regex() {
                    warnings.push(format!(
                        "skill '{}' has invalid intent pattern '{}': {}",
                        skill.id,
                        pattern.source(),
                        e
                    ));
                }
            }
        }
        warnings
    }

    fn report_load_warnings(&self) {
        for warning in self.load_warnings() {
            warn!("{}", warning);
        }
    }
}

/// `~/.claude/skills/INDEX.yaml`
pub fn default_index_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(SuggesterError::NoHomeDir)?;
    Ok(home.join(".claude").join(SKILLS_DIR).join(INDEX_FILE))
}

// ============================================================================
// Tests
// ============================================================================
