//! Skill Activator - index-driven skill suggestions for Claude Code
//!
//! Matches a user message against a precomputed skill index (keywords, tags,
//! use cases, intent patterns) without any model call:
//!
//! - `matcher`: word-boundary keyword/tag matching, use-case overlap, intent regexes
//! - `scorer`: fixed weight table, primary-keyword boost, priority multiplier
//! - `ranker`: per-skill thresholds and deterministic ordering
//! - `selector`: classic vs enhanced output, required/suggested/optional grouping
//!
//! # Performance
//! - O(n*k) matching where n=skills, k=keywords per skill
//! - skills are scored in parallel against one read-only snapshot

pub mod config;
pub mod engine;
pub mod error;
pub mod hook;
pub mod index;
pub mod matcher;
pub mod ranker;
pub mod report;
pub mod scorer;
pub mod selector;
pub mod snapshot;

pub use config::SuggesterConfig;
pub use engine::{evaluate, evaluate_with_diagnostics, Evaluation};
pub use error::{Result, SuggesterError};
pub use index::{Enforcement, Priority, SkillDescriptor, SkillIndex};
pub use matcher::{match_skill, Evidence, MatchEvidence, MatchKind};
pub use ranker::{rank, ScoredSkill};
pub use scorer::{score, MatchWeights};
pub use selector::{select, Bucket, OutputMode, SelectionResult};
pub use snapshot::IndexHandle;
