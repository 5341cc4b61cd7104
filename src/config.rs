//! User configuration (`~/.claude/skill_config.json`).
//!
//! Every field has a default and a broken or missing file never fails the
//! caller: it only logs and falls back.

use crate::error::{Result, SuggesterError};
use crate::selector::OutputMode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file name under ~/.claude/
const CONFIG_FILE: &str = "skill_config.json";

/// Skills shown in enhanced mode when nothing is configured
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggesterConfig {
    /// classic or enhanced
    pub output_format: OutputMode,

    /// Combined cap on suggested + optional skills (enhanced mode)
    pub max_suggestions: usize,

    /// Replaces every skill's own confidence_threshold when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_override: Option<f64>,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            output_format: OutputMode::Classic,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            threshold_override: None,
        }
    }
}

impl SuggesterConfig {
    /// Load from `path`, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), "Failed to read config: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields).sanitized(),
            Ok(_) => {
                warn!(path = %path.display(), "Config is not a JSON object, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to parse config: {}", e);
                Self::default()
            }
        }
    }

    /// Merge recognized fields over the defaults, one key at a time.
    ///
    /// An invalid value only resets its own field.
    fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            output_format: field(fields, "output_format").unwrap_or(defaults.output_format),
            max_suggestions: field(fields, "max_suggestions").unwrap_or(defaults.max_suggestions),
            threshold_override: field::<Option<f64>>(fields, "threshold_override")
                .unwrap_or(defaults.threshold_override),
        }
    }

    /// Load from the default location under the home directory.
    pub fn load_default() -> Self {
        match config_path() {
            Ok(path) => Self::load(&path),
            Err(e) => {
                warn!("{}, using default config", e);
                Self::default()
            }
        }
    }

    /// Apply command-line values on top of the file.
    pub fn with_overrides(
        mut self,
        output_format: Option<OutputMode>,
        max_suggestions: Option<usize>,
        threshold_override: Option<f64>,
    ) -> Self {
        if let Some(mode) = output_format {
            self.output_format = mode;
        }
        if let Some(max) = max_suggestions {
            self.max_suggestions = max;
        }
        if threshold_override.is_some() {
            self.threshold_override = threshold_override;
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        if self.max_suggestions == 0 {
            warn!("max_suggestions must be at least 1, using 1");
            self.max_suggestions = 1;
        }
        self
    }
}

fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(field = key, "Invalid config value {}, using default: {}", value, e);
            None
        }
    }
}

/// `~/.claude/skill_config.json`
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(SuggesterError::NoHomeDir)?;
    Ok(home.join(".claude").join(CONFIG_FILE))
}
