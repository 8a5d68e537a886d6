//! Run configuration: environment settings, pipeline options and the JSON
//! sources file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::emit::{ArtifactOptions, DEFAULT_TITLE};
use crate::error::ConvertError;
use crate::merge::DEFAULT_PROGRESS_EVERY;
use crate::source::{SheetSelection, SourceRef};

/// Options the pipeline entry point needs. Nothing is read from globals.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub output_path: PathBuf,
    pub title: String,
    /// Adds a `// Generated:` line. Off by default so reruns are byte-identical.
    pub stamp_generated_at: bool,
    /// Log progress every N rows per source; 0 disables.
    pub progress_every: usize,
}

impl ConverterConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            title: DEFAULT_TITLE.to_string(),
            stamp_generated_at: false,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn artifact_options(&self) -> ArtifactOptions {
        ArtifactOptions {
            title: self.title.clone(),
            generated_at: self.stamp_generated_at.then(chrono::Utc::now),
        }
    }
}

/// Settings taken from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub repo_path: PathBuf,
    pub output_file: PathBuf,
    pub git_remote: String,
    pub git_branch: String,
    pub progress_every: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConvertError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConvertError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let repo_path = PathBuf::from(lookup("REPO_PATH").unwrap_or_else(|| ".".to_string()));
        let output_file = lookup("OUTPUT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| repo_path.join("data").join("retailers.js"));
        let progress_every = match lookup("PROGRESS_EVERY") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConvertError::Config(format!("PROGRESS_EVERY must be an integer, got '{}'", raw))
            })?,
            None => DEFAULT_PROGRESS_EVERY,
        };

        Ok(Self {
            repo_path,
            output_file,
            git_remote: lookup("GIT_REMOTE").unwrap_or_else(|| "origin".to_string()),
            git_branch: lookup("GIT_BRANCH").unwrap_or_else(|| "main".to_string()),
            progress_every,
        })
    }
}

// =============================================================================
// Sources file
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SourcesConfig {
    pub version: String,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub sheets: SheetSelection,
}

fn default_true() -> bool {
    true
}

impl SourcesConfig {
    pub fn parse(content: &str) -> Result<Self, ConvertError> {
        serde_json::from_str(content)
            .map_err(|e| ConvertError::Config(format!("invalid sources config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Enabled entries (optionally just `only`) as refs, in file order.
    /// Relative paths resolve against `base`.
    pub fn source_refs(&self, base: &Path, only: Option<&str>) -> Vec<SourceRef> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .filter(|s| only.map_or(true, |id| s.id == id))
            .map(|s| {
                let path = if s.path.is_absolute() {
                    s.path.clone()
                } else {
                    base.join(&s.path)
                };
                SourceRef::new(path).with_sheets(s.sheets)
            })
            .collect()
    }
}
