use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single tabular source. Never fatal to a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source '{source_name}' is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
    #[error("source '{source_name}' stopped after {rows_read} rows: {reason}")]
    Interrupted {
        source_name: String,
        rows_read: usize,
        reason: String,
    },
}

impl SourceError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        SourceError::Unavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            SourceError::Unavailable { source_name, .. }
            | SourceError::Interrupted { source_name, .. } => source_name,
        }
    }
}

/// Run-level failures. Only these stop a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no records extracted from {sources} source(s)")]
    EmptyInput { sources: usize },
    #[error("failed to write artifact '{}': {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

/// The publish collaborator failed. The artifact on disk is still valid.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("could not run `{step}`: {source}")]
    Spawn {
        step: String,
        #[source]
        source: io::Error,
    },
    #[error("`{step}` exited with {status}")]
    Command { step: String, status: String },
    #[error("artifact '{}' is outside repository '{}'", artifact.display(), repo.display())]
    OutsideRepo { artifact: PathBuf, repo: PathBuf },
}
