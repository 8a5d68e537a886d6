//! Directory discovery for the command line. The pipeline itself never
//! searches the filesystem; it only receives the refs produced here.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::source::{SheetSelection, SourceRef};

pub const DEFAULT_PATTERNS: &[&str] = &["*.xlsx", "*.xls", "*.csv"];

/// Files in `dir` matching any pattern, sorted by path so runs are
/// reproducible. A file matched by several patterns is listed once.
/// Matching ignores case, like [`crate::source::SourceKind::detect`].
pub fn discover(
    dir: &Path,
    patterns: &[String],
    sheets: SheetSelection,
) -> Result<Vec<SourceRef>, ConvertError> {
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };
    let escaped_dir = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()));
    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let full = escaped_dir.join(pattern);
        let entries = glob::glob_with(&full.to_string_lossy(), options)
            .map_err(|e| ConvertError::Config(format!("bad pattern '{}': {}", pattern, e)))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable path during discovery: {}", e),
            }
        }
    }

    paths.sort();
    paths.dedup();
    log::info!("Discovered {} source file(s) in {}", paths.len(), dir.display());

    Ok(paths
        .into_iter()
        .map(|p| SourceRef::new(p).with_sheets(sheets))
        .collect())
}
