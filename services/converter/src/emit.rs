//! JavaScript artifact writer.
//!
//! Output layout: comment header, `const RETAILERS_DATA = [...]` with the
//! records as pretty JSON, then the metadata constants. With no generation
//! stamp the bytes depend only on the records and source names, so identical
//! inputs give identical files.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::ConvertError;
use crate::normalize::CanonicalRecord;
use crate::summary::Metadata;

pub const DATA_CONST: &str = "RETAILERS_DATA";
pub const COUNT_CONST: &str = "RETAILER_COUNT";
pub const FORCES_CONST: &str = "UNIQUE_POLICE_FORCES";
pub const LOCALITIES_CONST: &str = "UNIQUE_LOCALITIES";
pub const CATEGORIES_CONST: &str = "UNIQUE_CATEGORIES";

pub const DEFAULT_TITLE: &str = "NRCA Retailer Database";

/// Everything that goes into one artifact.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub records: Vec<CanonicalRecord>,
    pub metadata: Metadata,
    /// Sources that contributed records, in merge order.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    pub title: String,
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            generated_at: None,
        }
    }
}

/// Size and digest of a written artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    pub bytes: u64,
    /// `sha256:<hex>`
    pub content_hash: String,
}

struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes: u64,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    fn finish(self) -> EmitSummary {
        EmitSummary {
            bytes: self.bytes,
            content_hash: format!("sha256:{:x}", self.hasher.finalize()),
        }
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Keep header comments on one line each.
fn comment_safe(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn write_body<W: Write>(
    w: &mut W,
    result: &ConversionResult,
    options: &ArtifactOptions,
) -> io::Result<()> {
    writeln!(w, "// {} - Auto-generated", comment_safe(&options.title))?;
    writeln!(w, "// Complete POI (Point-of-Interest) dataset")?;
    if result.sources.is_empty() {
        writeln!(w, "// Source: (none)")?;
    }
    for source in &result.sources {
        writeln!(w, "// Source: {}", comment_safe(source))?;
    }
    writeln!(w, "// Total records: {}", group_thousands(result.metadata.total))?;
    if let Some(at) = options.generated_at {
        writeln!(w, "// Generated: {}", at.to_rfc3339_opts(SecondsFormat::Secs, true))?;
    }
    writeln!(w, "// Structure: Array of retailer objects with full details")?;
    writeln!(w)?;

    write!(w, "const {} = ", DATA_CONST)?;
    serde_json::to_writer_pretty(&mut *w, &result.records).map_err(io::Error::from)?;
    writeln!(w, ";")?;
    writeln!(w)?;

    let meta = &result.metadata;
    writeln!(w, "// Metadata")?;
    writeln!(w, "const {} = {};", COUNT_CONST, meta.total)?;
    writeln!(w, "const {} = {};", FORCES_CONST, meta.unique_police_forces)?;
    writeln!(w, "const {} = {};", LOCALITIES_CONST, meta.unique_localities)?;
    writeln!(w, "const {} = {};", CATEGORIES_CONST, meta.unique_categories)?;
    w.flush()
}

/// Write the artifact to any writer, e.g. an in-memory buffer.
pub fn emit_to_writer<W: Write>(
    result: &ConversionResult,
    options: &ArtifactOptions,
    writer: W,
) -> io::Result<EmitSummary> {
    let mut hashing = HashingWriter::new(writer);
    write_body(&mut hashing, result, options)?;
    Ok(hashing.finish())
}

/// Write the artifact to `path`. The file only appears once it is complete:
/// content goes to a temp file in the same directory which is then renamed.
pub fn emit_to_path(
    result: &ConversionResult,
    options: &ArtifactOptions,
    path: &Path,
) -> Result<EmitSummary, ConvertError> {
    let emit_err = |source: io::Error| ConvertError::Emit {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(emit_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(emit_err)?;
    let summary = {
        let buffered = BufWriter::new(tmp.as_file_mut());
        emit_to_writer(result, options, buffered).map_err(emit_err)?
    };
    tmp.as_file().sync_all().map_err(emit_err)?;
    tmp.persist(path).map_err(|e| emit_err(e.error))?;

    log::info!(
        "Wrote {} ({:.2} MB, {})",
        path.display(),
        summary.bytes as f64 / (1024.0 * 1024.0),
        summary.content_hash
    );
    Ok(summary)
}

// =============================================================================
// TESTS
// =============================================================================
