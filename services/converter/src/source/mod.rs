//! Tabular source interfaces.
//!
//! Ownership model:
//! - `SourceReader` is one discrete table (a sheet or a whole file) and hands
//!   out a single-pass, lazily produced stream of `RawRecord`s.
//! - `SourceRef` is a caller-supplied reference to a file on disk. Workbooks
//!   expand into one reader per sheet, CSV files into exactly one reader.
//! - `SourcePlan` keeps readers and failures found while expanding refs in
//!   the caller's order, so a broken workbook still shows up in the report at
//!   its position.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SourceError;
use crate::raw::RawRecord;

mod csv_file;
mod memory;
mod workbook;

pub use csv_file::CsvSource;
pub use memory::InMemorySource;
pub use workbook::{workbook_sheets, SheetSource};

/// Lazy record stream. An `Err` item ends the source; rows already yielded
/// are kept.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<RawRecord, SourceError>> + 'a>;

/// One discrete tabular source.
pub trait SourceReader {
    /// Stable name used in logs, reports and the artifact header.
    fn source_name(&self) -> &str;

    /// Open the source. Unreadable sources fail here rather than mid-stream.
    fn open(&mut self) -> Result<RecordStream<'_>, SourceError>;
}

/// Which sheets of a workbook become sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SheetSelection {
    /// Every sheet, in workbook order.
    #[default]
    All,
    /// Only the first sheet.
    First,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Workbook,
    Csv,
}

impl SourceKind {
    /// Detect from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceKind::Workbook),
            "csv" => Some(SourceKind::Csv),
            _ => None,
        }
    }
}

/// A file handed over by the discovery step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub path: PathBuf,
    pub sheets: SheetSelection,
}

impl SourceRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheets: SheetSelection::default(),
        }
    }

    pub fn with_sheets(mut self, sheets: SheetSelection) -> Self {
        self.sheets = sheets;
        self
    }

    pub fn display_name(&self) -> String {
        file_label(&self.path)
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub enum PlannedSource {
    Ready(Box<dyn SourceReader>),
    Failed(SourceError),
}

/// Ordered sources for one run.
#[derive(Default)]
pub struct SourcePlan {
    entries: Vec<PlannedSource>,
}

impl SourcePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand file references in the given order.
    pub fn from_refs(refs: &[SourceRef]) -> Self {
        let mut plan = Self::new();
        for source_ref in refs {
            plan.add_ref(source_ref);
        }
        plan
    }

    pub fn add_ref(&mut self, source_ref: &SourceRef) {
        let name = source_ref.display_name();
        match SourceKind::detect(&source_ref.path) {
            Some(SourceKind::Csv) => self.push(CsvSource::new(&source_ref.path)),
            Some(SourceKind::Workbook) => {
                match workbook_sheets(&source_ref.path, source_ref.sheets) {
                    Ok(sheets) => {
                        for sheet in sheets {
                            self.push(sheet);
                        }
                    }
                    Err(e) => self.push_failure(e),
                }
            }
            None => self.push_failure(SourceError::unavailable(
                name,
                "unsupported file type (expected .xlsx, .xls, .xlsm, .xlsb, .ods or .csv)",
            )),
        }
    }

    pub fn push<R: SourceReader + 'static>(&mut self, reader: R) {
        self.entries.push(PlannedSource::Ready(Box::new(reader)));
    }

    pub fn push_failure(&mut self, error: SourceError) {
        self.entries.push(PlannedSource::Failed(error));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<PlannedSource> {
        self.entries
    }
}
