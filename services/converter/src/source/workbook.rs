//! Spreadsheet sources backed by calamine (xls, xlsx, xlsb, ods).

use std::cell::RefCell;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use super::{file_label, RecordStream, SheetSelection, SourceReader};
use crate::error::SourceError;
use crate::raw::{Header, RawRecord, RawValue};

/// An opened workbook shared by the sheets listed from it, so the file (and
/// an xlsx shared-strings table) is parsed once per workbook.
type SharedWorkbook = Rc<RefCell<Sheets<BufReader<File>>>>;

/// One sheet of a workbook. The first non-empty row is the header.
pub struct SheetSource {
    path: PathBuf,
    sheet: String,
    name: String,
    workbook: Option<SharedWorkbook>,
    range: Option<Range<Data>>,
}

impl SheetSource {
    /// A sheet that opens its workbook on its own when read.
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        let path = path.into();
        let sheet = sheet.into();
        let name = format!("{} [{}]", file_label(&path), sheet);
        Self {
            path,
            sheet,
            name,
            workbook: None,
            range: None,
        }
    }

    fn with_workbook(mut self, workbook: SharedWorkbook) -> Self {
        self.workbook = Some(workbook);
        self
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}

/// List the sheets of a workbook as sources, in workbook order.
pub fn workbook_sheets(
    path: &Path,
    selection: SheetSelection,
) -> Result<Vec<SheetSource>, SourceError> {
    let label = file_label(path);
    let workbook = open_workbook_auto(path).map_err(|e| SourceError::unavailable(&label, e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(SourceError::unavailable(label, "workbook has no sheets"));
    }

    let take = match selection {
        SheetSelection::All => sheet_names.len(),
        SheetSelection::First => 1,
    };
    log::info!(
        "Workbook {}: using {} of {} sheet(s)",
        label,
        take,
        sheet_names.len()
    );

    let shared: SharedWorkbook = Rc::new(RefCell::new(workbook));
    Ok(sheet_names
        .into_iter()
        .take(take)
        .map(|sheet| SheetSource::new(path, sheet).with_workbook(Rc::clone(&shared)))
        .collect())
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => format!("{}", other),
    }
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(f) => RawValue::Float(*f),
        Data::Int(i) => RawValue::Int(*i),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => RawValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => RawValue::Empty,
    }
}

impl SourceReader for SheetSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<RecordStream<'_>, SourceError> {
        // Release the handle once read; the last sheet frees the workbook.
        let range = match self.workbook.take() {
            Some(shared) => {
                let mut workbook = shared.borrow_mut();
                workbook.worksheet_range(&self.sheet)
            }
            None => open_workbook_auto(&self.path)
                .and_then(|mut workbook| workbook.worksheet_range(&self.sheet)),
        }
        .map_err(|e| SourceError::unavailable(&self.name, e))?;

        let (row_count, col_count) = range.get_size();
        log::info!(
            "Sheet {}: {} rows x {} columns",
            self.name,
            row_count,
            col_count
        );

        let range = self.range.insert(range);
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(cells) => Arc::new(Header::new(cells.iter().map(header_text))),
            None => return Ok(Box::new(std::iter::empty())),
        };
        log::debug!("Sheet {}: {} named columns", self.name, header.len());

        Ok(Box::new(rows.map(move |cells| {
            Ok(RawRecord::new(
                Arc::clone(&header),
                cells.iter().map(cell_value).collect(),
            ))
        })))
    }
}
