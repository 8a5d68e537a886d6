//! Delimited text sources.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use encoding_rs::{UTF_8, WINDOWS_1252};

use super::{file_label, RecordStream, SourceReader};
use crate::error::SourceError;
use crate::raw::{Header, RawRecord, RawValue};

/// A whole CSV file with a header row.
pub struct CsvSource {
    path: PathBuf,
    name: String,
    reader: Option<csv::Reader<Cursor<Vec<u8>>>>,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = file_label(&path);
        Self {
            path,
            name,
            reader: None,
        }
    }
}

/// UTF-8 (BOM stripped) when valid, otherwise Windows-1252, which is what
/// spreadsheet exports on Windows usually produce.
fn decode_text(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

impl SourceReader for CsvSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<RecordStream<'_>, SourceError> {
        let bytes = fs::read(&self.path).map_err(|e| SourceError::unavailable(&self.name, e))?;
        log::info!("CSV {}: {} bytes", self.name, bytes.len());

        let text = decode_text(&bytes);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(Cursor::new(text.into_bytes()));

        let header = reader
            .headers()
            .map_err(|e| SourceError::unavailable(&self.name, e))?;
        let header = Arc::new(Header::new(header.iter()));
        if header.is_empty() {
            return Err(SourceError::unavailable(&self.name, "no header row"));
        }

        let reader = self.reader.insert(reader);
        let name = self.name.clone();
        let mut rows_read = 0;

        Ok(Box::new(reader.records().map(move |result| match result {
            Ok(record) => {
                rows_read += 1;
                Ok(RawRecord::new(
                    Arc::clone(&header),
                    record.iter().map(RawValue::from).collect(),
                ))
            }
            Err(e) => Err(SourceError::Interrupted {
                source_name: name.clone(),
                rows_read,
                reason: e.to_string(),
            }),
        })))
    }
}
