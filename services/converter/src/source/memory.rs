use super::{RecordStream, SourceReader};
use crate::error::SourceError;
use crate::raw::RawRecord;

/// Rows held in memory. Can simulate an unreadable source or one that breaks
/// part way through.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    rows: Vec<RawRecord>,
    unavailable: Option<String>,
    interrupt_after: Option<(usize, String)>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, rows: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            rows,
            unavailable: None,
            interrupt_after: None,
        }
    }

    /// A source whose `open` always fails.
    pub fn unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::new(name, Vec::new())
        }
    }

    /// Yield the first `rows` records, then fail.
    pub fn interrupted_after(mut self, rows: usize, reason: impl Into<String>) -> Self {
        self.interrupt_after = Some((rows, reason.into()));
        self
    }
}

impl SourceReader for InMemorySource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<RecordStream<'_>, SourceError> {
        if let Some(reason) = &self.unavailable {
            return Err(SourceError::unavailable(&self.name, reason));
        }

        let rows = self.rows.iter().cloned().map(Ok::<RawRecord, SourceError>);
        match &self.interrupt_after {
            None => Ok(Box::new(rows)),
            Some((limit, reason)) => {
                let failure = SourceError::Interrupted {
                    source_name: self.name.clone(),
                    rows_read: *limit,
                    reason: reason.clone(),
                };
                Ok(Box::new(rows.take(*limit).chain(std::iter::once(Err(failure)))))
            }
        }
    }
}
