//! Multi-source merge.
//!
//! Sources are drained one at a time in plan order; rows are normalized and
//! appended in row order. Nothing is deduplicated, reordered or filtered, so
//! record count out equals row count in, minus rows a broken source never
//! produced.

use std::fmt;

use crate::error::SourceError;
use crate::normalize::{normalize, CanonicalRecord, CoercionIssue};
use crate::source::{PlannedSource, SourcePlan, SourceReader};

/// Coercion issues logged individually before switching to a count.
const MAX_LOGGED_ISSUES: usize = 10;
pub const DEFAULT_PROGRESS_EVERY: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Complete,
    Unavailable(String),
    /// Rows before the failure were kept.
    Interrupted(String),
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceStatus::Complete => f.write_str("complete"),
            SourceStatus::Unavailable(reason) => write!(f, "unavailable: {}", reason),
            SourceStatus::Interrupted(reason) => write!(f, "interrupted: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub name: String,
    pub rows: usize,
    pub coercion_issues: usize,
    pub status: SourceStatus,
}

/// A coercion issue with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    pub source_name: String,
    pub row_index: usize,
    pub issue: CoercionIssue,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}: {}", self.source_name, self.row_index, self.issue)
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub records: Vec<CanonicalRecord>,
    pub sources: Vec<SourceReport>,
    pub coercion_issues: usize,
    /// The first few issues, for reporting.
    pub sample_issues: Vec<RowIssue>,
}

impl MergeOutcome {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|s| s.status != SourceStatus::Complete)
    }

    /// Names of sources that contributed at least one record.
    pub fn contributing_sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.rows > 0)
            .map(|s| s.name.clone())
            .collect()
    }
}

pub struct MergeAggregator {
    outcome: MergeOutcome,
    progress_every: usize,
}

impl Default for MergeAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_EVERY)
    }
}

impl MergeAggregator {
    /// `progress_every` of 0 disables progress logging.
    pub fn new(progress_every: usize) -> Self {
        Self {
            outcome: MergeOutcome::default(),
            progress_every,
        }
    }

    /// Drain one source into the collection.
    pub fn absorb(&mut self, reader: &mut dyn SourceReader) {
        let name = reader.source_name().to_string();
        log::info!("Reading source: {}", name);

        let stream = match reader.open() {
            Ok(stream) => stream,
            Err(e) => {
                self.record_failure(e);
                return;
            }
        };

        let mut rows = 0;
        let mut issues = 0;
        let mut status = SourceStatus::Complete;

        for item in stream {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("{}; keeping {} rows read so far", e, rows);
                    status = SourceStatus::Interrupted(e.to_string());
                    break;
                }
            };

            let normalized = normalize(&raw, rows);
            for issue in normalized.issues {
                issues += 1;
                self.note_issue(RowIssue {
                    source_name: name.clone(),
                    row_index: rows,
                    issue,
                });
            }
            self.outcome.records.push(normalized.record);
            rows += 1;

            if self.progress_every > 0 && rows % self.progress_every == 0 {
                log::info!("  {}: processed {} records...", name, rows);
            }
        }

        log::info!("Loaded {} records from {}", rows, name);
        self.outcome.sources.push(SourceReport {
            name,
            rows,
            coercion_issues: issues,
            status,
        });
    }

    /// Record a source that could not be opened at all.
    pub fn record_failure(&mut self, error: SourceError) {
        log::warn!("Skipping source: {}", error);
        let status = match &error {
            SourceError::Unavailable { reason, .. } => SourceStatus::Unavailable(reason.clone()),
            SourceError::Interrupted { reason, .. } => SourceStatus::Interrupted(reason.clone()),
        };
        self.outcome.sources.push(SourceReport {
            name: error.source_name().to_string(),
            rows: 0,
            coercion_issues: 0,
            status,
        });
    }

    fn note_issue(&mut self, issue: RowIssue) {
        self.outcome.coercion_issues += 1;
        if self.outcome.sample_issues.len() < MAX_LOGGED_ISSUES {
            log::warn!("Coercion: {}", issue);
            self.outcome.sample_issues.push(issue);
        } else if self.outcome.coercion_issues == MAX_LOGGED_ISSUES + 1 {
            log::warn!("Further coercion issues are counted but not logged");
        }
    }

    pub fn finish(self) -> MergeOutcome {
        self.outcome
    }
}

/// Merge every planned source, in plan order.
pub fn merge(plan: SourcePlan, progress_every: usize) -> MergeOutcome {
    let mut aggregator = MergeAggregator::new(progress_every);
    for entry in plan.into_entries() {
        match entry {
            PlannedSource::Ready(mut reader) => aggregator.absorb(reader.as_mut()),
            PlannedSource::Failed(error) => aggregator.record_failure(error),
        }
    }
    aggregator.finish()
}

// =============================================================================
// TESTS
// =============================================================================
