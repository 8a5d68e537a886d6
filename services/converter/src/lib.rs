//! Retailer converter - Turns spreadsheet/CSV point-of-interest dumps into a
//! single JavaScript data artifact.
//!
//! Pipeline:
//! - Read each source (sheet or file) lazily, one after another
//! - Resolve inconsistent column names into the canonical record schema
//! - Merge all records in source order (no dedup, no filtering)
//! - Summarize distinct forces / localities / categories
//! - Emit the artifact atomically, then hand it to the publisher
//!
//! This pipeline is DETERMINISTIC: same inputs in the same order = same
//! artifact bytes (unless a generation stamp is requested).

pub mod config;
pub mod discover;
pub mod emit;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod publish;
pub mod raw;
pub mod resolve;
pub mod schema;
pub mod source;
pub mod summary;

use std::path::PathBuf;

pub use config::{ConverterConfig, Settings, SourcesConfig};
pub use emit::{ArtifactOptions, ConversionResult, EmitSummary};
pub use error::{ConvertError, PublishError, SourceError};
pub use merge::{MergeOutcome, RowIssue, SourceReport, SourceStatus};
pub use normalize::{normalize, CanonicalRecord, CoercionIssue};
pub use publish::{GitPublisher, PublishOutcome, Publisher};
pub use raw::{RawRecord, RawValue};
pub use source::{SheetSelection, SourcePlan, SourceReader, SourceRef};
pub use summary::{summarize, Metadata};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    pub coercion_issues: usize,
    pub sample_issues: Vec<RowIssue>,
    pub metadata: Metadata,
    pub artifact: PathBuf,
    pub emitted: EmitSummary,
    pub publish: PublishOutcome,
}

/// Merge and summarize without writing anything.
///
/// Fails with [`ConvertError::EmptyInput`] when no source produced a record.
pub fn convert(
    plan: SourcePlan,
    progress_every: usize,
) -> Result<(ConversionResult, MergeOutcome), ConvertError> {
    let planned = plan.len();
    let mut outcome = merge::merge(plan, progress_every);

    if outcome.records.is_empty() {
        return Err(ConvertError::EmptyInput { sources: planned });
    }

    let metadata = summarize(&outcome.records);
    let result = ConversionResult {
        records: std::mem::take(&mut outcome.records),
        metadata,
        sources: outcome.contributing_sources(),
    };
    Ok((result, outcome))
}

/// Full run: convert, write the artifact, then publish.
///
/// Only empty input and a failed write are errors; source and publish
/// failures are reported in the [`RunReport`].
pub fn run(
    config: &ConverterConfig,
    plan: SourcePlan,
    publisher: Option<&dyn Publisher>,
) -> Result<RunReport, ConvertError> {
    let (result, outcome) = convert(plan, config.progress_every)?;
    log::info!(
        "Merged {} records from {} source(s)",
        emit::group_thousands(result.metadata.total),
        outcome.sources.len()
    );

    let emitted = emit::emit_to_path(&result, &config.artifact_options(), &config.output_path)?;
    let publish = publish::publish_artifact(publisher, &config.output_path, result.metadata.total);

    Ok(RunReport {
        sources: outcome.sources,
        coercion_issues: outcome.coercion_issues,
        sample_issues: outcome.sample_issues,
        metadata: result.metadata,
        artifact: config.output_path.clone(),
        emitted,
        publish,
    })
}
