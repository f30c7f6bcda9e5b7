//! The import run.
//!
//! [`run_import`] builds the [`ContactIndex`] from every file first, then transforms and publishes
//! one file at a time. A file that fails is reported (observer + summary) and the run moves on.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ImportError, ImportResult};
use crate::ingestion::{
    read_records_from_path, sheet_name_for, ImportContext, ImportObserver, ImportSeverity,
    ImportStats,
};
use crate::processing::{build_dataset, ContactIndex, ContactIndexBuilder, TransformOptions};
use crate::publish::GridSink;

/// Options controlling an import run.
#[derive(Clone)]
pub struct ImportOptions {
    /// Row transformation settings.
    pub transform: TransformOptions,
    /// Optional observer for per-file outcomes.
    pub observer: Option<Arc<dyn ImportObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ImportSeverity,
    /// Pause between files.
    pub delay_between_files: Duration,
}

impl fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportOptions")
            .field("transform", &self.transform)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("delay_between_files", &self.delay_between_files)
            .finish()
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            transform: TransformOptions::default(),
            observer: None,
            alert_at_or_above: ImportSeverity::Critical,
            delay_between_files: Duration::ZERO,
        }
    }
}

/// A file that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    /// The input file.
    pub path: PathBuf,
    /// Classified severity.
    pub severity: ImportSeverity,
    /// Error text.
    pub message: String,
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Contacts in the cross-file index.
    pub contacts: usize,
    /// Sheets written, in processing order.
    pub published: Vec<String>,
    /// Files with no data rows; their sheets were cleared.
    pub empty: Vec<String>,
    /// Files that failed.
    pub failed: Vec<FailedFile>,
    /// Total data rows written.
    pub rows: usize,
    /// Total phone cells filled from the index.
    pub backfilled_phones: usize,
    /// Total data-quality defects.
    pub defects: usize,
    /// Error from the sink's final step, if any.
    pub finish_error: Option<String>,
}

impl ImportSummary {
    /// Returns `true` if every file was handled and the sink finished cleanly.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.finish_error.is_none()
    }
}

enum FileOutcome {
    Published(ImportStats),
    Empty,
}

/// Build the contact index from every file, in the given order.
///
/// Files that cannot be read are logged and skipped here; they fail again, and are reported,
/// when the file itself is imported.
pub fn build_contact_index(files: &[PathBuf]) -> ContactIndex {
    let mut builder = ContactIndexBuilder::new();
    for path in files {
        match read_records_from_path(path) {
            Ok(records) => builder.add_records(&records),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "skipping file while building contact index"
            ),
        }
    }
    let index = builder.finish();
    tracing::info!(files = files.len(), contacts = index.len(), "built contact index");
    index
}

/// Import every file in `files` into `sink`.
///
/// The contact index is completed before the first file is transformed and is not modified
/// afterwards. Per-file errors are caught, classified, reported to the observer and recorded in
/// the summary; they never stop the run.
pub fn run_import(files: &[PathBuf], sink: &mut dyn GridSink, options: &ImportOptions) -> ImportSummary {
    let index = build_contact_index(files);
    let mut summary = ImportSummary {
        contacts: index.len(),
        ..Default::default()
    };

    for (i, path) in files.iter().enumerate() {
        if i > 0 && !options.delay_between_files.is_zero() {
            std::thread::sleep(options.delay_between_files);
        }

        let ctx = ImportContext {
            path: path.clone(),
            sheet: sheet_name_for(path),
        };

        match import_file(path, &ctx.sheet, &index, sink, &options.transform) {
            Ok(FileOutcome::Published(stats)) => {
                summary.published.push(ctx.sheet.clone());
                summary.rows += stats.rows;
                summary.backfilled_phones += stats.backfilled_phones;
                summary.defects += stats.defects;
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_success(&ctx, stats);
                }
            }
            Ok(FileOutcome::Empty) => {
                tracing::info!(path = %path.display(), sheet = %ctx.sheet, "no data rows, sheet cleared");
                summary.empty.push(ctx.sheet.clone());
            }
            Err(e) => {
                let severity = severity_for_error(&e);
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_failure(&ctx, severity, &e);
                    if severity >= options.alert_at_or_above {
                        obs.on_alert(&ctx, severity, &e);
                    }
                }
                summary.failed.push(FailedFile {
                    path: path.clone(),
                    severity,
                    message: e.to_string(),
                });
            }
        }
    }

    if let Err(e) = sink.finish() {
        tracing::error!(error = %e, "finishing import failed");
        summary.finish_error = Some(e.to_string());
    }

    summary
}

fn import_file(
    path: &Path,
    sheet: &str,
    index: &ContactIndex,
    sink: &mut dyn GridSink,
    transform: &TransformOptions,
) -> ImportResult<FileOutcome> {
    let records = read_records_from_path(path)?;
    let built = build_dataset(sheet, &records, transform, index);

    if built.misaligned_rows > 0 {
        tracing::warn!(
            path = %path.display(),
            rows = built.misaligned_rows,
            "rows with a different field set than the first row were aligned to its header"
        );
    }
    for defect in &built.defects {
        tracing::debug!(path = %path.display(), ?defect, "data quality defect");
    }

    // An empty grid is still published so the sink drops whatever the previous run wrote.
    sink.publish(&built.grid)?;
    if built.grid.is_empty() {
        return Ok(FileOutcome::Empty);
    }
    Ok(FileOutcome::Published(ImportStats {
        rows: built.grid.row_count(),
        backfilled_phones: built.backfill.filled,
        defects: built.defects.len(),
    }))
}

/// Classify an error for observers and alerting.
pub fn severity_for_error(e: &ImportError) -> ImportSeverity {
    match e {
        ImportError::Io(_) => ImportSeverity::Critical,
        ImportError::Http(_) => ImportSeverity::Critical,
        ImportError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ImportSeverity::Critical,
            _ => ImportSeverity::Error,
        },
        ImportError::SheetsApi { status, .. } if *status >= 500 => ImportSeverity::Critical,
        ImportError::SheetsApi { .. } => ImportSeverity::Error,
        ImportError::Json(_) => ImportSeverity::Error,
        ImportError::ConfigParse(_) | ImportError::Config { .. } | ImportError::Pattern(_) => {
            ImportSeverity::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_server_errors_are_critical() {
        let io = ImportError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(severity_for_error(&io), ImportSeverity::Critical);
        let server = ImportError::SheetsApi { status: 503, message: "unavailable".into() };
        assert_eq!(severity_for_error(&server), ImportSeverity::Critical);
    }

    #[test]
    fn api_rejections_are_errors() {
        let denied = ImportError::SheetsApi { status: 403, message: "denied".into() };
        assert_eq!(severity_for_error(&denied), ImportSeverity::Error);
    }
}
