//! Static report generation.
//!
//! Writes into the output directory:
//!
//! | File | Content |
//! |------|---------|
//! | `summary.txt` | Column statistics and performance summary |
//! | `summary.json` | Full snapshot as JSON |
//! | `metrics.csv` | Per-period input and derived series |
//! | `*.svg` | One file per chart |

mod summary;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::charts::{ChartOptions, report_charts};
use crate::config::ReportConfig;
use crate::error::{AnalyticsError, ErrorCode};
use crate::metrics::{MetricsParams, PerformanceCalculator, PerformanceSnapshot};
use crate::source::{RecordSource, SourceError};

pub use summary::render_summary;

/// Errors raised while producing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Records could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The calculator rejected the records or parameters.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    /// Error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Source(e) => e.code(),
            Self::Analytics(e) => e.code(),
            Self::Io { .. } | Self::Serialize(_) => ErrorCode::OutputError,
        }
    }
}

/// What a report run produced.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    /// The computed snapshot.
    pub snapshot: PerformanceSnapshot,
    /// Rendered `summary.txt` content.
    pub summary_text: String,
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

/// Produces summary files and charts from a record source.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    calculator: PerformanceCalculator,
    options: ChartOptions,
    charts: bool,
}

impl ReportGenerator {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the parameters are out of range.
    pub fn new(params: MetricsParams, config: &ReportConfig) -> Result<Self, AnalyticsError> {
        Ok(Self {
            calculator: PerformanceCalculator::new(params)?,
            options: ChartOptions::from(config),
            charts: config.charts,
        })
    }

    /// Load records, compute the snapshot and write every artifact.
    ///
    /// The output directory is created when missing.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` when loading, computing or writing fails.
    pub fn generate(
        &self,
        source: &dyn RecordSource,
        output_dir: &Path,
    ) -> Result<ReportArtifacts, ReportError> {
        let records = source.load()?;
        tracing::info!(
            source = %source.describe(),
            records = records.len(),
            "Generating performance report"
        );

        let snapshot = self.calculator.compute(&records)?;
        if let Some(reason) = &snapshot.autocorrelation_error {
            tracing::warn!(%reason, "Autocorrelation chart omitted");
        }

        std::fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        let summary_text = render_summary(&snapshot);
        write_file(output_dir, "summary.txt", &summary_text, &mut files)?;
        write_file(
            output_dir,
            "summary.json",
            &serde_json::to_string_pretty(&snapshot)?,
            &mut files,
        )?;
        write_file(output_dir, "metrics.csv", &snapshot.to_csv(), &mut files)?;

        if self.charts {
            for chart in report_charts(&snapshot, &self.options) {
                write_file(
                    output_dir,
                    &format!("{}.svg", chart.name),
                    &chart.svg,
                    &mut files,
                )?;
            }
        }

        tracing::info!(
            output_dir = %output_dir.display(),
            files = files.len(),
            total_pnl = snapshot.summary.total_pnl,
            "Report generated"
        );

        Ok(ReportArtifacts {
            snapshot,
            summary_text,
            files,
        })
    }
}

fn write_file(
    dir: &Path,
    name: &str,
    content: &str,
    written: &mut Vec<PathBuf>,
) -> Result<(), ReportError> {
    let path = dir.join(name);
    std::fs::write(&path, content).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote report file");
    written.push(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodRecord;
    use crate::sample::{SampleConfig, SampleGenerator};
    use chrono::{TimeZone, Utc};

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn load(&self) -> Result<Vec<PeriodRecord>, SourceError> {
            Err(SourceError::MissingHeader {
                path: PathBuf::from("empty.csv"),
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    struct SampleSource;

    impl RecordSource for SampleSource {
        fn load(&self) -> Result<Vec<PeriodRecord>, SourceError> {
            let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
            Ok(SampleGenerator::new(SampleConfig::new(40, 7, start))
                .unwrap()
                .generate())
        }

        fn describe(&self) -> String {
            "sample".to_string()
        }
    }

    struct EmptySource;

    impl RecordSource for EmptySource {
        fn load(&self) -> Result<Vec<PeriodRecord>, SourceError> {
            Ok(Vec::new())
        }

        fn describe(&self) -> String {
            "empty".to_string()
        }
    }

    fn generator() -> ReportGenerator {
        ReportGenerator::new(MetricsParams::default(), &ReportConfig::default()).unwrap()
    }

    #[test]
    fn test_source_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let err = generator().generate(&FailingSource, dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::Source(_)));
        assert_eq!(err.code(), ErrorCode::MalformedSource);
    }

    #[test]
    fn test_empty_records_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = generator().generate(&EmptySource, dir.path()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(!dir.path().join("summary.txt").exists());
    }

    #[test]
    fn test_unwritable_output_dir_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "occupied").unwrap();

        let err = generator().generate(&SampleSource, &blocker).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
        assert_eq!(err.code(), ErrorCode::OutputError);
    }

    #[test]
    fn test_serialize_error_is_output_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ReportError::from(source);
        assert_eq!(err.code(), ErrorCode::OutputError);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = MetricsParams {
            window: 0,
            ..MetricsParams::default()
        };
        assert!(ReportGenerator::new(params, &ReportConfig::default()).is_err());
    }
}
