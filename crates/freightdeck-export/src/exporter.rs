// Export orchestration: validate options, narrow to the requested date
// window, make sure the customer directory is loaded, then hand the
// formatted grid to the chosen format writer. The primary write goes to a
// file; if the platform write fails the engine regenerates into an
// in-memory buffer so the caller can still deliver the bytes.
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, warn};

use freightdeck_core::backend::CrmBackend;
use freightdeck_core::models::{Booking, Customer};

use crate::grid::{build_grid, Column, Grid};
use crate::{delimited, excel, pdf};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("custom date range requires both a start and an end date")]
    MissingDateRange,

    /// A notice, not a failure: nothing matched, nothing was written.
    #[error("no bookings found in the selected date range")]
    NoRecords,

    #[error("could not load the customer directory: {0}")]
    CustomerLookupFailed(String),

    #[error("CSV generation failed: {0}")]
    Csv(String),

    #[error("Excel generation failed: {0}")]
    Excel(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export failed: {0}")]
    Failed(String),
}

impl ExportError {
    /// Zero-result conditions get a notice toast, not an error banner.
    pub fn is_notice(&self) -> bool {
        matches!(self, ExportError::NoRecords)
    }
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Excel),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Export-specific date narrowing, applied after the page filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateWindow {
    #[default]
    AllTime,
    CurrentMonth,
    PreviousMonth,
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateWindow {
    /// Inclusive calendar-date bounds, or `None` for no constraint.
    /// A custom window with a missing bound is a validation error.
    pub fn bounds(&self, today: NaiveDate) -> Result<Option<(NaiveDate, NaiveDate)>, ExportError> {
        match self {
            DateWindow::AllTime => Ok(None),
            DateWindow::CurrentMonth => {
                let first = today - Duration::days(today.day0() as i64);
                Ok(Some((first, today)))
            }
            DateWindow::PreviousMonth => {
                let first_this = today - Duration::days(today.day0() as i64);
                let last_prev = first_this - Duration::days(1);
                let first_prev = last_prev - Duration::days(last_prev.day0() as i64);
                Ok(Some((first_prev, last_prev)))
            }
            DateWindow::Custom {
                start: Some(start),
                end: Some(end),
            } => Ok(Some((*start, *end))),
            DateWindow::Custom { .. } => Err(ExportError::MissingDateRange),
        }
    }

    /// Keep records whose created_at date falls inside the window.
    /// Records without a parseable created_at never match an active window.
    pub fn narrow(&self, records: &[Booking], today: NaiveDate) -> Result<Vec<Booking>, ExportError> {
        let bounds = self.bounds(today)?;
        let Some((start, end)) = bounds else {
            return Ok(records.to_vec());
        };
        Ok(records
            .iter()
            .filter(|b| match b.created_at {
                Some(created) => {
                    let date = created.date_naive();
                    date >= start && date <= end
                }
                None => false,
            })
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub window: DateWindow,
    /// Column subset in output order; `None` means every documented column.
    pub columns: Option<Vec<Column>>,
    /// Explicit destination; defaults to `bookings-export-<date>.<ext>` in
    /// the current directory.
    pub output_path: Option<PathBuf>,
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            window: DateWindow::AllTime,
            columns: None,
            output_path: None,
        }
    }
}

/// Where the export ended up.
#[derive(Debug)]
pub enum ExportOutput {
    /// Primary path: the file was written to disk.
    Saved(PathBuf),
    /// Fallback path: the platform write failed, but the bytes were
    /// regenerated in memory for caller-driven delivery.
    Buffer(Vec<u8>),
}

#[derive(Debug)]
pub struct ExportReport {
    pub format: ExportFormat,
    /// The number of data rows the format writer actually emitted. Always
    /// equals the number of records that matched the window.
    pub records_exported: usize,
    pub output: ExportOutput,
}

/// The export engine. Holds a backend reference only for the on-demand
/// customer directory fetch; it never mutates application data.
pub struct Exporter<'a> {
    backend: &'a dyn CrmBackend,
}

impl<'a> Exporter<'a> {
    pub fn new(backend: &'a dyn CrmBackend) -> Self {
        Self { backend }
    }

    /// Export the given (already filtered) records. `directory` is the
    /// customer lookup table if the page has it loaded; pass `None` to have
    /// the engine fetch it before generating anything.
    pub async fn export(
        &self,
        records: &[Booking],
        directory: Option<&[Customer]>,
        options: &ExportOptions,
    ) -> Result<ExportReport, ExportError> {
        self.export_at(records, directory, options, Utc::now().date_naive())
            .await
    }

    pub async fn export_at(
        &self,
        records: &[Booking],
        directory: Option<&[Customer]>,
        options: &ExportOptions,
        today: NaiveDate,
    ) -> Result<ExportReport, ExportError> {
        // Validation and narrowing happen before any side effect
        let narrowed = options.window.narrow(records, today)?;
        if narrowed.is_empty() {
            return Err(ExportError::NoRecords);
        }

        // Recover a missing lookup table instead of degrading every row
        let fetched;
        let customers: &[Customer] = match directory {
            Some(customers) => customers,
            None => {
                info!("customer directory not loaded, fetching before export");
                fetched = self
                    .backend
                    .get_all_customers()
                    .await
                    .map_err(|e| ExportError::CustomerLookupFailed(e.to_string()))?;
                &fetched
            }
        };

        let columns = options
            .columns
            .clone()
            .unwrap_or_else(|| Column::ALL.to_vec());
        let grid = build_grid(&narrowed, customers, &columns);
        debug_assert_eq!(grid.rows.len(), narrowed.len());

        let path = match &options.output_path {
            Some(path) => path.clone(),
            None => PathBuf::from(format!(
                "bookings-export-{}.{}",
                today.format("%Y%m%d"),
                options.format.extension()
            )),
        };

        let (output, written) = match write_file(&grid, options.format, &path) {
            Ok(written) => {
                info!("exported {} bookings to {}", written, path.display());
                (ExportOutput::Saved(path), written)
            }
            Err(primary) => {
                warn!(
                    "primary export write failed ({}), falling back to in-memory buffer",
                    primary
                );
                match to_bytes(&grid, options.format) {
                    Ok((bytes, written)) => (ExportOutput::Buffer(bytes), written),
                    Err(fallback) => {
                        return Err(ExportError::Failed(format!(
                            "{}; fallback also failed: {}",
                            primary, fallback
                        )))
                    }
                }
            }
        };
        debug_assert_eq!(written, narrowed.len());

        Ok(ExportReport {
            format: options.format,
            records_exported: written,
            output,
        })
    }
}

fn write_file(grid: &Grid, format: ExportFormat, path: &Path) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Csv => delimited::write_file(grid, path),
        ExportFormat::Excel => excel::write_file(grid, path),
        ExportFormat::Pdf => pdf::write_file(grid, path),
    }
}

fn to_bytes(grid: &Grid, format: ExportFormat) -> Result<(Vec<u8>, usize), ExportError> {
    match format {
        ExportFormat::Csv => delimited::to_bytes(grid),
        ExportFormat::Excel => excel::to_bytes(grid),
        ExportFormat::Pdf => pdf::to_bytes(grid),
    }
}
