// Export engine: turn a filtered booking list into a downloadable file.
pub mod delimited;
pub mod excel;
pub mod exporter;
pub mod grid;
pub mod pdf;

pub use exporter::{
    DateWindow, ExportError, ExportFormat, ExportOptions, ExportOutput, ExportReport, Exporter,
};
pub use grid::{format_currency, Column, Grid};
