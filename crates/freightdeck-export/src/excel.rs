//! Excel workbook output: a summary sheet plus the bookings grid.
use std::path::Path;

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::exporter::ExportError;
use crate::grid::Grid;

/// Returns the number of data rows written to the bookings sheet.
pub fn write_file(grid: &Grid, path: &Path) -> Result<usize, ExportError> {
    let (mut workbook, written) = build_workbook(grid)?;
    workbook
        .save(path)
        .map_err(|e| ExportError::Excel(e.to_string()))?;
    Ok(written)
}

pub fn to_bytes(grid: &Grid) -> Result<(Vec<u8>, usize), ExportError> {
    let (mut workbook, written) = build_workbook(grid)?;
    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Excel(e.to_string()))?;
    Ok((bytes, written))
}

fn build_workbook(grid: &Grid) -> Result<(Workbook, usize), ExportError> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, grid)?;

    let bookings_sheet = workbook.add_worksheet();
    let written = write_bookings_sheet(bookings_sheet, grid)?;

    Ok((workbook, written))
}

fn write_summary_sheet(sheet: &mut Worksheet, grid: &Grid) -> Result<(), ExportError> {
    sheet
        .set_name("Summary")
        .map_err(|e| ExportError::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    sheet
        .write_string_with_format(0, 0, "Freightdeck Bookings Export", &header_format)
        .map_err(|e| ExportError::Excel(e.to_string()))?;
    sheet
        .write_string(2, 0, "Exported At:")
        .map_err(|e| ExportError::Excel(e.to_string()))?;
    sheet
        .write_string(2, 1, &Utc::now().to_rfc3339())
        .map_err(|e| ExportError::Excel(e.to_string()))?;
    sheet
        .write_string(3, 0, "Bookings:")
        .map_err(|e| ExportError::Excel(e.to_string()))?;
    sheet
        .write_number(3, 1, grid.rows.len() as f64)
        .map_err(|e| ExportError::Excel(e.to_string()))?;

    Ok(())
}

fn write_bookings_sheet(sheet: &mut Worksheet, grid: &Grid) -> Result<usize, ExportError> {
    sheet
        .set_name("Bookings")
        .map_err(|e| ExportError::Excel(e.to_string()))?;

    let header_format = Format::new().set_bold();

    for (col, header) in grid.headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| ExportError::Excel(e.to_string()))?;
    }

    let mut written = 0;
    for (row_idx, row) in grid.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string((row_idx + 1) as u32, col as u16, value)
                .map_err(|e| ExportError::Excel(e.to_string()))?;
        }
        written += 1;
    }

    // Approximate widths; the grid is already display strings. Rows
    // shorter than the header count just contribute nothing.
    for col in 0..grid.headers.len() {
        let widest = grid
            .rows
            .iter()
            .map(|r| r.get(col).map(String::len).unwrap_or(0))
            .chain(std::iter::once(grid.headers[col].len()))
            .max()
            .unwrap_or(10);
        sheet
            .set_column_width(col as u16, (widest + 2).min(50) as f64)
            .map_err(|e| ExportError::Excel(e.to_string()))?;
    }

    Ok(written)
}
