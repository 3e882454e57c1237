// Delimited-text output over the shared grid. The csv crate handles
// quoting and escaping; we only feed it pre-formatted display strings.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::exporter::ExportError;
use crate::grid::Grid;

/// Returns the number of data rows written.
pub fn write_file(grid: &Grid, path: &Path) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    write_grid(grid, file)
}

pub fn to_bytes(grid: &Grid) -> Result<(Vec<u8>, usize), ExportError> {
    let mut buffer = Vec::new();
    let written = write_grid(grid, &mut buffer)?;
    Ok((buffer, written))
}

fn write_grid<W: Write>(grid: &Grid, writer: W) -> Result<usize, ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&grid.headers)
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    let mut written = 0;
    for row in &grid.rows {
        out.write_record(row)
            .map_err(|e| ExportError::Csv(e.to_string()))?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid {
            headers: vec!["Booking Number".into(), "Cargo Type".into()],
            rows: vec![
                vec!["BK-0001".into(), "Garments".into()],
                vec!["BK-0002".into(), "Spares, assorted".into()],
            ],
        }
    }

    #[test]
    fn test_data_row_count_matches_grid() {
        let (bytes, written) = to_bytes(&grid()).unwrap();
        assert_eq!(written, 2);
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let records: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), written);
    }

    #[test]
    fn test_commas_are_quoted() {
        let (bytes, _) = to_bytes(&grid()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Spares, assorted\""));
        assert!(text.starts_with("Booking Number,Cargo Type"));
    }

    #[test]
    fn test_write_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.csv");
        assert_eq!(write_file(&grid(), &path).unwrap(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3); // header + 2 rows
    }
}
