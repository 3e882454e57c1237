//! Paginated-document output. Each booking renders as a block of labeled
//! fields; a running vertical cursor decides when to break to a new page.
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, Line, Mm, PdfDocument, PdfDocumentReference, Point};

use crate::exporter::ExportError;
use crate::grid::Grid;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_HEIGHT_MM: f32 = 5.0;
const BLOCK_GAP_MM: f32 = 4.0;
const LABEL_WIDTH_MM: f32 = 42.0;

/// Returns the number of booking blocks rendered.
pub fn write_file(grid: &Grid, path: &Path) -> Result<usize, ExportError> {
    let (doc, rendered) = render(grid)?;
    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(rendered)
}

pub fn to_bytes(grid: &Grid) -> Result<(Vec<u8>, usize), ExportError> {
    let (doc, rendered) = render(grid)?;
    let bytes = doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok((bytes, rendered))
}

fn render(grid: &Grid) -> Result<(PdfDocumentReference, usize), ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Freightdeck Bookings Export",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut pager = Paginator::new(PAGE_HEIGHT_MM, MARGIN_MM);

    layer.use_text("Bookings Export", 14.0, Mm(MARGIN_MM), Mm(pager.y_mm()), &bold);
    pager.advance(10.0);

    // Every record is a fixed block: one labeled line per column plus a
    // separator rule.
    let block_height = grid.headers.len() as f32 * LINE_HEIGHT_MM + BLOCK_GAP_MM;

    let mut rendered = 0;
    for row in &grid.rows {
        if pager.ensure_room(block_height) {
            let (page, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_idx);
        }

        for (header, value) in grid.headers.iter().zip(row) {
            layer.use_text(
                format!("{}:", header),
                9.0,
                Mm(MARGIN_MM),
                Mm(pager.y_mm()),
                &bold,
            );
            if !value.is_empty() {
                layer.use_text(
                    value.clone(),
                    9.0,
                    Mm(MARGIN_MM + LABEL_WIDTH_MM),
                    Mm(pager.y_mm()),
                    &font,
                );
            }
            pager.advance(LINE_HEIGHT_MM);
        }

        layer.set_outline_thickness(0.2);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), Mm(pager.y_mm())), false),
                (
                    Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), Mm(pager.y_mm())),
                    false,
                ),
            ],
            is_closed: false,
        });
        pager.advance(BLOCK_GAP_MM);
        rendered += 1;
    }

    tracing::debug!("rendered {} bookings across {} page(s)", rendered, pager.pages);
    Ok((doc, rendered))
}

/// Pure page-break arithmetic: a cursor measured from the top of the page
/// that resets whenever the next block will not fit above the bottom
/// margin.
struct Paginator {
    cursor: f32,
    page_height: f32,
    margin: f32,
    pages: usize,
}

impl Paginator {
    fn new(page_height: f32, margin: f32) -> Self {
        Self {
            cursor: margin,
            page_height,
            margin,
            pages: 1,
        }
    }

    /// Returns true when a new page had to be started to fit the block.
    fn ensure_room(&mut self, block_height: f32) -> bool {
        if self.cursor + block_height > self.page_height - self.margin {
            self.pages += 1;
            self.cursor = self.margin;
            true
        } else {
            false
        }
    }

    fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    /// Cursor translated into PDF coordinates (origin at bottom-left).
    fn y_mm(&self) -> f32 {
        self.page_height - self.cursor
    }
}
