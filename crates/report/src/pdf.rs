//! PDF rendering with the built-in Helvetica faces.
//!
//! Layout works top-down in millimetres on an A4 page; `Canvas` converts to
//! the bottom-up coordinates PDF uses.

use engine::{Currency, Money};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect, Rgb, path::PaintMode,
};

use crate::{DESCRIPTION_WIDTH, PRODUCT_NAME, ReportError, StatementDocument, truncate};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const ROW_HEIGHT: f32 = 10.0;
const PT_TO_MM: f32 = 0.3528;
/// Mean advance of a Helvetica glyph, as a fraction of the font size.
const HELVETICA_MEAN_ADVANCE: f32 = 0.5;

const BACKGROUND: (u8, u8, u8) = (10, 11, 16);
const ACCENT: (u8, u8, u8) = (0, 210, 255);
const MUTED: (u8, u8, u8) = (138, 141, 164);
const TEXT: (u8, u8, u8) = (240, 240, 245);
const SPENT: (u8, u8, u8) = (255, 85, 85);
const RESERVE: (u8, u8, u8) = (0, 255, 170);

/// Column widths of the transaction table: date, time, description, amount.
const LEDGER_COLUMNS: [f32; 4] = [30.0, 30.0, 90.0, 40.0];

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn pdf_error(err: printpdf::Error) -> ReportError {
    ReportError::Pdf(format!("{err:?}"))
}

/// Built-in fonts only cover Latin-1; anything else is replaced.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if u32::from(c) < 0x100 && !c.is_control() { c } else { '?' })
        .collect()
}

#[derive(Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Italic,
}

#[derive(Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    /// Distance from the top of the page to the next free line.
    cursor: f32,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Statement");
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(pdf_error)?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        let canvas = Self {
            doc,
            layer,
            fonts,
            cursor: MARGIN,
            pages: 1,
        };
        canvas.paint_background();
        Ok(canvas)
    }

    fn paint_background(&self) {
        self.layer.set_fill_color(rgb(BACKGROUND));
        self.layer.add_rect(
            Rect::new(Mm(0.0), Mm(0.0), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT))
                .with_mode(PaintMode::Fill),
        );
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Statement");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = MARGIN;
        self.pages += 1;
        self.paint_background();
    }

    /// Start a new page if a line of `height` would run into the bottom
    /// margin. Returns `true` when a page was added.
    fn ensure_room(&mut self, height: f32) -> bool {
        if self.cursor + height > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.new_page();
            return true;
        }
        false
    }

    fn ln(&mut self, height: f32) {
        self.cursor += height;
    }

    fn font(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.fonts.regular,
            Face::Bold => &self.fonts.bold,
            Face::Italic => &self.fonts.italic,
        }
    }

    /// Draw one cell of the current line at `x`, `width` wide.
    #[allow(clippy::too_many_arguments)]
    fn cell(
        &self,
        x: f32,
        width: f32,
        text: &str,
        face: Face,
        size: f32,
        color: (u8, u8, u8),
        align: Align,
        border: bool,
        fill: Option<(u8, u8, u8)>,
    ) {
        let top = PAGE_HEIGHT - self.cursor;
        let bottom = top - ROW_HEIGHT;
        if let Some(fill) = fill {
            self.layer.set_fill_color(rgb(fill));
            self.layer.add_rect(
                Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(top)).with_mode(PaintMode::Fill),
            );
        }
        if border {
            self.layer.set_outline_color(rgb(MUTED));
            self.layer.set_outline_thickness(0.5);
            self.layer.add_rect(
                Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(top)).with_mode(PaintMode::Stroke),
            );
        }

        let text = printable(text);
        let size_mm = size * PT_TO_MM;
        let text_x = match align {
            Align::Left => x + 1.0,
            Align::Center => {
                let estimated = text.chars().count() as f32 * size_mm * HELVETICA_MEAN_ADVANCE;
                x + ((width - estimated) / 2.0).max(0.0)
            }
        };
        let baseline = top - ROW_HEIGHT / 2.0 - size_mm * 0.35;
        self.layer.set_fill_color(rgb(color));
        self.layer
            .use_text(text, size, Mm(text_x), Mm(baseline), self.font(face));
    }

    /// Full-width line, then move down by `height`.
    fn line(
        &mut self,
        text: &str,
        face: Face,
        size: f32,
        color: (u8, u8, u8),
        align: Align,
        height: f32,
    ) {
        self.ensure_room(height);
        let saved = self.cursor;
        // Center the text vertically inside `height` like a cell would.
        self.cursor += (height - ROW_HEIGHT) / 2.0;
        self.cell(MARGIN, CONTENT_WIDTH, text, face, size, color, align, false, None);
        self.cursor = saved + height;
    }

    fn finish(self) -> Result<(Vec<u8>, usize), ReportError> {
        let pages = self.pages;
        let bytes = self.doc.save_to_bytes().map_err(pdf_error)?;
        Ok((bytes, pages))
    }
}

fn metric_row(canvas: &mut Canvas, label: &str, value: Money, color: (u8, u8, u8)) {
    canvas.ensure_room(ROW_HEIGHT);
    canvas.cell(MARGIN, 90.0, label, Face::Regular, 12.0, color, Align::Left, false, None);
    canvas.cell(
        MARGIN + 90.0,
        90.0,
        &value.with_symbol(),
        Face::Regular,
        12.0,
        color,
        Align::Left,
        true,
        None,
    );
    canvas.ln(ROW_HEIGHT);
}

fn ledger_header(canvas: &mut Canvas) {
    let currency = Currency::Inr.code();
    let amount_header = format!("Amount ({currency})");
    let headers = ["Date", "Time", "Description", amount_header.as_str()];
    let mut x = MARGIN;
    for (header, width) in headers.iter().zip(LEDGER_COLUMNS) {
        canvas.cell(
            x,
            width,
            header,
            Face::Bold,
            10.0,
            BACKGROUND,
            Align::Left,
            true,
            Some(ACCENT),
        );
        x += width;
    }
    canvas.ln(ROW_HEIGHT);
}

fn render(document: &StatementDocument) -> Result<(Vec<u8>, usize), ReportError> {
    let statement = &document.statement;
    let title = format!("{PRODUCT_NAME} Statement");
    let mut canvas = Canvas::new(&title)?;

    canvas.line(
        &format!("{} - FINANCIAL STATEMENT", PRODUCT_NAME.to_uppercase()),
        Face::Bold,
        24.0,
        ACCENT,
        Align::Center,
        20.0,
    );
    canvas.line(
        &format!(
            "Generated on: {}",
            document.generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
        Face::Italic,
        10.0,
        MUTED,
        Align::Center,
        ROW_HEIGHT,
    );
    canvas.ln(10.0);

    canvas.line(
        &format!("Operator: {}", document.operator),
        Face::Bold,
        14.0,
        TEXT,
        Align::Left,
        ROW_HEIGHT,
    );
    canvas.line(
        &format!("Cycle Start: {}", statement.cycle_start.format("%d %b %Y")),
        Face::Bold,
        14.0,
        TEXT,
        Align::Left,
        ROW_HEIGHT,
    );
    canvas.ln(5.0);

    canvas.cell(MARGIN, 90.0, "Metric", Face::Regular, 12.0, TEXT, Align::Left, true, None);
    canvas.cell(
        MARGIN + 90.0,
        90.0,
        &format!("Value ({})", Currency::Inr.code()),
        Face::Regular,
        12.0,
        TEXT,
        Align::Left,
        true,
        None,
    );
    canvas.ln(ROW_HEIGHT);
    metric_row(
        &mut canvas,
        "Monthly Credit Allocation",
        statement.allocation.allocated,
        TEXT,
    );
    metric_row(&mut canvas, "Total Consumption", statement.total_spent, SPENT);
    metric_row(
        &mut canvas,
        "Available Reserve",
        statement.remaining_balance,
        RESERVE,
    );
    canvas.ln(15.0);

    canvas.line(
        "TRANSACTION PROTOCOLS",
        Face::Bold,
        16.0,
        ACCENT,
        Align::Left,
        ROW_HEIGHT,
    );
    canvas.ln(5.0);
    canvas.ensure_room(2.0 * ROW_HEIGHT);
    ledger_header(&mut canvas);

    for tx in &statement.transactions {
        if canvas.ensure_room(ROW_HEIGHT) {
            ledger_header(&mut canvas);
        }
        let date = tx.date.format("%Y-%m-%d").to_string();
        let time = tx.time.format("%H:%M:%S").to_string();
        let amount = tx.amount.to_string();
        let cells = [
            date.as_str(),
            time.as_str(),
            truncate(&tx.description, DESCRIPTION_WIDTH),
            amount.as_str(),
        ];
        let mut x = MARGIN;
        for (text, width) in cells.iter().zip(LEDGER_COLUMNS) {
            canvas.cell(x, width, text, Face::Regular, 9.0, TEXT, Align::Left, true, None);
            x += width;
        }
        canvas.ln(ROW_HEIGHT);
    }

    canvas.ln(20.0);
    canvas.line(
        &format!("End of {PRODUCT_NAME} Protocol Statement."),
        Face::Italic,
        8.0,
        MUTED,
        Align::Center,
        ROW_HEIGHT,
    );

    canvas.finish()
}

/// Render `document` to PDF bytes.
pub fn render_statement(document: &StatementDocument) -> Result<Vec<u8>, ReportError> {
    let (bytes, pages) = render(document)?;
    tracing::debug!(
        "rendered statement for {} ({} transactions, {pages} pages, {} bytes)",
        document.operator,
        document.statement.transactions.len(),
        bytes.len()
    );
    Ok(bytes)
}
