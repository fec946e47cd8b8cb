//! Printable statements.
//!
//! A [`StatementDocument`] wraps an engine [`Statement`] with what only the
//! printed version needs (who downloaded it and when). [`render_statement`]
//! turns it into an in-memory PDF.

use chrono::{NaiveDate, NaiveDateTime};
use engine::Statement;
use thiserror::Error;

pub use pdf::render_statement;

mod pdf;

/// Product name printed on statements and used in file names.
pub const PRODUCT_NAME: &str = "Hakogane";

/// Descriptions longer than this are cut in the transaction table.
pub const DESCRIPTION_WIDTH: usize = 45;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to render statement: {0}")]
    Pdf(String),
}

/// Everything printed on a statement.
#[derive(Clone, Debug)]
pub struct StatementDocument {
    /// Username shown as "Operator".
    pub operator: String,
    /// Local time the document was produced.
    pub generated_at: NaiveDateTime,
    /// Closed statement, transactions in chronological order.
    pub statement: Statement,
}

/// Download name of the statement of the cycle starting on `cycle_start`,
/// e.g. `Hakogane_Statement_Mar_2024.pdf`.
pub fn statement_filename(cycle_start: NaiveDate) -> String {
    format!(
        "{PRODUCT_NAME}_Statement_{}.pdf",
        cycle_start.format("%b_%Y")
    )
}

/// Cut `text` to at most `width` characters.
pub(crate) fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
