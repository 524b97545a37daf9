//! Fixed-width table report.
//!
//! ```text
//! --------------------------------------------------------------------------------------------------------------
//! |              TABLE_SCHEMA |                                         TABLE_NAME |                TABLE_TYPE |
//! --------------------------------------------------------------------------------------------------------------
//! |                    PUBLIC |                                           ACCOUNTS |                     TABLE |
//! --------------------------------------------------------------------------------------------------------------
//! ```
//!
//! Values are right-aligned and never truncated: a value longer than its
//! column pushes the rest of the line to the right.

use crate::models::{COLUMN_TABLE_NAME, COLUMN_TABLE_SCHEMA, COLUMN_TABLE_TYPE, TableRow};
use std::io::{self, Write};

/// Width of the schema column
pub const SCHEMA_WIDTH: usize = 25;
/// Width of the table name column
pub const NAME_WIDTH: usize = 50;
/// Width of the table type column
pub const TYPE_WIDTH: usize = 25;

/// Length of a line whose values fit their columns.
pub const LINE_WIDTH: usize = 110;

/// Line printed above the header, below the header, and after the last row.
pub const SEPARATOR: &str = "--------------------------------------------------------------------------------------------------------------";

/// Rendering of a SQL NULL field.
pub const NULL_TEXT: &str = "null";

/// Formats one report line.
///
/// ```rust
/// use tablelist_core::report::{format_line, LINE_WIDTH};
///
/// let line = format_line("PUBLIC", "ACCOUNTS", "TABLE");
/// assert_eq!(line.len(), LINE_WIDTH);
/// assert!(line.ends_with("|                     TABLE |"));
/// ```
#[must_use]
pub fn format_line(schema: &str, name: &str, table_type: &str) -> String {
    format!("| {schema:>SCHEMA_WIDTH$} | {name:>NAME_WIDTH$} | {table_type:>TYPE_WIDTH$} |")
}

/// Formats the header line.
#[must_use]
pub fn header_line() -> String {
    format_line(COLUMN_TABLE_SCHEMA, COLUMN_TABLE_NAME, COLUMN_TABLE_TYPE)
}

/// Formats a data line, rendering NULL fields as [`NULL_TEXT`].
#[must_use]
pub fn row_line(row: &TableRow) -> String {
    format_line(
        row.schema.as_deref().unwrap_or(NULL_TEXT),
        row.name.as_deref().unwrap_or(NULL_TEXT),
        row.table_type.as_deref().unwrap_or(NULL_TEXT),
    )
}

/// Report being written to `W`.
///
/// [`TableReport::begin`] writes the opening separator and header,
/// [`TableReport::finish`] the closing separator. A report dropped without
/// `finish` has no closing separator, which marks it as incomplete.
#[derive(Debug)]
pub struct TableReport<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> TableReport<W> {
    /// Writes the separator, header and separator.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn begin(mut out: W) -> io::Result<Self> {
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out, "{}", header_line())?;
        writeln!(out, "{SEPARATOR}")?;
        Ok(Self { out, rows: 0 })
    }

    /// Writes one data line.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_row(&mut self, row: &TableRow) -> io::Result<()> {
        writeln!(self.out, "{}", row_line(row))?;
        self.rows = self.rows.saturating_add(1);
        Ok(())
    }

    /// Number of data lines written so far.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Writes the closing separator and flushes.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn finish(mut self) -> io::Result<usize> {
        writeln!(self.out, "{SEPARATOR}")?;
        self.out.flush()?;
        Ok(self.rows)
    }
}
