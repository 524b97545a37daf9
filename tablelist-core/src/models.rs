//! Data carried from the database to the report.

/// The one statement tablelist ever sends.
///
/// Columns are read by position, so engines that fold unquoted identifiers
/// to lower case (PostgreSQL) and engines that keep them upper case (MySQL)
/// decode the same way.
pub const TABLES_QUERY: &str = "SELECT T.TABLE_SCHEMA, T.TABLE_NAME, T.TABLE_TYPE FROM INFORMATION_SCHEMA.TABLES T ORDER BY 1 ASC, 2 ASC, 3 ASC";

/// Label of the schema column
pub const COLUMN_TABLE_SCHEMA: &str = "TABLE_SCHEMA";
/// Label of the table name column
pub const COLUMN_TABLE_NAME: &str = "TABLE_NAME";
/// Label of the table type column
pub const COLUMN_TABLE_TYPE: &str = "TABLE_TYPE";

/// One row of `INFORMATION_SCHEMA.TABLES`.
///
/// A field is `None` when the database returned SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// `TABLE_SCHEMA`
    pub schema: Option<String>,
    /// `TABLE_NAME`
    pub name: Option<String>,
    /// `TABLE_TYPE`, such as `BASE TABLE` or `VIEW`
    pub table_type: Option<String>,
}

impl TableRow {
    /// Creates a row where every field is present.
    #[must_use]
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        table_type: impl Into<String>,
    ) -> Self {
        Self {
            schema: Some(schema.into()),
            name: Some(name.into()),
            table_type: Some(table_type.into()),
        }
    }

    /// Sort key matching the `ORDER BY 1, 2, 3` of [`TABLES_QUERY`].
    #[must_use]
    pub fn sort_key(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            self.schema.as_deref(),
            self.name.as_deref(),
            self.table_type.as_deref(),
        )
    }
}
