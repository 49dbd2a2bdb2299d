//! Always-quoted CSV encoding of inventory rows.
//!
//! The header comes from the first row's columns in insertion order. Every
//! field is wrapped in double quotes, embedded quotes are doubled, rows are
//! joined with `\n` and there is no trailing newline. An empty row set
//! encodes to the empty string.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;

/// Text written for a header column that a row does not carry (or carries as null).
pub const MISSING_FIELD: &str = "";

/// One flat record: ordered column name to optional scalar value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryRow {
    fields: Vec<(String, Option<String>)>,
}

impl InventoryRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column with a value (builder form).
    #[must_use]
    pub fn field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(column, Some(value.into()));
        self
    }

    /// Appends a column whose value may be absent (builder form).
    #[must_use]
    pub fn optional_field(mut self, column: impl Into<String>, value: Option<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a column, keeping its original position if it already exists.
    pub fn set(&mut self, column: impl Into<String>, value: Option<String>) {
        let column = column.into();
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.fields.push((column, value));
        }
    }

    /// Value of `column`, or `None` when the column is absent or null.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Encodes `rows` as an always-quoted CSV document.
///
/// Columns absent from a row render as [`MISSING_FIELD`]; columns a row has
/// beyond the header are not written.
///
/// # Errors
///
/// Returns [`ExportError::Encoding`] if the CSV writer fails.
///
/// # Examples
///
/// ```
/// use inventory_export::tabular::{InventoryRow, encode_rows};
///
/// let rows = vec![InventoryRow::new().field("Name", "Say \"hi\"").field("Amount", "2")];
/// let csv = encode_rows(&rows).unwrap();
/// assert_eq!(csv, "\"Name\",\"Amount\"\n\"Say \"\"hi\"\"\",\"2\"");
/// ```
pub fn encode_rows(rows: &[InventoryRow]) -> Result<String, ExportError> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let header: Vec<&str> = first.columns().collect();
    if header.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(&header)
        .map_err(|e| ExportError::encoding(e.to_string()))?;
    for row in rows {
        writer
            .write_record(
                header
                    .iter()
                    .map(|column| row.get(column).unwrap_or(MISSING_FIELD)),
            )
            .map_err(|e| ExportError::encoding(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::encoding(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| ExportError::encoding(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
