//! The structured outcome of a single query.

use super::error_code::ErrorCode;
use super::value::Value;

static INVALID: Value = Value::Invalid;

/// Field names, rows of tagged values and a status.
///
/// Every row holds exactly one cell per field and rows keep the order the server sent them.
/// Failures are reported through `code` and `message` rather than an error type, so a result
/// set always exists even when nothing was executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    fields: Vec<String>,
    rows: Vec<Vec<Value>>,
    code: ErrorCode,
    message: String,
}

impl ResultSet {
    /// An empty result set carrying only a status.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ResultSet {
            fields: Vec::new(),
            rows: Vec::new(),
            code,
            message: message.into(),
        }
    }

    pub fn with_fields(fields: Vec<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        ResultSet {
            fields,
            rows: Vec::new(),
            code,
            message: message.into(),
        }
    }

    /// Append a row, padding it with invalid cells or truncating it to the field count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.fields.len(), Value::Invalid);
        self.rows.push(row);
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Position of the first field with this name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }

    /// The cell at `(row, field)`, or an invalid value when either index is out of range.
    pub fn get(&self, row: usize, field: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(field))
            .unwrap_or(&INVALID)
    }

    /// The cell in the first field called `name`.
    pub fn get_by_name(&self, row: usize, name: &str) -> &Value {
        match self.field_index(name) {
            Some(field) => self.get(row, field),
            None => &INVALID,
        }
    }

    pub fn is_invalid(&self, row: usize, field: usize) -> bool {
        self.get(row, field).is_invalid()
    }

    /// Rows as JSON objects keyed by field name. Invalid cells are left out.
    pub fn to_json_rows(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|cells| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .fields
                    .iter()
                    .zip(cells)
                    .filter_map(|(field, cell)| cell.to_json().map(|json| (field.clone(), json)))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Renders the rows as a pipe separated table, header first.
impl std::fmt::Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|cells| cells.iter().map(ToString::to_string).collect())
            .collect();

        let mut widths: Vec<usize> = self.fields.iter().map(|field| field.chars().count()).collect();
        for cells in &rendered {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |f: &mut std::fmt::Formatter<'_>, cells: &[String]| -> std::fmt::Result {
            f.write_str("|")?;
            for (cell, width) in cells.iter().zip(&widths) {
                write!(f, " {cell:<width$} |")?;
            }
            writeln!(f)
        };

        line(f, self.fields.as_slice())?;
        let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        line(f, separator.as_slice())?;
        for cells in &rendered {
            line(f, cells.as_slice())?;
        }
        write!(f, "({} rows) {}: {}", self.rows.len(), self.code, self.message)
    }
}
