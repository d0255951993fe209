use std::fmt;

use serde_json::Value;

/// A single spreadsheet cell as the engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell.
    Empty,
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
}

impl Cell {
    /// Builds a text cell, mapping an empty string to [`Cell::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// Builds the cell holding an optional count.
    pub fn count(value: Option<u64>) -> Self {
        match value {
            Some(value) => Cell::Number(value as f64),
            None => Cell::Empty,
        }
    }

    /// Returns true for blank cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(value) => value.trim().is_empty(),
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Number(number) => number.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(value) => Cell::text(value.clone()),
            Value::Bool(value) => Cell::Text(value.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

/// A table materialised as one Excel sheet: a header row followed by data
/// rows. Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// Creates a sheet without columns or rows.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from rows expressed as `(column, cell)` pairs. Columns
    /// are the union of every key in first-seen order and rows keep their
    /// input order; keys a row does not carry become blank cells.
    pub fn from_keyed_rows<I>(sheet_name: impl Into<String>, keyed_rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<(String, Cell)>>,
    {
        let keyed_rows: Vec<Vec<(String, Cell)>> = keyed_rows.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for row in &keyed_rows {
            for (column, _) in row {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let rows = keyed_rows
            .into_iter()
            .map(|row| {
                let mut cells = vec![Cell::Empty; columns.len()];
                for (column, cell) in row {
                    if let Some(index) = columns.iter().position(|name| *name == column) {
                        cells[index] = cell;
                    }
                }
                cells
            })
            .collect();

        Self {
            sheet_name: sheet_name.into(),
            columns,
            rows,
        }
    }

    /// Stacks the rows of several tables under the union of their columns.
    pub fn concat<'a, I>(sheet_name: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = &'a SheetTable>,
    {
        Self::from_keyed_rows(
            sheet_name,
            tables.into_iter().flat_map(|table| table.keyed_rows()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Returns the cell of `row` under the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(index))
    }

    /// Removes a column and its cells. Returns whether the column existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
        true
    }

    /// Returns every row as owned `(column, cell)` pairs.
    pub fn keyed_rows(&self) -> Vec<Vec<(String, Cell)>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}
