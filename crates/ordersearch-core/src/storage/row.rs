//! Raw result rows returned by a query backend.

/// A single stored value as read from or written to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Integer(_) => "integer",
            Cell::Real(_) => "real",
            Cell::Text(_) => "text",
            Cell::Blob(_) => "blob",
        }
    }
}

/// One result row with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<(String, Cell)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Cell)>) -> Self {
        Self { columns }
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| cell)
    }
}
