//! Raw table model shared by every pipeline stage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One parsed upload: an ordered header list plus one map per data row.
///
/// Produced once by the reader and only read afterwards. Row maps are keyed
/// by the exact header strings in `headers`; missing keys mean empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<HashMap<String, String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed cell value for `header` in `row`, or `""` when absent.
    pub fn cell<'a>(&self, row: &'a HashMap<String, String>, header: &str) -> &'a str {
        row.get(header).map(|v| v.trim()).unwrap_or("")
    }

    /// Trimmed values of one column, in row order (empty cells included).
    pub fn column_values<'a>(&'a self, header: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(header).map(|v| v.trim()).unwrap_or(""))
    }
}
