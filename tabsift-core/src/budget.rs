//! Budget matrix reshaping.
//!
//! Budget uploads come in two shapes: a wide matrix (one category column,
//! one column per month) or a long table (explicit month/category/value
//! columns). Shape is detected from cell content, then either shape is
//! flattened into (month, category, value) triples.

use std::collections::BTreeSet;

use crate::aliases::canonical_category;
use crate::mapping::{ColumnMapping, mapping_for_field};
use crate::normalize::{month_key, parse_amount};
use crate::records::StandardBudget;
use crate::table::RawTable;

const SHAPE_SAMPLE_ROWS: usize = 10;
const NUMERIC_RATIO_THRESHOLD: f64 = 0.7;
const MIN_NON_EMPTY_VALUES: usize = 3;

/// Detected orientation of a budget file.
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetShape {
    Wide {
        category_column: String,
        month_columns: Vec<String>,
    },
    Long,
}

/// Classify columns over a small row sample: columns whose non-empty values
/// are mostly numeric are month candidates, the rest category candidates.
/// Exactly one category candidate plus at least two month candidates means
/// wide format.
pub fn detect_shape(table: &RawTable) -> BudgetShape {
    let mut month_columns: Vec<String> = Vec::new();
    let mut category_columns: Vec<String> = Vec::new();

    for header in &table.headers {
        let values: Vec<&str> = table
            .column_values(header)
            .take(SHAPE_SAMPLE_ROWS)
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            continue;
        }
        let numeric = values.iter().filter(|v| parse_amount(v).is_some()).count();
        let ratio = numeric as f64 / values.len() as f64;
        if values.len() >= MIN_NON_EMPTY_VALUES && ratio >= NUMERIC_RATIO_THRESHOLD {
            month_columns.push(header.clone());
        } else {
            category_columns.push(header.clone());
        }
    }

    if category_columns.len() == 1 && month_columns.len() >= 2 {
        BudgetShape::Wide {
            category_column: category_columns.pop().unwrap_or_default(),
            month_columns,
        }
    } else {
        BudgetShape::Long
    }
}

/// Flatten a budget table of either shape into a [`StandardBudget`].
pub fn reshape_budget(table: &RawTable, mappings: &[ColumnMapping]) -> StandardBudget {
    let triples = match detect_shape(table) {
        BudgetShape::Wide {
            category_column,
            month_columns,
        } => flatten_wide(table, &category_column, &month_columns),
        BudgetShape::Long => flatten_long(table, mappings),
    };

    let mut budget = StandardBudget::default();
    let mut months: BTreeSet<String> = BTreeSet::new();
    for (month, category, value) in triples {
        months.insert(month.clone());
        *budget
            .categories
            .entry(category)
            .or_default()
            .entry(month)
            .or_insert(0.0) += value;
    }
    budget.months = months.into_iter().collect();
    budget
}

/// One triple per non-empty month cell. Month headers go through the date
/// cascade; headers that are no dates keep their trimmed text as key.
fn flatten_wide(
    table: &RawTable,
    category_column: &str,
    month_columns: &[String],
) -> Vec<(String, String, f64)> {
    let mut triples = Vec::new();
    for row in &table.rows {
        let raw_category = table.cell(row, category_column);
        if raw_category.is_empty() {
            continue;
        }
        let category = canonical_category(raw_category);
        for column in month_columns {
            let cell = table.cell(row, column);
            if cell.is_empty() {
                continue;
            }
            let month = month_key(column).unwrap_or_else(|| column.trim().to_string());
            let value = parse_amount(cell).unwrap_or(0.0);
            triples.push((month, category.clone(), value));
        }
    }
    triples
}

/// One triple per row from explicit month/category/value columns; rows
/// missing month or category are dropped.
fn flatten_long(table: &RawTable, mappings: &[ColumnMapping]) -> Vec<(String, String, f64)> {
    let month_column = mapping_for_field(mappings, "month").map(|m| m.original_column.as_str());
    let category_column =
        mapping_for_field(mappings, "category").map(|m| m.original_column.as_str());
    let value_column =
        mapping_for_field(mappings, "budgeted_amount").map(|m| m.original_column.as_str());

    let mut triples = Vec::new();
    for row in &table.rows {
        let raw_month = month_column.map(|c| table.cell(row, c)).unwrap_or("");
        let raw_category = category_column.map(|c| table.cell(row, c)).unwrap_or("");
        if raw_month.is_empty() || raw_category.is_empty() {
            continue;
        }
        let month = month_key(raw_month).unwrap_or_else(|| raw_month.to_string());
        let value = value_column
            .map(|c| table.cell(row, c))
            .and_then(parse_amount)
            .unwrap_or(0.0);
        triples.push((month, canonical_category(raw_category), value));
    }
    triples
}
