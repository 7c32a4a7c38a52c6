//! Generic ingestion fallback: best-effort schema inference for files that
//! match no canonical dataset kind.

use std::collections::BTreeMap;

use crate::catalog::FieldType;
use crate::normalize::{parse_amount, parse_bool, parse_date};
use crate::records::{CellValue, GenericDataset, InferredColumn};
use crate::table::RawTable;

const INFERENCE_SAMPLE_ROWS: usize = 50;

/// Infer a column type from non-empty samples: number, date, boolean, then
/// text, picking the first that fits a strict majority.
fn infer_column_type(values: &[&str]) -> FieldType {
    if values.is_empty() {
        return FieldType::Text;
    }
    let majority = |count: usize| count * 2 > values.len();

    let numbers = values.iter().filter(|v| parse_amount(v).is_some()).count();
    if majority(numbers) {
        return FieldType::Number;
    }
    let dates = values.iter().filter(|v| parse_date(v).is_some()).count();
    if majority(dates) {
        return FieldType::Date;
    }
    let bools = values.iter().filter(|v| parse_bool(v).is_some()).count();
    if majority(bools) {
        return FieldType::Boolean;
    }
    FieldType::Text
}

fn coerce(raw: &str, field_type: FieldType) -> CellValue {
    if raw.is_empty() {
        return CellValue::Null;
    }
    match field_type {
        FieldType::Number | FieldType::Currency => parse_amount(raw)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null),
        FieldType::Date => parse_date(raw).map(CellValue::Date).unwrap_or(CellValue::Null),
        FieldType::Boolean => parse_bool(raw).map(CellValue::Bool).unwrap_or(CellValue::Null),
        FieldType::Text => CellValue::Text(raw.to_string()),
    }
}

/// Infer a schema over a row sample and normalize every row against it.
///
/// `ready_for_insert` is set only when every column has a non-empty name
/// and at least one non-empty sample, and at least one row survives with a
/// non-null cell.
pub fn infer_generic(table: &RawTable) -> GenericDataset {
    let mut schema = Vec::with_capacity(table.headers.len());
    let mut all_columns_resolved = true;

    for header in &table.headers {
        let samples: Vec<&str> = table
            .column_values(header)
            .take(INFERENCE_SAMPLE_ROWS)
            .filter(|v| !v.is_empty())
            .collect();
        if header.trim().is_empty() || samples.is_empty() {
            all_columns_resolved = false;
        }
        schema.push(InferredColumn {
            name: header.clone(),
            field_type: infer_column_type(&samples),
        });
    }

    let mut rows: Vec<BTreeMap<String, CellValue>> = Vec::new();
    for row in &table.rows {
        let mut normalized = BTreeMap::new();
        for column in &schema {
            let value = coerce(table.cell(row, &column.name), column.field_type);
            normalized.insert(column.name.clone(), value);
        }
        if normalized.values().any(|v| !v.is_null()) {
            rows.push(normalized);
        }
    }

    let ready_for_insert = all_columns_resolved && !rows.is_empty();
    GenericDataset {
        schema,
        rows,
        ready_for_insert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn inventory_table() -> RawTable {
        let headers: Vec<String> = ["Artikel", "Bestand", "Geliefert", "Aktiv"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            row(&[
                ("Artikel", "Schrauben"),
                ("Bestand", "1200"),
                ("Geliefert", "02.01.2024"),
                ("Aktiv", "ja"),
            ]),
            row(&[
                ("Artikel", "Muttern"),
                ("Bestand", "300"),
                ("Geliefert", "15.02.2024"),
                ("Aktiv", "nein"),
            ]),
            row(&[
                ("Artikel", "Scheiben"),
                ("Bestand", "k.A."),
                ("Geliefert", "01.03.2024"),
                ("Aktiv", "ja"),
            ]),
        ];
        RawTable::new(headers, rows)
    }

    #[test]
    fn test_infers_types_by_majority() {
        let dataset = infer_generic(&inventory_table());
        let types: Vec<FieldType> = dataset.schema.iter().map(|c| c.field_type).collect();
        assert_eq!(
            types,
            vec![
                FieldType::Text,
                FieldType::Number,
                FieldType::Date,
                FieldType::Boolean
            ]
        );
        assert!(dataset.ready_for_insert);
        assert_eq!(dataset.rows.len(), 3);
    }

    #[test]
    fn test_failed_coercion_becomes_null() {
        let dataset = infer_generic(&inventory_table());
        assert_eq!(dataset.rows[2]["Bestand"], CellValue::Null);
        assert_eq!(dataset.rows[0]["Bestand"], CellValue::Number(1200.0));
    }

    #[test]
    fn test_empty_column_blocks_readiness() {
        let headers: Vec<String> = vec!["A".to_string(), "B".to_string()];
        let rows = vec![row(&[("A", "1")]), row(&[("A", "2")])];
        let dataset = infer_generic(&RawTable::new(headers, rows));
        assert!(!dataset.ready_for_insert);
        assert_eq!(dataset.rows.len(), 2);
    }

    #[test]
    fn test_no_rows_blocks_readiness() {
        let table = RawTable::new(vec!["A".to_string()], Vec::new());
        let dataset = infer_generic(&table);
        assert!(!dataset.ready_for_insert);
    }
}
