//! Spreadsheet workbook reader (xlsx/xls/ods) via calamine.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Reader, open_workbook_auto};
use tabsift_core::RawTable;

use crate::finalize_headers;

/// Read the first worksheet of a workbook into a table.
///
/// The first non-empty row is the header row. Serial date cells keep their
/// numeric form; the value normalizer downstream understands spreadsheet
/// serials.
pub fn read(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("{} has no worksheets", path.display()))?
        .with_context(|| format!("reading first worksheet of {}", path.display()))?;

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<HashMap<String, String>> = Vec::new();

    for row in range.rows() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        let is_blank = cells.iter().all(|c| c.is_empty());

        match &headers {
            None => {
                if !is_blank {
                    headers = Some(finalize_headers(cells));
                }
            }
            Some(names) => {
                if is_blank {
                    continue;
                }
                let mut mapped = HashMap::with_capacity(names.len());
                for (idx, name) in names.iter().enumerate() {
                    let value = cells.get(idx).map(String::as_str).unwrap_or("");
                    if !value.is_empty() {
                        mapped.insert(name.clone(), value.to_string());
                    }
                }
                rows.push(mapped);
            }
        }
    }

    let Some(headers) = headers else {
        bail!("{}: no header row found", path.display());
    };
    if rows.is_empty() {
        bail!("{}: no data rows found", path.display());
    }

    Ok(RawTable::new(headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Render whole floats without the trailing `.0` Excel never shows.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
