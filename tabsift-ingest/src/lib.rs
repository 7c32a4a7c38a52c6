//! tabsift-ingest: turns uploaded files (delimited text or spreadsheet
//! workbooks) into a [`RawTable`]. Thin I/O layer; unreadable files and
//! tables without header or data rows are the only fatal errors.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use tabsift_core::RawTable;

pub mod delimited;
pub mod workbook;

/// Read any supported file into a table, dispatching on the extension.
/// Unknown extensions are tried as delimited text.
pub fn read_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => workbook::read(path),
        _ => delimited::read(path),
    }
}

/// Make header names usable as row keys: trim, fill empty names with their
/// 1-based position, and suffix duplicates with theirs.
pub(crate) fn finalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, header) in raw.into_iter().enumerate() {
        let mut name = header.trim_start_matches('\u{feff}').trim().to_string();
        if name.is_empty() {
            name = format!("column_{}", idx + 1);
        }
        if !seen.insert(name.to_lowercase()) {
            name = format!("{}_{}", name, idx + 1);
            seen.insert(name.to_lowercase());
        }
        headers.push(name);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_headers_fills_and_dedupes() {
        let raw = vec![
            "".to_string(),
            "Amount".to_string(),
            "amount".to_string(),
            " Date ".to_string(),
        ];
        assert_eq!(
            finalize_headers(raw),
            vec!["column_1", "Amount", "amount_3", "Date"]
        );
    }
}
