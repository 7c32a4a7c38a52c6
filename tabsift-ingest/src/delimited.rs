//! Delimited-text reader with delimiter sniffing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, Trim};
use tabsift_core::RawTable;

use crate::finalize_headers;

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Read a delimited file, sniffing the delimiter from the header line.
pub fn read(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let content = String::from_utf8_lossy(&bytes);
    read_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Parse delimited content, sniffing the delimiter first.
pub fn read_str(content: &str) -> Result<RawTable> {
    read_with_delimiter(content, sniff_delimiter(content))
}

/// Most frequent candidate delimiter on the first non-empty line; comma on
/// a complete tie.
pub fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");
    let mut best = b',';
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = first_line.bytes().filter(|b| *b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Parse delimited content with a fixed delimiter.
///
/// Leading blank records are skipped; the first record with any non-empty
/// field is the header row. Missing a header or having zero data rows is
/// fatal for the file.
pub fn read_with_delimiter(content: &str, delimiter: u8) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .has_headers(false)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<HashMap<String, String>> = Vec::new();

    for result in reader.records() {
        let record = result.context("reading delimited record")?;
        let is_blank = record.iter().all(|f| f.trim().is_empty());

        match &headers {
            None => {
                if is_blank {
                    continue;
                }
                headers = Some(finalize_headers(
                    record.iter().map(|f| f.to_string()).collect(),
                ));
            }
            Some(names) => {
                if is_blank {
                    continue;
                }
                let mut row = HashMap::with_capacity(names.len());
                for (idx, name) in names.iter().enumerate() {
                    let value = record.get(idx).unwrap_or("").trim();
                    if !value.is_empty() {
                        row.insert(name.clone(), value.to_string());
                    }
                }
                rows.push(row);
            }
        }
    }

    let Some(headers) = headers else {
        bail!("no header row found");
    };
    if rows.is_empty() {
        bail!("no data rows found");
    }

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniffs_semicolon() {
        let content = "Datum;Betrag;Verwendungszweck\n01.03.2024;-12,50;Miete\n";
        assert_eq!(sniff_delimiter(content), b';');
        let table = read_str(content).unwrap();
        assert_eq!(table.headers, vec!["Datum", "Betrag", "Verwendungszweck"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(&table.rows[0], "Betrag"), "-12,50");
    }

    #[test]
    fn test_sniffs_tab_and_pipe() {
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3\n"), b'|');
        assert_eq!(sniff_delimiter("a,b,c\n"), b',');
    }

    #[test]
    fn test_skips_leading_blank_records() {
        let content = "\n\nDate,Amount\n2024-01-01,10\n\n2024-01-02,20\n";
        let table = read_str(content).unwrap();
        assert_eq!(table.headers, vec!["Date", "Amount"]);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_short_records_leave_cells_empty() {
        let content = "Date,Amount,Note\n2024-01-01,10\n";
        let table = read_str(content).unwrap();
        assert_eq!(table.cell(&table.rows[0], "Note"), "");
    }

    #[test]
    fn test_empty_content_is_fatal() {
        assert!(read_str("").is_err());
        assert!(read_str("\n\n").is_err());
    }

    #[test]
    fn test_header_only_is_fatal() {
        assert!(read_str("Date,Amount\n").is_err());
    }
}
