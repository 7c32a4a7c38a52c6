//! Confidence-scored fuzzy matching of raw headers onto catalog fields.
//!
//! Deterministic and stateless: exact synonym hits score 1.0, containment
//! 0.9, word overlap up to 0.8, abbreviation aliases 0.7. Headers below the
//! accept threshold stay unmapped. Ties between catalog fields resolve to
//! the first field in catalog order.

use crate::catalog::SchemaField;
use crate::mapping::{ColumnMapping, dedupe_field_claims};

/// Minimum confidence for a header to be accepted as mapped.
pub const ACCEPT_THRESHOLD: f64 = 0.7;

/// Fixed abbreviation aliases, scored 0.7 when the expansion hits a synonym.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("amt", "amount"),
    ("cust", "client"),
    ("desc", "description"),
    ("descr", "description"),
    ("cat", "category"),
    ("ref", "reference"),
    ("acct", "account"),
    ("dt", "date"),
    ("dat", "datum"),
    ("betr", "betrag"),
];

/// Lowercase, strip punctuation used as word separators, collapse spacing.
fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.' | '/' | ':') { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn abbreviation_score(header: &str, synonym: &str) -> f64 {
    for word in header.split_whitespace() {
        if let Some((_, expansion)) = ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == word) {
            if synonym == *expansion || synonym.contains(expansion) || expansion.contains(synonym)
            {
                return 0.7;
            }
        }
    }
    0.0
}

/// Score one normalized header against one synonym.
fn score_synonym(header: &str, synonym: &str) -> f64 {
    if header == synonym {
        return 1.0;
    }
    if header.contains(synonym) || synonym.contains(header) {
        return 0.9;
    }

    let header_words: Vec<&str> = header.split_whitespace().collect();
    let synonym_words: Vec<&str> = synonym.split_whitespace().collect();
    let overlap = if header_words.is_empty() || synonym_words.is_empty() {
        0.0
    } else {
        let hits = synonym_words
            .iter()
            .filter(|sw| header_words.iter().any(|hw| hw.contains(*sw)))
            .count();
        hits as f64 / synonym_words.len() as f64 * 0.8
    };

    overlap.max(abbreviation_score(header, synonym))
}

/// Best field and confidence for every header against `catalog`.
///
/// Headers under [`ACCEPT_THRESHOLD`] come back as `ignore` mappings with
/// their losing score. At most one header keeps each standard field; on a
/// claim conflict the higher-confidence header wins, first header on ties.
pub fn match_headers(headers: &[String], catalog: &[SchemaField]) -> Vec<ColumnMapping> {
    let mut mappings: Vec<ColumnMapping> = headers
        .iter()
        .map(|header| {
            let normalized = normalize_header(header);
            if normalized.is_empty() {
                return ColumnMapping::ignored(header.clone(), 0.0);
            }
            let mut best: Option<(&SchemaField, f64)> = None;
            for field in catalog {
                let score = field
                    .synonyms
                    .iter()
                    .map(|syn| score_synonym(&normalized, syn))
                    .fold(0.0, f64::max);
                if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                    best = Some((field, score));
                }
            }
            match best {
                Some((field, confidence)) if confidence >= ACCEPT_THRESHOLD => ColumnMapping {
                    original_column: header.clone(),
                    standard_field: field.name.to_string(),
                    confidence: confidence.clamp(0.0, 1.0),
                    data_type: field.field_type,
                },
                Some((_, confidence)) => ColumnMapping::ignored(header.clone(), confidence),
                None => ColumnMapping::ignored(header.clone(), 0.0),
            }
        })
        .collect();

    dedupe_field_claims(&mut mappings);
    mappings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DatasetKind, catalog_for};
    use crate::mapping::average_confidence;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_synonym_scores_one() {
        let mappings = match_headers(
            &headers(&["Date", "Amount"]),
            catalog_for(DatasetKind::Transactions),
        );
        assert_eq!(mappings[0].standard_field, "date");
        assert_eq!(mappings[0].confidence, 1.0);
        assert_eq!(mappings[1].standard_field, "amount");
        assert_eq!(mappings[1].confidence, 1.0);
    }

    #[test]
    fn test_containment_scores_point_nine() {
        let mappings = match_headers(
            &headers(&["Booking Date (Valuta)"]),
            catalog_for(DatasetKind::Transactions),
        );
        assert_eq!(mappings[0].standard_field, "date");
        assert_eq!(mappings[0].confidence, 0.9);
    }

    #[test]
    fn test_abbreviation_alias() {
        let mappings = match_headers(&headers(&["Amt"]), catalog_for(DatasetKind::Transactions));
        assert_eq!(mappings[0].standard_field, "amount");
        assert_eq!(mappings[0].confidence, 0.7);
    }

    #[test]
    fn test_unknown_header_is_ignored() {
        let mappings = match_headers(
            &headers(&["Zufallsspalte"]),
            catalog_for(DatasetKind::Transactions),
        );
        assert!(mappings[0].is_ignored());
        assert!(mappings[0].confidence < ACCEPT_THRESHOLD);
    }

    #[test]
    fn test_german_bank_headers() {
        let mappings = match_headers(
            &headers(&["Buchungstag", "Verwendungszweck", "Betrag", "Empfänger"]),
            catalog_for(DatasetKind::Transactions),
        );
        assert_eq!(mappings[0].standard_field, "date");
        assert_eq!(mappings[1].standard_field, "description");
        assert_eq!(mappings[2].standard_field, "amount");
        assert_eq!(mappings[3].standard_field, "name");
        assert_eq!(average_confidence(&mappings), 1.0);
    }

    #[test]
    fn test_duplicate_field_claims_keep_best() {
        // "Amount" (exact, 1.0) and "Total Amount" (containment, 0.9) both
        // claim the amount field; only the stronger one may keep it.
        let mappings = match_headers(
            &headers(&["Total Amount", "Amount"]),
            catalog_for(DatasetKind::Transactions),
        );
        assert!(mappings[0].is_ignored());
        assert_eq!(mappings[1].standard_field, "amount");

        let claimed = mappings
            .iter()
            .filter(|m| m.standard_field == "amount")
            .count();
        assert_eq!(claimed, 1);
    }

    #[test]
    fn test_confidence_always_in_unit_interval() {
        let odd = headers(&["", "  ", "Datum", "x_y-z.q", "AMOUNT!!!", "日付"]);
        for kind in crate::catalog::CANDIDATE_KINDS {
            for m in match_headers(&odd, catalog_for(kind)) {
                assert!((0.0..=1.0).contains(&m.confidence), "{m:?}");
            }
        }
    }

    #[test]
    fn test_underscored_header_normalizes() {
        let mappings = match_headers(
            &headers(&["transaction_id"]),
            catalog_for(DatasetKind::Transactions),
        );
        assert_eq!(mappings[0].standard_field, "id");
        assert_eq!(mappings[0].confidence, 1.0);
    }
}
