//! Column mappings and the classification result handed to review.

use serde::{Deserialize, Serialize};

use crate::catalog::{DatasetKind, FieldType};

/// Sentinel standard-field name for headers that map to nothing.
pub const IGNORE_FIELD: &str = "ignore";

/// One header bound to a canonical field (or to [`IGNORE_FIELD`]).
///
/// Created by the matcher or the assist collaborator; a reviewer may edit
/// `standard_field` before normalization runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub original_column: String,
    pub standard_field: String,
    pub confidence: f64,
    pub data_type: FieldType,
}

impl ColumnMapping {
    pub fn ignored(original_column: impl Into<String>, confidence: f64) -> Self {
        Self {
            original_column: original_column.into(),
            standard_field: IGNORE_FIELD.to_string(),
            confidence,
            data_type: FieldType::Text,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.standard_field == IGNORE_FIELD
    }
}

/// Mean confidence over accepted (non-ignore) mappings; 0.0 when none.
pub fn average_confidence(mappings: &[ColumnMapping]) -> f64 {
    let accepted: Vec<&ColumnMapping> = mappings.iter().filter(|m| !m.is_ignored()).collect();
    if accepted.is_empty() {
        return 0.0;
    }
    accepted.iter().map(|m| m.confidence).sum::<f64>() / accepted.len() as f64
}

/// Enforce at most one accepted mapping per standard field: the
/// higher-confidence header keeps its claim, earlier headers win ties, and
/// the losers revert to `ignore`.
pub fn dedupe_field_claims(mappings: &mut [ColumnMapping]) {
    let mut best_for_field: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();
    for (idx, m) in mappings.iter().enumerate() {
        if m.is_ignored() {
            continue;
        }
        match best_for_field.get(&m.standard_field) {
            Some(&kept) if mappings[kept].confidence >= m.confidence => {}
            _ => {
                best_for_field.insert(m.standard_field.clone(), idx);
            }
        }
    }
    for (idx, m) in mappings.iter_mut().enumerate() {
        if !m.is_ignored() && best_for_field[&m.standard_field] != idx {
            *m = ColumnMapping::ignored(m.original_column.clone(), m.confidence);
        }
    }
}

/// The mapping claiming `field`, if any.
pub fn mapping_for_field<'a>(
    mappings: &'a [ColumnMapping],
    field: &str,
) -> Option<&'a ColumnMapping> {
    mappings
        .iter()
        .find(|m| !m.is_ignored() && m.standard_field == field)
}

/// Terminal output of classification, one per uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub dataset_kind: DatasetKind,
    pub confidence: f64,
    pub mappings: Vec<ColumnMapping>,
    pub issues: Vec<String>,
    pub needs_manual_review: bool,
    pub auto_mapped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_skips_ignored() {
        let mappings = vec![
            ColumnMapping {
                original_column: "Datum".to_string(),
                standard_field: "date".to_string(),
                confidence: 1.0,
                data_type: FieldType::Date,
            },
            ColumnMapping {
                original_column: "Betrag".to_string(),
                standard_field: "amount".to_string(),
                confidence: 0.8,
                data_type: FieldType::Currency,
            },
            ColumnMapping::ignored("Notiz", 0.3),
        ];

        assert!((average_confidence(&mappings) - 0.9).abs() < 1e-9);
        assert!(mapping_for_field(&mappings, "date").is_some());
        assert!(mapping_for_field(&mappings, "ignore").is_none());
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average_confidence(&[]), 0.0);
        assert_eq!(average_confidence(&[ColumnMapping::ignored("x", 0.5)]), 0.0);
    }
}
