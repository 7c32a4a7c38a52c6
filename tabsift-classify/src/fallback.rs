//! Rule-based fallback classification, used when neither deterministic
//! auto-mapping nor the assist collaborator produced a usable result.
//! Pure keyword heuristics over the same candidate kinds, capped at a
//! confidence that always routes through manual review.

use tabsift_core::budget::{BudgetShape, detect_shape};
use tabsift_core::{
    CANDIDATE_KINDS, ClassificationResult, ColumnMapping, DatasetKind, RawTable,
    average_confidence, catalog_for, mapping_for_field, match_headers, required_fields,
};

/// Fallback results never claim more confidence than this.
pub const FALLBACK_CONFIDENCE_CAP: f64 = 0.7;

/// Pick the candidate kind whose catalog explains the headers best,
/// weighting match confidence by required-field coverage. A wide budget
/// matrix satisfies the budget requirements structurally, so it scores as
/// fully covered even though its month columns match no synonym.
pub fn classify_rule_based(table: &RawTable) -> ClassificationResult {
    let budget_is_wide = matches!(detect_shape(table), BudgetShape::Wide { .. });

    let mut best: Option<(DatasetKind, Vec<ColumnMapping>, f64)> = None;
    for kind in CANDIDATE_KINDS {
        let mappings = match_headers(&table.headers, catalog_for(kind));
        let avg = average_confidence(&mappings);

        let required: Vec<&str> = required_fields(kind).map(|f| f.name).collect();
        let covered = required
            .iter()
            .filter(|name| mapping_for_field(&mappings, name).is_some())
            .count();
        let coverage = if required.is_empty() {
            0.0
        } else {
            covered as f64 / required.len() as f64
        };

        let mut score = avg * coverage;
        if kind == DatasetKind::Budget && budget_is_wide {
            score = score.max(FALLBACK_CONFIDENCE_CAP);
        }

        if score > 0.0 && best.as_ref().map_or(true, |(_, _, s)| score > *s) {
            best = Some((kind, mappings, score));
        }
    }

    match best {
        Some((kind, mappings, score)) => ClassificationResult {
            dataset_kind: kind,
            confidence: score.min(FALLBACK_CONFIDENCE_CAP),
            mappings,
            issues: Vec::new(),
            needs_manual_review: true,
            auto_mapped: false,
        },
        None => ClassificationResult {
            dataset_kind: DatasetKind::Generic,
            confidence: 0.0,
            mappings: table
                .headers
                .iter()
                .map(|h| ColumnMapping::ignored(h.clone(), 0.0))
                .collect(),
            issues: vec!["no canonical dataset kind matched the headers".to_string()],
            needs_manual_review: true,
            auto_mapped: false,
        },
    }
}
