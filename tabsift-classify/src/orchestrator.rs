//! Classification orchestration: deterministic auto-mapping first, then the
//! assist collaborator, then the rule-based fallback.
//!
//! Classification never fails. Assist errors, timeouts, and malformed
//! payloads are swallowed and degrade to the fallback; the worst case is a
//! low-confidence result that forces manual review.

use std::collections::HashMap;

use tabsift_core::budget::{BudgetShape, detect_shape};
use tabsift_core::{
    CANDIDATE_KINDS, ClassificationResult, ColumnMapping, DatasetKind, FieldType, IGNORE_FIELD,
    RawTable, average_confidence, catalog_for, dedupe_field_claims, field_named,
    mapping_for_field, match_headers, required_fields,
};

use crate::assist::{AssistMapping, AssistProvider, AssistRequest};
use crate::fallback::classify_rule_based;

/// Auto-mapping skips review only at or above this average confidence.
pub const AUTO_MAP_MIN_CONFIDENCE: f64 = 0.9;

/// Assist/fallback results below this confidence require manual review.
pub const MANUAL_REVIEW_THRESHOLD: f64 = 0.8;

/// Confidence penalty per missing required field.
const MISSING_FIELD_PENALTY: f64 = 0.7;

const SAMPLE_ROW_LIMIT: usize = 5;

/// Classify one table into a dataset kind plus column mappings.
pub fn classify(
    table: &RawTable,
    file_name: &str,
    assist: Option<&dyn AssistProvider>,
    business_context: Option<&str>,
) -> ClassificationResult {
    // Deterministic pass: first kind whose required fields are all mapped
    // with high average confidence wins outright.
    for kind in CANDIDATE_KINDS {
        let mappings = match_headers(&table.headers, catalog_for(kind));
        let confidence = average_confidence(&mappings);
        let has_required =
            required_fields(kind).all(|f| mapping_for_field(&mappings, f.name).is_some());
        if has_required && confidence >= AUTO_MAP_MIN_CONFIDENCE {
            return ClassificationResult {
                dataset_kind: kind,
                confidence,
                mappings,
                issues: Vec::new(),
                needs_manual_review: false,
                auto_mapped: true,
            };
        }
    }

    let mut result = assist
        .and_then(|provider| suggest_via_assist(table, file_name, provider, business_context))
        .unwrap_or_else(|| classify_rule_based(table));

    validate_required(table, &mut result);
    result.confidence = result.confidence.clamp(0.0, 1.0);
    result.needs_manual_review = result.confidence < MANUAL_REVIEW_THRESHOLD;
    result
}

/// Ask the assist collaborator; `None` for anything unusable so the caller
/// falls back. Errors are deliberately not propagated.
fn suggest_via_assist(
    table: &RawTable,
    file_name: &str,
    provider: &dyn AssistProvider,
    business_context: Option<&str>,
) -> Option<ClassificationResult> {
    let request = AssistRequest {
        file_name: file_name.to_string(),
        headers: table.headers.clone(),
        sample_rows: table.rows.iter().take(SAMPLE_ROW_LIMIT).cloned().collect(),
        business_context: business_context.map(str::to_string),
    };

    let response = provider.suggest(&request).ok()?;
    let kind = DatasetKind::parse(&response.file_type)?;
    if response.column_mappings.is_empty() {
        return None;
    }

    let (mappings, mut issues) = sanitize_mappings(table, kind, response.column_mappings);
    if mappings.iter().all(|m| m.is_ignored()) {
        return None;
    }
    issues.extend(response.issues);

    Some(ClassificationResult {
        dataset_kind: kind,
        confidence: response.confidence.clamp(0.0, 1.0),
        mappings,
        issues,
        needs_manual_review: true,
        auto_mapped: false,
    })
}

/// Turn assist suggestions into one mapping per actual header. Suggestions
/// for absent columns or unknown standard fields become issues; duplicate
/// field claims are resolved by confidence.
fn sanitize_mappings(
    table: &RawTable,
    kind: DatasetKind,
    suggestions: Vec<AssistMapping>,
) -> (Vec<ColumnMapping>, Vec<String>) {
    let mut issues = Vec::new();
    let mut by_column: HashMap<&str, &AssistMapping> = HashMap::new();
    for suggestion in &suggestions {
        if table.headers.iter().any(|h| h == &suggestion.original_column) {
            by_column.entry(suggestion.original_column.as_str()).or_insert(suggestion);
        } else {
            issues.push(format!(
                "assist suggested unknown column '{}'",
                suggestion.original_column
            ));
        }
    }

    let mut mappings: Vec<ColumnMapping> = table
        .headers
        .iter()
        .map(|header| {
            let Some(suggestion) = by_column.get(header.as_str()) else {
                return ColumnMapping::ignored(header.clone(), 0.0);
            };
            if suggestion.standard_field == IGNORE_FIELD {
                return ColumnMapping::ignored(header.clone(), suggestion.confidence.clamp(0.0, 1.0));
            }
            match field_named(kind, &suggestion.standard_field) {
                Some(field) => ColumnMapping {
                    original_column: header.clone(),
                    standard_field: field.name.to_string(),
                    confidence: suggestion.confidence.clamp(0.0, 1.0),
                    data_type: suggestion
                        .data_type
                        .as_deref()
                        .and_then(FieldType::parse)
                        .unwrap_or(field.field_type),
                },
                None => {
                    issues.push(format!(
                        "assist suggested unknown field '{}' for column '{}'",
                        suggestion.standard_field, header
                    ));
                    ColumnMapping::ignored(header.clone(), 0.0)
                }
            }
        })
        .collect();

    dedupe_field_claims(&mut mappings);
    (mappings, issues)
}

/// Missing required fields downgrade confidence and leave a trace. A wide
/// budget matrix carries its months in column headers, so the budget
/// requirements are satisfied structurally there.
fn validate_required(table: &RawTable, result: &mut ClassificationResult) {
    if result.dataset_kind == DatasetKind::Budget
        && matches!(detect_shape(table), BudgetShape::Wide { .. })
    {
        return;
    }
    for field in required_fields(result.dataset_kind) {
        if mapping_for_field(&result.mappings, field.name).is_none() {
            result
                .issues
                .push(format!("required field '{}' is not mapped", field.name));
            result.confidence *= MISSING_FIELD_PENALTY;
        }
    }
}
