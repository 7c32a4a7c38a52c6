//! End-to-end ingestion for one file: classify, normalize, hand off to the
//! storage collaborator. Each call is independent and shares no state with
//! sibling files; a classification that needs review stops before
//! normalization and resumes once a corrected mapping comes back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tabsift_core::{
    ClassificationResult, ColumnMapping, DatasetKind, GenericDataset, RawTable, StandardBudget,
    StandardDeal, StandardTransaction, canonical_category, canonical_phase, infer_generic,
    mapping_for_field, parse_amount, parse_date, reshape_budget,
};

use crate::assist::AssistProvider;
use crate::orchestrator::classify;

/// Canonical output of normalization, keyed by dataset kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "records", rename_all = "snake_case")]
pub enum CanonicalRecords {
    Transactions(Vec<StandardTransaction>),
    Deals(Vec<StandardDeal>),
    Budget(StandardBudget),
    Generic(GenericDataset),
}

impl CanonicalRecords {
    pub fn kind(&self) -> DatasetKind {
        match self {
            CanonicalRecords::Transactions(_) => DatasetKind::Transactions,
            CanonicalRecords::Deals(_) => DatasetKind::Deals,
            CanonicalRecords::Budget(_) => DatasetKind::Budget,
            CanonicalRecords::Generic(_) => DatasetKind::Generic,
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            CanonicalRecords::Transactions(t) => t.len(),
            CanonicalRecords::Deals(d) => d.len(),
            CanonicalRecords::Budget(b) => b.triple_count(),
            CanonicalRecords::Generic(g) => g.rows.len(),
        }
    }
}

/// Acknowledgement from the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertReceipt {
    pub dataset_kind: DatasetKind,
    pub records_written: usize,
    pub destination: String,
}

/// External storage collaborator. Insert failures abort the file's
/// ingestion and surface to the caller; sibling files are unaffected.
pub trait StorageSink {
    fn insert(
        &mut self,
        owner: &str,
        file_name: &str,
        records: &CanonicalRecords,
    ) -> Result<InsertReceipt>;
}

/// Normalization output plus how many rows failed required-field coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    pub records: CanonicalRecords,
    pub dropped_rows: usize,
}

/// The shape a reviewer sends back after editing mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedMapping {
    pub dataset_kind: DatasetKind,
    pub mappings: Vec<ColumnMapping>,
}

/// Outcome of one file's ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Records normalized and accepted by the storage collaborator.
    Stored {
        receipt: InsertReceipt,
        dropped_rows: usize,
    },
    /// Classification was not confident enough; mappings await review.
    AwaitingReview,
    /// Generic inference could not produce an insertable dataset.
    NotInsertable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub file_name: String,
    pub classification: ClassificationResult,
    pub outcome: IngestOutcome,
}

/// Apply the value normalizer per kind. Rows failing a required coercion
/// (date/amount for transactions, name/client/amount for deals) are
/// dropped and counted; optional failures normalize to empty or zero.
pub fn normalize_records(
    table: &RawTable,
    kind: DatasetKind,
    mappings: &[ColumnMapping],
) -> NormalizedBatch {
    match kind {
        DatasetKind::Transactions => normalize_transactions(table, mappings),
        DatasetKind::Deals => normalize_deals(table, mappings),
        DatasetKind::Budget => NormalizedBatch {
            records: CanonicalRecords::Budget(reshape_budget(table, mappings)),
            dropped_rows: 0,
        },
        DatasetKind::Generic => {
            let dataset = infer_generic(table);
            let dropped = table.row_count() - dataset.rows.len();
            NormalizedBatch {
                records: CanonicalRecords::Generic(dataset),
                dropped_rows: dropped,
            }
        }
    }
}

fn column<'a>(mappings: &'a [ColumnMapping], field: &str) -> Option<&'a str> {
    mapping_for_field(mappings, field).map(|m| m.original_column.as_str())
}

fn normalize_transactions(table: &RawTable, mappings: &[ColumnMapping]) -> NormalizedBatch {
    let date_col = column(mappings, "date");
    let amount_col = column(mappings, "amount");
    let id_col = column(mappings, "id");
    let name_col = column(mappings, "name");
    let description_col = column(mappings, "description");
    let category_col = column(mappings, "category");
    let reference_col = column(mappings, "reference");

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (idx, row) in table.rows.iter().enumerate() {
        let date = date_col
            .map(|c| table.cell(row, c))
            .and_then(parse_date);
        let amount = amount_col
            .map(|c| table.cell(row, c))
            .and_then(parse_amount);
        let (Some(date), Some(amount)) = (date, amount) else {
            dropped += 1;
            continue;
        };

        let text = |col: Option<&str>| {
            col.map(|c| table.cell(row, c).to_string()).unwrap_or_default()
        };
        let id = match text(id_col) {
            s if s.is_empty() => format!("txn-{}", idx + 1),
            s => s,
        };
        let raw_category = text(category_col);

        records.push(StandardTransaction {
            id,
            date,
            name: text(name_col),
            description: text(description_col),
            amount,
            category: canonical_category(&raw_category),
            reference: text(reference_col),
        });
    }

    NormalizedBatch {
        records: CanonicalRecords::Transactions(records),
        dropped_rows: dropped,
    }
}

fn normalize_deals(table: &RawTable, mappings: &[ColumnMapping]) -> NormalizedBatch {
    let name_col = column(mappings, "deal_name");
    let client_col = column(mappings, "client_name");
    let amount_col = column(mappings, "amount");
    let phase_col = column(mappings, "phase");
    let first_col = column(mappings, "first_appointment");
    let closing_col = column(mappings, "closing_date");
    let product_col = column(mappings, "product");
    let id_col = column(mappings, "id");

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (idx, row) in table.rows.iter().enumerate() {
        let deal_name = name_col.map(|c| table.cell(row, c)).unwrap_or("");
        let client_name = client_col.map(|c| table.cell(row, c)).unwrap_or("");
        let amount = amount_col
            .map(|c| table.cell(row, c))
            .and_then(parse_amount);
        let (false, false, Some(amount)) =
            (deal_name.is_empty(), client_name.is_empty(), amount)
        else {
            dropped += 1;
            continue;
        };

        let optional_date =
            |col: Option<&str>| col.map(|c| table.cell(row, c)).and_then(parse_date);
        let id = match id_col.map(|c| table.cell(row, c)).unwrap_or("") {
            "" => format!("deal-{}", idx + 1),
            s => s.to_string(),
        };

        records.push(StandardDeal {
            id,
            deal_name: deal_name.to_string(),
            phase: phase_col
                .map(|c| canonical_phase(table.cell(row, c)))
                .unwrap_or_default(),
            amount,
            client_name: client_name.to_string(),
            first_appointment: optional_date(first_col),
            closing_date: optional_date(closing_col),
            product: product_col
                .map(|c| table.cell(row, c))
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        });
    }

    NormalizedBatch {
        records: CanonicalRecords::Deals(records),
        dropped_rows: dropped,
    }
}

/// Run the full pipeline for one file.
///
/// A result that needs manual review yields [`IngestOutcome::AwaitingReview`]
/// without touching storage; call [`resume_with_mappings`] with the edited
/// mapping afterwards. Only storage failures surface as errors.
pub fn ingest_table(
    table: &RawTable,
    file_name: &str,
    assist: Option<&dyn AssistProvider>,
    business_context: Option<&str>,
    sink: &mut dyn StorageSink,
    owner: &str,
) -> Result<IngestReport> {
    let classification = classify(table, file_name, assist, business_context);

    if classification.needs_manual_review && classification.dataset_kind != DatasetKind::Generic {
        return Ok(IngestReport {
            file_name: file_name.to_string(),
            classification,
            outcome: IngestOutcome::AwaitingReview,
        });
    }

    let outcome = store(table, file_name, &classification, sink, owner)?;
    Ok(IngestReport {
        file_name: file_name.to_string(),
        classification,
        outcome,
    })
}

/// Re-enter the pipeline with a reviewer-corrected mapping.
pub fn resume_with_mappings(
    table: &RawTable,
    file_name: &str,
    reviewed: &ReviewedMapping,
    sink: &mut dyn StorageSink,
    owner: &str,
) -> Result<IngestReport> {
    let classification = ClassificationResult {
        dataset_kind: reviewed.dataset_kind,
        confidence: 1.0,
        mappings: reviewed.mappings.clone(),
        issues: Vec::new(),
        needs_manual_review: false,
        auto_mapped: false,
    };
    let outcome = store(table, file_name, &classification, sink, owner)?;
    Ok(IngestReport {
        file_name: file_name.to_string(),
        classification,
        outcome,
    })
}

fn store(
    table: &RawTable,
    file_name: &str,
    classification: &ClassificationResult,
    sink: &mut dyn StorageSink,
    owner: &str,
) -> Result<IngestOutcome> {
    let batch = normalize_records(table, classification.dataset_kind, &classification.mappings);

    if let CanonicalRecords::Generic(dataset) = &batch.records {
        if !dataset.ready_for_insert {
            return Ok(IngestOutcome::NotInsertable {
                reason: "generic schema inference left unresolved columns or no rows".to_string(),
            });
        }
    }

    let receipt = sink
        .insert(owner, file_name, &batch.records)
        .with_context(|| format!("storage insert failed for {file_name}"))?;
    Ok(IngestOutcome::Stored {
        receipt,
        dropped_rows: batch.dropped_rows,
    })
}
