//! End-to-end ingestion scenarios: delimited content through
//! classification, normalization, and the storage handoff.

use anyhow::{Result, bail};
use tabsift_classify::{
    CanonicalRecords, IngestOutcome, InsertReceipt, ReviewedMapping, StorageSink, ingest_table,
    resume_with_mappings,
};
use tabsift_core::{DatasetKind, mapping_for_field};
use tabsift_ingest::delimited;

#[derive(Default)]
struct MemorySink {
    inserts: Vec<(String, String, CanonicalRecords)>,
}

impl StorageSink for MemorySink {
    fn insert(
        &mut self,
        owner: &str,
        file_name: &str,
        records: &CanonicalRecords,
    ) -> Result<InsertReceipt> {
        self.inserts
            .push((owner.to_string(), file_name.to_string(), records.clone()));
        Ok(InsertReceipt {
            dataset_kind: records.kind(),
            records_written: records.record_count(),
            destination: format!("memory://{owner}"),
        })
    }
}

struct BrokenSink;

impl StorageSink for BrokenSink {
    fn insert(&mut self, _: &str, _: &str, _: &CanonicalRecords) -> Result<InsertReceipt> {
        bail!("connection reset by peer")
    }
}

#[test]
fn test_german_transaction_export_auto_maps_and_normalizes() {
    let csv = "Transaction ID,Date,Name,Amount,Category\n\
               1,01.03.2024,Acme,\"1.250,00\",Umsatz\n\
               2,02.03.2024,Globex,\"-99,90\",Miete\n";
    let table = delimited::read_str(csv).unwrap();
    let mut sink = MemorySink::default();

    let report = ingest_table(&table, "export.csv", None, None, &mut sink, "user-1").unwrap();

    assert_eq!(report.classification.dataset_kind, DatasetKind::Transactions);
    assert!(report.classification.auto_mapped);
    assert!(!report.classification.needs_manual_review);

    let IngestOutcome::Stored { receipt, dropped_rows } = &report.outcome else {
        panic!("expected stored outcome, got {:?}", report.outcome);
    };
    assert_eq!(*dropped_rows, 0);
    assert_eq!(receipt.records_written, 2);

    let CanonicalRecords::Transactions(records) = &sink.inserts[0].2 else {
        panic!("expected transactions in sink");
    };
    assert_eq!(records[0].date.to_string(), "2024-03-01");
    assert_eq!(records[0].amount, 1250.0);
    assert_eq!(records[0].category, "Revenue");
    assert_eq!(records[0].name, "Acme");
    assert_eq!(records[1].amount, -99.90);
    assert_eq!(records[1].category, "Rent");
}

#[test]
fn test_low_confidence_stops_for_review_and_resumes_after_edit() {
    let csv = "Projekt;Ansprechpartner;Summe\n\
               Relaunch;Acme GmbH;12.000,00\n\
               Migration;Globex AG;8.500,00\n";
    let table = delimited::read_str(csv).unwrap();
    let mut sink = MemorySink::default();

    let report = ingest_table(&table, "crm.csv", None, None, &mut sink, "user-1").unwrap();
    assert_eq!(report.outcome, IngestOutcome::AwaitingReview);
    assert_eq!(report.classification.dataset_kind, DatasetKind::Deals);
    assert!(report.classification.needs_manual_review);
    assert!(sink.inserts.is_empty());

    // The reviewer binds the unmatched column and resubmits.
    let mut mappings = report.classification.mappings.clone();
    for mapping in &mut mappings {
        if mapping.original_column == "Ansprechpartner" {
            mapping.standard_field = "client_name".to_string();
            mapping.confidence = 1.0;
        }
    }
    let reviewed = ReviewedMapping {
        dataset_kind: DatasetKind::Deals,
        mappings,
    };

    let resumed = resume_with_mappings(&table, "crm.csv", &reviewed, &mut sink, "user-1").unwrap();
    let IngestOutcome::Stored { receipt, .. } = &resumed.outcome else {
        panic!("expected stored outcome after review");
    };
    assert_eq!(receipt.dataset_kind, DatasetKind::Deals);
    assert_eq!(receipt.records_written, 2);

    let CanonicalRecords::Deals(deals) = &sink.inserts[0].2 else {
        panic!("expected deals in sink");
    };
    assert_eq!(deals[0].client_name, "Acme GmbH");
    assert_eq!(deals[0].amount, 12000.0);
}

#[test]
fn test_wide_budget_routes_to_review_then_reshapes() {
    let csv = "Kategorie;Jan 2024;Feb 2024;Mar 2024\n\
               Miete;1200;1200;1200\n\
               Marketing;500;600;\n\
               Personal;8000;8000;8200\n\
               Software;300;300;300\n";
    let table = delimited::read_str(csv).unwrap();
    let mut sink = MemorySink::default();

    let report = ingest_table(&table, "budget.csv", None, None, &mut sink, "user-1").unwrap();
    assert_eq!(report.classification.dataset_kind, DatasetKind::Budget);
    assert_eq!(report.outcome, IngestOutcome::AwaitingReview);

    let reviewed = ReviewedMapping {
        dataset_kind: DatasetKind::Budget,
        mappings: report.classification.mappings.clone(),
    };
    let resumed =
        resume_with_mappings(&table, "budget.csv", &reviewed, &mut sink, "user-1").unwrap();
    let IngestOutcome::Stored { receipt, .. } = &resumed.outcome else {
        panic!("expected stored outcome");
    };
    // 3 + 2 + 3 + 3 non-empty month cells.
    assert_eq!(receipt.records_written, 11);

    let CanonicalRecords::Budget(budget) = &sink.inserts[0].2 else {
        panic!("expected budget in sink");
    };
    assert_eq!(budget.months, vec!["2024-01", "2024-02", "2024-03"]);
    assert_eq!(budget.categories["Rent"]["2024-01"], 1200.0);
    assert_eq!(budget.categories["Salaries"]["2024-03"], 8200.0);
}

#[test]
fn test_unrecognized_file_lands_in_generic_dataset() {
    let csv = "Alpha,Beta\n1,x\n2,y\n";
    let table = delimited::read_str(csv).unwrap();
    let mut sink = MemorySink::default();

    let report = ingest_table(&table, "odd.csv", None, None, &mut sink, "user-1").unwrap();
    assert_eq!(report.classification.dataset_kind, DatasetKind::Generic);

    let IngestOutcome::Stored { receipt, .. } = &report.outcome else {
        panic!("expected stored outcome, got {:?}", report.outcome);
    };
    assert_eq!(receipt.dataset_kind, DatasetKind::Generic);
    assert_eq!(receipt.records_written, 2);

    let CanonicalRecords::Generic(dataset) = &sink.inserts[0].2 else {
        panic!("expected generic dataset");
    };
    assert!(dataset.ready_for_insert);
}

#[test]
fn test_storage_failure_surfaces_and_spares_siblings() {
    let csv = "Date,Amount\n2024-01-01,10\n";
    let table = delimited::read_str(csv).unwrap();

    let err = ingest_table(&table, "a.csv", None, None, &mut BrokenSink, "user-1");
    assert!(err.is_err());
    assert!(format!("{:#}", err.unwrap_err()).contains("a.csv"));

    // A sibling file with its own sink is unaffected.
    let mut sink = MemorySink::default();
    let report = ingest_table(&table, "b.csv", None, None, &mut sink, "user-1").unwrap();
    assert!(matches!(report.outcome, IngestOutcome::Stored { .. }));
}

#[test]
fn test_mapping_edit_shape_round_trips_as_json() {
    let csv = "Projekt;Ansprechpartner;Summe\nRelaunch;Acme;100\n";
    let table = delimited::read_str(csv).unwrap();
    let mut sink = MemorySink::default();
    let report = ingest_table(&table, "crm.csv", None, None, &mut sink, "user-1").unwrap();

    let reviewed = ReviewedMapping {
        dataset_kind: report.classification.dataset_kind,
        mappings: report.classification.mappings.clone(),
    };
    let json = serde_json::to_string_pretty(&reviewed).unwrap();
    let parsed: ReviewedMapping = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, reviewed);
    assert!(mapping_for_field(&parsed.mappings, "deal_name").is_some());
}
