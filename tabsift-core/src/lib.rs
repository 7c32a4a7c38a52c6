//! tabsift-core: data model and deterministic algorithms for spreadsheet
//! ingestion — schema catalogs, header matching, value normalization,
//! budget reshaping, and generic schema inference. No I/O, no network.

pub mod aliases;
pub mod budget;
pub mod catalog;
pub mod generic;
pub mod mapping;
pub mod matcher;
pub mod normalize;
pub mod records;
pub mod table;

pub use aliases::{canonical_category, canonical_phase};
pub use budget::{BudgetShape, detect_shape, reshape_budget};
pub use catalog::{
    CANDIDATE_KINDS, DatasetKind, FieldType, SchemaField, catalog_for, field_named,
    required_fields,
};
pub use generic::infer_generic;
pub use mapping::{
    ClassificationResult, ColumnMapping, IGNORE_FIELD, average_confidence, dedupe_field_claims,
    mapping_for_field,
};
pub use matcher::{ACCEPT_THRESHOLD, match_headers};
pub use normalize::{month_key, parse_amount, parse_bool, parse_date};
pub use records::{
    CellValue, GenericDataset, InferredColumn, StandardBudget, StandardDeal, StandardTransaction,
};
pub use table::RawTable;
