//! tabsift-classify: classification orchestration, the AI assist
//! capability, the rule-based fallback, and the end-to-end ingestion
//! pipeline handing canonical records to a storage sink.

pub mod assist;
pub mod fallback;
pub mod orchestrator;
pub mod pipeline;

pub use assist::{AssistMapping, AssistProvider, AssistRequest, AssistResponse, LlmAssist};
pub use fallback::{FALLBACK_CONFIDENCE_CAP, classify_rule_based};
pub use orchestrator::{AUTO_MAP_MIN_CONFIDENCE, MANUAL_REVIEW_THRESHOLD, classify};
pub use pipeline::{
    CanonicalRecords, IngestOutcome, IngestReport, InsertReceipt, NormalizedBatch,
    ReviewedMapping, StorageSink, ingest_table, normalize_records, resume_with_mappings,
};
