//! Canonical record types emitted by normalization.
//!
//! These are handed to the storage collaborator as-is; the pipeline does
//! not own their lifecycle beyond that handoff.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::FieldType;

/// A normalized bank/accounting transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardTransaction {
    pub id: String,
    pub date: NaiveDate,
    pub name: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub reference: String,
}

/// A normalized CRM deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDeal {
    pub id: String,
    pub deal_name: String,
    pub phase: String,
    pub amount: f64,
    pub client_name: String,
    pub first_appointment: Option<NaiveDate>,
    pub closing_date: Option<NaiveDate>,
    pub product: Option<String>,
}

/// A normalized budget: sorted month keys plus category → month → value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardBudget {
    pub months: Vec<String>,
    pub categories: BTreeMap<String, BTreeMap<String, f64>>,
}

impl StandardBudget {
    /// Number of (month, category, value) triples held.
    pub fn triple_count(&self) -> usize {
        self.categories.values().map(|m| m.len()).sum()
    }
}

/// One typed cell of a generic dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Inferred schema entry for one generic column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredColumn {
    pub name: String,
    pub field_type: FieldType,
}

/// Best-effort dataset for files matching no canonical kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericDataset {
    pub schema: Vec<InferredColumn>,
    pub rows: Vec<BTreeMap<String, CellValue>>,
    pub ready_for_insert: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_serializes_iso_date() {
        let txn = StandardTransaction {
            id: "txn-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            name: "Acme".to_string(),
            description: String::new(),
            amount: 1250.0,
            category: "Revenue".to_string(),
            reference: String::new(),
        };
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["amount"], 1250.0);
    }

    #[test]
    fn test_budget_triple_count() {
        let mut budget = StandardBudget::default();
        budget.months = vec!["2024-01".to_string(), "2024-02".to_string()];
        budget
            .categories
            .entry("Rent".to_string())
            .or_default()
            .insert("2024-01".to_string(), 1200.0);
        budget
            .categories
            .entry("Rent".to_string())
            .or_default()
            .insert("2024-02".to_string(), 1200.0);
        assert_eq!(budget.triple_count(), 2);
    }
}
