//! Static schema catalogs: the canonical fields each dataset kind can carry,
//! with the synonym vocabulary (English and German) the matcher scores
//! headers against. Never mutated at runtime.

use serde::{Deserialize, Serialize};

/// Expected value type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "currency")]
    Currency,
    #[serde(rename = "boolean")]
    Boolean,
}

impl FieldType {
    /// Parse the wire form used by the assist collaborator (`"date"`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Some(FieldType::Text),
            "number" | "numeric" | "float" | "integer" => Some(FieldType::Number),
            "date" | "datetime" => Some(FieldType::Date),
            "currency" | "money" | "amount" => Some(FieldType::Currency),
            "boolean" | "bool" => Some(FieldType::Boolean),
            _ => None,
        }
    }
}

/// The closed set of dataset kinds the pipeline can classify into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    #[serde(rename = "deals")]
    Deals,
    #[serde(rename = "transactions")]
    Transactions,
    #[serde(rename = "budget")]
    Budget,
    #[serde(rename = "generic")]
    Generic,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Deals => "deals",
            DatasetKind::Transactions => "transactions",
            DatasetKind::Budget => "budget",
            DatasetKind::Generic => "generic",
        }
    }

    /// Lenient parse of the kind names external collaborators send back.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deals" | "deal" | "crm" | "pipeline" | "opportunities" => Some(DatasetKind::Deals),
            "transactions" | "transaction" | "bank" | "bank_transactions" => {
                Some(DatasetKind::Transactions)
            }
            "budget" | "budgets" | "budget_plan" => Some(DatasetKind::Budget),
            "generic" | "unknown" | "other" => Some(DatasetKind::Generic),
            _ => None,
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds tried during classification, in fixed priority order.
pub const CANDIDATE_KINDS: [DatasetKind; 3] = [
    DatasetKind::Deals,
    DatasetKind::Transactions,
    DatasetKind::Budget,
];

/// One canonical field: its name, header synonyms, and expected type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    pub field_type: FieldType,
    pub required: bool,
}

pub const DEAL_FIELDS: &[SchemaField] = &[
    SchemaField {
        name: "deal_name",
        synonyms: &[
            "deal name",
            "deal",
            "opportunity",
            "opportunity name",
            "project",
            "projekt",
            "title",
            "titel",
        ],
        field_type: FieldType::Text,
        required: true,
    },
    SchemaField {
        name: "client_name",
        synonyms: &[
            "client",
            "client name",
            "customer",
            "customer name",
            "kunde",
            "kundenname",
            "company",
            "firma",
            "account name",
        ],
        field_type: FieldType::Text,
        required: true,
    },
    SchemaField {
        name: "amount",
        synonyms: &[
            "amount",
            "deal value",
            "value",
            "betrag",
            "summe",
            "volumen",
            "wert",
        ],
        field_type: FieldType::Currency,
        required: true,
    },
    SchemaField {
        name: "phase",
        synonyms: &[
            "phase",
            "stage",
            "status",
            "pipeline stage",
            "vertriebsphase",
        ],
        field_type: FieldType::Text,
        required: false,
    },
    SchemaField {
        name: "first_appointment",
        synonyms: &[
            "first appointment",
            "ersttermin",
            "first contact",
            "erstkontakt",
            "first meeting",
        ],
        field_type: FieldType::Date,
        required: false,
    },
    SchemaField {
        name: "closing_date",
        synonyms: &[
            "closing date",
            "close date",
            "closing",
            "abschlussdatum",
            "expected close",
        ],
        field_type: FieldType::Date,
        required: false,
    },
    SchemaField {
        name: "product",
        synonyms: &["product", "produkt", "service", "leistung"],
        field_type: FieldType::Text,
        required: false,
    },
    SchemaField {
        name: "id",
        synonyms: &["deal id", "id", "opportunity id"],
        field_type: FieldType::Text,
        required: false,
    },
];

pub const TRANSACTION_FIELDS: &[SchemaField] = &[
    SchemaField {
        name: "date",
        synonyms: &[
            "date",
            "datum",
            "buchungstag",
            "booking date",
            "transaction date",
            "valuta",
            "wertstellung",
        ],
        field_type: FieldType::Date,
        required: true,
    },
    SchemaField {
        name: "amount",
        synonyms: &[
            "amount",
            "betrag",
            "summe",
            "value",
            "umsatz",
            "wert",
            "total",
        ],
        field_type: FieldType::Currency,
        required: true,
    },
    SchemaField {
        name: "name",
        synonyms: &[
            "name",
            "payee",
            "empfaenger",
            "empfänger",
            "auftraggeber",
            "counterparty",
            "merchant",
        ],
        field_type: FieldType::Text,
        required: false,
    },
    SchemaField {
        name: "description",
        synonyms: &[
            "description",
            "beschreibung",
            "verwendungszweck",
            "purpose",
            "memo",
            "details",
        ],
        field_type: FieldType::Text,
        required: false,
    },
    SchemaField {
        name: "category",
        synonyms: &["category", "kategorie", "type", "art"],
        field_type: FieldType::Text,
        required: false,
    },
    SchemaField {
        name: "reference",
        synonyms: &["reference", "referenz", "iban", "konto", "account"],
        field_type: FieldType::Text,
        required: false,
    },
    SchemaField {
        name: "id",
        synonyms: &["transaction id", "id", "transaktionsnummer", "tx id"],
        field_type: FieldType::Text,
        required: false,
    },
];

pub const BUDGET_FIELDS: &[SchemaField] = &[
    SchemaField {
        name: "month",
        synonyms: &["month", "monat", "period", "periode", "zeitraum"],
        field_type: FieldType::Date,
        required: true,
    },
    SchemaField {
        name: "budgeted_amount",
        synonyms: &[
            "budget",
            "budgeted amount",
            "planned",
            "plan",
            "planwert",
            "soll",
            "amount",
            "betrag",
            "value",
        ],
        field_type: FieldType::Currency,
        required: true,
    },
    SchemaField {
        name: "category",
        synonyms: &[
            "category",
            "kategorie",
            "cost center",
            "kostenstelle",
            "position",
            "bereich",
        ],
        field_type: FieldType::Text,
        required: false,
    },
];

/// Catalog for one kind. `Generic` carries no catalog.
pub fn catalog_for(kind: DatasetKind) -> &'static [SchemaField] {
    match kind {
        DatasetKind::Deals => DEAL_FIELDS,
        DatasetKind::Transactions => TRANSACTION_FIELDS,
        DatasetKind::Budget => BUDGET_FIELDS,
        DatasetKind::Generic => &[],
    }
}

pub fn required_fields(kind: DatasetKind) -> impl Iterator<Item = &'static SchemaField> {
    catalog_for(kind).iter().filter(|f| f.required)
}

pub fn field_named(kind: DatasetKind, name: &str) -> Option<&'static SchemaField> {
    catalog_for(kind).iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_per_kind() {
        let deals: Vec<&str> = required_fields(DatasetKind::Deals).map(|f| f.name).collect();
        assert_eq!(deals, vec!["deal_name", "client_name", "amount"]);

        let txns: Vec<&str> = required_fields(DatasetKind::Transactions)
            .map(|f| f.name)
            .collect();
        assert_eq!(txns, vec!["date", "amount"]);

        let budget: Vec<&str> = required_fields(DatasetKind::Budget).map(|f| f.name).collect();
        assert_eq!(budget, vec!["month", "budgeted_amount"]);

        assert_eq!(required_fields(DatasetKind::Generic).count(), 0);
    }

    #[test]
    fn test_kind_parse_lenient() {
        assert_eq!(DatasetKind::parse("Transactions"), Some(DatasetKind::Transactions));
        assert_eq!(DatasetKind::parse("crm"), Some(DatasetKind::Deals));
        assert_eq!(DatasetKind::parse("budget_plan"), Some(DatasetKind::Budget));
        assert_eq!(DatasetKind::parse("spreadsheet"), None);
    }

    #[test]
    fn test_field_type_parse() {
        assert_eq!(FieldType::parse("Date"), Some(FieldType::Date));
        assert_eq!(FieldType::parse("money"), Some(FieldType::Currency));
        assert_eq!(FieldType::parse("blob"), None);
    }
}
