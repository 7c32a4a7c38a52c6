//! Canonical labels for deal phases and transaction categories, with the
//! English/German spelling variants seen in real exports. Loaded once as
//! static tables; unmatched values pass through unchanged.

/// Canonical pipeline phases, in funnel order.
pub const DEAL_PHASES: [&str; 6] = [
    "Lead Generation",
    "First Contact",
    "Need Qualification",
    "Negotiation",
    "Deal",
    "No Deal",
];

/// Canonical transaction categories.
pub const TRANSACTION_CATEGORIES: [&str; 7] = [
    "Revenue",
    "Salaries",
    "Marketing",
    "Rent",
    "Software",
    "COGS",
    "Other",
];

static PHASE_ALIASES: &[(&str, &str)] = &[
    ("lead generation", "Lead Generation"),
    ("leadgenerierung", "Lead Generation"),
    ("lead gen", "Lead Generation"),
    ("lead", "Lead Generation"),
    ("leads", "Lead Generation"),
    ("first contact", "First Contact"),
    ("erstkontakt", "First Contact"),
    ("erstgespraech", "First Contact"),
    ("erstgespräch", "First Contact"),
    ("contacted", "First Contact"),
    ("need qualification", "Need Qualification"),
    ("needs analysis", "Need Qualification"),
    ("bedarfsanalyse", "Need Qualification"),
    ("bedarfsqualifizierung", "Need Qualification"),
    ("qualification", "Need Qualification"),
    ("qualifizierung", "Need Qualification"),
    ("negotiation", "Negotiation"),
    ("verhandlung", "Negotiation"),
    ("angebot", "Negotiation"),
    ("proposal", "Negotiation"),
    ("offer", "Negotiation"),
    ("deal", "Deal"),
    ("won", "Deal"),
    ("closed won", "Deal"),
    ("gewonnen", "Deal"),
    ("abschluss", "Deal"),
    ("sale", "Deal"),
    ("no deal", "No Deal"),
    ("lost", "No Deal"),
    ("closed lost", "No Deal"),
    ("verloren", "No Deal"),
    ("kein abschluss", "No Deal"),
];

static CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("revenue", "Revenue"),
    ("umsatz", "Revenue"),
    ("einnahmen", "Revenue"),
    ("income", "Revenue"),
    ("sales", "Revenue"),
    ("erloese", "Revenue"),
    ("erlöse", "Revenue"),
    ("salaries", "Salaries"),
    ("salary", "Salaries"),
    ("payroll", "Salaries"),
    ("gehalt", "Salaries"),
    ("gehaelter", "Salaries"),
    ("gehälter", "Salaries"),
    ("lohn", "Salaries"),
    ("loehne", "Salaries"),
    ("löhne", "Salaries"),
    ("personal", "Salaries"),
    ("personalkosten", "Salaries"),
    ("marketing", "Marketing"),
    ("werbung", "Marketing"),
    ("advertising", "Marketing"),
    ("ads", "Marketing"),
    ("rent", "Rent"),
    ("miete", "Rent"),
    ("mietkosten", "Rent"),
    ("lease", "Rent"),
    ("software", "Software"),
    ("saas", "Software"),
    ("tools", "Software"),
    ("lizenzen", "Software"),
    ("licenses", "Software"),
    ("subscriptions", "Software"),
    ("cogs", "COGS"),
    ("cost of goods sold", "COGS"),
    ("cost of goods", "COGS"),
    ("wareneinsatz", "COGS"),
    ("materialkosten", "COGS"),
    ("material", "COGS"),
    ("other", "Other"),
    ("sonstiges", "Other"),
    ("sonstige", "Other"),
    ("misc", "Other"),
    ("miscellaneous", "Other"),
    ("diverses", "Other"),
];

fn lookup(table: &[(&'static str, &'static str)], raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Canonical phase label for `raw`, or the trimmed input when unknown.
pub fn canonical_phase(raw: &str) -> String {
    lookup(PHASE_ALIASES, raw)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Canonical category label for `raw`, or the trimmed input when unknown.
pub fn canonical_category(raw: &str) -> String {
    lookup(CATEGORY_ALIASES, raw)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_aliases_german_and_english() {
        assert_eq!(canonical_phase("Verhandlung"), "Negotiation");
        assert_eq!(canonical_phase("closed won"), "Deal");
        assert_eq!(canonical_phase("  LOST "), "No Deal");
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!(canonical_category("Umsatz"), "Revenue");
        assert_eq!(canonical_category("Gehälter"), "Salaries");
        assert_eq!(canonical_category("Wareneinsatz"), "COGS");
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(canonical_phase("Pilot Phase"), "Pilot Phase");
        assert_eq!(canonical_category(" Reisen "), "Reisen");
    }

    #[test]
    fn test_canonical_labels_map_to_themselves() {
        for phase in DEAL_PHASES {
            assert_eq!(canonical_phase(phase), phase);
        }
        for cat in TRANSACTION_CATEGORIES {
            assert_eq!(canonical_category(cat), cat);
        }
    }
}
