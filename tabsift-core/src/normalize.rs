//! Locale-aware value normalization.
//!
//! Dates are tried against a fixed cascade (spreadsheet serials, ISO,
//! German, US, month names, then a last round of common formats). Amounts
//! disambiguate decimal/thousands separators from the observed punctuation
//! instead of a fixed locale. Unparsable values normalize to `None`, never
//! to the current date.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// 1970-01-01 expressed in spreadsheet serial days (1900 epoch).
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

// Serial values outside this window are treated as plain numbers; bare
// amounts like "1250" must not turn into dates.
const SERIAL_MIN: f64 = 20_000.0;
const SERIAL_MAX: f64 = 80_000.0;

static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());

static CURRENCY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(eur|euro|usd|gbp|chf|cad|aud)\b").unwrap());

const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("januar", 1),
    ("jan", 1),
    ("february", 2),
    ("februar", 2),
    ("feb", 2),
    ("march", 3),
    ("maerz", 3),
    ("märz", 3),
    ("mar", 3),
    ("mrz", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("mai", 5),
    ("june", 6),
    ("juni", 6),
    ("jun", 6),
    ("july", 7),
    ("juli", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oktober", 10),
    ("oct", 10),
    ("okt", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dezember", 12),
    ("dec", 12),
    ("dez", 12),
];

/// Parse a raw cell into a calendar date, trying each rule in order.
///
/// Returns `None` when nothing matches. A partially-parsed string never
/// leaks through, and there is no current-date fallback.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = parse_serial(s) {
        return Some(d);
    }

    for fmt in ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    if let Some(d) = parse_month_name(s) {
        return Some(d);
    }

    // Last round: remaining conventions seen in exports.
    for fmt in ["%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&s.replace('T', " "), "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Some(caps) = YEAR_MONTH_RE.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }

    None
}

/// Spreadsheet serial date: days since the 1900 epoch, 25569 days before
/// the Unix epoch. Bounded to a plausible window.
fn parse_serial(s: &str) -> Option<NaiveDate> {
    let value: f64 = s.parse().ok()?;
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&value) {
        return None;
    }
    let days = (value - SERIAL_EPOCH_OFFSET_DAYS).floor() as i64;
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(days))
}

/// Month-name forms: "March", "Mar 2024", "Dezember 2023". Day is always
/// the 1st; a missing year defaults to the current year.
fn parse_month_name(s: &str) -> Option<NaiveDate> {
    let tokens: Vec<String> = s
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    if tokens.is_empty() || tokens.len() > 2 {
        return None;
    }

    let month = tokens.iter().find_map(|t| {
        MONTH_NAMES
            .iter()
            .find(|(name, _)| name == t)
            .map(|(_, m)| *m)
    })?;
    let year = tokens
        .iter()
        .find_map(|t| t.parse::<i32>().ok())
        .filter(|y| (1900..=2100).contains(y))
        .unwrap_or_else(|| Utc::now().date_naive().year());

    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Project a raw month label onto a `YYYY-MM` key.
pub fn month_key(raw: &str) -> Option<String> {
    parse_date(raw).map(|d| d.format("%Y-%m").to_string())
}

/// Parse a currency/number string into a finite signed value.
///
/// Separator rules: with both `,` and `.` present the rightmost one is the
/// decimal separator; a lone comma is decimal only when exactly two digits
/// follow it. Currency symbols, codes, grouping apostrophes, and whitespace
/// are stripped first.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let stripped = CURRENCY_CODE_RE.replace_all(raw, "");
    let mut cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£' | '¥' | '\''))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let negative_parens = cleaned.starts_with('(') && cleaned.ends_with(')');
    if negative_parens {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ','))
    {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                // German convention: dots group, comma is decimal.
                cleaned.replace('.', "").replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (Some(comma), None) => {
            let digits_after = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && digits_after == 2 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        _ => cleaned,
    };

    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative_parens { -value } else { value })
}

/// Boolean coercion used by generic schema inference.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "ja" | "y" | "x" | "wahr" | "1" => Some(true),
        "false" | "no" | "nein" | "n" | "falsch" | "0" => Some(false),
        _ => None,
    }
}
