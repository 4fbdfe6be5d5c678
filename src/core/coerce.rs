use crate::core::reader::excel_serial_to_datetime;
use crate::domain::ledger::{Amount, DueDate, FieldValue, LedgerRow, LedgerTable};
use crate::domain::model::{Cell, ReconciledTable};
use crate::domain::schema::{CanonicalColumn, ColumnKind};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Earlier years come from `%Y` swallowing a two-digit year.
const MIN_PLAUSIBLE_YEAR: i32 = 1900;

// 1.000.000 / 1.000.000,50
static DOT_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{3})+(,\d+)?$").unwrap());
// 1,000,000 / 1,000,000.50
static COMMA_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());
static SIMPLE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[.,]\d+$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// 數字日期先試月/日，月份不合法 (首欄 > 12) 才改用日/月
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
    "%d-%m-%y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Convert every reconciled cell to its column's semantic type.
///
/// Never fails: cells that cannot be read become `Amount::Unparseable` or
/// `DueDate::NoDate` and the rest of the row is kept.
pub fn coerce(table: ReconciledTable) -> LedgerTable {
    let mut unparseable = 0usize;
    let mut no_date = 0usize;
    let mut rows = Vec::with_capacity(table.rows.len());

    for cells in &table.rows {
        let mut row = LedgerRow::new();
        for (column, cell) in table.columns.iter().zip(cells) {
            let value = coerce_cell(*column, cell);
            match &value {
                FieldValue::Amount(Amount::Unparseable(_)) => unparseable += 1,
                FieldValue::Date(DueDate::NoDate) => no_date += 1,
                _ => {}
            }
            row.insert(*column, value);
        }
        rows.push(row);
    }

    tracing::debug!(
        "Coerced {} row(s): {} unparseable amount(s), {} missing date(s)",
        rows.len(),
        unparseable,
        no_date
    );

    LedgerTable {
        columns: table.columns,
        rows,
    }
}

pub fn coerce_cell(column: CanonicalColumn, cell: &Cell) -> FieldValue {
    match column.kind() {
        ColumnKind::Currency => FieldValue::Amount(coerce_amount(cell)),
        ColumnKind::Date => FieldValue::Date(coerce_date(cell)),
        ColumnKind::Text => FieldValue::Text(cell.to_label().trim().to_string()),
    }
}

pub fn coerce_amount(cell: &Cell) -> Amount {
    let parsed = match cell {
        Cell::Number(n) => round_to_i64(*n),
        Cell::Text(text) => parse_amount(text),
        Cell::Empty | Cell::Bool(_) | Cell::Date(_) => None,
    };

    match parsed {
        Some(value) => Amount::Value(value),
        None => Amount::Unparseable(cell.to_label().trim().to_string()),
    }
}

fn round_to_i64(n: f64) -> Option<i64> {
    let rounded = n.round();
    if rounded.is_finite() && rounded.abs() < 9.0e18 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Parse a Rupiah amount written by hand or by a spreadsheet.
///
/// Accepts `Rp`/`IDR` prefixes, a trailing `,-`, a leading minus or
/// accounting parentheses, and both Indonesian (`1.000.000,50`) and English
/// (`1,000,000.50`) grouping. Fractions round half away from zero.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let mut text = raw.trim();
    let mut negative = false;

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.trim_start();
    }
    text = strip_currency_prefix(text);
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.trim_start();
    }
    text = text
        .strip_suffix(",-")
        .or_else(|| text.strip_suffix(".-"))
        .unwrap_or(text);

    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let (integer, fraction) = if compact.chars().all(|c| c.is_ascii_digit()) {
        (compact, String::new())
    } else if DOT_GROUPED.is_match(&compact) {
        split_decimal(&compact, ',', '.')
    } else if COMMA_GROUPED.is_match(&compact) {
        split_decimal(&compact, '.', ',')
    } else if SIMPLE_DECIMAL.is_match(&compact) {
        let separator = if compact.contains(',') { ',' } else { '.' };
        split_decimal(&compact, separator, separator)
    } else {
        return None;
    };

    let mut value: i64 = integer.parse().ok()?;
    if fraction.starts_with(['5', '6', '7', '8', '9']) {
        value = value.checked_add(1)?;
    }

    Some(if negative { -value } else { value })
}

fn split_decimal(text: &str, decimal: char, grouping: char) -> (String, String) {
    let (integer, fraction) = text.split_once(decimal).unwrap_or((text, ""));
    (integer.replace(grouping, ""), fraction.to_string())
}

fn strip_currency_prefix(text: &str) -> &str {
    let lower = text.to_ascii_lowercase();
    for prefix in ["rp.", "rp", "idr"] {
        if lower.starts_with(prefix) {
            return text[prefix.len()..].trim_start();
        }
    }
    text
}

/// Read a due-date cell.
///
/// Only numeric cells are taken as spreadsheet serials. Text is parsed as a
/// written date, so a text cell holding digits such as "45322" is `NoDate`.
pub fn coerce_date(cell: &Cell) -> DueDate {
    let parsed = match cell {
        Cell::Date(dt) => Some(dt.date()),
        Cell::Number(serial) => excel_serial_to_datetime(*serial).map(|dt| dt.date()),
        Cell::Text(text) => parse_date(text),
        Cell::Empty | Cell::Bool(_) => None,
    };

    parsed.map(DueDate::Date).unwrap_or(DueDate::NoDate)
}

/// Lenient calendar-date parsing with Indonesian month names.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = normalize_month_names(raw.trim());
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return plausible(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
        .map(|dt| dt.date())
        .chain(
            DATE_FORMATS
                .iter()
                .filter_map(|format| NaiveDate::parse_from_str(&text, format).ok()),
        )
        .find_map(plausible)
}

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_PLAUSIBLE_YEAR).then_some(date)
}

fn normalize_month_names(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_alphabetic() {
            word.push(ch);
        } else {
            push_word(&mut out, &mut word);
            out.push(ch);
        }
    }
    push_word(&mut out, &mut word);
    out
}

fn push_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    let lower = word.to_lowercase();
    out.push_str(indonesian_month(&lower).unwrap_or(word.as_str()));
    word.clear();
}

fn indonesian_month(word: &str) -> Option<&'static str> {
    let english = match word {
        "januari" => "january",
        "februari" | "pebruari" => "february",
        "maret" => "march",
        "mei" => "may",
        "juni" => "june",
        "juli" => "july",
        "agustus" => "august",
        "oktober" => "october",
        "nopember" => "november",
        "desember" => "december",
        "peb" => "feb",
        "agu" | "agt" | "ags" => "aug",
        "okt" => "oct",
        "nop" => "nov",
        "des" => "dec",
        _ => return None,
    };
    Some(english)
}
