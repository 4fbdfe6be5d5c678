use crate::domain::schema::{CanonicalColumn, SALDO_KREDIT_LABEL};
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Currency cell after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Value(i64),
    /// Original (trimmed) cell text, kept for display.
    Unparseable(String),
}

impl Amount {
    pub fn value(&self) -> Option<i64> {
        match self {
            Amount::Value(v) => Some(*v),
            Amount::Unparseable(_) => None,
        }
    }
}

/// Date cell after coercion. `NoDate` is valid domain state, not a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    Date(NaiveDate),
    NoDate,
}

impl DueDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DueDate::Date(d) => Some(*d),
            DueDate::NoDate => None,
        }
    }
}

/// Derived `Saldo Kredit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    Value(i64),
    Undefined,
}

impl Balance {
    pub fn value(&self) -> Option<i64> {
        match self {
            Balance::Value(v) => Some(*v),
            Balance::Undefined => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Amount(Amount),
    Date(DueDate),
    Text(String),
}

// JSON 輸出: 標記值一律輸出為 null
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.date().serialize(serializer)
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// One ledger row. Only columns present in the source appear in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRow {
    fields: BTreeMap<CanonicalColumn, FieldValue>,
    /// `None` until derivation has run.
    pub saldo_kredit: Option<Balance>,
}

impl LedgerRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: CanonicalColumn, value: FieldValue) {
        self.fields.insert(column, value);
    }

    pub fn get(&self, column: CanonicalColumn) -> Option<&FieldValue> {
        self.fields.get(&column)
    }

    pub fn amount(&self, column: CanonicalColumn) -> Option<&Amount> {
        match self.fields.get(&column)? {
            FieldValue::Amount(amount) => Some(amount),
            _ => None,
        }
    }

    pub fn date(&self, column: CanonicalColumn) -> Option<DueDate> {
        match self.fields.get(&column)? {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn text(&self, column: CanonicalColumn) -> Option<&str> {
        match self.fields.get(&column)? {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn nama_proyek(&self) -> &str {
        self.text(CanonicalColumn::NamaProyek).unwrap_or_default()
    }
}

impl Serialize for LedgerRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.saldo_kredit.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column.label(), value)?;
        }
        if let Some(balance) = &self.saldo_kredit {
            map.serialize_entry(SALDO_KREDIT_LABEL, balance)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerTable {
    pub columns: Vec<CanonicalColumn>,
    pub rows: Vec<LedgerRow>,
}

impl LedgerTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaturityEntry {
    /// Position of the row in the ledger table.
    pub index: usize,
    /// Negative when the contract is already overdue.
    pub days_until_due: i64,
    pub row: LedgerRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaturityReport {
    pub as_of: NaiveDate,
    pub horizon_days: u32,
    pub cutoff: NaiveDate,
    pub entries: Vec<MaturityEntry>,
}

impl MaturityReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectTotals {
    pub nama_proyek: String,
    pub rows: usize,
    pub nominal_kredit: i64,
    pub total_pencairan: i64,
    pub baki_debet: i64,
    pub saldo_kredit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub projects: Vec<ProjectTotals>,
    pub totals: ProjectTotals,
    /// Rows left out of every sum because their balance is undefined.
    pub undefined_balances: usize,
}

/// Result of a completed ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerOutput {
    pub table: LedgerTable,
    pub maturity: MaturityReport,
    pub summary: PortfolioSummary,
    /// False when the header fell back to row 0.
    pub anchored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Completed(LedgerOutput),
    /// A workbook was given without a sheet; the caller must pick one.
    SheetSelectionRequired(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut row = LedgerRow::new();
        row.insert(
            CanonicalColumn::NamaProyek,
            FieldValue::Text("Jalan Tol".to_string()),
        );
        row.insert(
            CanonicalColumn::NominalKredit,
            FieldValue::Amount(Amount::Value(500_000)),
        );
        row.insert(
            CanonicalColumn::JatuhTempoKontrak,
            FieldValue::Date(DueDate::NoDate),
        );

        assert_eq!(row.nama_proyek(), "Jalan Tol");
        assert_eq!(
            row.amount(CanonicalColumn::NominalKredit),
            Some(&Amount::Value(500_000))
        );
        assert_eq!(row.date(CanonicalColumn::JatuhTempoKontrak), Some(DueDate::NoDate));
        // 型別不符時不回傳
        assert_eq!(row.amount(CanonicalColumn::NamaProyek), None);
        assert_eq!(row.text(CanonicalColumn::Bowheer), None);
    }

    #[test]
    fn test_row_serializes_with_labels() {
        let mut row = LedgerRow::new();
        row.insert(
            CanonicalColumn::TotalPencairan,
            FieldValue::Amount(Amount::Unparseable("N/A".to_string())),
        );
        row.insert(
            CanonicalColumn::JatuhTempoKontrak,
            FieldValue::Date(DueDate::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())),
        );
        row.saldo_kredit = Some(Balance::Undefined);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Jatuh Tempo Kontrak": "2024-01-31",
                "Total Pencairan (Rp)": null,
                "Saldo Kredit": null
            })
        );
    }
}
