use crate::domain::ledger::{Balance, LedgerRow, LedgerTable, MaturityEntry, MaturityReport};
use crate::domain::schema::CanonicalColumn;
use chrono::{Days, NaiveDate};

pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Attach `Saldo Kredit` to every row and collect the contracts due within
/// `horizon_days` of `as_of` (inclusive). Overdue contracts are included;
/// rows without a contract date never are.
pub fn derive(
    mut table: LedgerTable,
    horizon_days: u32,
    as_of: NaiveDate,
) -> (LedgerTable, MaturityReport) {
    for row in &mut table.rows {
        row.saldo_kredit = Some(saldo_kredit(row));
    }

    let cutoff = as_of
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);

    let entries: Vec<MaturityEntry> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let due = row.date(CanonicalColumn::JatuhTempoKontrak)?.date()?;
            (due <= cutoff).then(|| MaturityEntry {
                index,
                days_until_due: (due - as_of).num_days(),
                row: row.clone(),
            })
        })
        .collect();

    let undefined = table
        .rows
        .iter()
        .filter(|row| row.saldo_kredit == Some(Balance::Undefined))
        .count();
    tracing::debug!(
        "Derived balances for {} row(s) ({} undefined); {} contract(s) due by {}",
        table.rows.len(),
        undefined,
        entries.len(),
        cutoff
    );

    let report = MaturityReport {
        as_of,
        horizon_days,
        cutoff,
        entries,
    };
    (table, report)
}

/// `Nominal Kredit - Total Pencairan (Rp)`
pub fn saldo_kredit(row: &LedgerRow) -> Balance {
    let nominal = row
        .amount(CanonicalColumn::NominalKredit)
        .and_then(|amount| amount.value());
    let pencairan = row
        .amount(CanonicalColumn::TotalPencairan)
        .and_then(|amount| amount.value());

    match (nominal, pencairan) {
        (Some(nominal), Some(pencairan)) => nominal
            .checked_sub(pencairan)
            .map(Balance::Value)
            .unwrap_or(Balance::Undefined),
        _ => Balance::Undefined,
    }
}
