use crate::domain::ledger::{Balance, LedgerTable, PortfolioSummary, ProjectTotals};
use crate::domain::schema::CanonicalColumn;

/// Per-project totals in first-seen order.
///
/// Rows whose balance is undefined are left out of every sum and only
/// counted; an unparseable `Baki Debet` alone adds zero to that column.
pub fn summarize(table: &LedgerTable) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();

    for row in &table.rows {
        let saldo = match row.saldo_kredit {
            Some(Balance::Value(value)) => value,
            _ => {
                summary.undefined_balances += 1;
                continue;
            }
        };

        let amount = |column| {
            row.amount(column)
                .and_then(|amount| amount.value())
                .unwrap_or(0)
        };
        let nominal = amount(CanonicalColumn::NominalKredit);
        let pencairan = amount(CanonicalColumn::TotalPencairan);
        let baki_debet = amount(CanonicalColumn::BakiDebet);

        let name = row.nama_proyek();
        let index = match summary.projects.iter().position(|p| p.nama_proyek == name) {
            Some(index) => index,
            None => {
                summary.projects.push(ProjectTotals {
                    nama_proyek: name.to_string(),
                    ..ProjectTotals::default()
                });
                summary.projects.len() - 1
            }
        };

        for totals in [&mut summary.projects[index], &mut summary.totals] {
            totals.rows += 1;
            totals.nominal_kredit = totals.nominal_kredit.saturating_add(nominal);
            totals.total_pencairan = totals.total_pencairan.saturating_add(pencairan);
            totals.baki_debet = totals.baki_debet.saturating_add(baki_debet);
            totals.saldo_kredit = totals.saldo_kredit.saturating_add(saldo);
        }
    }

    tracing::debug!(
        "Summarized {} project(s), {} row(s) without a balance",
        summary.projects.len(),
        summary.undefined_balances
    );
    summary
}
