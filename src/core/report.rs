use crate::core::header::ANCHOR_LABEL;
use crate::domain::ledger::{Amount, Balance, LedgerOutput, LedgerRow, ProjectTotals};
use crate::domain::schema::{CanonicalColumn, SALDO_KREDIT_LABEL};
use crate::utils::error::Result;
use std::fmt::Write;

const UNDEFINED: &str = "-";

/// Terminal view of a completed run, in the dashboard's own wording.
pub fn render_text(output: &LedgerOutput) -> String {
    let mut out = String::new();

    if !output.anchored {
        let _ = writeln!(
            out,
            "Catatan: label \"{}\" tidak ditemukan, baris pertama dipakai sebagai header.\n",
            ANCHOR_LABEL
        );
    }

    let _ = writeln!(out, "📊 Ringkasan Kredit Proyek ({} baris)", output.table.len());
    let rows: Vec<Vec<String>> = output
        .table
        .rows
        .iter()
        .map(|row| {
            vec![
                row.nama_proyek().to_string(),
                amount_cell(row, CanonicalColumn::NominalKredit),
                amount_cell(row, CanonicalColumn::TotalPencairan),
                amount_cell(row, CanonicalColumn::BakiDebet),
                balance_cell(row.saldo_kredit),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &[
            CanonicalColumn::NamaProyek.label(),
            CanonicalColumn::NominalKredit.label(),
            CanonicalColumn::TotalPencairan.label(),
            CanonicalColumn::BakiDebet.label(),
            SALDO_KREDIT_LABEL,
        ],
        &rows,
    ));

    let _ = writeln!(out, "\n💰 Total per Proyek");
    let mut totals: Vec<Vec<String>> = output.summary.projects.iter().map(totals_row).collect();
    let mut grand_total = totals_row(&output.summary.totals);
    grand_total[0] = "TOTAL".to_string();
    totals.push(grand_total);
    out.push_str(&render_table(
        &[
            CanonicalColumn::NamaProyek.label(),
            CanonicalColumn::NominalKredit.label(),
            CanonicalColumn::TotalPencairan.label(),
            CanonicalColumn::BakiDebet.label(),
            SALDO_KREDIT_LABEL,
        ],
        &totals,
    ));
    if output.summary.undefined_balances > 0 {
        let _ = writeln!(
            out,
            "({} baris tanpa Saldo Kredit tidak ikut dijumlahkan)",
            output.summary.undefined_balances
        );
    }

    let maturity = &output.maturity;
    out.push('\n');
    if maturity.is_empty() {
        let _ = writeln!(
            out,
            "✅ Tidak ada proyek yang mendekati jatuh tempo dalam {} hari ke depan!",
            maturity.horizon_days
        );
    } else {
        let _ = writeln!(
            out,
            "⚠️ Proyek berikut mendekati jatuh tempo kontrak (s.d. {}):",
            maturity.cutoff
        );
        let due: Vec<Vec<String>> = maturity
            .entries
            .iter()
            .map(|entry| {
                vec![
                    entry.row.nama_proyek().to_string(),
                    entry
                        .row
                        .date(CanonicalColumn::JatuhTempoKontrak)
                        .and_then(|d| d.date())
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                    amount_cell(&entry.row, CanonicalColumn::BakiDebet),
                    entry.days_until_due.to_string(),
                ]
            })
            .collect();
        out.push_str(&render_table(
            &[
                CanonicalColumn::NamaProyek.label(),
                CanonicalColumn::JatuhTempoKontrak.label(),
                CanonicalColumn::BakiDebet.label(),
                "Sisa Hari",
            ],
            &due,
        ));
    }

    out
}

pub fn render_json(output: &LedgerOutput) -> Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

/// `1234567` -> `1.234.567`
pub fn format_rupiah(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

fn amount_cell(row: &LedgerRow, column: CanonicalColumn) -> String {
    match row.amount(column) {
        Some(Amount::Value(value)) => format_rupiah(*value),
        Some(Amount::Unparseable(raw)) if !raw.is_empty() => raw.clone(),
        Some(Amount::Unparseable(_)) => UNDEFINED.to_string(),
        None => String::new(),
    }
}

fn balance_cell(balance: Option<Balance>) -> String {
    match balance {
        Some(Balance::Value(value)) => format_rupiah(value),
        Some(Balance::Undefined) | None => UNDEFINED.to_string(),
    }
}

fn totals_row(totals: &ProjectTotals) -> Vec<String> {
    vec![
        totals.nama_proyek.clone(),
        format_rupiah(totals.nominal_kredit),
        format_rupiah(totals.total_pencairan),
        format_rupiah(totals.baki_debet),
        format_rupiah(totals.saldo_kredit),
    ]
}

/// First column left-aligned, the rest right-aligned.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_row(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &rule, &widths);
    for row in rows {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            let pad = width.saturating_sub(cell.chars().count());
            if i == 0 {
                format!("{}{}", cell, " ".repeat(pad))
            } else {
                format!("{}{}", " ".repeat(pad), cell)
            }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}
