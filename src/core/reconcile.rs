use crate::domain::model::{Cell, HeaderFrame, ReconciledTable};
use crate::domain::schema::CanonicalColumn;
use crate::utils::error::{IngestError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Map header labels onto the canonical schema.
///
/// Matching is exact. Unknown columns are dropped and a repeated canonical
/// label keeps its first occurrence. Rows with nothing left once unknown
/// columns are dropped are skipped. Fails before any cell is coerced when a
/// required column is missing.
pub fn reconcile(frame: HeaderFrame) -> Result<ReconciledTable> {
    // canonical 欄位 -> 原始欄位索引
    let mut positions: BTreeMap<CanonicalColumn, usize> = BTreeMap::new();
    for (index, label) in frame.header.iter().enumerate() {
        match CanonicalColumn::from_label(label) {
            Some(column) => {
                positions.entry(column).or_insert(index);
            }
            None => tracing::debug!("Dropping unrecognized column '{}'", label),
        }
    }

    let missing: BTreeSet<CanonicalColumn> = CanonicalColumn::REQUIRED
        .into_iter()
        .filter(|column| !positions.contains_key(column))
        .collect();

    if !missing.is_empty() {
        return Err(IngestError::MissingRequiredColumns { missing });
    }

    let columns: Vec<CanonicalColumn> = positions.keys().copied().collect();
    let source_rows = frame.data.len();
    let rows: Vec<Vec<Cell>> = frame
        .data
        .into_iter()
        .map(|row| {
            positions
                .values()
                .map(|&index| row.get(index).cloned().unwrap_or(Cell::Empty))
                .collect::<Vec<Cell>>()
        })
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    if rows.len() < source_rows {
        tracing::debug!(
            "Skipped {} row(s) with no ledger values",
            source_rows - rows.len()
        );
    }
    tracing::debug!(
        "Reconciled {} of {} source column(s)",
        columns.len(),
        frame.header.len()
    );

    Ok(ReconciledTable { columns, rows })
}
