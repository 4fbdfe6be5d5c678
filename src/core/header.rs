use crate::domain::model::{Cell, HeaderFrame, RawGrid};

/// Literal label that marks the real header row.
pub const ANCHOR_LABEL: &str = "No. Loan";

pub const DEFAULT_HEADER_LOOKAHEAD: usize = 5;

/// Split a grid into header labels and the data region below it.
///
/// Blank rows are dropped first so leading padding does not eat into the
/// lookahead window. The first of the next `lookahead` rows holding the
/// anchor label wins; without one, row 0 is the header.
pub fn locate(grid: RawGrid, lookahead: usize) -> HeaderFrame {
    let mut rows: Vec<Vec<Cell>> = grid
        .into_rows()
        .into_iter()
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    let anchor_row = rows
        .iter()
        .take(lookahead)
        .position(|row| row.iter().any(is_anchor));

    let header_row = match anchor_row {
        Some(index) => {
            tracing::debug!("Anchor '{}' found in row {}", ANCHOR_LABEL, index);
            index
        }
        None => {
            tracing::warn!(
                "Anchor '{}' not found in the first {} row(s), using row 0 as header",
                ANCHOR_LABEL,
                lookahead
            );
            0
        }
    };

    if rows.is_empty() {
        return HeaderFrame {
            header: Vec::new(),
            data: Vec::new(),
            header_row: 0,
            anchored: false,
        };
    }

    // 表頭之上的列全部丟棄
    let data = rows.split_off(header_row + 1);
    let header = rows[header_row].iter().map(Cell::to_label).collect();

    HeaderFrame {
        header,
        data,
        header_row,
        anchored: anchor_row.is_some(),
    }
}

fn is_anchor(cell: &Cell) -> bool {
    matches!(cell, Cell::Text(text) if text == ANCHOR_LABEL)
}
