use crate::domain::schema::CanonicalColumn;
use crate::utils::error::{IngestError, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One untyped spreadsheet value, as the decoder produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    /// Empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as a header label. Text is returned untouched.
    pub fn to_label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Cell::Date(dt) => dt.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Integers without the trailing `.0`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Declared source format. Chosen from the file extension, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    DelimitedText,
    LegacyWorkbook,
    ModernWorkbook,
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceFormat::DelimitedText),
            "xls" => Ok(SourceFormat::LegacyWorkbook),
            "xlsx" | "xlsm" => Ok(SourceFormat::ModernWorkbook),
            other => Err(IngestError::unreadable(format!(
                "unsupported file extension '{}'",
                other
            ))),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                IngestError::unreadable(format!(
                    "cannot determine format of '{}': no file extension",
                    path.display()
                ))
            })?;
        Self::from_extension(extension)
    }
}

impl FromStr for SourceFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text/csv" => Ok(SourceFormat::DelimitedText),
            "legacy-workbook" => Ok(SourceFormat::LegacyWorkbook),
            "modern-workbook" => Ok(SourceFormat::ModernWorkbook),
            other => Self::from_extension(other.trim_start_matches('.')),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::DelimitedText => "text/csv",
            SourceFormat::LegacyWorkbook => "legacy-workbook",
            SourceFormat::ModernWorkbook => "modern-workbook",
        })
    }
}

/// Ragged rows of cells. Nothing about the shape is trusted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }
}

impl From<Vec<Vec<Cell>>> for RawGrid {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Self::new(rows)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFrame {
    /// Labels as they appeared; whitespace and case preserved.
    pub header: Vec<String>,
    pub data: Vec<Vec<Cell>>,
    /// Index of the header row after blank rows were dropped.
    pub header_row: usize,
    /// False when the anchor was not found and row 0 was used instead.
    pub anchored: bool,
}

/// Header-matched table: one cell per canonical column, columns in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledTable {
    pub columns: Vec<CanonicalColumn>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReconciledTable {
    pub fn present_columns(&self) -> BTreeSet<CanonicalColumn> {
        self.columns.iter().copied().collect()
    }
}
