use crate::domain::model::{Cell, RawGrid, SourceFormat};
use crate::domain::ports::Extracted;
use crate::domain::schema::CanonicalColumn;
use crate::utils::error::{IngestError, Result};
use calamine::{Data, Reader, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::Display;
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;

/// Largest serial Excel can represent (9999-12-31).
pub(crate) const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// Decode raw bytes under the declared format.
///
/// Workbooks without a sheet selector are not read: the sheet list is
/// returned so the caller can choose, even when there is only one sheet.
pub fn read(bytes: &[u8], format: SourceFormat, sheet: Option<&str>) -> Result<Extracted> {
    match format {
        SourceFormat::DelimitedText => {
            if let Some(sheet) = sheet {
                tracing::debug!("Ignoring sheet selector '{}' for delimited text", sheet);
            }
            read_delimited(bytes).map(Extracted::Grid)
        }
        SourceFormat::LegacyWorkbook => read_sheet::<Xls<Cursor<&[u8]>>>(bytes, sheet),
        SourceFormat::ModernWorkbook => read_sheet::<Xlsx<Cursor<&[u8]>>>(bytes, sheet),
    }
}

/// Sheet names in workbook order. Delimited text has none.
pub fn list_sheets(bytes: &[u8], format: SourceFormat) -> Result<Vec<String>> {
    match format {
        SourceFormat::DelimitedText => Ok(Vec::new()),
        SourceFormat::LegacyWorkbook => {
            let workbook: Xls<Cursor<&[u8]>> = open_workbook(bytes)?;
            Ok(workbook.sheet_names().to_vec())
        }
        SourceFormat::ModernWorkbook => {
            let workbook: Xlsx<Cursor<&[u8]>> = open_workbook(bytes)?;
            Ok(workbook.sheet_names().to_vec())
        }
    }
}

fn open_workbook<'a, R>(bytes: &'a [u8]) -> Result<R>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    R::new(Cursor::new(bytes))
        .map_err(|e| IngestError::unreadable(format!("cannot open workbook: {}", e)))
}

fn read_sheet<'a, R>(bytes: &'a [u8], sheet: Option<&str>) -> Result<Extracted>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    let mut workbook: R = open_workbook(bytes)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let Some(sheet) = sheet else {
        tracing::debug!("No sheet selected, {} sheet(s) available", sheet_names.len());
        return Ok(Extracted::SheetSelection(sheet_names));
    };

    if !sheet_names.iter().any(|name| name == sheet) {
        return Err(IngestError::unreadable(format!(
            "sheet '{}' not found; available sheets: {}",
            sheet,
            sheet_names.join(", ")
        )));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| IngestError::unreadable(format!("cannot read sheet '{}': {}", sheet, e)))?;

    let rows: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(data_cell).collect())
        .collect();

    tracing::debug!("Read {} row(s) from sheet '{}'", rows.len(), sheet);
    Ok(Extracted::Grid(RawGrid::new(rows)))
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_datetime(serial)
                .map(Cell::Date)
                .unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}

/// Excel 1900 date system. Serials before 1900-03-01 are off by one day
/// because of the 1900 leap-year bug; nothing in a credit ledger goes back that far.
pub(crate) fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..EXCEL_MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
}

fn read_delimited(bytes: &[u8]) -> Result<RawGrid> {
    let content = decode_text(bytes)?;
    let delimiter = sniff_delimiter(&content);
    tracing::debug!("Reading delimited text with delimiter {:?}", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| IngestError::unreadable(format!("CSV parse error: {}", e)))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawGrid::new(rows))
}

/// UTF-8 first, Windows-1252 as the fallback for Excel-exported CSVs.
fn decode_text(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if bytes.contains(&0) {
        return Err(IngestError::unreadable(
            "source contains NUL bytes; it looks like a binary file, not delimited text",
        ));
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Pick the delimiter that splits a header line into the most canonical
/// labels.
///
/// Only labels vote, so punctuation inside free-text cells cannot outvote
/// the real separator. Comma wins ties and is used when no candidate
/// recognizes a label.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for delimiter in DELIMITER_CANDIDATES {
        let score = sample
            .iter()
            .map(|line| canonical_label_count(line, delimiter))
            .max()
            .unwrap_or(0);

        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

fn canonical_label_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|record| record.ok())
        .map(|record| {
            record
                .iter()
                .filter(|field| CanonicalColumn::from_label(field).is_some())
                .count()
        })
        .unwrap_or(0)
}
