use chrono::NaiveDate;
use obligo_etl::core::reader;
use obligo_etl::domain::ledger::{Amount, Balance, DueDate};
use obligo_etl::domain::schema::CanonicalColumn;
use obligo_etl::{
    IngestEngine, IngestError, IngestOutcome, IngestSettings, ObligoPipeline, SourceFormat,
    SourceRequest,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const HEADER: [&str; 8] = [
    "No. Loan",
    "Nama Proyek",
    "Nominal Kredit",
    "Total Pencairan (Rp)",
    "Baki Debet (Rp)",
    "Jatuh Tempo Kontrak",
    "Jatuh Tempo Fasilitas",
    "Keterangan",
];

// 45322 = 2024-01-31, 45323 = 2024-02-01
const DUE_ON_CUTOFF: f64 = 45322.0;
const DUE_AFTER_CUTOFF: f64 = 45323.0;

fn write_obligo_sheet(sheet: &mut Worksheet) -> Result<(), XlsxError> {
    let date = Format::new().set_num_format("yyyy-mm-dd");

    sheet.write_string(0, 0, "KARTU OBLIGO")?;
    for (col, label) in HEADER.iter().enumerate() {
        sheet.write_string(2, col as u16, *label)?;
    }

    sheet.write_string(3, 0, "L-001")?;
    sheet.write_string(3, 1, "Gedung Serbaguna")?;
    sheet.write_number(3, 2, 500_000.0)?;
    sheet.write_number(3, 3, 200_000.0)?;
    sheet.write_number(3, 4, 150_000.0)?;
    sheet.write_number_with_format(3, 5, DUE_ON_CUTOFF, &date)?;
    sheet.write_number_with_format(3, 6, DUE_AFTER_CUTOFF, &date)?;
    sheet.write_string(3, 7, "Lancar")?;

    sheet.write_string(4, 0, "L-002")?;
    sheet.write_string(4, 1, "Jembatan Kali Progo")?;
    sheet.write_string(4, 2, "Rp 1.000.000")?;
    sheet.write_string(4, 3, "-")?;
    sheet.write_number(4, 4, 0.0)?;
    sheet.write_number_with_format(4, 5, DUE_AFTER_CUTOFF, &date)?;
    sheet.write_string(4, 6, "31/12/2024")?;

    sheet.write_string(5, 0, "L-003")?;
    sheet.write_string(5, 1, "Jalan Lingkar")?;
    sheet.write_number(5, 2, 750_000.0)?;
    sheet.write_number(5, 3, 250_000.0)?;
    sheet.write_number(5, 4, 100_000.0)?;
    sheet.write_string(5, 5, "31 Januari 2024")?;

    Ok(())
}

/// Workbook with a summary sheet first and the ledger second.
fn obligo_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet().set_name("Ringkasan")?;
    summary.write_string(0, 0, "Ringkasan portofolio")?;
    summary.write_number(1, 0, 42.0)?;

    let ledger = workbook.add_worksheet().set_name("Obligo")?;
    write_obligo_sheet(ledger)?;

    workbook.save_to_buffer()
}

fn single_sheet_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let ledger = workbook.add_worksheet().set_name("Obligo")?;
    write_obligo_sheet(ledger)?;
    workbook.save_to_buffer()
}

fn engine() -> IngestEngine<ObligoPipeline<IngestSettings>> {
    IngestEngine::new(ObligoPipeline::new(IngestSettings::default()))
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[test]
fn test_list_sheets_in_workbook_order() -> anyhow::Result<()> {
    let bytes = obligo_workbook()?;

    let sheets = reader::list_sheets(&bytes, SourceFormat::ModernWorkbook)?;

    assert_eq!(sheets, vec!["Ringkasan".to_string(), "Obligo".to_string()]);
    assert!(reader::list_sheets(b"a,b\n1,2\n", SourceFormat::DelimitedText)?.is_empty());
    Ok(())
}

#[test]
fn test_workbook_without_sheet_suspends() -> anyhow::Result<()> {
    let request = SourceRequest::new(obligo_workbook()?, SourceFormat::ModernWorkbook);

    let outcome = engine().run(&request, as_of())?;

    assert_eq!(
        outcome,
        IngestOutcome::SheetSelectionRequired(vec!["Ringkasan".to_string(), "Obligo".to_string()])
    );
    Ok(())
}

#[test]
fn test_single_sheet_workbook_still_suspends() -> anyhow::Result<()> {
    let request = SourceRequest::new(single_sheet_workbook()?, SourceFormat::ModernWorkbook);

    let outcome = engine().run(&request, as_of())?;

    assert_eq!(
        outcome,
        IngestOutcome::SheetSelectionRequired(vec!["Obligo".to_string()])
    );
    Ok(())
}

#[test]
fn test_selected_sheet_is_normalized() -> anyhow::Result<()> {
    let request =
        SourceRequest::new(obligo_workbook()?, SourceFormat::ModernWorkbook).with_sheet("Obligo");

    let output = match engine().run(&request, as_of())? {
        IngestOutcome::Completed(output) => output,
        other => panic!("expected a completed run, got {:?}", other),
    };

    assert!(output.anchored);
    assert_eq!(output.table.len(), 3);

    let first = &output.table.rows[0];
    assert_eq!(
        first.date(CanonicalColumn::JatuhTempoKontrak),
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
    );
    assert_eq!(
        first.date(CanonicalColumn::JatuhTempoFasilitas),
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()))
    );
    assert_eq!(first.saldo_kredit, Some(Balance::Value(300_000)));

    let second = &output.table.rows[1];
    assert_eq!(
        second.amount(CanonicalColumn::NominalKredit),
        Some(&Amount::Value(1_000_000))
    );
    assert_eq!(
        second.amount(CanonicalColumn::TotalPencairan),
        Some(&Amount::Unparseable("-".to_string()))
    );
    assert_eq!(second.saldo_kredit, Some(Balance::Undefined));
    assert_eq!(
        second.date(CanonicalColumn::JatuhTempoFasilitas),
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()))
    );

    let third = &output.table.rows[2];
    assert_eq!(
        third.date(CanonicalColumn::JatuhTempoKontrak),
        Some(DueDate::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
    );
    assert_eq!(third.text(CanonicalColumn::Keterangan), Some(""));

    // 2024-01-31 is on the cutoff; 2024-02-01 is one day past it
    let due: Vec<&str> = output
        .maturity
        .entries
        .iter()
        .map(|entry| entry.row.nama_proyek())
        .collect();
    assert_eq!(due, vec!["Gedung Serbaguna", "Jalan Lingkar"]);
    assert!(output.maturity.entries.iter().all(|e| e.days_until_due == 30));

    Ok(())
}

#[test]
fn test_sheet_without_ledger_columns_fails_schema_check() -> anyhow::Result<()> {
    let request = SourceRequest::new(obligo_workbook()?, SourceFormat::ModernWorkbook)
        .with_sheet("Ringkasan");

    let result = engine().run(&request, as_of());

    match result {
        Err(IngestError::MissingRequiredColumns { missing }) => {
            assert_eq!(missing.len(), CanonicalColumn::REQUIRED.len())
        }
        other => panic!("expected MissingRequiredColumns, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_unknown_sheet_is_unreadable() -> anyhow::Result<()> {
    let request = SourceRequest::new(obligo_workbook()?, SourceFormat::ModernWorkbook)
        .with_sheet("Sheet1");

    let err = engine().run(&request, as_of()).unwrap_err();

    assert!(matches!(err, IngestError::UnreadableSource { .. }));
    assert!(err.to_string().contains("Ringkasan, Obligo"));
    Ok(())
}

#[test]
fn test_corrupt_workbook_is_unreadable() {
    let garbage = b"this is not a zip archive".to_vec();

    assert!(matches!(
        reader::list_sheets(&garbage, SourceFormat::ModernWorkbook),
        Err(IngestError::UnreadableSource { .. })
    ));
    assert!(matches!(
        reader::list_sheets(&garbage, SourceFormat::LegacyWorkbook),
        Err(IngestError::UnreadableSource { .. })
    ));

    let request = SourceRequest::new(garbage, SourceFormat::ModernWorkbook).with_sheet("Obligo");
    let err = engine().run(&request, as_of()).unwrap_err();
    assert!(err
        .user_friendly_message()
        .starts_with("Terjadi kesalahan saat membaca file"));
}

#[test]
fn test_workbook_declared_as_csv_is_unreadable() -> anyhow::Result<()> {
    let request = SourceRequest::new(obligo_workbook()?, SourceFormat::DelimitedText);

    let result = engine().run(&request, as_of());

    assert!(matches!(result, Err(IngestError::UnreadableSource { .. })));
    Ok(())
}
