use crate::core::{coerce, derive, header, reader, reconcile, summary};
use crate::domain::ledger::LedgerOutput;
use crate::domain::model::RawGrid;
use crate::domain::ports::{ConfigProvider, Extracted, Pipeline, SourceRequest};
use crate::utils::error::{IngestError, Result};
use chrono::NaiveDate;

/// The obligo normalization pipeline: decode, locate header, reconcile,
/// coerce, derive.
pub struct ObligoPipeline<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> ObligoPipeline<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }
}

impl<C: ConfigProvider> Pipeline for ObligoPipeline<C> {
    fn extract(&self, source: &SourceRequest) -> Result<Extracted> {
        let limit = self.config.max_source_bytes();
        if source.bytes.len() > limit {
            tracing::warn!(
                "Rejecting {} byte source (limit {} bytes)",
                source.bytes.len(),
                limit
            );
            return Err(IngestError::unreadable(format!(
                "source is {} bytes, larger than the {} byte limit",
                source.bytes.len(),
                limit
            )));
        }

        tracing::debug!(
            "Decoding {} bytes as {}{}",
            source.bytes.len(),
            source.format,
            source
                .sheet
                .as_deref()
                .map(|s| format!(" (sheet '{}')", s))
                .unwrap_or_default()
        );
        reader::read(&source.bytes, source.format, source.sheet.as_deref())
    }

    fn transform(&self, grid: RawGrid, as_of: NaiveDate) -> Result<LedgerOutput> {
        let frame = header::locate(grid, self.config.header_lookahead());
        let anchored = frame.anchored;

        let reconciled = reconcile::reconcile(frame)?;
        let ledger = coerce::coerce(reconciled);
        let (table, maturity) = derive::derive(ledger, self.config.horizon_days(), as_of);
        let summary = summary::summarize(&table);

        Ok(LedgerOutput {
            table,
            maturity,
            summary,
            anchored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestSettings;
    use crate::domain::ledger::Balance;
    use crate::domain::model::{Cell, SourceFormat};
    use crate::domain::schema::CanonicalColumn;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn obligo_grid() -> RawGrid {
        RawGrid::new(vec![
            vec![text("KARTU OBLIGO")],
            vec![],
            vec![
                text("No. Loan"),
                text("Nama Proyek"),
                text("Nominal Kredit"),
                text("Total Pencairan (Rp)"),
                text("Baki Debet (Rp)"),
                text("Jatuh Tempo Kontrak"),
                text("Jatuh Tempo Fasilitas"),
            ],
            vec![
                text("L-01"),
                text("Gedung A"),
                Cell::Number(500_000.0),
                Cell::Number(200_000.0),
                Cell::Number(150_000.0),
                text("2024-01-15"),
                text("2024-12-31"),
            ],
        ])
    }

    #[test]
    fn test_transform_runs_all_stages() {
        let pipeline = ObligoPipeline::new(IngestSettings::default());

        let output = pipeline
            .transform(obligo_grid(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();

        assert!(output.anchored);
        assert_eq!(output.table.len(), 1);
        assert_eq!(output.table.columns[0], CanonicalColumn::NoLoan);
        assert_eq!(output.table.rows[0].saldo_kredit, Some(Balance::Value(300_000)));
        assert_eq!(output.maturity.entries.len(), 1);
        assert_eq!(output.summary.totals.saldo_kredit, 300_000);
    }

    #[test]
    fn test_extract_rejects_oversized_source() {
        let settings = IngestSettings {
            max_source_bytes: 4,
            ..IngestSettings::default()
        };
        let pipeline = ObligoPipeline::new(settings);
        let request = SourceRequest::new(b"a,b,c".to_vec(), SourceFormat::DelimitedText);

        let result = pipeline.extract(&request);

        assert!(matches!(result, Err(IngestError::UnreadableSource { .. })));
    }

    #[test]
    fn test_extract_reports_corrupt_workbook_without_sheet() {
        let pipeline = ObligoPipeline::new(IngestSettings::default());
        let request = SourceRequest::new(b"not a zip".to_vec(), SourceFormat::ModernWorkbook);

        // 壞掉的檔案仍然要回報錯誤，而不是清單
        assert!(matches!(
            pipeline.extract(&request),
            Err(IngestError::UnreadableSource { .. })
        ));
    }
}
