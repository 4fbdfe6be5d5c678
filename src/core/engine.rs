use crate::domain::ledger::IngestOutcome;
use crate::domain::ports::{Extracted, Pipeline, SourceRequest};
use crate::utils::error::Result;
use chrono::NaiveDate;

pub struct IngestEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> IngestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Run one stateless ingestion. `as_of` is the evaluation date for the
    /// maturity report; the engine never reads the clock itself.
    pub fn run(&self, source: &SourceRequest, as_of: NaiveDate) -> Result<IngestOutcome> {
        tracing::info!("Starting ingestion ({} bytes, {})", source.bytes.len(), source.format);

        // Extract
        let grid = match self.pipeline.extract(source)? {
            Extracted::Grid(grid) => grid,
            Extracted::SheetSelection(sheets) => {
                tracing::info!("Workbook has {} sheet(s), waiting for a selection", sheets.len());
                return Ok(IngestOutcome::SheetSelectionRequired(sheets));
            }
        };
        tracing::info!("Extracted {} raw row(s)", grid.len());

        // Transform
        let output = self.pipeline.transform(grid, as_of)?;
        tracing::info!(
            "Ledger ready: {} row(s), {} column(s), {} contract(s) due within {} day(s)",
            output.table.len(),
            output.table.columns.len(),
            output.maturity.entries.len(),
            output.maturity.horizon_days
        );

        Ok(IngestOutcome::Completed(output))
    }
}
