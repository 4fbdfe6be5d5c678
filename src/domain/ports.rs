use crate::domain::ledger::LedgerOutput;
use crate::domain::model::{RawGrid, SourceFormat};
use crate::utils::error::Result;
use chrono::NaiveDate;

pub trait ConfigProvider {
    fn horizon_days(&self) -> u32;
    fn header_lookahead(&self) -> usize;
    fn max_source_bytes(&self) -> usize;
}

/// Raw upload handed over by the presentation layer.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    pub bytes: Vec<u8>,
    pub format: SourceFormat,
    pub sheet: Option<String>,
}

impl SourceRequest {
    pub fn new(bytes: Vec<u8>, format: SourceFormat) -> Self {
        Self {
            bytes,
            format,
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Grid(RawGrid),
    SheetSelection(Vec<String>),
}

pub trait Pipeline {
    fn extract(&self, source: &SourceRequest) -> Result<Extracted>;
    fn transform(&self, grid: RawGrid, as_of: NaiveDate) -> Result<LedgerOutput>;
}
