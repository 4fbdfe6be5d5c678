#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::derive::DEFAULT_HORIZON_DAYS;
use crate::core::header::DEFAULT_HEADER_LOOKAHEAD;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};

pub const DEFAULT_MAX_SOURCE_BYTES: usize = 20 * 1024 * 1024;
pub const MAX_HORIZON_DAYS: u32 = 3650;
pub const MAX_HEADER_LOOKAHEAD: usize = 50;

/// Resolved settings for one run, after TOML and CLI layering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSettings {
    pub horizon_days: u32,
    pub header_lookahead: usize,
    pub max_source_bytes: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            header_lookahead: DEFAULT_HEADER_LOOKAHEAD,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}

impl ConfigProvider for IngestSettings {
    fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    fn header_lookahead(&self) -> usize {
        self.header_lookahead
    }

    fn max_source_bytes(&self) -> usize {
        self.max_source_bytes
    }
}

impl Validate for IngestSettings {
    fn validate(&self) -> Result<()> {
        validate_range("horizon_days", self.horizon_days, 0, MAX_HORIZON_DAYS)?;
        validate_range(
            "header_lookahead",
            self.header_lookahead,
            1,
            MAX_HEADER_LOOKAHEAD,
        )?;
        validate_positive_number("max_source_bytes", self.max_source_bytes, 1)?;
        Ok(())
    }
}
