use crate::config::IngestSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every section may be left out; a section that is
/// present must carry its key.
///
/// ```toml
/// [maturity]
/// horizon_days = 45
///
/// [header]
/// lookahead_rows = 8
///
/// [source]
/// max_bytes = 10485760
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub maturity: Option<MaturityConfig>,
    pub header: Option<HeaderConfig>,
    pub source: Option<SourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaturityConfig {
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    pub lookahead_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub max_bytes: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IngestError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IngestError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Settings with every missing key filled from the defaults.
    pub fn settings(&self) -> IngestSettings {
        let defaults = IngestSettings::default();
        IngestSettings {
            horizon_days: self
                .maturity
                .as_ref()
                .and_then(|m| m.horizon_days)
                .unwrap_or(defaults.horizon_days),
            header_lookahead: self
                .header
                .as_ref()
                .and_then(|h| h.lookahead_rows)
                .unwrap_or(defaults.header_lookahead),
            max_source_bytes: self
                .source
                .as_ref()
                .and_then(|s| s.max_bytes)
                .unwrap_or(defaults.max_source_bytes),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn horizon_days(&self) -> u32 {
        self.settings().horizon_days
    }

    fn header_lookahead(&self) -> usize {
        self.settings().header_lookahead
    }

    fn max_source_bytes(&self) -> usize {
        self.settings().max_source_bytes
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        // 有寫區段卻沒有鍵，多半是鍵名打錯
        if let Some(maturity) = &self.maturity {
            validate_required_field("maturity.horizon_days", &maturity.horizon_days)?;
        }
        if let Some(header) = &self.header {
            validate_required_field("header.lookahead_rows", &header.lookahead_rows)?;
        }
        if let Some(source) = &self.source {
            validate_required_field("source.max_bytes", &source.max_bytes)?;
        }

        self.settings().validate()
    }
}
