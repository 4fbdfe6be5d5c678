use crate::domain::schema::CanonicalColumn;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Unreadable source: {message}")]
    UnreadableSource { message: String },

    #[error("Missing required columns: {}", join_columns(.missing))]
    MissingRequiredColumns { missing: BTreeSet<CanonicalColumn> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Schema,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

fn join_columns(columns: &BTreeSet<CanonicalColumn>) -> String {
    columns
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl IngestError {
    pub fn unreadable(message: impl Into<String>) -> Self {
        IngestError::UnreadableSource {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::UnreadableSource { .. } => ErrorCategory::Source,
            IngestError::MissingRequiredColumns { .. } => ErrorCategory::Schema,
            IngestError::ConfigError { .. }
            | IngestError::InvalidConfigValueError { .. }
            | IngestError::MissingConfigError { .. } => ErrorCategory::Configuration,
            IngestError::IoError(_) | IngestError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Source | ErrorCategory::Schema => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// The two failure kinds the ingestion boundary is allowed to surface.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            IngestError::UnreadableSource { .. } | IngestError::MissingRequiredColumns { .. }
        )
    }

    /// 給最終使用者看的訊息 (印尼文)
    pub fn user_friendly_message(&self) -> String {
        match self {
            IngestError::UnreadableSource { message } => {
                format!("Terjadi kesalahan saat membaca file: {}", message)
            }
            IngestError::MissingRequiredColumns { missing } => format!(
                "File harus memiliki kolom yang sesuai dengan format kartu obligo. Kolom yang hilang: {}",
                join_columns(missing)
            ),
            IngestError::ConfigError { message } => {
                format!("Konfigurasi tidak valid: {}", message)
            }
            IngestError::InvalidConfigValueError { field, value, reason } => {
                format!("Nilai '{}' untuk {} tidak valid: {}", value, field, reason)
            }
            IngestError::MissingConfigError { field } => {
                format!("Konfigurasi '{}' wajib diisi", field)
            }
            IngestError::IoError(e) => format!("Gagal membaca file: {}", e),
            IngestError::SerializationError(e) => format!("Gagal menyusun keluaran: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            IngestError::UnreadableSource { .. } => {
                "Check that the file extension matches its content (csv, xls, xlsx) and that the file is not corrupt".to_string()
            }
            IngestError::MissingRequiredColumns { missing } => format!(
                "Add the missing columns with their exact labels ({}) and make sure the header row contains \"No. Loan\" within the first rows",
                join_columns(missing)
            ),
            IngestError::ConfigError { .. }
            | IngestError::InvalidConfigValueError { .. }
            | IngestError::MissingConfigError { .. } => {
                "Review the command-line flags and the TOML configuration file".to_string()
            }
            IngestError::IoError(_) => {
                "Check that the input path exists and is readable".to_string()
            }
            IngestError::SerializationError(_) => {
                "Retry with --output text".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
