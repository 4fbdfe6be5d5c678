use crate::config::IngestSettings;
use crate::domain::model::SourceFormat;
use crate::domain::ports::SourceRequest;
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, Validate,
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::fs;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["csv", "txt", "tsv", "xls", "xlsx", "xlsm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "obligo-etl")]
#[command(about = "Normalize an obligo credit-ledger export and flag contracts nearing maturity")]
pub struct CliConfig {
    /// Ledger export (.csv, .xls or .xlsx)
    pub input: String,

    /// Worksheet to read from a workbook
    #[arg(long)]
    pub sheet: Option<String>,

    /// Print the workbook's sheet names and exit
    #[arg(long)]
    pub list_sheets: bool,

    /// Override the format implied by the file extension
    #[arg(long)]
    pub format: Option<String>,

    /// Days ahead of --as-of that count as nearing maturity
    #[arg(long, env = "OBLIGO_HORIZON_DAYS")]
    pub horizon_days: Option<u32>,

    /// Evaluation date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// TOML settings file
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Layer the command-line overrides over `base`.
    pub fn settings(&self, base: IngestSettings) -> IngestSettings {
        IngestSettings {
            horizon_days: self.horizon_days.unwrap_or(base.horizon_days),
            ..base
        }
    }

    pub fn source_format(&self) -> Result<SourceFormat> {
        match &self.format {
            Some(format) => format.parse(),
            None => SourceFormat::from_path(&self.input),
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn read_source(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.input)?)
    }

    pub fn source_request(&self) -> Result<SourceRequest> {
        let request = SourceRequest::new(self.read_source()?, self.source_format()?);
        Ok(match &self.sheet {
            Some(sheet) => request.with_sheet(sheet.clone()),
            None => request,
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;

        match &self.format {
            Some(format) => {
                format
                    .parse::<SourceFormat>()
                    .map_err(|_| IngestError::InvalidConfigValueError {
                        field: "format".to_string(),
                        value: format.clone(),
                        reason: "Expected csv, xls, xlsx, text/csv, legacy-workbook or modern-workbook"
                            .to_string(),
                    })?;
            }
            None => validate_file_extension("input", &self.input, &SUPPORTED_EXTENSIONS)?,
        }

        if let Some(sheet) = &self.sheet {
            validate_non_empty_string("sheet", sheet)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["obligo-etl"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_flags() {
        let config = parse(&[
            "ledger.xlsx",
            "--sheet",
            "Obligo",
            "--horizon-days",
            "14",
            "--as-of",
            "2024-01-01",
            "--output",
            "json",
        ]);

        assert_eq!(config.input, "ledger.xlsx");
        assert_eq!(config.sheet.as_deref(), Some("Obligo"));
        assert_eq!(config.horizon_days, Some(14));
        assert_eq!(config.as_of(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.source_format().unwrap(), SourceFormat::ModernWorkbook);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_as_of_is_rejected_by_parser() {
        let result = CliConfig::try_parse_from(["obligo-etl", "a.csv", "--as-of", "31/01/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_layer_over_base() {
        let base = IngestSettings {
            horizon_days: 45,
            header_lookahead: 8,
            ..IngestSettings::default()
        };

        let config = parse(&["a.csv", "--horizon-days", "7"]);
        let settings = config.settings(base);
        assert_eq!(settings.horizon_days, 7);
        assert_eq!(settings.header_lookahead, 8);

        // OBLIGO_HORIZON_DAYS 可能存在於環境中
        let mut config = parse(&["a.csv"]);
        config.horizon_days = None;
        let settings = config.settings(base);
        assert_eq!(settings.horizon_days, 45);
        assert_eq!(settings, base);
    }

    #[test]
    fn test_format_override() {
        let config = parse(&["upload.bin", "--format", "text/csv"]);
        assert_eq!(config.source_format().unwrap(), SourceFormat::DelimitedText);
        assert!(config.validate().is_ok());

        let config = parse(&["upload.bin", "--format", "pdf"]);
        assert!(matches!(
            config.validate(),
            Err(IngestError::InvalidConfigValueError { ref field, .. }) if field == "format"
        ));
    }

    #[test]
    fn test_validation_failures() {
        assert!(parse(&["ledger.pdf"]).validate().is_err());
        assert!(parse(&["ledger"]).validate().is_err());
        assert!(parse(&["ledger.xlsx", "--sheet", "  "]).validate().is_err());
        assert!(parse(&["LEDGER.XLSX"]).validate().is_ok());
    }

    #[test]
    fn test_source_request_reads_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file.write_all(b"No. Loan,Nama Proyek\n").unwrap();
        let path = temp_file.path().to_string_lossy().to_string();

        let config = parse(&[path.as_str(), "--sheet", "ignored"]);
        let request = config.source_request().unwrap();

        assert_eq!(request.bytes, b"No. Loan,Nama Proyek\n");
        assert_eq!(request.format, SourceFormat::DelimitedText);
        assert_eq!(request.sheet.as_deref(), Some("ignored"));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let config = parse(&["/nonexistent/ledger.csv"]);
        assert!(matches!(config.read_source(), Err(IngestError::IoError(_))));
    }
}
