use anyhow::Context;
use clap::Parser;
use obligo_etl::config::cli::OutputFormat;
use obligo_etl::core::{reader, report};
use obligo_etl::utils::error::{ErrorSeverity, IngestError};
use obligo_etl::utils::{logger, validation::Validate};
use obligo_etl::{CliConfig, IngestEngine, IngestOutcome, ObligoPipeline, TomlConfig};
use std::io::Write;

const SHEET_SELECTION_EXIT_CODE: i32 = 4;

enum Completion {
    Rendered(String),
    Sheets { names: Vec<String>, selection_required: bool },
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting obligo-etl");
    tracing::debug!("CLI config: {:?}", config);

    match run(&config) {
        Ok(Completion::Rendered(output)) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("failed to write report to stdout")?;
            stdout.flush().context("failed to flush stdout")?;
        }
        Ok(Completion::Sheets {
            names,
            selection_required,
        }) => {
            if names.is_empty() {
                eprintln!("ℹ️ File teks tidak memiliki sheet.");
            }
            for name in &names {
                println!("{}", name);
            }
            if selection_required {
                eprintln!("📄 Pilih sheet dengan --sheet <NAMA>.");
                std::process::exit(SHEET_SELECTION_EXIT_CODE);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Ingestion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Saran: {}", e.recovery_suggestion());

            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn run(config: &CliConfig) -> obligo_etl::Result<Completion> {
    config.validate()?;

    let base = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let toml = TomlConfig::from_file(path)?;
            toml.validate()?;
            toml.settings()
        }
        None => Default::default(),
    };
    let settings = config.settings(base);
    settings.validate()?;
    tracing::debug!("Effective settings: {:?}", settings);

    if config.list_sheets {
        let bytes = config.read_source()?;
        let names = reader::list_sheets(&bytes, config.source_format()?)?;
        return Ok(Completion::Sheets {
            names,
            selection_required: false,
        });
    }

    let request = config.source_request()?;
    let engine = IngestEngine::new(ObligoPipeline::new(settings));

    match engine.run(&request, config.as_of())? {
        IngestOutcome::SheetSelectionRequired(names) => Ok(Completion::Sheets {
            names,
            selection_required: true,
        }),
        IngestOutcome::Completed(output) => {
            tracing::info!("✅ Ingestion completed");
            let rendered = match config.output {
                OutputFormat::Text => report::render_text(&output),
                OutputFormat::Json => report::render_json(&output)? + "\n",
            };
            Ok(Completion::Rendered(rendered))
        }
    }
}

// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &IngestError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
