pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{IngestSettings, TomlConfig};
pub use core::{engine::IngestEngine, pipeline::ObligoPipeline};
pub use domain::ledger::{IngestOutcome, LedgerOutput};
pub use domain::model::SourceFormat;
pub use domain::ports::SourceRequest;
pub use utils::error::{IngestError, Result};
