pub mod coerce;
pub mod derive;
pub mod engine;
pub mod header;
pub mod pipeline;
pub mod reader;
pub mod reconcile;
pub mod report;
pub mod summary;

pub use crate::domain::ports::{ConfigProvider, Extracted, Pipeline, SourceRequest};
pub use crate::utils::error::Result;
