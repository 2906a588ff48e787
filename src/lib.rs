pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::{
    extract_pipeline::ColumnExtractPipeline, format_pipeline::TripFormatPipeline,
    report_pipeline::StatsReportPipeline,
};
pub use app::verifier::DataVerifier;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{etl::EtlEngine, pipeline_sequence::PipelineSequence};
pub use utils::error::{EtlError, Result};
