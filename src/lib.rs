pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::ScrapeConfig};

pub use adapters::{build_source, SourceConfig, SourceContext};
pub use core::{batch::PhoneBatch, etl::ScrapeEngine, pipeline::ScrapePipeline};
pub use utils::error::{Result, ScrapeError};
