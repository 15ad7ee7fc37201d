pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::ScrapeConfig;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "expo-scrape")]
#[command(about = "Scrape trade-fair exhibitor contacts into a spreadsheet")]
pub struct CliConfig {
    /// Path to the TOML run file
    #[arg(short, long, default_value = "expo-scrape.toml")]
    pub config: String,

    /// Override run.output_path
    #[arg(long)]
    pub output_path: Option<String>,

    /// Override run.name (file basename and sheet name)
    #[arg(long)]
    pub name: Option<String>,

    /// Override http.concurrent_requests
    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Show what would be scraped without touching the network
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Applies the command-line overrides to a loaded run file.
    pub fn apply_overrides(&self, config: &mut ScrapeConfig) {
        if let Some(output_path) = &self.output_path {
            config.run.output_path = output_path.clone();
            tracing::info!("🔧 Output path overridden to: {}", output_path);
        }
        if let Some(name) = &self.name {
            config.run.name = name.clone();
            tracing::info!("🔧 Run name overridden to: {}", name);
        }
        if let Some(concurrent) = self.concurrent_requests {
            config.http.concurrent_requests = concurrent;
            tracing::info!("🔧 Concurrent requests overridden to: {}", concurrent);
        }
    }
}
