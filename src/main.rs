use clap::Parser;
use expo_scrape::utils::error::ErrorSeverity;
use expo_scrape::utils::{logger, validation::Validate};
use expo_scrape::{build_source, CliConfig, LocalStorage, ScrapeConfig, ScrapeEngine, ScrapePipeline, SourceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting expo-scrape");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match ScrapeConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        perform_dry_run(&config);
        return Ok(());
    }

    let source = match build_source(&config) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("❌ Could not set up {}: {}", config.source_name(), e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(config.output_path());
    let pipeline = ScrapePipeline::new(source, storage, config.run.name.clone(), config.output_path());
    let engine = ScrapeEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Scrape completed successfully!");
            println!("✅ Scrape completed successfully!");
            println!("📁 Workbook saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &ScrapeConfig, args: &CliConfig) {
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    println!("  Source: {}", config.source_name());
    println!("  Output: {}", config.output_path());
    println!("  Concurrent Requests: {}", config.http.concurrent_requests);
    println!(
        "  Phone Country Code: {} (below {} digits)",
        config.phone.default_country_code, config.phone.min_digits
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &ScrapeConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Data Source Analysis:");
    match &config.source {
        SourceConfig::Ifema(c) => {
            println!("  Endpoint: {}", c.api_url);
            println!("  Tenant: {}  Edition: {}", c.tenant_id, c.edition_id);
            println!("  Website emails: scraped per exhibitor");
        }
        SourceConfig::MwcBarcelona(c) => {
            println!("  Endpoint: {}/1/indexes/*/queries", c.algolia_url());
            println!("  Index: {}", c.index_name);
            println!("  Detail pages: {}", c.site_url);
        }
        SourceConfig::TicketsNebext(c) => {
            println!("  Endpoint: {}/{}", c.base_url, c.catalog_name);
            println!("  Website emails: scraped per exhibitor");
        }
        SourceConfig::Publicalt(c) => {
            println!("  Endpoint: {}/{}", c.base_url, c.catalog_name);
        }
        SourceConfig::Eccmid(c) => {
            println!("  Sponsor list: {}", c.url);
            println!("  Emails and phones: scraped per sponsor website");
        }
        SourceConfig::CantonFair(c) => {
            println!("  Endpoint: {}", c.api_url);
            println!("  Page size: {}", c.page_size);
            println!(
                "  Phone Country Code: {} (below {} digits)",
                c.country_code, c.min_digits
            );
        }
        SourceConfig::FiraBarcelona(c) => {
            println!("  Search: {}", c.search_api_url);
            println!("  Detail: {}", c.detail_api_url);
            println!("  Catalogue: {} (id {}, SAP {})", c.catalog_name, c.catalog_id, c.sap_code);
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  File: {}_<6 hex>.xlsx", config.run.name);

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
