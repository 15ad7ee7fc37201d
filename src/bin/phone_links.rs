use clap::Parser;
use expo_scrape::core::batch::DEFAULT_RESULTS_FILE;
use expo_scrape::core::phone::{PhoneNormalizer, MIN_INTERNATIONAL_DIGITS};
use expo_scrape::core::whatsapp::{WhatsappLinker, DEFAULT_WHATSAPP_URL};
use expo_scrape::utils::{logger, validation};
use expo_scrape::{LocalStorage, PhoneBatch};

#[derive(Parser)]
#[command(name = "phone-links")]
#[command(about = "Turn a list of phone numbers into WhatsApp links, one per line")]
struct Args {
    /// Text file with one phone number per line
    input: String,

    /// Where to write the links
    #[arg(short, long, default_value = DEFAULT_RESULTS_FILE)]
    output: String,

    /// Country code for numbers written without one
    #[arg(long, default_value = "34")]
    country_code: String,

    /// Digit count from which a number already carries its country code
    #[arg(long, default_value_t = MIN_INTERNATIONAL_DIGITS)]
    min_digits: usize,

    #[arg(long, default_value = DEFAULT_WHATSAPP_URL)]
    base_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    if let Err(e) = validation::validate_country_code("country_code", &args.country_code)
        .and_then(|_| validation::validate_url("base_url", &args.base_url))
    {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let batch = PhoneBatch::new(
        PhoneNormalizer::new(args.country_code.clone()).with_min_digits(args.min_digits),
        WhatsappLinker::new(args.base_url.clone()),
    );
    let storage = LocalStorage::new(".");

    match batch.run(&storage, &args.input, &args.output).await {
        Ok(summary) => {
            println!(
                "✅ {} links from {} lines written to {}",
                summary.links, summary.lines, args.output
            );
        }
        Err(e) => {
            tracing::error!("❌ Batch failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}
