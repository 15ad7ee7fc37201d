use crate::adapters::SourceContext;
use crate::core::contact::scrape_contacts;
use crate::core::http::recover;
use crate::core::phone::recreate_phone_number;
use crate::domain::model::{Harvest, Record, RecordOutcome};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

pub const SOURCE_NAME: &str = "eccmid";
pub const ECCMID_URL: &str = "https://www.eccmid.org/sponsorship-and-exhibition/sponsor-list";

pub const FIELD_NAMES: &[&str] = &["Title", "Website", "Emails", "Phones"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EccmidConfig {
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    ECCMID_URL.to_string()
}

impl Default for EccmidConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl EccmidConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Sponsor {
    title: String,
    website: Option<String>,
}

fn parse_sponsors(html: &str) -> Result<Vec<Sponsor>> {
    let selector = Selector::parse("a.linksside")
        .map_err(|e| ScrapeError::parse(ECCMID_URL, e.to_string()))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|link| Sponsor {
            title: link.text().collect::<String>().trim().to_string(),
            website: link.value().attr("href").map(str::to_string),
        })
        .collect())
}

/// ESCMID Global (ECCMID) sponsor list; contacts come from each sponsor's
/// own website.
pub struct EccmidSource {
    config: EccmidConfig,
    context: SourceContext,
}

impl EccmidSource {
    pub fn new(config: EccmidConfig, context: SourceContext) -> Self {
        Self { config, context }
    }

    async fn record(&self, sponsor: Sponsor) -> Result<RecordOutcome> {
        let mut failures = Vec::new();
        let contacts = recover(
            scrape_contacts(&self.context.fetcher, sponsor.website.as_deref()).await,
            &mut failures,
        );
        let phones: Vec<Option<String>> = contacts
            .phones
            .iter()
            .map(|phone| recreate_phone_number(Some(phone)))
            .collect();

        let record = Record::new(vec![
            sponsor.title.into(),
            sponsor.website.into(),
            contacts.emails.into(),
            phones.into(),
        ]);
        Ok(RecordOutcome::new(record, failures))
    }
}

#[async_trait]
impl ExhibitorSource for EccmidSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);
        let fetcher = &self.context.fetcher;

        let page = fetcher.send_text(fetcher.client().get(&self.config.url)).await?;
        let sponsors = parse_sponsors(&page)?;
        tracing::info!("📋 ECCMID sponsor list has {} entries", sponsors.len());

        let results = fetcher
            .fetch_all(sponsors, |sponsor| self.record(sponsor))
            .await;
        harvest.collect(results);

        Ok(harvest)
    }
}
