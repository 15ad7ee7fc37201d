use crate::adapters::xeria::{read_companies, Company};
use crate::adapters::{trim_base, SourceContext};
use crate::core::contact::{normalize_website, scrape_emails};
use crate::core::http::recover;
use crate::domain::model::{Harvest, Record, RecordOutcome};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::Result;
use crate::utils::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const SOURCE_NAME: &str = "ticketsnebext";
pub const TICKETSNEBEXT_URL: &str = "https://des.ticketsnebext.com";

pub const FIELD_NAMES: &[&str] = &[
    "Name",
    "Country",
    "Whatsapp Link",
    "Phone number",
    "Current Email",
    "Emails",
    "Website",
    "Detail Link",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketsNebextConfig {
    pub catalog_name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    TICKETSNEBEXT_URL.to_string()
}

impl TicketsNebextConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_credential("source.catalog_name", &self.catalog_name)?;
        validation::validate_url("source.base_url", &self.base_url)
    }
}

pub struct TicketsNebextSource {
    config: TicketsNebextConfig,
    context: SourceContext,
}

impl TicketsNebextSource {
    pub fn new(config: TicketsNebextConfig, context: SourceContext) -> Self {
        Self { config, context }
    }

    fn catalog_url(&self) -> String {
        format!("{}/{}", trim_base(&self.config.base_url), self.config.catalog_name)
    }

    async fn record(&self, company: Company) -> Result<RecordOutcome> {
        let website = normalize_website(company.web.as_deref());
        let mut failures = Vec::new();
        let emails = recover(
            scrape_emails(&self.context.fetcher, website.as_deref()).await,
            &mut failures,
        );
        let whatsapp = self.context.whatsapp_link(company.telephone.as_deref());
        let detail_link = company
            .id_account
            .as_ref()
            .map(|id| format!("{}/en/Company/Details/{}", self.catalog_url(), id));

        let record = Record::new(vec![
            company.name.into(),
            company.country.into(),
            whatsapp.into(),
            company.telephone.into(),
            company.email.into(),
            emails.into(),
            website.into(),
            detail_link.into(),
        ]);
        Ok(RecordOutcome::new(record, failures))
    }
}

#[async_trait]
impl ExhibitorSource for TicketsNebextSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);
        let url = format!("{}/en/Company/Companies_Read", self.catalog_url());

        let companies = read_companies(&self.context.fetcher, &url, "corder-asc~Name-asc").await?;
        tracing::info!("📋 TicketsNebext catalogue returned {} companies", companies.len());

        let results = self
            .context
            .fetcher
            .fetch_all(companies, |company| self.record(company))
            .await;
        harvest.collect(results);

        Ok(harvest)
    }
}
