use crate::adapters::xeria::{read_companies, Company};
use crate::adapters::{trim_base, SourceContext};
use crate::domain::model::{Harvest, Record};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::Result;
use crate::utils::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const SOURCE_NAME: &str = "publicalt";
pub const PUBLICALT_URL: &str = "https://publicalt.xeria.es";

pub const FIELD_NAMES: &[&str] = &[
    "Name",
    "Website",
    "Email",
    "Phone number",
    "Whatsapp Link",
    "Country",
    "Detail Link",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicaltConfig {
    pub catalog_name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    PUBLICALT_URL.to_string()
}

impl PublicaltConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_credential("source.catalog_name", &self.catalog_name)?;
        validation::validate_url("source.base_url", &self.base_url)
    }
}

pub struct PublicaltSource {
    config: PublicaltConfig,
    context: SourceContext,
}

impl PublicaltSource {
    pub fn new(config: PublicaltConfig, context: SourceContext) -> Self {
        Self { config, context }
    }

    fn catalog_url(&self) -> String {
        format!("{}/{}", trim_base(&self.config.base_url), self.config.catalog_name)
    }

    fn record(&self, company: Company) -> Record {
        let whatsapp = self.context.whatsapp_link(company.telephone.as_deref());
        let detail_link = company
            .id_account
            .as_ref()
            .map(|id| format!("{}/es/company/Details/{}", self.catalog_url(), id));

        Record::new(vec![
            company.name.into(),
            company.web.into(),
            company.email.into(),
            company.telephone.into(),
            whatsapp.into(),
            company.country.into(),
            detail_link.into(),
        ])
    }
}

#[async_trait]
impl ExhibitorSource for PublicaltSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);
        let url = format!("{}/es/Company/Companies_Read", self.catalog_url());

        let companies = read_companies(&self.context.fetcher, &url, "Name-asc").await?;
        tracing::info!("📋 Publicalt catalogue returned {} companies", companies.len());

        harvest.records = companies.into_iter().map(|c| self.record(c)).collect();
        Ok(harvest)
    }
}
