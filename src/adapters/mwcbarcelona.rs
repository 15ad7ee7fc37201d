use crate::adapters::{flexible_text, trim_base, SourceContext};
use crate::core::contact::{scrape_emails, validate_email};
use crate::core::http::{recover, split_outcomes};
use crate::core::phone::is_valid_phone;
use crate::domain::model::{Harvest, Record, RecordOutcome};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

pub const SOURCE_NAME: &str = "mwcbarcelona";
pub const MWC_BARCELONA_URL: &str = "https://www.mwcbarcelona.com";
const DEFAULT_INDEX: &str = "exhibitors-default";
const HITS_PER_PAGE: u32 = 1000;
const CONTACT_LINKS: &str = "#exhibitor-container aside div ul li a";

pub const FIELD_NAMES: &[&str] = &[
    "Name",
    "Country",
    "Whatsapp link",
    "Telephone",
    "Current Email",
    "Website Emails",
    "Website",
    "Detail",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MwcBarcelonaConfig {
    pub algolia_api_key: String,
    pub algolia_application_id: String,
    /// Defaults to `https://<application id>-dsn.algolia.net`.
    #[serde(default)]
    pub algolia_url: Option<String>,
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_index")]
    pub index_name: String,
}

fn default_site_url() -> String {
    MWC_BARCELONA_URL.to_string()
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

impl MwcBarcelonaConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_credential("source.algolia_api_key", &self.algolia_api_key)?;
        validation::validate_credential(
            "source.algolia_application_id",
            &self.algolia_application_id,
        )?;
        if let Some(url) = &self.algolia_url {
            validation::validate_url("source.algolia_url", url)?;
        }
        validation::validate_url("source.site_url", &self.site_url)
    }

    pub fn algolia_url(&self) -> String {
        match &self.algolia_url {
            Some(url) => trim_base(url).to_string(),
            None => format!(
                "https://{}-dsn.algolia.net",
                self.algolia_application_id.to_lowercase()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MultiQueryResponse {
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    hits: Vec<Hit>,
    #[serde(default)]
    nb_pages: u32,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default, deserialize_with = "flexible_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    country: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    url: Option<String>,
}

/// Contact links listed on an exhibitor's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DetailContacts {
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
}

// `tel:` and `mailto:` links are recognised by their payload; any other
// link is taken as the exhibitor's website (the last one wins).
fn parse_detail_contacts(html: &str) -> DetailContacts {
    let mut contacts = DetailContacts::default();
    let Ok(selector) = Selector::parse(CONTACT_LINKS) else {
        return contacts;
    };
    let document = Html::parse_document(html);

    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(payload) = href.split(':').nth(1) else {
            continue;
        };

        if is_valid_phone(payload) && contacts.phone.is_none() {
            contacts.phone = Some(payload.to_string());
        } else if validate_email(payload) && contacts.email.is_none() {
            contacts.email = Some(payload.to_string());
        } else {
            contacts.website = Some(href.to_string());
        }
    }

    contacts
}

/// MWC Barcelona: exhibitors come from the site's Algolia index, contacts
/// from each exhibitor's detail page.
pub struct MwcBarcelonaSource {
    config: MwcBarcelonaConfig,
    context: SourceContext,
}

impl MwcBarcelonaSource {
    pub fn new(config: MwcBarcelonaConfig, context: SourceContext) -> Self {
        Self { config, context }
    }

    async fn query_page(&self, page: u32) -> Result<QueryResult> {
        let url = format!("{}/1/indexes/*/queries", self.config.algolia_url());
        let body = serde_json::json!({
            "requests": [{
                "indexName": self.config.index_name,
                "params": format!("hitsPerPage={}&page={}", HITS_PER_PAGE, page),
            }]
        });
        let fetcher = &self.context.fetcher;
        let request = fetcher
            .client()
            .post(&url)
            .query(&[
                ("x-algolia-api-key", self.config.algolia_api_key.as_str()),
                (
                    "x-algolia-application-id",
                    self.config.algolia_application_id.as_str(),
                ),
            ])
            .json(&body);

        let response: MultiQueryResponse = fetcher.send_json(request).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ScrapeError::parse(url, "empty Algolia results"))
    }

    fn detail_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            trim_base(&self.config.site_url),
            path.trim_start_matches('/')
        )
    }

    async fn detail_contacts(&self, detail_url: Option<&str>) -> Result<DetailContacts> {
        let Some(url) = detail_url else {
            return Ok(DetailContacts::default());
        };
        let fetcher = &self.context.fetcher;
        let html = fetcher.send_text(fetcher.client().get(url)).await?;
        Ok(parse_detail_contacts(&html))
    }

    async fn record(&self, hit: Hit) -> Result<RecordOutcome> {
        let detail_url = hit
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| self.detail_url(u));
        let mut failures = Vec::new();
        let contacts = recover(
            self.detail_contacts(detail_url.as_deref()).await,
            &mut failures,
        );
        let website_emails = recover(
            scrape_emails(&self.context.fetcher, contacts.website.as_deref()).await,
            &mut failures,
        );
        let whatsapp = self.context.whatsapp_link(contacts.phone.as_deref());

        let record = Record::new(vec![
            hit.name.into(),
            hit.country.into(),
            whatsapp.into(),
            contacts.phone.into(),
            contacts.email.into(),
            website_emails.into(),
            contacts.website.into(),
            detail_url.into(),
        ]);
        Ok(RecordOutcome::new(record, failures))
    }
}

#[async_trait]
impl ExhibitorSource for MwcBarcelonaSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);
        let fetcher = &self.context.fetcher;

        let first = self.query_page(0).await?;
        let page_count = first.nb_pages.max(1);
        tracing::info!("📋 MWC Barcelona index has {} pages", page_count);

        let mut hits = first.hits;
        let pages = fetcher
            .fetch_all(1..page_count, |page| self.query_page(page))
            .await;
        for page in split_outcomes(pages, &mut harvest.failures) {
            hits.extend(page.hits);
        }
        tracing::info!("📋 Collected {} exhibitors", hits.len());

        let results = fetcher.fetch_all(hits, |hit| self.record(hit)).await;
        harvest.collect(results);

        Ok(harvest)
    }
}
