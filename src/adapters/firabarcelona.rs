use crate::adapters::{distinct, flexible_text, trim_base, SourceContext};
use crate::core::contact::{normalize_website, scrape_emails};
use crate::core::http::{recover, split_outcomes};
use crate::domain::model::{FieldValue, Harvest, Record, RecordOutcome};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::Result;
use crate::utils::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SOURCE_NAME: &str = "firabarcelona";
pub const FIRA_WEB_URL: &str = "https://ecatalogue.firabarcelona.com";
pub const FIRA_SEARCH_API_URL: &str = "https://ecatalogueusearch-api.firabarcelona.com/v1";
pub const FIRA_DETAIL_API_URL: &str = "https://ecatalogue-api.firabarcelona.com/v1";
const UNKNOWN_COUNTRY: &str = "Undefined";

pub const FIELD_NAMES: &[&str] = &[
    "Name",
    "Country",
    "Whatsapp Link",
    "Contact Telephone",
    "Contact Email",
    "Contact Name",
    "Contact Post",
    "Emails",
    "Facebook url",
    "Company Website",
    "Detail link",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiraBarcelonaConfig {
    pub sap_code: String,
    pub catalog_id: u32,
    /// Slug of the catalogue in the public e-catalogue URLs.
    pub catalog_name: String,
    #[serde(default = "default_web_url")]
    pub web_url: String,
    #[serde(default = "default_search_api_url")]
    pub search_api_url: String,
    #[serde(default = "default_detail_api_url")]
    pub detail_api_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_web_url() -> String {
    FIRA_WEB_URL.to_string()
}

fn default_search_api_url() -> String {
    FIRA_SEARCH_API_URL.to_string()
}

fn default_detail_api_url() -> String {
    FIRA_DETAIL_API_URL.to_string()
}

fn default_language() -> String {
    "en_EN".to_string()
}

fn default_page_size() -> u64 {
    1000
}

impl FiraBarcelonaConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_credential("source.sap_code", &self.sap_code)?;
        validation::validate_credential("source.catalog_name", &self.catalog_name)?;
        validation::validate_positive_number("source.catalog_id", self.catalog_id as u64, 1)?;
        validation::validate_positive_number("source.page_size", self.page_size, 1)?;
        validation::validate_url("source.web_url", &self.web_url)?;
        validation::validate_url("source.search_api_url", &self.search_api_url)?;
        validation::validate_url("source.detail_api_url", &self.detail_api_url)
    }

    /// Number of search pages needed for `total` exhibitors.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size.max(1))
    }
}

#[derive(Debug, Deserialize)]
struct ItemCount {
    #[serde(rename = "EXHIBITORS", default)]
    exhibitors: u64,
}

#[derive(Debug, Deserialize)]
struct CountriesInUse {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedCountries,
}

#[derive(Debug, Deserialize)]
struct EmbeddedCountries {
    #[serde(default)]
    countries: Vec<CountryEntry>,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    #[serde(deserialize_with = "flexible_text")]
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    list: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    #[serde(deserialize_with = "flexible_text")]
    entity_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Exhibitor {
    #[serde(default, deserialize_with = "flexible_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    country_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    contact_telephone: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    telephone: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    contact_email: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    email: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    contact_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    contact_post: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    web_site: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    facebook_url: Option<String>,
}

/// Fira Barcelona e-catalogue (Hispack, Alimentaria, ...). One catalogue is
/// identified by its SAP code for search and by its numeric id for details.
pub struct FiraBarcelonaSource {
    config: FiraBarcelonaConfig,
    context: SourceContext,
}

impl FiraBarcelonaSource {
    pub fn new(config: FiraBarcelonaConfig, context: SourceContext) -> Self {
        Self { config, context }
    }

    fn catalogue_url(&self, resource: &str) -> String {
        format!(
            "{}/catalogues/{}/{}",
            trim_base(&self.config.detail_api_url),
            self.config.catalog_id,
            resource
        )
    }

    async fn exhibitor_count(&self) -> Result<u64> {
        let fetcher = &self.context.fetcher;
        let request = fetcher
            .client()
            .get(self.catalogue_url("countItems"))
            .query(&[("language", self.config.language.as_str())]);
        let count: ItemCount = fetcher.send_json(request).await?;
        Ok(count.exhibitors)
    }

    /// Country id to name table, read once per run.
    async fn countries(&self) -> Result<HashMap<String, String>> {
        let fetcher = &self.context.fetcher;
        let request = fetcher
            .client()
            .get(self.catalogue_url("countriesInUse"))
            .query(&[("language", self.config.language.as_str())]);

        let response: CountriesInUse = fetcher.send_json(request).await?;
        Ok(response
            .embedded
            .countries
            .into_iter()
            .filter_map(|c| c.id.map(|id| (id, c.name)))
            .collect())
    }

    async fn search_page(&self, page: u64) -> Result<Vec<String>> {
        let url = format!("{}/us/unifiedSearch", trim_base(&self.config.search_api_url));
        let fetcher = &self.context.fetcher;
        let request = fetcher
            .client()
            .post(&url)
            .query(&[
                ("page", page.to_string()),
                ("size", self.config.page_size.to_string()),
                ("language", self.config.language.clone()),
            ])
            .header(reqwest::header::ACCEPT, "application/json, text/plain, */*")
            .json(&serde_json::json!({
                "sapCode": self.config.sap_code,
                "filter": "ONLY_EXHIBITORS",
            }));

        let page: SearchPage = fetcher.send_json(request).await?;
        Ok(page.list.into_iter().filter_map(|hit| hit.entity_id).collect())
    }

    async fn exhibitor(
        &self,
        id: String,
        countries: &HashMap<String, String>,
    ) -> Result<RecordOutcome> {
        let url = format!("{}/exhibitors/{}", trim_base(&self.config.detail_api_url), id);
        let fetcher = &self.context.fetcher;
        let request = fetcher.client().get(&url).query(&[
            ("projection", "detail"),
            ("language", self.config.language.as_str()),
        ]);
        let exhibitor: Exhibitor = fetcher.send_json(request).await?;
        let website = normalize_website(exhibitor.web_site.as_deref());
        let mut failures = Vec::new();
        let emails = recover(scrape_emails(fetcher, website.as_deref()).await, &mut failures);
        let record = self.record(exhibitor, id, countries, emails);
        Ok(RecordOutcome::new(record, failures))
    }

    fn record(
        &self,
        exhibitor: Exhibitor,
        id: String,
        countries: &HashMap<String, String>,
        website_emails: Vec<String>,
    ) -> Record {
        let country = exhibitor
            .country_id
            .as_ref()
            .and_then(|id| countries.get(id))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());

        let links = distinct([
            self.context.whatsapp_link(exhibitor.contact_telephone.as_deref()),
            self.context.whatsapp_link(exhibitor.telephone.as_deref()),
        ]);
        let telephones = distinct([exhibitor.contact_telephone, exhibitor.telephone]);
        let emails = distinct([exhibitor.contact_email, exhibitor.email]);
        let detail_link = format!(
            "{}/{}/exhibitor/{}/detail",
            trim_base(&self.config.web_url),
            self.config.catalog_name,
            exhibitor.id.unwrap_or(id)
        );

        Record::new(vec![
            exhibitor.name.into(),
            country.into(),
            links.into(),
            telephones.into(),
            emails.into(),
            exhibitor.contact_name.into(),
            exhibitor.contact_post.into(),
            website_emails.into(),
            exhibitor.facebook_url.into(),
            FieldValue::from(exhibitor.web_site),
            detail_link.into(),
        ])
    }
}

#[async_trait]
impl ExhibitorSource for FiraBarcelonaSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);
        let fetcher = &self.context.fetcher;

        let total = self.exhibitor_count().await?;
        let pages = self.config.page_count(total);
        tracing::info!("📋 Fira Barcelona catalogue has {} exhibitors in {} pages", total, pages);

        let countries = recover(self.countries().await, &mut harvest.failures);

        let searches = fetcher.fetch_all(0..pages, |page| self.search_page(page)).await;
        let ids: Vec<String> = split_outcomes(searches, &mut harvest.failures)
            .into_iter()
            .flatten()
            .collect();

        let results = fetcher
            .fetch_all(ids, |id| self.exhibitor(id, &countries))
            .await;
        harvest.collect(results);

        Ok(harvest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::HttpConfig;
    use crate::core::http::HttpFetcher;
    use crate::core::phone::PhoneNormalizer;
    use crate::core::whatsapp::WhatsappLinker;
    use httpmock::prelude::*;

    fn config(server: &MockServer) -> FiraBarcelonaConfig {
        FiraBarcelonaConfig {
            sap_code: "J011024".to_string(),
            catalog_id: 136,
            catalog_name: "hispack2024".to_string(),
            web_url: server.url("/web"),
            search_api_url: server.url("/search"),
            detail_api_url: server.url("/detail"),
            language: default_language(),
            page_size: 2,
        }
    }

    fn context() -> SourceContext {
        SourceContext::new(
            HttpFetcher::new(&HttpConfig::default()).unwrap(),
            PhoneNormalizer::new("34"),
            WhatsappLinker::default(),
        )
    }

    #[test]
    fn test_page_count_rounds_up() {
        let config: FiraBarcelonaConfig = toml::from_str(
            r#"
sap_code = "J011024"
catalog_id = 136
catalog_name = "hispack2024"
"#,
        )
        .unwrap();
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.page_count(0), 0);
        assert_eq!(config.page_count(1000), 1);
        assert_eq!(config.page_count(1001), 2);
    }

    #[tokio::test]
    async fn test_scrape_catalogue() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/detail/catalogues/136/countItems")
                .query_param("language", "en_EN");
            then.status(200).json_body(serde_json::json!({"EXHIBITORS": 3}));
        });
        let countries_mock = server.mock(|when, then| {
            when.method(GET).path("/detail/catalogues/136/countriesInUse");
            then.status(200).json_body(serde_json::json!({
                "_embedded": {"countries": [{"id": 724, "name": "Spain"}]}
            }));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/search/us/unifiedSearch")
                .query_param("page", "0")
                .json_body(serde_json::json!({"sapCode": "J011024", "filter": "ONLY_EXHIBITORS"}));
            then.status(200).json_body(serde_json::json!({
                "list": [{"entityId": 11}, {"entityId": 12}]
            }));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/search/us/unifiedSearch")
                .query_param("page", "1");
            then.status(200).json_body(serde_json::json!({"list": [{"entityId": 13}]}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/detail/exhibitors/11")
                .query_param("projection", "detail");
            then.status(200).json_body(serde_json::json!({
                "id": 11,
                "name": "Envases Barcelona",
                "countryId": 724,
                "contactTelephone": "932 33 20 00",
                "telephone": "932 33 20 00",
                "contactEmail": "ana@envases.es",
                "email": "info@envases.es",
                "contactName": "Ana",
                "contactPost": "Export",
                "webSite": null
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/detail/exhibitors/12");
            then.status(200).json_body(serde_json::json!({
                "id": 12,
                "name": "Foreign Pack",
                "countryId": 999
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/detail/exhibitors/13");
            then.status(404);
        });

        let harvest = FiraBarcelonaSource::new(config(&server), context())
            .scrape()
            .await
            .unwrap();

        countries_mock.assert_hits(1);
        assert_eq!(harvest.records.len(), 2);
        assert_eq!(harvest.failures.len(), 1);

        let envases = &harvest.records[0];
        assert_eq!(envases.values[1], FieldValue::from("Spain"));
        assert_eq!(
            envases.values[2],
            FieldValue::from(vec!["https://wa.me/34932332000".to_string()])
        );
        assert_eq!(
            envases.values[4],
            FieldValue::from(vec![
                "ana@envases.es".to_string(),
                "info@envases.es".to_string()
            ])
        );
        assert_eq!(
            envases.values[10],
            FieldValue::from(server.url("/web/hispack2024/exhibitor/11/detail"))
        );

        let foreign = &harvest.records[1];
        assert_eq!(foreign.values[1], FieldValue::from("Undefined"));
        assert_eq!(foreign.values[2], FieldValue::List(Vec::new()));
    }

    #[tokio::test]
    async fn test_failed_country_table_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/detail/catalogues/136/countItems");
            then.status(200).json_body(serde_json::json!({"EXHIBITORS": 1}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/detail/catalogues/136/countriesInUse");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(POST).path("/search/us/unifiedSearch");
            then.status(200).json_body(serde_json::json!({"list": [{"entityId": 11}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/detail/exhibitors/11");
            then.status(200).json_body(serde_json::json!({
                "id": 11,
                "name": "Envases Barcelona",
                "countryId": 724
            }));
        });

        let harvest = FiraBarcelonaSource::new(config(&server), context())
            .scrape()
            .await
            .unwrap();

        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.records[0].values[1], FieldValue::from("Undefined"));
        assert_eq!(harvest.failures.len(), 1);
        assert!(harvest.failures[0].contains("countriesInUse"));
    }
}
