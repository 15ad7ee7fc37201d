use crate::adapters::{flexible_text, trim_base, SourceContext};
use crate::core::contact::{normalize_website, scrape_emails};
use crate::core::http::recover;
use crate::domain::model::{Harvest, Record, RecordOutcome};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const SOURCE_NAME: &str = "ifema";
pub const IFEMA_API_URL: &str = "https://lc-events-web-public.ifema.es/api/v1";
const PAGE_SIZE: u32 = 1000;

pub const FIELD_NAMES: &[&str] = &["Name", "Country", "Current Email", "Emails", "Website"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfemaConfig {
    pub tenant_id: String,
    pub edition_id: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    IFEMA_API_URL.to_string()
}

impl IfemaConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_credential("source.tenant_id", &self.tenant_id)?;
        validation::validate_credential("source.edition_id", &self.edition_id)?;
        validation::validate_url("source.api_url", &self.api_url)
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default, deserialize_with = "flexible_text")]
    id: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExhibitorDetail {
    #[serde(default, deserialize_with = "flexible_text")]
    name: Option<String>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default, deserialize_with = "flexible_text")]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    #[serde(default, deserialize_with = "flexible_text")]
    country_code: Option<String>,
}

/// IFEMA Madrid events (public exhibitor catalogue API).
pub struct IfemaSource {
    config: IfemaConfig,
    context: SourceContext,
}

impl IfemaSource {
    pub fn new(config: IfemaConfig, context: SourceContext) -> Self {
        Self { config, context }
    }

    fn exhibitors_url(&self) -> String {
        format!(
            "{}/tenants/{}/editions/{}/exhibitors",
            trim_base(&self.config.api_url),
            self.config.tenant_id,
            self.config.edition_id
        )
    }

    async fn search(&self) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search", self.exhibitors_url());
        let body = serde_json::json!({"page": 0, "pageSize": PAGE_SIZE});
        let fetcher = &self.context.fetcher;

        let page: SearchPage = fetcher
            .send_json(fetcher.client().post(&url).json(&body))
            .await?;
        Ok(page.data)
    }

    async fn exhibitor(&self, id: String, email: Option<String>) -> Result<RecordOutcome> {
        let url = format!("{}/{}", self.exhibitors_url(), id);
        let fetcher = &self.context.fetcher;

        let detail: ExhibitorDetail = fetcher.send_json(fetcher.client().get(&url)).await?;
        let website = normalize_website(detail.link.as_deref());
        let mut failures = Vec::new();
        let emails = recover(scrape_emails(fetcher, website.as_deref()).await, &mut failures);

        let record = Record::new(vec![
            detail.name.into(),
            detail.location.and_then(|l| l.country_code).into(),
            email.into(),
            emails.into(),
            website.into(),
        ]);
        Ok(RecordOutcome::new(record, failures))
    }
}

#[async_trait]
impl ExhibitorSource for IfemaSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);

        let hits = self.search().await?;
        tracing::info!("📋 IFEMA search returned {} exhibitors", hits.len());

        let search_url = format!("{}/search", self.exhibitors_url());
        let mut exhibitors = Vec::with_capacity(hits.len());
        for hit in hits {
            match hit.id.filter(|id| !id.is_empty()) {
                Some(id) => exhibitors.push((id, hit.email)),
                None => {
                    let e = ScrapeError::parse(&search_url, "search hit without id");
                    tracing::warn!("⚠️ Skipping exhibitor: {}", e);
                    harvest.failures.push(e.to_string());
                }
            }
        }

        let results = self
            .context
            .fetcher
            .fetch_all(exhibitors, |(id, email)| self.exhibitor(id, email))
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
    use crate::domain::model::FieldValue;
    use httpmock::prelude::*;

    fn source(server: &MockServer) -> IfemaSource {
        let config = IfemaConfig {
            tenant_id: "t1".to_string(),
            edition_id: "e1".to_string(),
            api_url: server.base_url(),
        };
        let context = SourceContext::new(
            HttpFetcher::new(&HttpConfig::default()).unwrap(),
            PhoneNormalizer::default(),
            WhatsappLinker::default(),
        );
        IfemaSource::new(config, context)
    }

    #[tokio::test]
    async fn test_scrape_exhibitors() {
        let server = MockServer::start();
        let search_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/tenants/t1/editions/e1/exhibitors/search")
                .json_body(serde_json::json!({"page": 0, "pageSize": 1000}));
            then.status(200).json_body(serde_json::json!({
                "data": [
                    {"id": "a", "email": "hello@acme.es"},
                    {"id": "b", "email": null}
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/tenants/t1/editions/e1/exhibitors/a");
            then.status(200).json_body(serde_json::json!({
                "name": "Acme Frutas",
                "location": {"countryCode": "ES"},
                "link": server.url("/site-a")
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/tenants/t1/editions/e1/exhibitors/b");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/site-a");
            then.status(200)
                .body("<html><body>Contact: ventas@acme.es</body></html>");
        });

        let harvest = source(&server).scrape().await.unwrap();

        search_mock.assert();
        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.failures.len(), 1);

        let record = &harvest.records[0];
        assert_eq!(record.len(), FIELD_NAMES.len());
        assert_eq!(record.values[0], FieldValue::from("Acme Frutas"));
        assert_eq!(record.values[1], FieldValue::from("ES"));
        assert_eq!(record.values[2], FieldValue::from("hello@acme.es"));
        assert_eq!(
            record.values[3],
            FieldValue::from(vec!["ventas@acme.es".to_string()])
        );
        assert_eq!(record.values[4], FieldValue::from(server.url("/site-a")));
    }

    #[tokio::test]
    async fn test_hit_without_id_is_skipped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenants/t1/editions/e1/exhibitors/search");
            then.status(200).json_body(serde_json::json!({
                "data": [{"id": null, "email": "ghost@acme.es"}, {"email": "none@acme.es"}]
            }));
        });
        let list_mock = server.mock(|when, then| {
            when.method(GET).path("/tenants/t1/editions/e1/exhibitors/");
            then.status(200).json_body(serde_json::json!({"name": "Wrong"}));
        });

        let harvest = source(&server).scrape().await.unwrap();

        list_mock.assert_hits(0);
        assert!(harvest.records.is_empty());
        assert_eq!(harvest.failures.len(), 2);
        assert!(harvest.failures[0].contains("without id"));
    }

    #[tokio::test]
    async fn test_unreachable_website_is_recorded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenants/t1/editions/e1/exhibitors/search");
            then.status(200).json_body(serde_json::json!({"data": [{"id": "a"}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/tenants/t1/editions/e1/exhibitors/a");
            then.status(200).json_body(serde_json::json!({
                "name": "Acme Frutas",
                "link": server.url("/down")
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/down");
            then.status(500);
        });

        let harvest = source(&server).scrape().await.unwrap();

        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.records[0].values[3], FieldValue::List(Vec::new()));
        assert_eq!(harvest.failures.len(), 1);
        assert!(harvest.failures[0].contains("500"));
    }

    #[tokio::test]
    async fn test_search_failure_recovers_to_empty_harvest() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tenants/t1/editions/e1/exhibitors/search");
            then.status(502);
        });

        let harvest = source(&server).parse().await;

        assert!(harvest.records.is_empty());
        assert_eq!(harvest.failures.len(), 1);
        assert_eq!(harvest.header.len(), FIELD_NAMES.len());
    }
}
