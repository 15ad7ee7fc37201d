//! Site adapters. Each module knows one trade-fair site: its endpoints,
//! its response shapes, and the column layout of the records it emits.

pub mod cantonfair;
pub mod eccmid;
pub mod firabarcelona;
pub mod ifema;
pub mod mwcbarcelona;
pub mod publicalt;
pub mod ticketsnebext;
mod xeria;

use crate::config::toml_config::ScrapeConfig;
use crate::core::http::HttpFetcher;
use crate::core::phone::PhoneNormalizer;
use crate::core::whatsapp::WhatsappLinker;
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::Result;
use serde::{Deserialize, Deserializer, Serialize};

pub use cantonfair::{CantonFairConfig, CantonFairSource};
pub use eccmid::{EccmidConfig, EccmidSource};
pub use firabarcelona::{FiraBarcelonaConfig, FiraBarcelonaSource};
pub use ifema::{IfemaConfig, IfemaSource};
pub use mwcbarcelona::{MwcBarcelonaConfig, MwcBarcelonaSource};
pub use publicalt::{PublicaltConfig, PublicaltSource};
pub use ticketsnebext::{TicketsNebextConfig, TicketsNebextSource};

/// `[source]` table of the run file; `type` picks the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Ifema(IfemaConfig),
    MwcBarcelona(MwcBarcelonaConfig),
    TicketsNebext(TicketsNebextConfig),
    Publicalt(PublicaltConfig),
    Eccmid(EccmidConfig),
    CantonFair(CantonFairConfig),
    FiraBarcelona(FiraBarcelonaConfig),
}

impl SourceConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ifema(_) => ifema::SOURCE_NAME,
            Self::MwcBarcelona(_) => mwcbarcelona::SOURCE_NAME,
            Self::TicketsNebext(_) => ticketsnebext::SOURCE_NAME,
            Self::Publicalt(_) => publicalt::SOURCE_NAME,
            Self::Eccmid(_) => eccmid::SOURCE_NAME,
            Self::CantonFair(_) => cantonfair::SOURCE_NAME,
            Self::FiraBarcelona(_) => firabarcelona::SOURCE_NAME,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Ifema(c) => c.validate(),
            Self::MwcBarcelona(c) => c.validate(),
            Self::TicketsNebext(c) => c.validate(),
            Self::Publicalt(c) => c.validate(),
            Self::Eccmid(c) => c.validate(),
            Self::CantonFair(c) => c.validate(),
            Self::FiraBarcelona(c) => c.validate(),
        }
    }
}

/// What every adapter needs besides its own settings.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub fetcher: HttpFetcher,
    pub phones: PhoneNormalizer,
    pub whatsapp: WhatsappLinker,
}

impl SourceContext {
    pub fn new(fetcher: HttpFetcher, phones: PhoneNormalizer, whatsapp: WhatsappLinker) -> Self {
        Self {
            fetcher,
            phones,
            whatsapp,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self> {
        Ok(Self::new(
            HttpFetcher::new(&config.http)?,
            PhoneNormalizer::new(config.phone.default_country_code.clone())
                .with_min_digits(config.phone.min_digits),
            WhatsappLinker::new(config.whatsapp.base_url.clone()),
        ))
    }

    /// WhatsApp link for a raw phone as typed by the exhibitor.
    pub fn whatsapp_link(&self, raw_phone: Option<&str>) -> Option<String> {
        self.whatsapp.link(self.phones.normalize(raw_phone).as_deref())
    }
}

pub fn build_source(config: &ScrapeConfig) -> Result<Box<dyn ExhibitorSource>> {
    let context = SourceContext::from_config(config)?;
    let source: Box<dyn ExhibitorSource> = match &config.source {
        SourceConfig::Ifema(c) => Box::new(IfemaSource::new(c.clone(), context)),
        SourceConfig::MwcBarcelona(c) => Box::new(MwcBarcelonaSource::new(c.clone(), context)),
        SourceConfig::TicketsNebext(c) => Box::new(TicketsNebextSource::new(c.clone(), context)),
        SourceConfig::Publicalt(c) => Box::new(PublicaltSource::new(c.clone(), context)),
        SourceConfig::Eccmid(c) => Box::new(EccmidSource::new(c.clone(), context)),
        SourceConfig::CantonFair(c) => Box::new(CantonFairSource::new(c.clone(), context)),
        SourceConfig::FiraBarcelona(c) => Box::new(FiraBarcelonaSource::new(c.clone(), context)),
    };
    Ok(source)
}

/// Non-empty values in first-seen order, duplicates removed.
pub(crate) fn distinct<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut seen = Vec::new();
    for value in values.into_iter().flatten() {
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Third-party APIs are loose about scalar types: the same field may come
/// back as a string, a number or a list. Everything is read as text.
pub(crate) fn flexible_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

fn value_to_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => Some(other.to_string()),
    }
}

pub(crate) fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "flexible_text")]
        value: Option<String>,
    }

    fn loose(json: &str) -> Option<String> {
        serde_json::from_str::<Loose>(json).unwrap().value
    }

    #[test]
    fn test_flexible_text() {
        assert_eq!(loose(r#"{"value": "08001"}"#), Some("08001".to_string()));
        assert_eq!(loose(r#"{"value": 8001}"#), Some("8001".to_string()));
        assert_eq!(loose(r#"{"value": ["Spain", "France"]}"#), Some("Spain, France".to_string()));
        assert_eq!(loose(r#"{"value": null}"#), None);
        assert_eq!(loose(r#"{}"#), None);
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let values = vec![
            Some("b".to_string()),
            None,
            Some("a".to_string()),
            Some("b".to_string()),
            Some(String::new()),
        ];
        assert_eq!(distinct(values), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_whatsapp_link_uses_context_country_code() {
        let context = SourceContext::new(
            HttpFetcher::new(&Default::default()).unwrap(),
            PhoneNormalizer::new("34"),
            WhatsappLinker::default(),
        );
        assert_eq!(
            context.whatsapp_link(Some("917 22 30 00")),
            Some("https://wa.me/34917223000".to_string())
        );
        assert_eq!(context.whatsapp_link(None), None);
    }

    #[test]
    fn test_source_config_names() {
        let config: SourceConfig = toml::from_str(
            r#"
type = "firabarcelona"
sap_code = "J011024"
catalog_id = 136
catalog_name = "hispack2024"
"#,
        )
        .unwrap();
        assert_eq!(config.name(), "firabarcelona");
        assert!(config.validate().is_ok());
    }
}
