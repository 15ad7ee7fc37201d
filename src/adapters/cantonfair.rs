use crate::adapters::{distinct, flexible_text, trim_base, SourceContext};
use crate::core::http::split_outcomes;
use crate::core::phone::{recreate_phone_number, PhoneNormalizer};
use crate::domain::model::{FieldValue, Harvest, Record};
use crate::domain::ports::ExhibitorSource;
use crate::utils::error::Result;
use crate::utils::validation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const SOURCE_NAME: &str = "cantonfair";
pub const CANTON_FAIR_URL: &str = "https://www.cantonfair.org.cn";
const LANGUAGE: &str = "en-US";

pub const FIELD_NAMES: &[&str] = &[
    "Name",
    "Status",
    "Country",
    "Country Code",
    "Company Person",
    "Email",
    "Phone Numbers",
    "Whatsapp Links",
    "Fax",
    "Zip Code",
    "Website",
    "Detail Link",
    "Company Type",
    "Business Type",
    "Product Type",
    "Address",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CantonFairConfig {
    /// Value of the `_authI` session cookie.
    pub auth: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Country code for numbers published without one.
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Chinese mobiles have 11 national digits, so only 12+ digit numbers
    /// already carry a country code.
    #[serde(default = "default_min_digits")]
    pub min_digits: usize,
}

fn default_api_url() -> String {
    CANTON_FAIR_URL.to_string()
}

fn default_page_size() -> u32 {
    200
}

fn default_country_code() -> String {
    "86".to_string()
}

fn default_min_digits() -> usize {
    12
}

impl CantonFairConfig {
    pub fn validate(&self) -> Result<()> {
        validation::validate_credential("source.auth", &self.auth)?;
        validation::validate_url("source.api_url", &self.api_url)?;
        validation::validate_positive_number("source.page_size", self.page_size as u64, 1)?;
        validation::validate_country_code("source.country_code", &self.country_code)
    }
}

// Every response wraps its payload as `{"arrayData": {"0": ...}}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "arrayData")]
    array_data: ArrayData<T>,
}

#[derive(Debug, Deserialize)]
struct ArrayData<T> {
    #[serde(rename = "0")]
    first: T,
}

#[derive(Debug, Deserialize)]
struct ShopPage {
    #[serde(rename = "_embedded", default)]
    embedded: EmbeddedShops,
    page: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddedShops {
    #[serde(rename = "b2b:shops", default)]
    shops: Vec<ShopCode>,
}

#[derive(Debug, Deserialize)]
struct ShopCode {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    total_pages: u32,
    #[serde(default)]
    total_elements: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Shop {
    #[serde(default, deserialize_with = "flexible_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    status: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    business_type: Option<String>,
    #[serde(default)]
    address: Address,
    #[serde(default)]
    udfs: Udfs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    #[serde(default)]
    country: Option<Country>,
    #[serde(default, deserialize_with = "flexible_text")]
    full_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Country {
    #[serde(default, deserialize_with = "flexible_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Udfs {
    #[serde(default, deserialize_with = "flexible_text")]
    email: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    mobile_phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    telephone: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    contact_person: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    fax: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    website: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    type_of_company: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    main_products: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    zip_code: Option<String>,
}

/// Canton Fair online shop directory. The detail endpoint needs a logged-in
/// session cookie.
pub struct CantonFairSource {
    config: CantonFairConfig,
    context: SourceContext,
}

impl CantonFairSource {
    pub fn new(config: CantonFairConfig, mut context: SourceContext) -> Self {
        context.phones =
            PhoneNormalizer::new(config.country_code.clone()).with_min_digits(config.min_digits);
        Self { config, context }
    }

    fn api_url(&self) -> &str {
        trim_base(&self.config.api_url)
    }

    async fn shop_page(&self, page: u32) -> Result<ShopPage> {
        let url = format!(
            "{}/b2bshop/api/themeRos/public/productShops/searchByVariables",
            self.api_url()
        );
        let fetcher = &self.context.fetcher;
        let request = fetcher.client().get(&url).query(&[
            ("productSearchable", "false".to_string()),
            ("size", self.config.page_size.to_string()),
            ("scoreStrategy", "shop".to_string()),
            ("page", page.to_string()),
        ]);
        let envelope: Envelope<ShopPage> = fetcher.send_json(request).await?;
        Ok(envelope.array_data.first)
    }

    async fn shop(&self, code: String) -> Result<Record> {
        let url = format!(
            "{}/b2bshop/api/themeRos/public/shopExt/searchByVariables",
            self.api_url()
        );
        let fetcher = &self.context.fetcher;
        let request = fetcher
            .client()
            .get(&url)
            .query(&[("shopCode", code.as_str()), ("lang", LANGUAGE)])
            .header("X-User-Lan", LANGUAGE)
            .header(reqwest::header::COOKIE, format!("_authI={}", self.config.auth));

        tracing::debug!("Fetching shop {}", code);
        let envelope: Envelope<Shop> = fetcher.send_json(request).await?;
        let detail_link = format!("{}/{}/shops/{}", self.api_url(), LANGUAGE, code);
        Ok(self.record(envelope.array_data.first, detail_link))
    }

    fn record(&self, shop: Shop, detail_link: String) -> Record {
        let Shop {
            name,
            status,
            business_type,
            address,
            udfs,
        } = shop;
        let (country, country_code) = match address.country {
            Some(country) => (country.name, country.code),
            None => (None, None),
        };

        let phones = distinct([
            recreate_phone_number(udfs.mobile_phone.as_deref()),
            recreate_phone_number(udfs.telephone.as_deref()),
        ]);
        let links: Vec<Option<String>> = phones
            .iter()
            .map(|phone| self.context.whatsapp_link(Some(phone)))
            .collect();

        Record::new(vec![
            name.into(),
            status.into(),
            country.into(),
            country_code.into(),
            udfs.contact_person.into(),
            udfs.email.into(),
            phones.into(),
            FieldValue::List(links),
            udfs.fax.into(),
            udfs.zip_code.into(),
            udfs.website.into(),
            detail_link.into(),
            udfs.type_of_company.into(),
            business_type.into(),
            udfs.main_products.into(),
            address.full_address.into(),
        ])
    }
}

#[async_trait]
impl ExhibitorSource for CantonFairSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn field_names(&self) -> &'static [&'static str] {
        FIELD_NAMES
    }

    async fn scrape(&self) -> Result<Harvest> {
        let mut harvest = Harvest::new(SOURCE_NAME, FIELD_NAMES);
        let fetcher = &self.context.fetcher;

        let first = self.shop_page(0).await?;
        tracing::info!(
            "📋 Canton Fair directory: {} pages, {} shops",
            first.page.total_pages,
            first.page.total_elements
        );

        let mut codes: Vec<String> = first.embedded.shops.into_iter().map(|s| s.code).collect();
        let pages = fetcher
            .fetch_all(1..first.page.total_pages, |page| self.shop_page(page))
            .await;
        for page in split_outcomes(pages, &mut harvest.failures) {
            codes.extend(page.embedded.shops.into_iter().map(|s| s.code));
        }

        let results = fetcher.fetch_all(codes, |code| self.shop(code)).await;
        harvest.records = split_outcomes(results, &mut harvest.failures);

        Ok(harvest)
    }
}
