// Catalogues hosted on the Xeria platform (Publicalt, TicketsNebext) share
// one company listing endpoint.

use crate::adapters::flexible_text;
use crate::core::http::HttpFetcher;
use crate::utils::error::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CompaniesPage {
    #[serde(rename = "Data")]
    data: Vec<Company>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Company {
    #[serde(default, deserialize_with = "flexible_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub telephone: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flexible_text")]
    pub web: Option<String>,
    #[serde(deserialize_with = "flexible_text")]
    pub id_account: Option<String>,
}

/// POSTs the `Companies_Read` form and returns every company of the catalogue.
pub(crate) async fn read_companies(
    fetcher: &HttpFetcher,
    url: &str,
    sort: &str,
) -> Result<Vec<Company>> {
    let request = fetcher.client().post(url).form(&[("sort", sort)]);
    let page: CompaniesPage = fetcher.send_json(request).await?;
    Ok(page.data)
}
