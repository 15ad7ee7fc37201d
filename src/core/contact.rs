use crate::core::http::HttpFetcher;
use crate::utils::error::Result;
use regex::Regex;
use scraper::Html;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static EMAIL_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,4}").expect("valid email regex")
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}").expect("valid email regex")
});

static PHONE_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+]\w{13,20}").expect("valid phone regex"));

pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_PATTERN.is_match(email)
}

/// 為 `www.acme.com` 這類沒有協定的網址補上 `https://`
pub fn normalize_website(url: Option<&str>) -> Option<String> {
    let url = url?.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("https://") || url.starts_with("http://") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

// 文字節點以空白連接，相鄰元素的地址不會黏在一起
fn page_text(html: &str) -> String {
    Html::parse_document(html)
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML 頁面可見文字中的 email，去重並排序
pub fn extract_emails(html: &str) -> Vec<String> {
    let text = page_text(html);
    EMAIL_IN_TEXT
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 以 `+` 開頭且沒有分隔符號的電話號碼，去重並排序
pub fn extract_phone_numbers(html: &str) -> Vec<String> {
    let text = page_text(html);
    PHONE_IN_TEXT
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContacts {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

async fn fetch_page(fetcher: &HttpFetcher, url: &str) -> Result<String> {
    tracing::debug!("Scanning website {}", url);
    fetcher.send_text(fetcher.client().get(url)).await
}

/// 參展商網站上的 email；沒有網址時回傳空清單，請求失敗時回傳錯誤
pub async fn scrape_emails(fetcher: &HttpFetcher, url: Option<&str>) -> Result<Vec<String>> {
    match url {
        Some(url) => Ok(extract_emails(&fetch_page(fetcher, url).await?)),
        None => Ok(Vec::new()),
    }
}

/// 參展商網站上的 email 與電話
pub async fn scrape_contacts(fetcher: &HttpFetcher, url: Option<&str>) -> Result<PageContacts> {
    let Some(url) = url else {
        return Ok(PageContacts::default());
    };
    let body = fetch_page(fetcher, url).await?;
    Ok(PageContacts {
        emails: extract_emails(&body),
        phones: extract_phone_numbers(&body),
    })
}
