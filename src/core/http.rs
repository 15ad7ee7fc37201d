use crate::config::toml_config::HttpConfig;
use crate::utils::error::{Result, ScrapeError};
use futures::stream::{self, StreamExt};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// 共用的 HTTP 客戶端：所有請求套用設定的逾時，
/// 平行請求數不超過 `concurrent_requests`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    concurrency: usize,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            concurrency: config.concurrent_requests.max(1),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 送出請求並把回應主體解析成 `T`
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let (url, body) = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ScrapeError::parse(url, e.to_string()))
    }

    /// 送出請求並取回文字主體（HTML 頁面）
    pub async fn send_text(&self, request: RequestBuilder) -> Result<String> {
        let (_, body) = self.send(request).await?;
        Ok(body)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(String, String)> {
        let response = request.send().await?;
        let url = response.url().to_string();
        let status = response.status();
        tracing::debug!("{} -> {}", url, status);

        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok((url, body))
    }

    /// 對每個項目執行 `task`，同時最多 `concurrency` 個請求，結果保持輸入順序
    pub async fn fetch_all<I, T, F, Fut>(&self, items: I, task: F) -> Vec<Result<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        stream::iter(items)
            .map(task)
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// 保留成功結果，錯誤記錄到 `failures`
pub fn split_outcomes<T>(results: Vec<Result<T>>, failures: &mut Vec<String>) -> Vec<T> {
    let mut successes = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => {
                tracing::warn!("⚠️ Request failed: {}", e);
                failures.push(e.to_string());
            }
        }
    }
    successes
}

/// 可選請求（詳細頁、參展商網站）失敗時記錄錯誤並回傳空值
pub fn recover<T: Default>(result: Result<T>, failures: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("⚠️ Optional request failed: {}", e);
            failures.push(e.to_string());
            T::default()
        }
    }
}
