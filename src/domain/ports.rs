use crate::domain::model::{Harvest, SheetLayout};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A site adapter. `scrape` does the site-specific work and may fail;
/// `parse` is the boundary callers use and never fails.
#[async_trait]
pub trait ExhibitorSource: Send + Sync {
    fn name(&self) -> &str;

    fn field_names(&self) -> &'static [&'static str];

    async fn scrape(&self) -> Result<Harvest>;

    async fn parse(&self) -> Harvest {
        let header = self.field_names();
        let mut harvest = match self.scrape().await {
            Ok(harvest) => harvest,
            Err(e) => {
                tracing::warn!("⚠️ {} failed: {} ({:?})", self.name(), e, e.category());
                let mut harvest = Harvest::new(self.name(), header);
                harvest.failures.push(e.to_string());
                return harvest;
            }
        };

        let expected = header.len();
        let mut aligned = Vec::with_capacity(harvest.records.len());
        for record in std::mem::take(&mut harvest.records) {
            if record.len() == expected {
                aligned.push(record);
            } else {
                let e = ScrapeError::SchemaMismatch {
                    source_name: self.name().to_string(),
                    expected,
                    actual: record.len(),
                };
                tracing::warn!("⚠️ Dropping record: {}", e);
                harvest.failures.push(e.to_string());
            }
        }
        harvest.records = aligned;

        if harvest.records.is_empty() {
            let e = ScrapeError::EmptyResult {
                source_name: self.name().to_string(),
            };
            tracing::warn!("⚠️ {}", e);
        }
        if harvest.is_partial() {
            tracing::warn!(
                "⚠️ {} finished with {} records and {} failures",
                self.name(),
                harvest.records.len(),
                harvest.failures.len()
            );
        }

        harvest
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Harvest>;
    async fn transform(&self, harvest: Harvest) -> Result<SheetLayout>;
    async fn load(&self, layout: SheetLayout) -> Result<String>;
}
