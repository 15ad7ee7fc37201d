use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct ScrapeEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ScrapeEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting scrape...");

        let harvest = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Scraped {} records from {} ({} failures)",
            harvest.records.len(),
            harvest.source_name,
            harvest.failures.len()
        );

        let layout = self.pipeline.transform(harvest).await?;
        tracing::info!(
            "🔄 Laid out {} records on sheet '{}'",
            layout.record_count,
            layout.sheet_name
        );

        let output_path = self.pipeline.load(layout).await?;
        tracing::info!("💾 Workbook saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Harvest, Record, SheetLayout};
    use crate::utils::error::ScrapeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        fail_load: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<Harvest> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut harvest = Harvest::new("counting", &["Name"]);
            harvest.records.push(Record::new(vec!["Acme".into()]));
            Ok(harvest)
        }

        async fn transform(&self, harvest: Harvest) -> Result<SheetLayout> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(crate::core::workbook::layout_records(
                "Run",
                &harvest.header,
                &harvest.records,
            ))
        }

        async fn load(&self, _layout: SheetLayout) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                return Err(ScrapeError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            Ok("out/Run_abc123.xlsx".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_calls_every_stage() {
        let engine = ScrapeEngine::new(CountingPipeline {
            fail_load: false,
            calls: AtomicUsize::new(0),
        });

        let path = engine.run().await.unwrap();

        assert_eq!(path, "out/Run_abc123.xlsx");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_propagates_load_error() {
        let engine = ScrapeEngine::new(CountingPipeline {
            fail_load: true,
            calls: AtomicUsize::new(0),
        });

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Io(_)));
    }
}
