use crate::core::workbook::{layout_records, render_workbook, workbook_filename};
use crate::domain::model::{Harvest, SheetLayout};
use crate::domain::ports::{ExhibitorSource, Pipeline, Storage};
use crate::utils::error::Result;

/// One run: scrape a site, flatten its records into a sheet, store the xlsx.
pub struct ScrapePipeline<S: Storage> {
    source: Box<dyn ExhibitorSource>,
    storage: S,
    /// Workbook basename and sheet name.
    name: String,
    output_path: String,
}

impl<S: Storage> ScrapePipeline<S> {
    pub fn new(
        source: Box<dyn ExhibitorSource>,
        storage: S,
        name: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            source,
            storage,
            name: name.into(),
            output_path: output_path.into(),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ScrapePipeline<S> {
    async fn extract(&self) -> Result<Harvest> {
        tracing::debug!("Scraping {}", self.source.name());
        Ok(self.source.parse().await)
    }

    async fn transform(&self, harvest: Harvest) -> Result<SheetLayout> {
        let layout = layout_records(&self.name, &harvest.header, &harvest.records);
        tracing::debug!(
            "Laid out {} records over {} rows",
            layout.record_count,
            layout.last_row()
        );
        Ok(layout)
    }

    async fn load(&self, layout: SheetLayout) -> Result<String> {
        let data = render_workbook(&layout)?;
        let filename = workbook_filename(&self.name);

        tracing::debug!("Writing workbook ({} bytes) to storage", data.len());
        self.storage.write_file(&filename, &data).await?;

        Ok(format!(
            "{}/{}",
            self.output_path.trim_end_matches('/'),
            filename
        ))
    }
}
