use super::{read_table, write_outputs};
use crate::core::report::render_markdown;
use crate::core::stats::calculate_statistics;
use crate::core::{ConfigProvider, OutputFile, Pipeline, Storage, Table, TransformResult};
use crate::utils::error::Result;
use chrono::NaiveDateTime;

/// Formatted data -> Markdown statistics report (plus optional JSON).
pub struct StatsReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    generated_at: Option<NaiveDateTime>,
}

impl<S: Storage, C: ConfigProvider> StatsReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            generated_at: None,
        }
    }

    /// Pins the report timestamp instead of using the local clock.
    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for StatsReportPipeline<S, C> {
    async fn extract(&self) -> Result<Table> {
        let table = read_table(&self.storage, self.config.formatted_file()).await?;
        tracing::info!(
            "Successfully read data with {} rows and {} columns",
            table.len(),
            table.headers.len()
        );
        Ok(table)
    }

    async fn transform(&self, data: Table) -> Result<TransformResult> {
        tracing::info!("Calculating statistics...");
        let summary = calculate_statistics(&data);
        if summary.is_empty() {
            tracing::warn!("No numerical columns found; the report will have an empty table");
        } else {
            tracing::debug!(
                "Numerical columns: {}",
                summary
                    .columns
                    .iter()
                    .map(|c| c.column.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let generated_at = self
            .generated_at
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        let markdown = render_markdown(&summary, generated_at);

        let mut outputs = vec![OutputFile::new(self.config.report_file(), markdown)];
        if let Some(json_file) = self.config.stats_json_file() {
            let json = serde_json::to_string_pretty(&summary)?;
            outputs.push(OutputFile::new(json_file, json));
        }

        Ok(TransformResult {
            processed_rows: data.len(),
            outputs,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = write_outputs(&self.storage, &result.outputs).await?;
        tracing::info!("Report successfully generated: {}", output_path);
        Ok(output_path)
    }
}
