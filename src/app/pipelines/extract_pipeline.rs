use super::{read_table, write_outputs};
use crate::core::table::{is_missing, normalize_cells, write_csv};
use crate::core::trip_time::to_clock_time;
use crate::core::{ConfigProvider, OutputFile, Pipeline, Storage, Table, TransformResult};
use crate::utils::error::{EtlError, Result};

/// Raw export -> relevant columns, timestamps reduced to 24-hour clock times.
pub struct ColumnExtractPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> ColumnExtractPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ColumnExtractPipeline<S, C> {
    async fn extract(&self) -> Result<Table> {
        let raw_file = self.config.raw_file();
        let table = read_table(&self.storage, raw_file).await?;

        // 只保留需要的欄位，順序沿用原始檔案
        let selected = table.select_columns(self.config.columns_to_keep(), raw_file)?;
        tracing::info!(
            "Extracted {} rows with {} columns",
            selected.len(),
            selected.headers.len()
        );
        Ok(selected)
    }

    async fn transform(&self, mut data: Table) -> Result<TransformResult> {
        tracing::info!("Processing datetime columns...");
        let format = self.config.datetime_format();
        normalize_cells(&mut data);

        for column in self.config.datetime_columns() {
            let idx = data.require_column(column, self.config.raw_file())?;
            for (row_no, row) in data.rows.iter_mut().enumerate() {
                let cell = &mut row[idx];
                if is_missing(cell) {
                    cell.clear();
                    continue;
                }
                let converted = to_clock_time(cell, format).map_err(|e| EtlError::DataFormatError {
                    row: row_no + 1,
                    column: column.clone(),
                    value: cell.clone(),
                    reason: format!("expected a datetime like '{}' ({})", format, e),
                })?;
                *cell = converted;
            }
        }

        let csv_output = write_csv(&data)?;
        Ok(TransformResult {
            processed_rows: data.len(),
            outputs: vec![OutputFile::new(self.config.relevant_file(), csv_output)],
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = write_outputs(&self.storage, &result.outputs).await?;
        tracing::info!(
            "Done! Wrote {} rows; datetime columns now hold 24-hour times (HH:MM:SS)",
            result.processed_rows
        );
        Ok(output_path)
    }
}
