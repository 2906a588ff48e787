use super::{read_table, write_outputs};
use crate::core::table::{is_missing, normalize_cells, write_csv};
use crate::core::trip_id::TripIdGenerator;
use crate::core::trip_time::{elapsed_seconds, parse_clock_time};
use crate::core::{ConfigProvider, OutputFile, Pipeline, Storage, Table, TransformResult};
use crate::utils::error::{EtlError, Result};

/// Relevant data -> trip IDs prepended, elapsed time appended, clock-time
/// columns removed.
pub struct TripFormatPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> TripFormatPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn elapsed_times(&self, data: &Table) -> Result<Vec<String>> {
        let source = self.config.relevant_file();
        let pickup_col = self.config.pickup_column();
        let dropoff_col = self.config.dropoff_column();
        let pickup_idx = data.require_column(pickup_col, source)?;
        let dropoff_idx = data.require_column(dropoff_col, source)?;

        data.rows
            .iter()
            .enumerate()
            .map(|(row_no, row)| {
                let (pickup, dropoff) = (&row[pickup_idx], &row[dropoff_idx]);
                // 缺少任一時間就無法計算
                if is_missing(pickup) || is_missing(dropoff) {
                    return Ok(String::new());
                }

                elapsed_seconds(pickup, dropoff)
                    // 與秒數的浮點表示一致，例如 795.0
                    .map(|seconds| format!("{:.1}", seconds as f64))
                    .map_err(|e| {
                        let (column, value) = if parse_clock_time(pickup).is_err() {
                            (pickup_col, pickup)
                        } else {
                            (dropoff_col, dropoff)
                        };
                        EtlError::DataFormatError {
                            row: row_no + 1,
                            column: column.to_string(),
                            value: value.clone(),
                            reason: format!("expected HH:MM:SS ({})", e),
                        }
                    })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TripFormatPipeline<S, C> {
    async fn extract(&self) -> Result<Table> {
        let table = read_table(&self.storage, self.config.relevant_file()).await?;
        tracing::info!("Processing {} rows...", table.len());
        Ok(table)
    }

    async fn transform(&self, mut data: Table) -> Result<TransformResult> {
        normalize_cells(&mut data);
        tracing::info!("Calculating elapsed times...");
        let elapsed = self.elapsed_times(&data)?;

        tracing::info!("Generating unique trip IDs...");
        let mut generator =
            TripIdGenerator::new(self.config.trip_id_length(), self.config.trip_id_seed())?;
        let ids = generator.generate(data.len())?;

        data.insert_column(0, self.config.trip_id_column(), ids)?;
        data.push_column(self.config.elapsed_column(), elapsed)?;

        tracing::info!("Removing datetime columns...");
        data.drop_columns(&[
            self.config.pickup_column().to_string(),
            self.config.dropoff_column().to_string(),
        ]);

        tracing::debug!("Formatted columns: {}", data.headers.join(", "));
        let csv_output = write_csv(&data)?;
        Ok(TransformResult {
            processed_rows: data.len(),
            outputs: vec![OutputFile::new(self.config.formatted_file(), csv_output)],
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        write_outputs(&self.storage, &result.outputs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::test_support::MockStorage;
    use crate::config::toml_config::TomlConfig;
    use crate::core::table::read_csv;
    use crate::core::trip_id::is_valid_trip_id;

    const RELEVANT: &str = "\
pickup_datetime,dropoff_datetime,passenger_count,trip_distance,fare_amount
18:41:46,18:55:01,1,1.63,10.5
23:58:00,00:03:30,3,0.9,5.5
,07:10:00,2,4.2,15.0
";

    fn seeded_config() -> TomlConfig {
        let mut config = TomlConfig::default();
        config.format.seed = Some(2015);
        config
    }

    #[tokio::test]
    async fn test_format_stage_output_layout() {
        let storage = MockStorage::new();
        storage.put("relevant_data.csv", RELEVANT).await;
        let pipeline = TripFormatPipeline::new(storage.clone(), seeded_config());

        let table = pipeline.extract().await.unwrap();
        let result = pipeline.transform(table).await.unwrap();
        assert_eq!(result.processed_rows, 3);
        pipeline.load(result).await.unwrap();

        let written = storage.get_text("formatted_data.csv").await.unwrap();
        let table = read_csv(written.as_bytes()).unwrap();
        assert_eq!(
            table.headers,
            vec![
                "trip_id",
                "passenger_count",
                "trip_distance",
                "fare_amount",
                "elapsed_time"
            ]
        );

        let elapsed = table.column_values("elapsed_time").unwrap();
        assert_eq!(elapsed, vec!["795.0", "330.0", ""]);

        let ids = table.column_values("trip_id").unwrap();
        assert!(ids.iter().all(|id| is_valid_trip_id(id, 6)));
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[tokio::test]
    async fn test_seeded_ids_are_reproducible() {
        let run = || async {
            let storage = MockStorage::new();
            storage.put("relevant_data.csv", RELEVANT).await;
            let pipeline = TripFormatPipeline::new(storage.clone(), seeded_config());
            let table = pipeline.extract().await.unwrap();
            pipeline.load(pipeline.transform(table).await.unwrap()).await.unwrap();
            storage.get_text("formatted_data.csv").await.unwrap()
        };

        assert_eq!(run().await, run().await);
    }

    #[tokio::test]
    async fn test_bad_clock_time_reports_column() {
        let pipeline = TripFormatPipeline::new(MockStorage::new(), seeded_config());
        let table = read_csv(b"pickup_datetime,dropoff_datetime\n18:41:46,6:55pm\n").unwrap();

        let err = pipeline.transform(table).await.unwrap_err();
        assert!(matches!(
            err,
            EtlError::DataFormatError { row: 1, ref column, .. } if column == "dropoff_datetime"
        ));
    }

    #[tokio::test]
    async fn test_existing_trip_id_column_rejected() {
        let pipeline = TripFormatPipeline::new(MockStorage::new(), seeded_config());
        let table =
            read_csv(b"trip_id,pickup_datetime,dropoff_datetime\nABCDEF,10:00:00,10:05:00\n")
                .unwrap();

        assert!(pipeline.transform(table).await.is_err());
    }
}
