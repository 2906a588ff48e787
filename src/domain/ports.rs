use crate::domain::model::{Table, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Where `path` ends up, for logging and reporting.
    fn full_path(&self, path: &str) -> String;
}

/// Settings every stage reads. File names are relative to the storage root.
pub trait ConfigProvider: Send + Sync {
    fn raw_file(&self) -> &str;
    fn relevant_file(&self) -> &str;
    fn formatted_file(&self) -> &str;
    fn report_file(&self) -> &str;
    fn stats_json_file(&self) -> Option<&str>;

    fn columns_to_keep(&self) -> &[String];
    fn datetime_columns(&self) -> &[String];
    fn datetime_format(&self) -> &str;

    fn trip_id_column(&self) -> &str;
    fn trip_id_length(&self) -> usize;
    fn trip_id_seed(&self) -> Option<u64>;
    fn pickup_column(&self) -> &str;
    fn dropoff_column(&self) -> &str;
    fn elapsed_column(&self) -> &str;

    fn verify_numeric_columns(&self) -> &[String];
    fn verify_tolerance(&self) -> f64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Table>;
    async fn transform(&self, data: Table) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
