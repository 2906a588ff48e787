use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ETL process...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} rows with {} columns",
            raw_data.len(),
            raw_data.headers.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("Transforming data...");
        let transformed_result = self.pipeline.transform(raw_data).await?;
        tracing::info!("Transformed {} rows", transformed_result.processed_rows);
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("Loading data...");
        let output_path = self.pipeline.load(transformed_result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
