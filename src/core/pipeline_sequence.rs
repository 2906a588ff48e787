use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::{Duration, Instant};

/// Pipeline 執行結果
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub pipeline_name: String,
    pub rows: usize,
    pub output_path: String,
    pub duration: Duration,
}

/// Runs named pipelines one after another. Each stage reads what the
/// previous one wrote, so the sequence stops at the first failure.
pub struct PipelineSequence {
    stages: Vec<(String, Box<dyn Pipeline>)>,
    monitor: SystemMonitor,
}

impl PipelineSequence {
    pub fn new(monitor_enabled: bool) -> Self {
        Self {
            stages: Vec::new(),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn add_pipeline(mut self, name: &str, pipeline: Box<dyn Pipeline>) -> Self {
        self.stages.push((name.to_string(), pipeline));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub async fn execute(&self) -> Result<Vec<PipelineResult>> {
        let mut results = Vec::with_capacity(self.stages.len());

        for (index, (name, pipeline)) in self.stages.iter().enumerate() {
            tracing::info!(
                "🔄 [{}/{}] Running pipeline '{}'",
                index + 1,
                self.stages.len(),
                name
            );
            let started = Instant::now();

            let data = pipeline.extract().await.inspect_err(|e| {
                tracing::error!("❌ Pipeline '{}' failed during extract: {}", name, e)
            })?;
            let transformed = pipeline.transform(data).await.inspect_err(|e| {
                tracing::error!("❌ Pipeline '{}' failed during transform: {}", name, e)
            })?;
            let rows = transformed.processed_rows;
            let output_path = pipeline.load(transformed).await.inspect_err(|e| {
                tracing::error!("❌ Pipeline '{}' failed during load: {}", name, e)
            })?;

            let duration = started.elapsed();
            tracing::info!(
                "✅ Pipeline '{}' done: {} rows -> {} ({:?})",
                name,
                rows,
                output_path,
                duration
            );
            self.monitor.log_stats(name);

            results.push(PipelineResult {
                pipeline_name: name.clone(),
                rows,
                output_path,
                duration,
            });
        }

        self.monitor.log_final_stats();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Table, TransformResult};
    use crate::utils::error::EtlError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MockPipeline {
        name: String,
        fail: bool,
        runs: Arc<AtomicUsize>,
    }

    impl MockPipeline {
        fn new(name: &str, runs: Arc<AtomicUsize>) -> Self {
            Self {
                name: name.to_string(),
                fail: false,
                runs,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<Table> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EtlError::ProcessingError {
                    message: format!("{} failed", self.name),
                });
            }
            let mut table = Table::new(vec!["id".to_string()]);
            table.rows.push(vec!["1".to_string()]);
            table.rows.push(vec!["2".to_string()]);
            Ok(table)
        }

        async fn transform(&self, data: Table) -> Result<TransformResult> {
            Ok(TransformResult {
                processed_rows: data.len(),
                outputs: Vec::new(),
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            Ok(format!("/tmp/{}_output.csv", self.name))
        }
    }

    #[tokio::test]
    async fn test_sequence_runs_in_order() {
        let runs = Arc::new(AtomicUsize::new(0));
        let sequence = PipelineSequence::new(false)
            .add_pipeline("first", Box::new(MockPipeline::new("first", runs.clone())))
            .add_pipeline("second", Box::new(MockPipeline::new("second", runs.clone())));

        let results = sequence.execute().await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].pipeline_name, "first");
        assert_eq!(results[1].output_path, "/tmp/second_output.csv");
        assert_eq!(results[1].rows, 2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sequence_stops_at_first_failure() {
        let runs = Arc::new(AtomicUsize::new(0));
        let sequence = PipelineSequence::new(false)
            .add_pipeline(
                "broken",
                Box::new(MockPipeline::new("broken", runs.clone()).failing()),
            )
            .add_pipeline("never", Box::new(MockPipeline::new("never", runs.clone())));

        assert_eq!(sequence.len(), 2);
        assert!(sequence.execute().await.is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
