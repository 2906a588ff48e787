use crate::app::pipelines::read_table;
use crate::core::verify::{verify_tables, VerificationOutcome, VerifyOptions};
use crate::core::{ConfigProvider, Storage};
use crate::utils::error::Result;

pub fn verify_options<C: ConfigProvider>(config: &C) -> VerifyOptions {
    VerifyOptions {
        numeric_columns: config.verify_numeric_columns().to_vec(),
        tolerance: config.verify_tolerance(),
        trip_id_column: config.trip_id_column().to_string(),
        trip_id_length: config.trip_id_length(),
        pickup_column: config.pickup_column().to_string(),
        datetime_format: config.datetime_format().to_string(),
    }
}

/// Checks processed files against the raw export.
pub struct DataVerifier<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DataVerifier<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub async fn verify(&self, processed_file: &str) -> Result<VerificationOutcome> {
        tracing::info!("Reading raw data...");
        let raw = read_table(&self.storage, self.config.raw_file()).await?;
        tracing::info!("Reading processed data...");
        let processed = read_table(&self.storage, processed_file).await?;

        let outcome = verify_tables(&raw, &processed, &verify_options(&self.config))?;
        match &outcome {
            VerificationOutcome::Verified => {
                tracing::info!("✅ {} matches {}", processed_file, self.config.raw_file())
            }
            VerificationOutcome::Failed(failure) => {
                tracing::warn!("❌ {} failed verification: {:?}", processed_file, failure)
            }
        }
        Ok(outcome)
    }

    /// Verifies each file in turn and stops at the first failure.
    pub async fn verify_all(&self, processed_files: &[&str]) -> Result<VerificationOutcome> {
        for file in processed_files {
            let outcome = self.verify(file).await?;
            if !outcome.is_verified() {
                return Ok(outcome);
            }
        }
        Ok(VerificationOutcome::Verified)
    }
}
