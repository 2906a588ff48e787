pub mod extract_pipeline;
pub mod format_pipeline;
pub mod report_pipeline;

use crate::core::table::read_csv;
use crate::core::{OutputFile, Storage, Table};
use crate::utils::error::{EtlError, Result};

/// Reads and parses a CSV file from storage.
pub(crate) async fn read_table<S: Storage>(storage: &S, path: &str) -> Result<Table> {
    tracing::info!("Reading from {}...", storage.full_path(path));
    let data = storage.read_file(path).await?;
    let table = read_csv(&data)?;
    tracing::debug!(
        "Read {} rows with {} columns from {}",
        table.len(),
        table.headers.len(),
        path
    );
    Ok(table)
}

/// Writes every output and returns the full path of the first one.
pub(crate) async fn write_outputs<S: Storage>(storage: &S, outputs: &[OutputFile]) -> Result<String> {
    let primary = outputs.first().ok_or_else(|| EtlError::ProcessingError {
        message: "Nothing to write".to_string(),
    })?;

    for output in outputs {
        tracing::info!("Writing to {}...", storage.full_path(&output.name));
        storage.write_file(&output.name, &output.contents).await?;
    }

    Ok(storage.full_path(&primary.name))
}
