use crate::core::trip_id::DEFAULT_TRIP_ID_LENGTH;
use crate::core::trip_time::SOURCE_DATETIME_FORMAT;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_column_list, validate_file_extension, validate_non_empty_string, validate_path,
    validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest trip ID the formatter will generate.
pub const MAX_TRIP_ID_LENGTH: usize = 12;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Every section is optional; anything left out falls back to the defaults
/// for the NYC taxi trip export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub files: FilesConfig,
    pub extract: ExtractConfig,
    pub format: FormatConfig,
    pub verify: VerifyConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub data_dir: String,
    pub raw: String,
    pub relevant: String,
    pub formatted: String,
    pub report: String,
    pub stats_json: Option<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            raw: "raw_data.csv".to_string(),
            relevant: "relevant_data.csv".to_string(),
            formatted: "formatted_data.csv".to_string(),
            report: "statistics_report.md".to_string(),
            stats_json: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub columns: Vec<String>,
    pub datetime_columns: Vec<String>,
    pub datetime_format: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            columns: strings(&[
                "passenger_count",
                "trip_distance",
                "fare_amount",
                "pickup_datetime",
                "dropoff_datetime",
            ]),
            datetime_columns: strings(&["pickup_datetime", "dropoff_datetime"]),
            datetime_format: SOURCE_DATETIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub trip_id_column: String,
    pub trip_id_length: usize,
    pub seed: Option<u64>,
    pub pickup_column: String,
    pub dropoff_column: String,
    pub elapsed_column: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            trip_id_column: "trip_id".to_string(),
            trip_id_length: DEFAULT_TRIP_ID_LENGTH,
            seed: None,
            pickup_column: "pickup_datetime".to_string(),
            dropoff_column: "dropoff_datetime".to_string(),
            elapsed_column: "elapsed_time".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub numeric_columns: Vec<String>,
    pub tolerance: f64,
    /// File checked against the raw data; the extract output when unset.
    pub processed: Option<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            numeric_columns: strings(&["passenger_count", "trip_distance", "fare_amount"]),
            tolerance: 1e-10,
            processed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("files.data_dir", &self.files.data_dir)?;
        validate_file_extension("files.raw", &self.files.raw, &["csv"])?;
        validate_file_extension("files.relevant", &self.files.relevant, &["csv"])?;
        validate_file_extension("files.formatted", &self.files.formatted, &["csv"])?;
        validate_file_extension("files.report", &self.files.report, &["md"])?;
        if let Some(json) = &self.files.stats_json {
            validate_file_extension("files.stats_json", json, &["json"])?;
        }
        if let Some(processed) = &self.verify.processed {
            validate_file_extension("verify.processed", processed, &["csv"])?;
        }

        validate_column_list("extract.columns", &self.extract.columns)?;
        for column in &self.extract.datetime_columns {
            if !self.extract.columns.contains(column) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "extract.datetime_columns".to_string(),
                    value: column.clone(),
                    reason: "Datetime column is not in extract.columns".to_string(),
                });
            }
        }
        validate_non_empty_string("extract.datetime_format", &self.extract.datetime_format)?;

        validate_non_empty_string("format.trip_id_column", &self.format.trip_id_column)?;
        validate_non_empty_string("format.pickup_column", &self.format.pickup_column)?;
        validate_non_empty_string("format.dropoff_column", &self.format.dropoff_column)?;
        validate_non_empty_string("format.elapsed_column", &self.format.elapsed_column)?;
        validate_range(
            "format.trip_id_length",
            self.format.trip_id_length,
            1,
            MAX_TRIP_ID_LENGTH,
        )?;

        validate_column_list("verify.numeric_columns", &self.verify.numeric_columns)?;
        if !self.verify.tolerance.is_finite() {
            return Err(EtlError::InvalidConfigValueError {
                field: "verify.tolerance".to_string(),
                value: self.verify.tolerance.to_string(),
                reason: "Tolerance must be a finite number".to_string(),
            });
        }
        validate_range("verify.tolerance", self.verify.tolerance, 0.0, f64::MAX)?;

        Ok(())
    }

    pub fn data_dir(&self) -> &str {
        &self.files.data_dir
    }

    /// File compared with the raw data by the verifier.
    pub fn verify_target(&self) -> &str {
        self.verify
            .processed
            .as_deref()
            .unwrap_or(&self.files.relevant)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn raw_file(&self) -> &str {
        &self.files.raw
    }

    fn relevant_file(&self) -> &str {
        &self.files.relevant
    }

    fn formatted_file(&self) -> &str {
        &self.files.formatted
    }

    fn report_file(&self) -> &str {
        &self.files.report
    }

    fn stats_json_file(&self) -> Option<&str> {
        self.files.stats_json.as_deref()
    }

    fn columns_to_keep(&self) -> &[String] {
        &self.extract.columns
    }

    fn datetime_columns(&self) -> &[String] {
        &self.extract.datetime_columns
    }

    fn datetime_format(&self) -> &str {
        &self.extract.datetime_format
    }

    fn trip_id_column(&self) -> &str {
        &self.format.trip_id_column
    }

    fn trip_id_length(&self) -> usize {
        self.format.trip_id_length
    }

    fn trip_id_seed(&self) -> Option<u64> {
        self.format.seed
    }

    fn pickup_column(&self) -> &str {
        &self.format.pickup_column
    }

    fn dropoff_column(&self) -> &str {
        &self.format.dropoff_column
    }

    fn elapsed_column(&self) -> &str {
        &self.format.elapsed_column
    }

    fn verify_numeric_columns(&self) -> &[String] {
        &self.verify.numeric_columns
    }

    fn verify_tolerance(&self) -> f64 {
        self.verify.tolerance
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_taxi_export() {
        let config = TomlConfig::default();
        assert_eq!(config.raw_file(), "raw_data.csv");
        assert_eq!(config.report_file(), "statistics_report.md");
        assert_eq!(config.columns_to_keep().len(), 5);
        assert_eq!(config.datetime_format(), "%m/%d/%Y %I:%M:%S %p");
        assert_eq!(config.trip_id_length(), 6);
        assert_eq!(config.verify_target(), "relevant_data.csv");
        assert!(config.stats_json_file().is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[files]
data_dir = "./data"
stats_json = "statistics.json"

[format]
trip_id_length = 8
seed = 1234

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_dir(), "./data");
        assert_eq!(config.files.raw, "raw_data.csv");
        assert_eq!(config.stats_json_file(), Some("statistics.json"));
        assert_eq!(config.trip_id_length(), 8);
        assert_eq!(config.trip_id_seed(), Some(1234));
        assert_eq!(config.trip_id_column(), "trip_id");
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRIP_STATS_TEST_DATA_DIR", "/srv/taxi");

        let toml_content = r#"
[files]
data_dir = "${TRIP_STATS_TEST_DATA_DIR}"
raw = "${TRIP_STATS_TEST_UNSET_VAR}.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), "/srv/taxi");
        assert_eq!(config.files.raw, "${TRIP_STATS_TEST_UNSET_VAR}.csv");

        std::env::remove_var("TRIP_STATS_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_report = TomlConfig::from_toml_str("[files]\nreport = \"report.txt\"\n").unwrap();
        assert!(bad_report.validate().is_err());

        let bad_datetime = TomlConfig::from_toml_str(
            "[extract]\ncolumns = [\"fare_amount\"]\ndatetime_columns = [\"pickup_datetime\"]\n",
        )
        .unwrap();
        assert!(bad_datetime.validate().is_err());

        let bad_length = TomlConfig::from_toml_str("[format]\ntrip_id_length = 0\n").unwrap();
        assert!(bad_length.validate().is_err());

        let bad_tolerance = TomlConfig::from_toml_str("[verify]\ntolerance = -0.5\n").unwrap();
        assert!(bad_tolerance.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[files\nraw = 1").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[files]\nformatted = \"trips.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.formatted_file(), "trips.csv");
    }
}
