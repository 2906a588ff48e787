use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Column '{column}' not found in {source_name}")]
    MissingColumnError { column: String, source_name: String },

    #[error("Bad value '{value}' in column '{column}' at row {row}: {reason}")]
    DataFormatError {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 對應的程序退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingColumnError { .. }
            | EtlError::DataFormatError { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorSeverity::Critical
            }
            EtlError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::CsvError(_) => {
                "Check that the input file is a well-formed CSV with a header row".to_string()
            }
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check the input file name and --data-dir; run the previous stage first".to_string()
            }
            EtlError::IoError(_) => "Check file permissions and available disk space".to_string(),
            EtlError::SerializationError(_) => "Report this as a bug".to_string(),
            EtlError::ConfigError { .. } | EtlError::ConfigValidationError { .. } => {
                "Fix the TOML configuration file and try again".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' in the configuration", field)
            }
            EtlError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration", field)
            }
            EtlError::MissingColumnError { column, .. } => format!(
                "Make sure the input has a '{}' column or adjust the configured column list",
                column
            ),
            EtlError::DataFormatError { column, .. } => format!(
                "Fix the offending '{}' value or the configured datetime format",
                column
            ),
            EtlError::ProcessingError { .. } => "Inspect the input data and retry".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            EtlError::MissingColumnError {
                column,
                source_name,
            } => format!("The file {} has no '{}' column", source_name, column),
            EtlError::DataFormatError {
                row, column, value, ..
            } => format!(
                "Could not understand '{}' in column '{}' (row {})",
                value, column, row
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_with_hint() {
        let err = EtlError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "raw_data.csv",
        ));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.recovery_suggestion().contains("previous stage"));
        assert!(err.user_friendly_message().starts_with("File not found"));
    }

    #[test]
    fn test_config_errors_are_configuration_category() {
        let err = EtlError::InvalidConfigValueError {
            field: "format.trip_id_length".to_string(),
            value: "0".to_string(),
            reason: "too short".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("format.trip_id_length"));
    }

    #[test]
    fn test_data_errors_are_data_category() {
        let err = EtlError::DataFormatError {
            row: 3,
            column: "pickup_datetime".to_string(),
            value: "6pm".to_string(),
            reason: "bad".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Could not understand '6pm' in column 'pickup_datetime' (row 3)"
        );

        let err = EtlError::ProcessingError {
            message: "trip ID space exhausted".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity().exit_code(), 1);
    }

    #[test]
    fn test_severity_exit_codes() {
        assert_eq!(ErrorSeverity::Low.exit_code(), 0);
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::High.exit_code(), 1);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);
    }
}
