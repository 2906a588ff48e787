use crate::core::table::is_missing;
use crate::core::trip_id::is_valid_trip_id;
use crate::core::trip_time::to_clock_time;
use crate::domain::model::Table;
use crate::utils::error::Result;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub numeric_columns: Vec<String>,
    pub tolerance: f64,
    pub trip_id_column: String,
    pub trip_id_length: usize,
    pub pickup_column: String,
    pub datetime_format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationFailure {
    DuplicateIds,
    InvalidIdFormat,
    RowCountMismatch { raw: usize, processed: usize },
    ValueMismatch { column: String, mismatches: usize },
    UnparseableDatetime { row: usize, value: String },
    DatetimeMismatch { mismatches: usize },
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::DuplicateIds => write!(f, "Found duplicate IDs"),
            VerificationFailure::InvalidIdFormat => write!(f, "Found IDs with invalid format"),
            VerificationFailure::RowCountMismatch { .. } => write!(f, "Row count mismatch"),
            VerificationFailure::ValueMismatch { column, .. } => {
                write!(f, "Found mismatches in '{}' column", column)
            }
            VerificationFailure::UnparseableDatetime { .. } => write!(f, "Could not parse datetime"),
            VerificationFailure::DatetimeMismatch { .. } => {
                write!(f, "Incorrect datetime conversions")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    Verified,
    Failed(VerificationFailure),
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    /// Single-line verdict, `YES - ...` or `NO - ...`.
    pub fn verdict(&self) -> String {
        match self {
            VerificationOutcome::Verified => "YES - All data verified correctly".to_string(),
            VerificationOutcome::Failed(failure) => format!("NO - {}", failure),
        }
    }
}

/// Checks that `processed` still holds the raw data: trip IDs (when
/// present) are unique and well formed, no rows were lost, numeric values
/// are unchanged and pickup times (when present) were converted correctly.
///
/// The first failing check decides the outcome. Missing columns are errors,
/// not failures.
pub fn verify_tables(
    raw: &Table,
    processed: &Table,
    options: &VerifyOptions,
) -> Result<VerificationOutcome> {
    if let Some(ids) = processed.column_values(&options.trip_id_column) {
        let unique: HashSet<&str> = ids.iter().copied().collect();
        if unique.len() != ids.len() {
            return Ok(VerificationOutcome::Failed(VerificationFailure::DuplicateIds));
        }
        if !ids
            .iter()
            .all(|id| is_valid_trip_id(id, options.trip_id_length))
        {
            return Ok(VerificationOutcome::Failed(
                VerificationFailure::InvalidIdFormat,
            ));
        }
    }

    if raw.len() != processed.len() {
        return Ok(VerificationOutcome::Failed(
            VerificationFailure::RowCountMismatch {
                raw: raw.len(),
                processed: processed.len(),
            },
        ));
    }

    for column in &options.numeric_columns {
        let raw_idx = raw.require_column(column, "raw data")?;
        let proc_idx = processed.require_column(column, "processed data")?;

        let mismatches = raw
            .rows
            .iter()
            .zip(&processed.rows)
            .filter(|(a, b)| !same_number(&a[raw_idx], &b[proc_idx], options.tolerance))
            .count();

        if mismatches != 0 {
            tracing::debug!("{} mismatching values in '{}'", mismatches, column);
            return Ok(VerificationOutcome::Failed(
                VerificationFailure::ValueMismatch {
                    column: column.clone(),
                    mismatches,
                },
            ));
        }
    }

    if let Some(proc_idx) = processed.column_index(&options.pickup_column) {
        let raw_idx = raw.require_column(&options.pickup_column, "raw data")?;

        let mut mismatches = 0;
        for (row, (a, b)) in raw.rows.iter().zip(&processed.rows).enumerate() {
            let expected = match to_clock_time(&a[raw_idx], &options.datetime_format) {
                Ok(time) => time,
                Err(_) if is_missing(&a[raw_idx]) => String::new(),
                Err(_) => {
                    return Ok(VerificationOutcome::Failed(
                        VerificationFailure::UnparseableDatetime {
                            row: row + 1,
                            value: a[raw_idx].clone(),
                        },
                    ))
                }
            };
            if expected != b[proc_idx].trim() {
                mismatches += 1;
            }
        }

        if mismatches != 0 {
            return Ok(VerificationOutcome::Failed(
                VerificationFailure::DatetimeMismatch { mismatches },
            ));
        }
    }

    Ok(VerificationOutcome::Verified)
}

fn same_number(a: &str, b: &str, tolerance: f64) -> bool {
    match (is_missing(a), is_missing(b)) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        _ => {}
    }
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => (x - y).abs() <= tolerance,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::trip_time::SOURCE_DATETIME_FORMAT;
    use crate::utils::error::EtlError;

    fn options() -> VerifyOptions {
        VerifyOptions {
            numeric_columns: vec!["fare_amount".to_string()],
            tolerance: 1e-10,
            trip_id_column: "trip_id".to_string(),
            trip_id_length: 6,
            pickup_column: "pickup_datetime".to_string(),
            datetime_format: SOURCE_DATETIME_FORMAT.to_string(),
        }
    }

    fn raw() -> Table {
        Table {
            headers: vec!["fare_amount".into(), "pickup_datetime".into()],
            rows: vec![
                vec!["9.5".into(), "08/15/2015 06:41:46 PM".into()],
                vec!["12".into(), "08/15/2015 11:02:00 AM".into()],
            ],
        }
    }

    fn processed() -> Table {
        Table {
            headers: vec![
                "trip_id".into(),
                "fare_amount".into(),
                "pickup_datetime".into(),
            ],
            rows: vec![
                vec!["ABCDEF".into(), "9.50".into(), "18:41:46".into()],
                vec!["QWERTY".into(), "12.0".into(), "11:02:00".into()],
            ],
        }
    }

    #[test]
    fn test_verified() {
        let outcome = verify_tables(&raw(), &processed(), &options()).unwrap();
        assert!(outcome.is_verified());
        assert_eq!(outcome.verdict(), "YES - All data verified correctly");
    }

    #[test]
    fn test_duplicate_ids() {
        let mut p = processed();
        p.rows[1][0] = "ABCDEF".into();
        let outcome = verify_tables(&raw(), &p, &options()).unwrap();
        assert_eq!(outcome.verdict(), "NO - Found duplicate IDs");
    }

    #[test]
    fn test_invalid_id_format() {
        let mut p = processed();
        p.rows[1][0] = "abcdef".into();
        let outcome = verify_tables(&raw(), &p, &options()).unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Failed(VerificationFailure::InvalidIdFormat)
        );
    }

    #[test]
    fn test_row_count_mismatch() {
        let mut p = processed();
        p.rows.pop();
        let outcome = verify_tables(&raw(), &p, &options()).unwrap();
        assert_eq!(outcome.verdict(), "NO - Row count mismatch");
    }

    #[test]
    fn test_value_mismatch() {
        let mut p = processed();
        p.rows[0][1] = "9.51".into();
        let outcome = verify_tables(&raw(), &p, &options()).unwrap();
        assert_eq!(outcome.verdict(), "NO - Found mismatches in 'fare_amount' column");
    }

    #[test]
    fn test_datetime_checks() {
        let mut p = processed();
        p.rows[0][2] = "06:41:46".into();
        let outcome = verify_tables(&raw(), &p, &options()).unwrap();
        assert_eq!(outcome.verdict(), "NO - Incorrect datetime conversions");

        let mut r = raw();
        r.rows[1][1] = "yesterday".into();
        let outcome = verify_tables(&r, &processed(), &options()).unwrap();
        assert_eq!(outcome.verdict(), "NO - Could not parse datetime");
    }

    #[test]
    fn test_optional_checks_skipped_when_columns_absent() {
        let mut p = processed();
        p.drop_columns(&["trip_id".to_string(), "pickup_datetime".to_string()]);
        let outcome = verify_tables(&raw(), &p, &options()).unwrap();
        assert!(outcome.is_verified());
    }

    #[test]
    fn test_missing_numeric_column_is_error() {
        let mut p = processed();
        p.drop_columns(&["fare_amount".to_string()]);
        let err = verify_tables(&raw(), &p, &options()).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumnError { .. }));
    }

    #[test]
    fn test_same_number() {
        assert!(same_number("1", "1.0", 1e-10));
        assert!(same_number("", "NaN", 1e-10));
        assert!(!same_number("", "0", 1e-10));
        assert!(!same_number("abc", "abc", 1e-10));
    }
}
