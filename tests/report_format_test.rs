use chrono::NaiveDate;
use trip_stats::core::report::render_markdown;
use trip_stats::core::stats::{calculate_statistics, StatValue};
use trip_stats::core::table::read_csv;

/// 完整比對單一欄位的報表輸出
#[test]
fn test_single_column_report_exact() {
    let table = read_csv(b"trip_id,passenger_count\nAAAAAA,1\nBBBBBB,2\nCCCCCC,4\n").unwrap();
    let summary = calculate_statistics(&table);
    let generated_at = NaiveDate::from_ymd_opt(2015, 8, 15)
        .unwrap()
        .and_hms_opt(18, 41, 46)
        .unwrap();

    let expected = "\
# Descriptive Statistics Report

*Generated on: 2015-08-15 18:41:46*

## Summary

This report contains descriptive statistics for the numerical columns in the dataset.

Number of numerical columns analyzed: 1

## Descriptive Statistics

| Statistic | passenger_count | Description |
|-----------|-----------|-------------|
| Mean | 2.3333 | Average value |
| Median | 2.0000 | Middle value when ordered |
| Mode | 1 | Most frequent value |
| Range | 3 | Difference between max and min |
| Variance | 2.3333 | Average squared deviation from the mean |
| Std Dev | 1.5275 | Square root of variance (spread around mean) |
| Iqr | 1.5000 | Middle 50% spread (Q3 - Q1) |
| Min | 1 | Smallest value |
| Max | 4 | Largest value |
| Q1 | 1.5000 | First quartile (25th percentile) |
| Q2 | 2.0000 | Second quartile (50th percentile, median) |
| Q3 | 3.0000 | Third quartile (75th percentile) |
| P10 | 1.2000 | 10th percentile |
| P90 | 3.6000 | 90th percentile |
| Skewness | 0.3818 | Measure of asymmetry (>0: right skew, <0: left skew) |
| Kurtosis | -1.5000 | Measure of 'tailedness' (>0: heavy tails, <0: light tails) |

## Interpretations

### passenger_count

The distribution is moderate positive skew with very light tails (fewer outliers than normal).

";

    assert_eq!(render_markdown(&summary, generated_at), expected);
}

#[test]
fn test_float_column_with_gaps_and_large_values() {
    let table = read_csv(b"fare_amount\n2500.0\n\n7500.0\nNA\n").unwrap();
    let summary = calculate_statistics(&table);
    let stats = summary.get("fare_amount").unwrap();

    assert_eq!(stats.count, 2);
    assert_eq!(stats.min, StatValue::Float(2500.0));
    assert_eq!(stats.range, StatValue::Float(5000.0));

    let generated_at = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let report = render_markdown(&summary, generated_at);
    assert!(report.contains("| Mean | 5.0000e+03 | Average value |"));
    assert!(report.contains("| Mode | 2.5000e+03 | Most frequent value |"));
    assert!(report.contains("| Skewness | 0.0000e+00 |"));
    assert!(report.contains("| Kurtosis | -2.0000 |"));
}

#[test]
fn test_elapsed_seconds_render_as_float_column() {
    let table =
        read_csv(b"trip_id,elapsed_time\nAAAAAA,795.0\nBBBBBB,330.0\nCCCCCC,1588.0\n").unwrap();
    let summary = calculate_statistics(&table);
    let generated_at = NaiveDate::from_ymd_opt(2015, 8, 16)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let report = render_markdown(&summary, generated_at);

    assert!(report.contains("| Mode | 330.0000 | Most frequent value |"));
    assert!(report.contains("| Range | 1.2580e+03 | Difference between max and min |"));
    assert!(report.contains("| Min | 330.0000 | Smallest value |"));
    assert!(report.contains("| Max | 1.5880e+03 | Largest value |"));
}
