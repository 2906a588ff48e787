use crate::core::stats::{StatValue, Statistic, StatsSummary};
use chrono::NaiveDateTime;
use std::fmt::Write as _;

pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a value the way it appears in the report table.
///
/// Integers print as-is. Floats use four decimals, switching to scientific
/// notation (`1.2345e+03`) when the magnitude is below 0.01 or above 1000.
pub fn format_value(value: StatValue) -> String {
    match value {
        StatValue::Int(v) => v.to_string(),
        StatValue::Float(v) if v.is_nan() => "nan".to_string(),
        StatValue::Float(v) if v.abs() < 0.01 || v.abs() > 1000.0 => format_scientific(v),
        StatValue::Float(v) => format!("{:.4}", v),
    }
}

/// Four-decimal scientific notation with a signed, two-digit exponent.
fn format_scientific(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{:.4e}", v);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => raw,
    }
}

pub fn interpret_skewness(skewness: f64) -> &'static str {
    if skewness > 0.5 {
        "strong positive skew (right-tailed)"
    } else if skewness > 0.1 {
        "moderate positive skew"
    } else if skewness < -0.5 {
        "strong negative skew (left-tailed)"
    } else if skewness < -0.1 {
        "moderate negative skew"
    } else {
        "approximately symmetric"
    }
}

pub fn interpret_kurtosis(kurtosis: f64) -> &'static str {
    if kurtosis > 1.0 {
        "very heavy tails (more outliers than normal)"
    } else if kurtosis > 0.5 {
        "heavy tails"
    } else if kurtosis < -1.0 {
        "very light tails (fewer outliers than normal)"
    } else if kurtosis < -0.5 {
        "light tails"
    } else {
        "near normal tails"
    }
}

/// Builds the Markdown statistics report: one consolidated table with the
/// dataset columns as headers, followed by per-column interpretations.
pub fn render_markdown(summary: &StatsSummary, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();

    out.push_str("# Descriptive Statistics Report\n\n");
    let _ = write!(
        out,
        "*Generated on: {}*\n\n",
        generated_at.format(GENERATED_AT_FORMAT)
    );

    out.push_str("## Summary\n\n");
    out.push_str(
        "This report contains descriptive statistics for the numerical columns in the dataset.\n\n",
    );
    let _ = write!(
        out,
        "Number of numerical columns analyzed: {}\n\n",
        summary.len()
    );

    out.push_str("## Descriptive Statistics\n\n");

    let names: Vec<&str> = summary.columns.iter().map(|c| c.column.as_str()).collect();
    let _ = writeln!(out, "| Statistic | {} | Description |", names.join(" | "));
    let _ = writeln!(
        out,
        "|-----------|{}|-------------|",
        vec!["-----------"; names.len()].join("|")
    );

    for stat in Statistic::ALL {
        let _ = write!(out, "| {} | ", stat.label());
        for column in &summary.columns {
            let _ = write!(out, "{} | ", format_value(column.stats.get(stat)));
        }
        let _ = writeln!(out, "{} |", stat.description());
    }
    out.push('\n');

    out.push_str("## Interpretations\n\n");
    for column in &summary.columns {
        let _ = write!(out, "### {}\n\n", column.column);
        let _ = write!(
            out,
            "The distribution is {} with {}.\n\n",
            interpret_skewness(column.stats.skewness),
            interpret_kurtosis(column.stats.kurtosis)
        );
    }

    out
}
