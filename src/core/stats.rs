//! Descriptive statistics for the numeric columns of a [`Table`].
//!
//! Semantics follow the usual dataframe conventions: sample variance
//! (ddof = 1), linearly interpolated quantiles, biased skewness and biased
//! excess kurtosis. Missing cells are dropped before anything is computed.

use crate::core::table::is_missing;
use crate::domain::model::Table;
use serde::Serialize;
use std::cmp::Ordering;

/// Relative resolution below which the second central moment counts as zero.
const MOMENT_RESOLUTION: f64 = 1e-15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// No missing cells and every cell is an `i64`.
    Integer,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Float(f64),
}

impl StatValue {
    pub fn as_f64(self) -> f64 {
        match self {
            StatValue::Int(v) => v as f64,
            StatValue::Float(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub kind: ColumnKind,
    /// Parsed non-missing values in row order.
    pub values: Vec<f64>,
    /// Populated only for integer columns.
    pub integers: Vec<i64>,
}

impl NumericColumn {
    /// Returns `None` when a non-missing cell is not a number. NaN spellings
    /// outside the missing-value tokens (`NAN`, `NaN1`...) count as text.
    pub fn parse(name: &str, cells: &[&str]) -> Option<Self> {
        let mut values = Vec::with_capacity(cells.len());
        let mut integers = Vec::with_capacity(cells.len());
        let mut all_integers = true;
        let mut any_missing = false;

        for cell in cells {
            if is_missing(cell) {
                any_missing = true;
                continue;
            }
            let cell = cell.trim();
            let value: f64 = cell.parse().ok().filter(|v: &f64| !v.is_nan())?;
            values.push(value);
            if all_integers {
                match cell.parse::<i64>() {
                    Ok(v) => integers.push(v),
                    Err(_) => all_integers = false,
                }
            }
        }

        let kind = if all_integers && !any_missing {
            ColumnKind::Integer
        } else {
            integers.clear();
            ColumnKind::Float
        };

        Some(Self {
            name: name.to_string(),
            kind,
            values,
            integers,
        })
    }
}

/// Every numeric column of `table`, in column order.
pub fn numeric_columns(table: &Table) -> Vec<NumericColumn> {
    table
        .headers
        .iter()
        .filter_map(|name| {
            let cells = table.column_values(name)?;
            NumericColumn::parse(name, &cells)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    Median,
    Mode,
    Range,
    Variance,
    StdDev,
    Iqr,
    Min,
    Max,
    Q1,
    Q2,
    Q3,
    P10,
    P90,
    Skewness,
    Kurtosis,
}

impl Statistic {
    /// Report order: central tendency, dispersion, position, shape.
    pub const ALL: [Statistic; 16] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Mode,
        Statistic::Range,
        Statistic::Variance,
        Statistic::StdDev,
        Statistic::Iqr,
        Statistic::Min,
        Statistic::Max,
        Statistic::Q1,
        Statistic::Q2,
        Statistic::Q3,
        Statistic::P10,
        Statistic::P90,
        Statistic::Skewness,
        Statistic::Kurtosis,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Mode => "mode",
            Statistic::Range => "range",
            Statistic::Variance => "variance",
            Statistic::StdDev => "std_dev",
            Statistic::Iqr => "iqr",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Q1 => "q1",
            Statistic::Q2 => "q2",
            Statistic::Q3 => "q3",
            Statistic::P10 => "p10",
            Statistic::P90 => "p90",
            Statistic::Skewness => "skewness",
            Statistic::Kurtosis => "kurtosis",
        }
    }

    /// Row label in the report: the key title-cased, underscores as spaces.
    pub fn label(self) -> &'static str {
        match self {
            Statistic::Mean => "Mean",
            Statistic::Median => "Median",
            Statistic::Mode => "Mode",
            Statistic::Range => "Range",
            Statistic::Variance => "Variance",
            Statistic::StdDev => "Std Dev",
            Statistic::Iqr => "Iqr",
            Statistic::Min => "Min",
            Statistic::Max => "Max",
            Statistic::Q1 => "Q1",
            Statistic::Q2 => "Q2",
            Statistic::Q3 => "Q3",
            Statistic::P10 => "P10",
            Statistic::P90 => "P90",
            Statistic::Skewness => "Skewness",
            Statistic::Kurtosis => "Kurtosis",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Statistic::Mean => "Average value",
            Statistic::Median => "Middle value when ordered",
            Statistic::Mode => "Most frequent value",
            Statistic::Range => "Difference between max and min",
            Statistic::Variance => "Average squared deviation from the mean",
            Statistic::StdDev => "Square root of variance (spread around mean)",
            Statistic::Iqr => "Middle 50% spread (Q3 - Q1)",
            Statistic::Min => "Smallest value",
            Statistic::Max => "Largest value",
            Statistic::Q1 => "First quartile (25th percentile)",
            Statistic::Q2 => "Second quartile (50th percentile, median)",
            Statistic::Q3 => "Third quartile (75th percentile)",
            Statistic::P10 => "10th percentile",
            Statistic::P90 => "90th percentile",
            Statistic::Skewness => "Measure of asymmetry (>0: right skew, <0: left skew)",
            Statistic::Kurtosis => "Measure of 'tailedness' (>0: heavy tails, <0: light tails)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    // Central tendency
    pub mean: f64,
    pub median: f64,
    pub mode: StatValue,
    // Dispersion
    pub range: StatValue,
    pub variance: f64,
    pub std_dev: f64,
    pub iqr: f64,
    // Position
    pub min: StatValue,
    pub max: StatValue,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub p10: f64,
    pub p90: f64,
    // Shape
    pub skewness: f64,
    pub kurtosis: f64,
}

impl ColumnStats {
    /// `None` for a column without values.
    pub fn compute(column: &NumericColumn) -> Option<Self> {
        if column.values.is_empty() {
            return None;
        }

        let mut sorted = column.values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;

        let (m2, m3, m4) = central_moments(&sorted, mean);
        let variance = if sorted.len() > 1 {
            m2 * n / (n - 1.0)
        } else {
            f64::NAN
        };

        let (skewness, kurtosis) = if m2 <= (MOMENT_RESOLUTION * mean).powi(2) {
            (f64::NAN, f64::NAN)
        } else {
            (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
        };

        let q1 = quantile(&sorted, 0.25);
        let q2 = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);

        let (min, max, range, mode) = match column.kind {
            ColumnKind::Integer => {
                let mut ints = column.integers.clone();
                ints.sort_unstable();
                let min = ints[0];
                let max = ints[ints.len() - 1];
                let range = match max.checked_sub(min) {
                    Some(r) => StatValue::Int(r),
                    None => StatValue::Float(max as f64 - min as f64),
                };
                (
                    StatValue::Int(min),
                    StatValue::Int(max),
                    range,
                    StatValue::Int(mode_of(&ints)),
                )
            }
            ColumnKind::Float => {
                let min = sorted[0];
                let max = sorted[sorted.len() - 1];
                (
                    StatValue::Float(min),
                    StatValue::Float(max),
                    StatValue::Float(max - min),
                    StatValue::Float(mode_of(&sorted)),
                )
            }
        };

        Some(Self {
            count: sorted.len(),
            mean,
            median: q2,
            mode,
            range,
            variance,
            std_dev: variance.sqrt(),
            iqr: q3 - q1,
            min,
            max,
            q1,
            q2,
            q3,
            p10: quantile(&sorted, 0.1),
            p90: quantile(&sorted, 0.9),
            skewness,
            kurtosis,
        })
    }

    pub fn get(&self, stat: Statistic) -> StatValue {
        match stat {
            Statistic::Mean => StatValue::Float(self.mean),
            Statistic::Median => StatValue::Float(self.median),
            Statistic::Mode => self.mode,
            Statistic::Range => self.range,
            Statistic::Variance => StatValue::Float(self.variance),
            Statistic::StdDev => StatValue::Float(self.std_dev),
            Statistic::Iqr => StatValue::Float(self.iqr),
            Statistic::Min => self.min,
            Statistic::Max => self.max,
            Statistic::Q1 => StatValue::Float(self.q1),
            Statistic::Q2 => StatValue::Float(self.q2),
            Statistic::Q3 => StatValue::Float(self.q3),
            Statistic::P10 => StatValue::Float(self.p10),
            Statistic::P90 => StatValue::Float(self.p90),
            Statistic::Skewness => StatValue::Float(self.skewness),
            Statistic::Kurtosis => StatValue::Float(self.kurtosis),
        }
    }
}

/// Population central moments m2, m3, m4.
fn central_moments(values: &[f64], mean: f64) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let (s2, s3, s4) = values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), &x| {
        let d = x - mean;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    });
    (s2 / n, s3 / n, s4 / n)
}

/// Linear-interpolation quantile of already sorted, non-empty data.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = h - lo as f64;
    if frac == 0.0 {
        sorted[lo]
    } else {
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

/// Most frequent value of sorted data; ties go to the smallest value.
fn mode_of<T: PartialEq + Copy>(sorted: &[T]) -> T {
    let mut best = sorted[0];
    let mut best_count = 0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_count {
            best = sorted[i];
            best_count = j - i;
        }
        i = j;
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedStats {
    pub column: String,
    pub kind: ColumnKind,
    pub stats: ColumnStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatsSummary {
    pub columns: Vec<NamedStats>,
}

impl StatsSummary {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.stats)
    }
}

/// Statistics for every numeric column with at least one value.
pub fn calculate_statistics(table: &Table) -> StatsSummary {
    let columns = numeric_columns(table)
        .into_iter()
        .filter_map(|column| {
            let stats = ColumnStats::compute(&column);
            if stats.is_none() {
                tracing::debug!("Skipping column '{}': no values", column.name);
            }
            stats.map(|stats| NamedStats {
                column: column.name,
                kind: column.kind,
                stats,
            })
        })
        .collect();

    StatsSummary { columns }
}
