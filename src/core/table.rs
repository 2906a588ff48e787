use crate::core::stats::{ColumnKind, NumericColumn};
use crate::domain::model::Table;
use crate::utils::error::Result;

/// Parses CSV bytes; the first record is the header.
pub fn read_csv(data: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Cell texts treated as missing values.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell.trim())
}

/// Rewrites cells the way a typed column writes back out: missing cells
/// become empty, integer columns drop padding (`007` -> `7`) and float
/// columns use the shortest round-trip form (`0.90` -> `0.9`, `21` -> `21.0`).
pub fn normalize_cells(table: &mut Table) {
    let kinds: Vec<Option<ColumnKind>> = table
        .headers
        .iter()
        .map(|name| {
            table
                .column_values(name)
                .and_then(|cells| NumericColumn::parse(name, &cells))
                .map(|column| column.kind)
        })
        .collect();

    for row in table.rows.iter_mut() {
        for (cell, kind) in row.iter_mut().zip(&kinds) {
            if is_missing(cell) {
                cell.clear();
                continue;
            }
            let normalized = match kind {
                Some(ColumnKind::Integer) => cell.trim().parse::<i64>().ok().map(|v| v.to_string()),
                Some(ColumnKind::Float) => cell.trim().parse::<f64>().ok().map(float_repr),
                None => None,
            };
            if let Some(normalized) = normalized {
                *cell = normalized;
            }
        }
    }
}

/// Shortest round-trip float text with a signed two-digit exponent (`1e+16`).
fn float_repr(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
