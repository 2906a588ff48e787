use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};

/// An in-memory CSV table: ordered headers plus rows of raw cell text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str, source_name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::MissingColumnError {
                column: name.to_string(),
                source_name: source_name.to_string(),
            })
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Keeps only `columns`, in the order they appear in this table.
    pub fn select_columns(&self, columns: &[String], source_name: &str) -> Result<Table> {
        for column in columns {
            self.require_column(column, source_name)?;
        }

        let keep: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| columns.contains(h))
            .map(|(i, _)| i)
            .collect();

        Ok(Table {
            headers: keep.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    pub fn drop_columns(&mut self, columns: &[String]) {
        let drop: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| columns.contains(h))
            .map(|(i, _)| i)
            .collect();

        // 由後往前刪，索引才不會位移
        for &idx in drop.iter().rev() {
            self.headers.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
    }

    pub fn insert_column(&mut self, index: usize, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "Column '{}' has {} values but the table has {} rows",
                    name,
                    values.len(),
                    self.rows.len()
                ),
            });
        }
        if self.has_column(name) {
            return Err(EtlError::ProcessingError {
                message: format!("Column '{}' already exists", name),
            });
        }

        let index = index.min(self.headers.len());
        self.headers.insert(index, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(index, value);
        }
        Ok(())
    }

    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        self.insert_column(self.headers.len(), name, values)
    }
}

/// A named payload produced by a transform step and written by the load step.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl OutputFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_rows: usize,
    /// The first entry is the stage's primary output.
    pub outputs: Vec<OutputFile>,
}
