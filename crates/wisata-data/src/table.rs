//! In-memory tabular data with the case-insensitive filters the router needs.

use serde::{Deserialize, Serialize};

/// An ordered set of rows under named columns. Every cell is a string.
///
/// Filters never reorder: the rows they keep come back in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value of `column` in `row`, if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Distinct non-empty values of a column in first-seen order.
    ///
    /// Returns an empty list when the column does not exist.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.get(idx) {
                if !value.is_empty() && !seen.iter().any(|s| s == value) {
                    seen.push(value.clone());
                }
            }
        }
        seen
    }

    /// Rows whose `column` cell contains `needle`, ignoring case.
    pub fn filter_contains(&self, column: &str, needle: &str) -> Table {
        let needle = needle.to_lowercase();
        self.filter_by(column, |cell| cell.to_lowercase().contains(&needle))
    }

    /// Rows whose `column` cell equals `value`, ignoring case.
    pub fn filter_equals(&self, column: &str, value: &str) -> Table {
        let value = value.to_lowercase();
        self.filter_by(column, |cell| cell.to_lowercase() == value)
    }

    fn filter_by<F>(&self, column: &str, keep: F) -> Table
    where
        F: Fn(&str) -> bool,
    {
        let rows = match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|row| row.get(idx).is_some_and(|cell| keep(cell)))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Table::new(self.columns.clone(), rows)
    }

    /// Rows as `(column, value)` pairs, in column order.
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &str)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .zip(row.iter())
                .map(|(c, v)| (c.as_str(), v.as_str()))
                .collect()
        })
    }

    /// Fixed-width rendering: a header line and one line per row, every
    /// column right-aligned to its widest cell, no index column.
    pub fn to_text(&self) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render = |cells: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:>width$}")
                })
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(render(&self.columns));
        for row in &self.rows {
            lines.push(render(row));
        }
        lines.join("\n")
    }
}
