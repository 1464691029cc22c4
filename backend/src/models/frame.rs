//! Minimal column-oriented table used by feature engineering and preprocessing.
//!
//! Training runs the pipeline over a many-row [`Frame`]; serving builds a
//! one-row frame from a [`Record`]. Both go through the same code, which is
//! what keeps the two paths numerically identical.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single input value: numbers for measurements, text for categories
/// (`province`, `daynight` labels, raw dates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// One flat input record: column name to value. Field order carries no meaning.
pub type Record = HashMap<String, FieldValue>;

/// Column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named columns of equal length, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    order: Vec<String>,
    columns: HashMap<String, Column>,
    rows: usize,
}

impl Frame {
    /// Create an empty frame with a fixed row count.
    pub fn with_rows(rows: usize) -> Self {
        Self {
            order: Vec::new(),
            columns: HashMap::new(),
            rows,
        }
    }

    /// Build a one-row frame from a record. Columns are inserted in sorted
    /// name order so the result does not depend on map iteration order.
    pub fn from_record(record: &Record) -> Self {
        let mut names: Vec<&String> = record.keys().collect();
        names.sort();

        let mut frame = Frame::with_rows(1);
        for name in names {
            match &record[name] {
                FieldValue::Number(v) => frame.set_numeric(name, vec![*v]),
                FieldValue::Text(s) => frame.set_text(name, vec![s.clone()]),
            }
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn has(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Numeric view of a column; `None` when absent or textual.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name) {
            Some(Column::Numeric(v)) => Some(v),
            _ => None,
        }
    }

    pub fn numeric_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        match self.columns.get_mut(name) {
            Some(Column::Numeric(v)) => Some(v),
            _ => None,
        }
    }

    /// Text view of a column; `None` when absent or numeric.
    pub fn text(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name) {
            Some(Column::Text(v)) => Some(v),
            _ => None,
        }
    }

    /// Insert or replace a numeric column. A replaced column keeps its position.
    ///
    /// # Panics
    /// Panics when `values` does not match the frame's row count.
    pub fn set_numeric(&mut self, name: &str, values: Vec<f64>) {
        self.set_column(name, Column::Numeric(values));
    }

    /// Insert or replace a text column. A replaced column keeps its position.
    pub fn set_text(&mut self, name: &str, values: Vec<String>) {
        self.set_column(name, Column::Text(values));
    }

    /// Insert a numeric column filled with `value` unless it already exists.
    pub fn fill_missing(&mut self, name: &str, value: f64) {
        if !self.has(name) {
            self.set_numeric(name, vec![value; self.rows]);
        }
    }

    fn set_column(&mut self, name: &str, column: Column) {
        assert_eq!(
            column.len(),
            self.rows,
            "column `{}` has {} rows, frame has {}",
            name,
            column.len(),
            self.rows
        );
        if self.columns.insert(name.to_string(), column).is_none() {
            self.order.push(name.to_string());
        }
    }

    pub fn rename(&mut self, from: &str, to: &str) {
        if from == to || self.has(to) {
            return;
        }
        if let Some(col) = self.columns.remove(from) {
            self.columns.insert(to.to_string(), col);
            if let Some(slot) = self.order.iter_mut().find(|n| n.as_str() == from) {
                *slot = to.to_string();
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let col = self.columns.remove(name)?;
        self.order.retain(|n| n != name);
        Some(col)
    }

    /// Keep only `names` that exist, in the order given.
    pub fn select(&self, names: &[&str]) -> Frame {
        let mut out = Frame::with_rows(self.rows);
        for name in names {
            if let Some(col) = self.columns.get(*name) {
                out.set_column(name, col.clone());
            }
        }
        out
    }

    /// Copy of the given rows, in the order given.
    pub fn take_rows(&self, indices: &[usize]) -> Frame {
        let mut out = Frame::with_rows(indices.len());
        for name in &self.order {
            let column = match &self.columns[name] {
                Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
                Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
            };
            out.set_column(name, column);
        }
        out
    }

    /// Replace every non-finite numeric value with `value`.
    pub fn fill_non_finite(&mut self, value: f64) {
        for col in self.columns.values_mut() {
            if let Column::Numeric(v) = col {
                for x in v.iter_mut().filter(|x| !x.is_finite()) {
                    *x = value;
                }
            }
        }
    }
}
