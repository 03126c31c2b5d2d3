//! The shared column store
//!
//! Every member panel of a dashboard projects the same grid. Filtering never
//! removes or reorders rows; it only narrows the retained view, so a row's
//! original position doubles as its identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scalar cell of the shared grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric cell
    Number(f64),
    /// A text cell
    Text(String),
}

impl CellValue {
    /// Convert a JSON scalar into a cell value. Non-scalar nodes (arrays,
    /// objects, booleans, null) have no cell representation.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(CellValue::Number),
            serde_json::Value::String(s) => Some(CellValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Render the cell back into a JSON scalar
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Number(n) => serde_json::Value::from(*n),
            CellValue::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Number(_) => None,
            CellValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One row of the shared dataset
///
/// `index` is the row's original position and stays stable for the lifetime
/// of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub index: usize,
    cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// Column store backing one dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    columns: BTreeMap<String, Vec<CellValue>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a column. The first binding of a column wins; later bindings of
    /// the same column reuse the already captured data.
    pub fn insert_column(&mut self, name: &str, data: Vec<CellValue>) {
        self.columns.entry(name.to_string()).or_insert(data);
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of records in the grid (the length of its first column)
    pub fn record_count(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    /// Materialize row objects, ascending by original index
    pub fn records(&self) -> Vec<Record> {
        (0..self.record_count())
            .map(|index| {
                let mut record = Record::new(index);
                for (name, data) in &self.columns {
                    if let Some(value) = data.get(index) {
                        record.insert(name.clone(), value.clone());
                    }
                }
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_from_json() {
        assert_eq!(CellValue::from_json(&json!(2.5)), Some(CellValue::Number(2.5)));
        assert_eq!(
            CellValue::from_json(&json!("x")),
            Some(CellValue::Text("x".to_string()))
        );
        assert_eq!(CellValue::from_json(&json!([1, 2])), None);
        assert_eq!(CellValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_first_column_binding_wins() {
        let mut grid = Grid::new();
        grid.insert_column("a", vec![1.into(), 2.into()]);
        grid.insert_column("a", vec![9.into()]);
        assert_eq!(grid.column("a").map(<[CellValue]>::len), Some(2));
    }

    #[test]
    fn test_records_carry_index_and_cells() {
        let mut grid = Grid::new();
        grid.insert_column("a", vec![1.into(), 2.into(), 3.into()]);
        grid.insert_column("b", vec!["x".into(), "y".into(), "x".into()]);

        let records = grid.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].get("a"), Some(&CellValue::Number(2.0)));
        assert_eq!(records[2].get("b"), Some(&CellValue::Text("x".to_string())));
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::new();
        assert!(grid.is_empty());
        assert_eq!(grid.record_count(), 0);
        assert!(grid.records().is_empty());
    }
}
