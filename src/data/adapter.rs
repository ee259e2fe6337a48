//! Read-only table model used by the table view

use crate::data::{Column, EventTable};
use std::cmp::Ordering;
use std::fmt;

/// A single table cell
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Compare two cells of the same kind; mismatched kinds compare equal
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Null => Ok(()),
        }
    }
}

/// The read interface a table view needs
pub trait TableModel {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Cell at a display position, `None` outside the table
    fn cell(&self, row: usize, column: usize) -> Option<&CellValue>;

    /// Horizontal header label
    fn header(&self, column: usize) -> Option<&str>;

    /// Vertical header label
    fn row_label(&self, row: usize) -> String {
        row.to_string()
    }
}

/// Snapshot of tabular data in display order.
///
/// A fresh adapter is built whenever the underlying table is loaded or
/// re-sorted; it never changes afterwards.
#[derive(Clone, Debug, Default)]
pub struct TableAdapter {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl TableAdapter {
    /// Snapshot an event table in its current display order
    pub fn new(table: &EventTable) -> Self {
        profiling::scope!("TableAdapter::new");

        let headers = Column::ALL.iter().map(|c| c.header().to_string()).collect();
        let rows = table
            .row_index()
            .iter()
            .map(|&record_index| {
                Column::ALL
                    .iter()
                    .map(|&column| table.value(record_index, column).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Wrap arbitrary rows under the given headers
    #[cfg(test)]
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }
}

impl TableModel for TableAdapter {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.headers.len()
    }

    fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }

    fn header(&self, column: usize) -> Option<&str> {
        self.headers.get(column).map(String::as_str)
    }
}
