//! In-memory tabular dataset consumed by the analyzers.

use std::collections::{BTreeMap, HashSet};

use crate::error::{BiasError, Result};

/// A fully materialized table of string cells with named columns.
///
/// Every row has exactly one cell per column. Column names keep the casing
/// they had in the source; lookups through [`Dataset::column_index`] are exact,
/// case-insensitive resolution lives in [`crate::analyzers::ColumnResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one row of a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Record<'a> {
    /// Returns the cell under `column` (exact name match).
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.cells[idx].as_str())
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let columns = self.columns;
        let cells = self.cells;
        columns
            .iter()
            .zip(cells.iter())
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }
}

impl Dataset {
    /// Creates a dataset from a header and rows of equal width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(BiasError::malformed(format!(
                    "Duplicate column name '{column}'"
                )));
            }
        }

        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(BiasError::malformed(format!(
                    "Row {idx} has {} cells but the header has {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }

        Ok(Self { columns, rows })
    }

    /// Creates an empty dataset that only carries a header.
    pub fn with_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns.into_iter().map(Into::into).collect(), Vec::new())
    }

    /// Builds a dataset from name → value maps that all share one key set.
    ///
    /// Columns are ordered by name since maps carry no column order.
    pub fn from_records(records: Vec<BTreeMap<String, String>>) -> Result<Self> {
        let Some(first) = records.first() else {
            return Ok(Self::default());
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (idx, mut record) in records.into_iter().enumerate() {
            if record.len() != columns.len() || !columns.iter().all(|c| record.contains_key(c)) {
                return Err(BiasError::malformed(format!(
                    "Record {idx} does not share the column set of the first record"
                )));
            }
            let row = columns
                .iter()
                .map(|c| record.remove(c).unwrap_or_default())
                .collect();
            rows.push(row);
        }

        Self::new(columns, rows)
    }

    /// Column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column` in the header (exact match).
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Iterates over the cells of one column, or `None` if it does not exist.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Iterates over the records.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|row| Record {
            columns: &self.columns,
            cells: row,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["Name".to_string(), "Sex".to_string()],
            vec![
                vec!["ana".to_string(), "F".to_string()],
                vec!["bo".to_string(), "M".to_string()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_values() {
        let data = sample();
        let values: Vec<&str> = data.column_values("Sex").unwrap().collect();
        assert_eq!(values, vec!["F", "M"]);
        assert!(data.column_values("sex").is_none());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Row 0 has 1 cells"));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Dataset::with_columns(["age", "age"]).unwrap_err();
        assert!(err.to_string().contains("Duplicate column name 'age'"));
    }

    #[test]
    fn test_from_records() {
        let mut a = BTreeMap::new();
        a.insert("gender".to_string(), "m".to_string());
        a.insert("age".to_string(), "40".to_string());
        let mut b = BTreeMap::new();
        b.insert("gender".to_string(), "f".to_string());
        b.insert("age".to_string(), "22".to_string());

        let data = Dataset::from_records(vec![a, b.clone()]).unwrap();
        assert_eq!(data.columns(), &["age".to_string(), "gender".to_string()]);
        assert_eq!(data.len(), 2);

        let record = data.records().nth(1).unwrap();
        assert_eq!(record.get("age"), Some("22"));
        assert_eq!(record.iter().count(), 2);

        b.remove("age");
        let mut c = BTreeMap::new();
        c.insert("gender".to_string(), "f".to_string());
        c.insert("age".to_string(), "1".to_string());
        assert!(Dataset::from_records(vec![c, b]).is_err());
    }

    #[test]
    fn test_empty_from_records() {
        let data = Dataset::from_records(Vec::new()).unwrap();
        assert!(data.is_empty());
        assert!(data.columns().is_empty());
    }
}
