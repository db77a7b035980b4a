//! Immutable column-oriented tables

use std::collections::BTreeSet;

use crate::errors::{StatsError, StatsResult};

/// A single named column of a [`Table`]
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric observations (`None` = missing)
    Numeric(Vec<Option<f64>>),
    /// Category labels (`None` = missing)
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the value at `row` is missing
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Numeric(v) => v[row].is_none(),
            Column::Categorical(v) => v[row].is_none(),
        }
    }

    fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(rows.iter().map(|&r| v[r].clone()).collect())
            }
        }
    }
}

/// An ordered set of equally long named columns
///
/// Tables are never modified in place: every builder method consumes the
/// table and returns a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column
    ///
    /// Fails on a duplicate name or when the column length differs from the
    /// existing row count.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> StatsResult<Self> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(StatsError::DuplicateColumn { name });
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(StatsError::LengthMismatch {
                    op: "table",
                    left: first.len(),
                    right: column.len(),
                });
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(self)
    }

    /// Append a numeric column; NaN values are stored as missing
    pub fn with_numeric<I>(self, name: impl Into<String>, values: I) -> StatsResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let data = values
            .into_iter()
            .map(|v| if v.is_nan() { None } else { Some(v) })
            .collect();
        self.with_column(name, Column::Numeric(data))
    }

    /// Append a categorical column
    pub fn with_categorical<I, S>(self, name: impl Into<String>, values: I) -> StatsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data = values.into_iter().map(|v| Some(v.into())).collect();
        self.with_column(name, Column::Categorical(data))
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> StatsResult<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| StatsError::UnknownColumn { name: name.into() })
    }

    pub fn numeric(&self, name: &str) -> StatsResult<&[Option<f64>]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v),
            Column::Categorical(_) => Err(StatsError::ColumnType {
                name: name.into(),
                expected: "numeric",
            }),
        }
    }

    pub fn categorical(&self, name: &str) -> StatsResult<&[Option<String>]> {
        match self.column(name)? {
            Column::Categorical(v) => Ok(v),
            Column::Numeric(_) => Err(StatsError::ColumnType {
                name: name.into(),
                expected: "categorical",
            }),
        }
    }

    /// Distinct non-missing values of a categorical column, sorted
    pub fn levels(&self, name: &str) -> StatsResult<Vec<String>> {
        let set: BTreeSet<&String> = self.categorical(name)?.iter().flatten().collect();
        Ok(set.into_iter().cloned().collect())
    }

    /// New table holding the rows for which `keep` returns true
    pub fn filter_rows<F>(&self, keep: F) -> Table
    where
        F: Fn(usize) -> bool,
    {
        let rows: Vec<usize> = (0..self.n_rows()).filter(|&r| keep(r)).collect();
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(&rows)).collect(),
        }
    }

    /// Row indices where none of `columns` is missing
    pub fn complete_rows(&self, columns: &[&str]) -> StatsResult<Vec<usize>> {
        let cols = columns
            .iter()
            .map(|name| self.column(name))
            .collect::<StatsResult<Vec<_>>>()?;
        Ok((0..self.n_rows())
            .filter(|&r| cols.iter().all(|c| !c.is_missing(r)))
            .collect())
    }
}
