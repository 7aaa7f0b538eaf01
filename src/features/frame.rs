//! Named-column numeric table backing every batch: rows are users, columns are
//! features. Missing values are NaN.

use crate::error::{ChurnError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    values: Array2<f64>,
}

impl Frame {
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(ChurnError::Input(format!(
                "{} column names for {} columns",
                names.len(),
                values.ncols()
            )));
        }
        let mut seen = HashSet::new();
        for n in &names {
            if !seen.insert(n.as_str()) {
                return Err(ChurnError::Input(format!("duplicate column `{}`", n)));
            }
        }
        Ok(Self { names, values })
    }

    /// Build from `(name, values)` pairs; every column must have the same length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut values: Array2<f64> = Array2::zeros((n_rows, 0));
        let mut names = Vec::with_capacity(columns.len());
        for (name, col) in columns {
            let name = name.into();
            if col.len() != n_rows {
                return Err(ChurnError::Input(format!(
                    "column `{}` has {} rows, expected {}",
                    name,
                    col.len(),
                    n_rows
                )));
            }
            values
                .push_column(Array1::from(col).view())
                .map_err(|e| ChurnError::Input(e.to_string()))?;
            names.push(name);
        }
        Self::new(names, values)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self
            .position(name)
            .ok_or_else(|| ChurnError::Input(format!("missing required column `{}`", name)))?;
        Ok(self.values.column(idx))
    }

    /// Copy without the named columns; names that are absent are ignored.
    pub fn without<S: AsRef<str>>(&self, drop: &[S]) -> Frame {
        let keep: Vec<usize> = (0..self.names.len())
            .filter(|&i| !drop.iter().any(|d| d.as_ref() == self.names[i]))
            .collect();
        Frame {
            names: keep.iter().map(|&i| self.names[i].clone()).collect(),
            values: self.values.select(Axis(1), &keep),
        }
    }

    /// Append a column, or overwrite it if the name already exists.
    pub fn push_column(&mut self, name: &str, column: Array1<f64>) -> Result<()> {
        if column.len() != self.n_rows() {
            return Err(ChurnError::Input(format!(
                "column `{}` has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows()
            )));
        }
        match self.position(name) {
            Some(idx) => self.values.column_mut(idx).assign(&column),
            None => {
                self.values
                    .push_column(column.view())
                    .map_err(|e| ChurnError::Input(e.to_string()))?;
                self.names.push(name.to_string());
            }
        }
        Ok(())
    }

    /// Apply `f` elementwise to one column in place.
    pub fn map_column(&mut self, name: &str, f: impl Fn(f64) -> f64) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| ChurnError::Input(format!("missing required column `{}`", name)))?;
        self.values.column_mut(idx).mapv_inplace(f);
        Ok(())
    }

    /// Gather the named columns, in the given order, into a dense block.
    /// On failure returns the first name that is not present.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> std::result::Result<Array2<f64>, String> {
        let idx = names
            .iter()
            .map(|n| self.position(n.as_ref()).ok_or_else(|| n.as_ref().to_string()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(self.values.select(Axis(1), &idx))
    }

    /// Overwrite the named columns with the columns of `block`, in order.
    pub fn assign<S: AsRef<str>>(&mut self, names: &[S], block: &Array2<f64>) -> Result<()> {
        if block.ncols() != names.len() || block.nrows() != self.n_rows() {
            return Err(ChurnError::Transform(format!(
                "expected a {}x{} block, got {}x{}",
                self.n_rows(),
                names.len(),
                block.nrows(),
                block.ncols()
            )));
        }
        for (j, name) in names.iter().enumerate() {
            let idx = self.position(name.as_ref()).ok_or_else(|| {
                ChurnError::Transform(format!("column `{}` not present", name.as_ref()))
            })?;
            self.values.column_mut(idx).assign(&block.column(j));
        }
        Ok(())
    }
}
