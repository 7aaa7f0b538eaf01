//! CSV upload → numeric [`Frame`], with identifier columns dropped and the
//! optional ground-truth label split off before any parsing.

use super::Frame;
use crate::config::FeaturesConfig;
use crate::error::{ChurnError, Result};
use ndarray::Array2;
use std::io::Read;

/// One uploaded batch before feature engineering.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub frame: Frame,
    /// Ground truth, when the upload carried a label column
    pub labels: Option<Vec<String>>,
}

pub fn read_batch<R: Read>(reader: R, config: &FeaturesConfig) -> Result<RawBatch> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(ChurnError::Input("input batch is empty".to_string()));
    }

    let label_idx = headers.iter().position(|h| h == config.label_column);
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| {
            Some(*i) != label_idx && !config.identifier_columns.iter().any(|c| c == *h)
        })
        .map(|(i, _)| i)
        .collect();
    let names: Vec<String> = keep.iter().map(|&i| headers[i].to_string()).collect();

    let mut cells = Vec::new();
    let mut labels = label_idx.map(|_| Vec::new());
    let mut n_rows = 0usize;
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for &i in &keep {
            let raw = record.get(i).unwrap_or("");
            cells.push(parse_cell(raw).ok_or_else(|| {
                ChurnError::Input(format!(
                    "row {}: column `{}` is not numeric: {:?}",
                    row + 1,
                    &headers[i],
                    raw
                ))
            })?);
        }
        if let (Some(idx), Some(out)) = (label_idx, labels.as_mut()) {
            out.push(record.get(idx).unwrap_or("").to_string());
        }
        n_rows += 1;
    }
    if n_rows == 0 {
        return Err(ChurnError::Input("input batch is empty".to_string()));
    }

    let values = Array2::from_shape_vec((n_rows, keep.len()), cells)
        .map_err(|e| ChurnError::Input(e.to_string()))?;
    tracing::debug!(rows = n_rows, columns = names.len(), "read input batch");
    Ok(RawBatch {
        frame: Frame::new(names, values)?,
        labels,
    })
}

/// Empty cells are missing values.
fn parse_cell(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}
