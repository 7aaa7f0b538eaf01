//! Batch statistics used by segmentation and median-fill.

use ndarray::Array1;

/// Median of the defined (non-NaN) values; NaN when there are none.
pub fn median<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut v: Vec<f64> = values.into_iter().filter(|x| !x.is_nan()).collect();
    if v.is_empty() {
        return f64::NAN;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    }
}

/// Replace NaN cells with the median of the remaining cells. Returns the fill value.
pub fn fill_with_median(column: &mut Array1<f64>) -> f64 {
    let m = median(column.iter().copied());
    column.mapv_inplace(|x| if x.is_nan() { m } else { x });
    m
}
