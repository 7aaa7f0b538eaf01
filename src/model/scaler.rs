//! Fitted scalers for the magnitude columns.

use super::{check_finite, check_names, Artifact, Capability, Transform};
use crate::error::{ChurnError, Result};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// `(x - mean) / scale`; a zero scale leaves the centred value unscaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

/// `x * scale + min`, the fitted form of a min-max range mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

/// Either scaler; the pipeline only cares that it transforms.
#[derive(Debug, Clone)]
pub enum Scaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

fn check_width(x: &ArrayView2<f64>, expected: usize, what: &str) -> Result<()> {
    if x.ncols() != expected {
        return Err(ChurnError::Transform(format!(
            "X has {} features, but {} is expecting {} features as input",
            x.ncols(),
            what,
            expected
        )));
    }
    Ok(())
}

impl Transform for StandardScaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn n_features_out(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width(&x, self.mean.len(), "StandardScaler")?;
        let mean = Array1::from(self.mean.clone());
        let scale: Array1<f64> = self
            .scale
            .iter()
            .map(|&s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok((&x - &mean) / &scale)
    }
}

impl Transform for MinMaxScaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.min.len()
    }

    fn n_features_out(&self) -> usize {
        self.min.len()
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width(&x, self.min.len(), "MinMaxScaler")?;
        let min = Array1::from(self.min.clone());
        let scale = Array1::from(self.scale.clone());
        Ok(&x * &scale + &min)
    }
}

impl Transform for Scaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        match self {
            Scaler::Standard(s) => s.feature_names_in(),
            Scaler::MinMax(s) => s.feature_names_in(),
        }
    }

    fn n_features_in(&self) -> usize {
        match self {
            Scaler::Standard(s) => s.n_features_in(),
            Scaler::MinMax(s) => s.n_features_in(),
        }
    }

    fn n_features_out(&self) -> usize {
        self.n_features_in()
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Scaler::Standard(s) => s.transform(x),
            Scaler::MinMax(s) => s.transform(x),
        }
    }
}

impl Capability for Scaler {
    const NAME: &'static str = "scaler";

    fn from_artifact(artifact: Artifact) -> std::result::Result<Self, Artifact> {
        match artifact {
            Artifact::StandardScaler(s) => Ok(Scaler::Standard(s)),
            Artifact::MinMaxScaler(s) => Ok(Scaler::MinMax(s)),
            other => Err(other),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let (offset, scale, names) = match self {
            Scaler::Standard(s) => (&s.mean, &s.scale, s.feature_names_in.as_deref()),
            Scaler::MinMax(s) => (&s.min, &s.scale, s.feature_names_in.as_deref()),
        };
        if offset.is_empty() {
            return Err("scaler has no fitted columns".to_string());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "{} offsets but {} scales",
                offset.len(),
                scale.len()
            ));
        }
        check_finite("offset", offset)?;
        check_finite("scale", scale)?;
        check_names(names, offset.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scaler_centres_and_scales() {
        let s = StandardScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.0],
            feature_names_in: None,
        };
        let x = Array2::from_shape_vec((2, 2), vec![12.0, 3.0, 8.0, -1.0]).unwrap();
        let out = s.transform(x.view()).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![1.0, 3.0]);
        assert_eq!(out.row(1).to_vec(), vec![-1.0, -1.0]);
    }

    #[test]
    fn min_max_scaler_maps_range() {
        let s = MinMaxScaler {
            min: vec![-0.5],
            scale: vec![0.25],
            feature_names_in: None,
        };
        let x = Array2::from_shape_vec((2, 1), vec![2.0, 6.0]).unwrap();
        assert_eq!(s.transform(x.view()).unwrap().column(0).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn width_mismatch_is_transform_error() {
        let s = Scaler::Standard(StandardScaler {
            mean: vec![0.0; 4],
            scale: vec![1.0; 4],
            feature_names_in: None,
        });
        let x = Array2::<f64>::zeros((1, 3));
        assert!(matches!(s.transform(x.view()), Err(ChurnError::Transform(_))));
    }

    #[test]
    fn validate_catches_ragged_parameters() {
        let s = Scaler::MinMax(MinMaxScaler {
            min: vec![0.0, 1.0],
            scale: vec![1.0],
            feature_names_in: None,
        });
        assert!(s.validate().is_err());
    }
}
