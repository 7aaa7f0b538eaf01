//! Artifacts that passed capability and consistency checks.

use crate::error::{ChurnError, Result};
use crate::model::{Artifact, Capability};
use std::ops::Deref;

/// Only produced by [`Verified::decode`], so holding one means the wrapped
/// object is the right kind and internally consistent.
#[derive(Debug, Clone)]
pub struct Verified<T> {
    inner: T,
    source: String,
}

impl<T: Capability> Verified<T> {
    /// Decode JSON bytes fetched from `source` and check the capability.
    pub fn decode(bytes: &[u8], source: &str) -> Result<Self> {
        let artifact: Artifact =
            serde_json::from_slice(bytes).map_err(|e| ChurnError::ArtifactDecode {
                source_id: source.to_string(),
                reason: e.to_string(),
            })?;
        Self::verify(artifact, source)
    }

    pub fn verify(artifact: Artifact, source: &str) -> Result<Self> {
        let inner = T::from_artifact(artifact).map_err(|other| ChurnError::ArtifactTypeMismatch {
            source_id: source.to_string(),
            expected: T::NAME,
            found: other.kind().to_string(),
        })?;
        inner.validate().map_err(|reason| ChurnError::ArtifactDecode {
            source_id: source.to_string(),
            reason,
        })?;
        Ok(Self {
            inner,
            source: source.to_string(),
        })
    }
}

impl<T> Verified<T> {
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl<T> Deref for Verified<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticRegression, Scaler, SelectFromModel};

    const CLASSIFIER: &str = r#"{"kind": "logistic_regression", "coef": [1.0], "intercept": 0.0}"#;

    #[test]
    fn matching_kind_verifies() {
        let v = Verified::<LogisticRegression>::decode(CLASSIFIER.as_bytes(), "mem://clf").unwrap();
        assert_eq!(v.source(), "mem://clf");
        assert_eq!(v.coef, vec![1.0]);
    }

    #[test]
    fn wrong_kind_is_type_mismatch() {
        let err = Verified::<SelectFromModel>::decode(CLASSIFIER.as_bytes(), "mem://sel").unwrap_err();
        match err {
            ChurnError::ArtifactTypeMismatch { expected, found, .. } => {
                assert_eq!(expected, "feature selector");
                assert_eq!(found, "logistic_regression");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = Verified::<Scaler>::decode(b"\x80\x04\x95pickle", "mem://scaler").unwrap_err();
        assert!(matches!(err, ChurnError::ArtifactDecode { .. }));
    }

    #[test]
    fn inconsistent_parameters_are_decode_error() {
        let json = r#"{"kind": "standard_scaler", "mean": [0.0, 1.0], "scale": [1.0]}"#;
        let err = Verified::<Scaler>::decode(json.as_bytes(), "mem://scaler").unwrap_err();
        assert!(matches!(err, ChurnError::ArtifactDecode { .. }));
    }
}
