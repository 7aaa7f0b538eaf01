//! Artifact Loader: fetch the fitted scaler, selector and classifier once at
//! startup and hand them out as verified, immutable values.

mod loader;
mod verified;

pub use loader::{ArtifactLoader, ArtifactSet, ArtifactSource};
pub use verified::Verified;
