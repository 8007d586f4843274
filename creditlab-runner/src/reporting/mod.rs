//! Artifact export for completed pipeline runs.

pub mod artifacts;

pub use artifacts::{ArtifactManager, ArtifactPaths, RunManifest};
