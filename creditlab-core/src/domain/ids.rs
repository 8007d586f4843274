use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hash of the canonical pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// BLAKE3 hash of the canonicalized input table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one pipeline run: config + dataset + seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub seed: u64,
}

impl RunId {
    pub fn new(config_hash: ConfigHash, dataset_hash: DatasetHash, seed: u64) -> Self {
        Self {
            config_hash,
            dataset_hash,
            seed,
        }
    }

    /// Stable hex digest of the run identity.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config_hash.0.as_bytes());
        hasher.update(b"|");
        hasher.update(self.dataset_hash.0.as_bytes());
        hasher.update(b"|");
        hasher.update(&self.seed.to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Short prefix used for run directory names.
    pub fn short(&self) -> String {
        self.digest()[..12].to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}
