//! @ai:module:intent Result artifact paths and the solution descriptor side-car
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultArtifact, SolutionSideCar
//! @ai:module:stateless true

use crate::solution::{ProblemSizes, Solution};
use crate::workspace::write_atomic;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Results table, descriptor dump and granularity table sharing one stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    stem: PathBuf,
}

impl ResultArtifact {
    /// @ai:intent Artifact addressed by `<dir>/<name>`
    /// @ai:effects pure
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            stem: dir.join(name),
        }
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path = self.stem.as_os_str().to_owned();
        path.push(suffix);
        PathBuf::from(path)
    }

    /// @ai:intent Results table; its existence is the cache-hit signal
    pub fn results(&self) -> PathBuf {
        self.with_suffix(".csv")
    }

    pub fn solutions(&self) -> PathBuf {
        self.with_suffix(".yaml")
    }

    pub fn granularity(&self) -> PathBuf {
        self.with_suffix("_Granularity.csv")
    }

    /// Promoted copy of the granularity table.
    pub fn granularity_promoted(&self) -> PathBuf {
        self.with_suffix(".gsp")
    }

    pub fn is_cached(&self) -> bool {
        self.results().exists()
    }
}

/// @ai:intent Problem sizes plus solution descriptors persisted next to a results table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SolutionSideCar {
    pub problem_sizes: ProblemSizes,
    pub solutions: Vec<Solution>,
}

impl SolutionSideCar {
    /// @ai:intent Write-then-rename the side-car as YAML
    /// @ai:effects fs:write
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        write_atomic(path, content.as_bytes())
            .with_context(|| format!("Failed to write solutions to {}", path.display()))
    }

    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
