//! @ai:module:intent JSON run summary written after the driver completes
//! @ai:module:layer infrastructure
//! @ai:module:public_api RunSummary, SummaryReporter, SummaryReporterTrait
//! @ai:module:stateless true

use crate::pipeline::{PairOutcome, RunOutcome};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "run_summary.json";

/// @ai:intent Serializable record of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub dry_run: bool,
    pub force_redo: bool,
    pub pairs: Vec<PairOutcome>,
    pub total_failures: u32,
}

impl RunSummary {
    /// @ai:intent Stamp an outcome with the current time
    /// @ai:effects time
    pub fn from_outcome(outcome: &RunOutcome, dry_run: bool, force_redo: bool) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            dry_run,
            force_redo,
            pairs: outcome.pairs.clone(),
            total_failures: outcome.failures,
        }
    }
}

/// @ai:intent Trait for run summary output
pub trait SummaryReporterTrait: Send + Sync {
    /// @ai:intent Write the summary under a data directory, returning the file path
    fn write(&self, summary: &RunSummary, data_dir: &Path) -> Result<PathBuf>;
}

/// @ai:intent Writes `<data>/run_summary.json`
#[derive(Default)]
pub struct SummaryReporter;

impl SummaryReporter {
    pub fn new() -> Self {
        Self
    }
}

impl SummaryReporterTrait for SummaryReporter {
    /// @ai:effects fs:write
    fn write(&self, summary: &RunSummary, data_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SUMMARY_FILE);

        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("Run summary written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PairStatus;
    use tempfile::TempDir;

    #[test]
    fn test_write_summary() {
        let temp = TempDir::new().unwrap();
        let outcome = RunOutcome {
            pairs: vec![PairOutcome {
                name: "Cijk_Ailk_Bljk_SB_00".to_string(),
                status: PairStatus::Skipped,
                steps: 0,
                failures: 0,
                elapsed_secs: 0.0,
            }],
            failures: 0,
        };

        let summary = RunSummary::from_outcome(&outcome, true, false);
        let path = SummaryReporter::new().write(&summary, temp.path()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["pairs"][0]["status"], "skipped");
        assert_eq!(parsed["total_failures"], 0);
        assert!(parsed["timestamp"].as_str().unwrap().contains('T'));
    }
}
