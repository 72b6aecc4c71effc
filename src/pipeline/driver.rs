//! @ai:module:intent Drive every (problem type, size group) pair and promote final results
//! @ai:module:layer application
//! @ai:module:public_api TopLevelDriver, RunOutcome, PairOutcome, PairStatus
//! @ai:module:stateless false

use crate::benchmark::{BenchmarkProcess, InputSpec};
use crate::client::BenchmarkClientTrait;
use crate::config::TuneConfig;
use crate::pipeline::context::{Collaborators, ProblemScope};
use crate::pipeline::process::BenchmarkPipeline;
use crate::pipeline::results::ResultArtifact;
use crate::workspace::WorkingPathStack;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// @ai:intent Whether a pair ran or was satisfied by promoted results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairStatus {
    Benchmarked,
    Skipped,
}

/// @ai:intent Result for one (problem type, size group) pair
#[derive(Debug, Clone, Serialize)]
pub struct PairOutcome {
    pub name: String,
    pub status: PairStatus,
    pub steps: usize,
    pub failures: u32,
    pub elapsed_secs: f64,
}

/// @ai:intent Aggregate of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutcome {
    pub pairs: Vec<PairOutcome>,
    pub failures: u32,
}

impl RunOutcome {
    /// @ai:intent 1 when failures occurred and the exit-on-fails policy is enabled
    /// @ai:effects pure
    pub fn exit_code(&self, exit_on_fails: bool) -> i32 {
        if exit_on_fails && self.failures > 0 {
            1
        } else {
            0
        }
    }
}

/// @ai:intent Iterates the input specification, caching at pair granularity
pub struct TopLevelDriver<'a, C: BenchmarkClientTrait> {
    config: &'a TuneConfig,
    collaborators: &'a Collaborators<C>,
}

impl<'a, C: BenchmarkClientTrait> TopLevelDriver<'a, C> {
    pub fn new(config: &'a TuneConfig, collaborators: &'a Collaborators<C>) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// @ai:intent Run every pair; fatal errors abort, client failures are summed
    /// @ai:effects fs:write, io
    pub async fn run(&self, spec: &InputSpec) -> Result<RunOutcome> {
        let data_root = self.config.data_root();
        std::fs::create_dir_all(&data_root)
            .with_context(|| format!("Failed to create {}", data_root.display()))?;

        let mut paths = WorkingPathStack::new(self.config.problems_root())?;
        let pipeline = BenchmarkPipeline::new(self.config, self.collaborators);
        let mut outcome = RunOutcome::default();

        for (problem_type, group_idx, group) in spec.pairs() {
            let group_name = format!("{}_{:02}", problem_type, group_idx);
            let promoted = ResultArtifact::new(
                &data_root,
                &format!("{}{}", group_name, self.config.promoted_suffix()),
            );

            if promoted.is_cached() && !self.config.run.force_redo {
                tracing::info!(
                    "{} already benchmarked; skipping ({})",
                    group_name,
                    promoted.results().display()
                );
                outcome.pairs.push(PairOutcome {
                    name: group_name,
                    status: PairStatus::Skipped,
                    steps: 0,
                    failures: 0,
                    elapsed_secs: 0.0,
                });
                continue;
            }

            let process = BenchmarkProcess::new(problem_type.clone(), group)
                .with_context(|| format!("Invalid size group {}", group_name))?;
            let scope = ProblemScope::for_problem(problem_type);

            tracing::info!("Benchmarking {} ({} steps)", group_name, process.len());

            let result = pipeline.run(&mut paths, &process, &group_name, scope).await?;
            outcome.failures += result.failures;

            match &result.final_results {
                Some(final_results) if final_results.is_cached() => {
                    promote(final_results, &promoted)?;
                }
                Some(final_results) => {
                    tracing::warn!(
                        "No results at {}; nothing promoted for {}",
                        final_results.results().display(),
                        group_name
                    );
                }
                None => tracing::warn!("{} has no final step", group_name),
            }

            tracing::info!(
                "{} finished in {:.1} secs with {} failures",
                group_name,
                result.elapsed.as_secs_f64(),
                result.failures
            );

            outcome.pairs.push(PairOutcome {
                name: group_name,
                status: PairStatus::Benchmarked,
                steps: result.steps.len(),
                failures: result.failures,
                elapsed_secs: result.elapsed.as_secs_f64(),
            });
        }

        Ok(outcome)
    }
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

/// @ai:intent Copy final-step artifacts to their stable names; granularity is best-effort
/// @ai:effects fs:write
fn promote(from: &ResultArtifact, to: &ResultArtifact) -> Result<()> {
    copy(&from.results(), &to.results())?;
    copy(&from.solutions(), &to.solutions())?;

    if from.granularity().is_file() {
        copy(&from.granularity(), &to.granularity_promoted())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBenchmarkClient;
    use crate::codegen::MockCodeGenerator;
    use crate::pipeline::results::SolutionSideCar;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    const SPEC: &str = r#"
- - OperationType: GEMM
    DataType: s
  - ForkParameters:
      - DepthU: [8, 16, 32, 8, -1]
    ProblemSizes:
      - Exact: [128, 128, 1, 128]
"#;

    fn config(temp: &TempDir) -> TuneConfig {
        let mut config = TuneConfig::default();
        config.paths.working_path = temp.path().to_path_buf();
        config
    }

    fn collaborators(config: &TuneConfig, failing: &[usize]) -> Collaborators<MockBenchmarkClient> {
        Collaborators::with(
            config,
            Arc::new(MockCodeGenerator::with_failures(failing.iter().copied())),
            Arc::new(MockBenchmarkClient::new()),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_dedup_and_generation_pruning() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let collaborators = collaborators(&config, &[1]);
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();

        let outcome = TopLevelDriver::new(&config, &collaborators)
            .run(&spec)
            .await
            .unwrap();

        assert_eq!(outcome.failures, 0);
        assert_eq!(outcome.exit_code(true), 0);

        let group = config.problems_root().join("Cijk_Ailk_Bljk_SB_00");
        let step = SolutionSideCar::load(&group.join("Data/00_Final.yaml")).unwrap();
        assert_eq!(step.solutions.len(), 2);
        let depths: Vec<i64> = step
            .solutions
            .iter()
            .filter_map(|s| s.get_int("DepthU"))
            .collect();
        assert_eq!(depths, vec![8, 32]);

        let promoted = config.data_root().join("Cijk_Ailk_Bljk_SB_00.yaml");
        assert_eq!(SolutionSideCar::load(&promoted).unwrap().solutions.len(), 2);
        assert!(config.data_root().join("Cijk_Ailk_Bljk_SB_00.csv").exists());
        assert!(!config.data_root().join("Cijk_Ailk_Bljk_SB_00.gsp").exists());
    }

    #[tokio::test]
    async fn test_second_run_is_cached() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let collaborators = collaborators(&config, &[]);
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();
        let driver = TopLevelDriver::new(&config, &collaborators);

        let first = driver.run(&spec).await.unwrap();
        let second = driver.run(&spec).await.unwrap();

        assert_eq!(first.pairs[0].status, PairStatus::Benchmarked);
        assert_eq!(second.pairs[0].status, PairStatus::Skipped);
        assert_eq!(collaborators.client.invocations().len(), 1);
    }

    #[tokio::test]
    async fn test_force_redo_reruns_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.run.force_redo = true;
        config.run.csv_export_winner = true;
        let collaborators = collaborators(&config, &[]);
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();
        let driver = TopLevelDriver::new(&config, &collaborators);

        driver.run(&spec).await.unwrap();
        let promoted = config.data_root().join("Cijk_Ailk_Bljk_SB_00_CSVWinner.csv");
        std::fs::write(&promoted, "stale").unwrap();

        let second = driver.run(&spec).await.unwrap();

        assert_eq!(second.pairs[0].status, PairStatus::Benchmarked);
        assert_eq!(collaborators.client.invocations().len(), 2);
        assert_ne!(std::fs::read_to_string(&promoted).unwrap(), "stale");
    }

    #[tokio::test]
    async fn test_granularity_table_is_promoted_when_present() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let collaborators = collaborators(&config, &[]);
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();

        let data = config.problems_root().join("Cijk_Ailk_Bljk_SB_00/Data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("00_Final_Granularity.csv"), "kernel,granularity\n").unwrap();

        TopLevelDriver::new(&config, &collaborators)
            .run(&spec)
            .await
            .unwrap();

        assert!(config.data_root().join("Cijk_Ailk_Bljk_SB_00.gsp").exists());
    }

    #[tokio::test]
    async fn test_client_failures_set_exit_code() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp);
        let collaborators = Collaborators::with(
            &config,
            Arc::new(MockCodeGenerator::new()),
            Arc::new(MockBenchmarkClient::with_exit_code(1)),
        );
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();

        let outcome = TopLevelDriver::new(&config, &collaborators)
            .run(&spec)
            .await
            .unwrap();

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.exit_code(true), 1);
        assert_eq!(outcome.exit_code(false), 0);
    }
}
