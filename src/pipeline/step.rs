//! @ai:module:intent Run one benchmark step: enumerate, materialize, benchmark, persist
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkStepRunner, StepOutcome, StepStatus
//! @ai:module:stateless false

use crate::benchmark::{BenchmarkProcess, BenchmarkStep};
use crate::client::{BenchmarkClientTrait, ClientInvocation};
use crate::codegen::{StepArtifactBuilder, StepLayout};
use crate::config::TuneConfig;
use crate::error::TuneError;
use crate::pipeline::context::{Collaborators, ProblemScope};
use crate::pipeline::results::{ResultArtifact, SolutionSideCar};
use crate::solution::{CustomKernelResolver, ParameterExpander, Solution};
use crate::workspace::WorkingPathStack;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// @ai:intent How a step's results were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Benchmarked,
    Cached,
}

/// @ai:intent What one step produced
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub name: String,
    pub status: StepStatus,
    pub enumerated: usize,
    pub persisted: usize,
    pub failures: u32,
    pub results: ResultArtifact,
}

/// @ai:intent Executes a step inside its own working-directory scope
pub struct BenchmarkStepRunner<'a, C: BenchmarkClientTrait> {
    config: &'a TuneConfig,
    collaborators: &'a Collaborators<C>,
    scope: ProblemScope,
}

impl<'a, C: BenchmarkClientTrait> BenchmarkStepRunner<'a, C> {
    /// @ai:intent Create a runner for one problem scope
    /// @ai:effects pure
    pub fn new(config: &'a TuneConfig, collaborators: &'a Collaborators<C>, scope: ProblemScope) -> Self {
        Self {
            config,
            collaborators,
            scope,
        }
    }

    fn custom_kernel_dir(&self) -> PathBuf {
        self.config.paths.working_path.join(&self.config.paths.custom_kernel_dir)
    }

    /// @ai:intent Forked solutions followed by custom-kernel solutions
    /// @ai:pre constant and fork parameters pass the key/value checker, else Err(InvalidParameter)
    /// @ai:post non-empty, or Err(NoValidSolutions)
    /// @ai:effects fs:read
    pub fn enumerate(&self, process: &BenchmarkProcess, step: &BenchmarkStep) -> Result<Vec<Solution>> {
        let report = self.config.run.print_solution_rejection_reason;
        let rules = self.collaborators.rules.as_ref();

        rules.check_parameters(step.constant_params())?;
        let permutations = step.fork_permutations();
        for perm in &permutations {
            rules.check_parameters(perm)?;
        }

        let expander = ParameterExpander::new(rules, report);
        let mut solutions = expander.expand(process.problem_type(), step.constant_params(), &permutations);

        if !step.custom_kernels().is_empty() {
            let dir = self.custom_kernel_dir();
            let resolver =
                CustomKernelResolver::new(self.collaborators.kernels.as_ref(), rules, &dir, report);
            solutions.extend(resolver.resolve(
                process.problem_type(),
                step.custom_kernels(),
                step.fail_on_mismatch(),
            )?);
        }

        if solutions.is_empty() {
            let hint = if report {
                "All candidates were rejected; see the rejection notices above.".to_string()
            } else {
                "Enable print_solution_rejection_reason to see why candidates were rejected."
                    .to_string()
            };
            return Err(TuneError::NoValidSolutions {
                step: step.name().to_string(),
                hint,
            }
            .into());
        }

        tracing::info!("# Actual Solutions: {}", solutions.len());
        Ok(solutions)
    }

    /// @ai:intent Enumerate → Materialize → CheckCache → {RunClient | SkipCached} → Persist
    /// @ai:pre paths is positioned at the group directory; data_dir is `<group>/Data`
    /// @ai:post paths depth is unchanged on every exit path
    /// @ai:effects fs:write, io
    pub async fn run(
        &self,
        paths: &mut WorkingPathStack,
        process: &BenchmarkProcess,
        step: &BenchmarkStep,
        data_dir: &Path,
    ) -> Result<StepOutcome> {
        let started = std::time::Instant::now();
        let mut step_scope = paths.enter(step.name())?;
        let step_dir = step_scope.current();

        tracing::info!("{}", step.name());
        tracing::info!(
            "# Num Sizes: {}, # Fork Params: {}, # Custom Kernels: {}",
            step.problem_sizes().total(),
            step.forks().iter().count(),
            step.custom_kernels().len()
        );

        let candidates = self.enumerate(process, step)?;
        let results = ResultArtifact::new(data_dir, step.name());

        let (solutions, materialized) = {
            let source_scope = step_scope.enter("source")?;
            let layout = StepLayout {
                name: step.name().to_string(),
                step_dir: step_dir.clone(),
                source_dir: source_scope.current(),
                results_file: results.results(),
            };
            let builder = StepArtifactBuilder::new(
                self.collaborators.generator.as_ref(),
                self.config,
                self.scope.enable_half,
            );
            builder.build(
                &layout,
                process.problem_type(),
                &candidates,
                step.problem_sizes(),
                process.tile_aware_summation_sizes(),
            )?
        };

        let mut failures = 0;
        let status = if results.is_cached() && !self.config.run.force_redo {
            tracing::info!("{} exists; benchmarking skipped", results.results().display());
            StepStatus::Cached
        } else {
            let invocation = ClientInvocation {
                step_name: step.name().to_string(),
                step_dir: step_dir.clone(),
                config_file: materialized.client_config.clone(),
                library_logic: None,
                benchmark: true,
                tile_selection: materialized.tile_selection,
                results_file: results.results(),
                problem_sizes: materialized.problem_sizes.clone(),
                num_solutions: solutions.len(),
            };

            let code = self.collaborators.client.run(&invocation).await?;
            promote_partial(&invocation)?;

            if code != 0 {
                tracing::warn!("Benchmark client exited with code {}", code);
                failures += 1;
            }

            StepStatus::Benchmarked
        };

        let side_car = SolutionSideCar {
            problem_sizes: step.problem_sizes().clone(),
            solutions,
        };
        side_car.write(&results.solutions())?;

        tracing::info!(
            "{} done in {:.1} secs",
            step.name(),
            started.elapsed().as_secs_f64()
        );

        Ok(StepOutcome {
            name: step.name().to_string(),
            status,
            enumerated: candidates.len(),
            persisted: side_car.solutions.len(),
            failures,
            results,
        })
    }
}

/// @ai:intent Rename the client's partial results into place, if it wrote any
/// @ai:effects fs:write
fn promote_partial(invocation: &ClientInvocation) -> Result<()> {
    let partial = invocation.partial_results_file();

    if partial.exists() {
        std::fs::rename(&partial, &invocation.results_file).with_context(|| {
            format!(
                "Failed to move {} to {}",
                partial.display(),
                invocation.results_file.display()
            )
        })?;
    }

    Ok(())
}
