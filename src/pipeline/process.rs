//! @ai:module:intent Sequence every step of one (problem type, size group) pair
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkPipeline, PipelineOutcome
//! @ai:module:stateless false

use crate::benchmark::BenchmarkProcess;
use crate::client::BenchmarkClientTrait;
use crate::config::TuneConfig;
use crate::pipeline::context::{Collaborators, ProblemScope};
use crate::pipeline::results::ResultArtifact;
use crate::pipeline::step::{BenchmarkStepRunner, StepOutcome};
use crate::workspace::WorkingPathStack;
use anyhow::Result;
use std::time::{Duration, Instant};

pub const DATA_DIR: &str = "Data";

/// @ai:intent Aggregate of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub group: String,
    pub steps: Vec<StepOutcome>,
    pub failures: u32,
    /// Results of the step flagged final.
    pub final_results: Option<ResultArtifact>,
    pub elapsed: Duration,
}

/// @ai:intent Runs the steps of a process in order under `<group>/`
pub struct BenchmarkPipeline<'a, C: BenchmarkClientTrait> {
    config: &'a TuneConfig,
    collaborators: &'a Collaborators<C>,
}

impl<'a, C: BenchmarkClientTrait> BenchmarkPipeline<'a, C> {
    pub fn new(config: &'a TuneConfig, collaborators: &'a Collaborators<C>) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// @ai:intent Run all steps; failures are summed, fatal errors propagate
    /// @ai:post paths depth is unchanged on every exit path
    /// @ai:effects fs:write, io
    pub async fn run(
        &self,
        paths: &mut WorkingPathStack,
        process: &BenchmarkProcess,
        group: &str,
        scope: ProblemScope,
    ) -> Result<PipelineOutcome> {
        let started = Instant::now();
        let mut group_scope = paths.enter(group)?;
        let data_dir = group_scope.ensure(DATA_DIR)?;

        let runner = BenchmarkStepRunner::new(self.config, self.collaborators, scope);
        let mut steps = Vec::with_capacity(process.len());
        let mut failures = 0;
        let mut final_results = None;

        tracing::info!("{}: {} steps", group, process.len());

        for step in process.steps() {
            tracing::info!(
                "Step {}/{} at {:.1} secs",
                step.index() + 1,
                process.len(),
                started.elapsed().as_secs_f64()
            );

            let outcome = runner.run(&mut group_scope, process, step, &data_dir).await?;
            failures += outcome.failures;

            if step.is_final() {
                final_results = Some(outcome.results.clone());
            }

            steps.push(outcome);
        }

        Ok(PipelineOutcome {
            group: group.to_string(),
            steps,
            failures,
            final_results,
            elapsed: started.elapsed(),
        })
    }
}
