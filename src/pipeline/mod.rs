//! @ai:module:intent Benchmark orchestration: step runner, per-group pipeline, top-level driver
//! @ai:module:layer application
//! @ai:module:public_api TopLevelDriver, BenchmarkPipeline, BenchmarkStepRunner, Collaborators, ProblemScope

pub mod context;
pub mod driver;
pub mod process;
pub mod results;
pub mod step;

pub use context::{Collaborators, ProblemScope};
pub use driver::{PairOutcome, PairStatus, RunOutcome, TopLevelDriver};
pub use process::{BenchmarkPipeline, PipelineOutcome};
pub use results::{ResultArtifact, SolutionSideCar};
pub use step::{BenchmarkStepRunner, StepOutcome, StepStatus};
