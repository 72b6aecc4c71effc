//! @ai:module:intent Benchmark input specification and step sequences
//! @ai:module:layer domain
//! @ai:module:public_api InputSpec, ProblemEntry, SizeGroupConfig, BenchmarkStep, BenchmarkProcess

pub mod input;
pub mod process;
pub mod step;

pub use input::{InputSpec, ProblemEntry, SizeGroupConfig, StepConfig};
pub use process::BenchmarkProcess;
pub use step::BenchmarkStep;
