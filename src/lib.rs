//! @ai:module:intent Kernel autotuning pipeline library
//! @ai:module:layer application
//! @ai:module:public_api config, solution, benchmark, codegen, client, pipeline, report, toolchain

pub mod benchmark;
pub mod client;
pub mod codegen;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod solution;
pub mod toolchain;
pub mod workspace;

pub use benchmark::{BenchmarkProcess, BenchmarkStep, InputSpec};
pub use client::{BenchmarkClientTrait, CommandClient, MockBenchmarkClient};
pub use codegen::{CodeGeneratorTrait, StepArtifactBuilder};
pub use config::TuneConfig;
pub use error::TuneError;
pub use pipeline::{BenchmarkPipeline, BenchmarkStepRunner, Collaborators, RunOutcome, TopLevelDriver};
pub use solution::{CustomKernelResolver, ParameterExpander, ProblemType, Solution};
pub use toolchain::{ToolchainStatus, ToolchainValidator};
