//! @ai:module:intent Benchmarking client invocation and its configuration file
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkClientTrait, ClientInvocation, CommandClient, MockBenchmarkClient, ClientConfigWriter

pub mod parameters;
pub mod runner;

pub use parameters::{partial_results_path, ClientConfigWriter, ClientParameters};
pub use runner::{BenchmarkClientTrait, ClientInvocation, CommandClient, MockBenchmarkClient};
