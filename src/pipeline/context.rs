//! @ai:module:intent Collaborators and per-problem scope handed down the pipeline
//! @ai:module:layer application
//! @ai:module:public_api Collaborators, ProblemScope
//! @ai:module:stateless true

use crate::client::{BenchmarkClientTrait, CommandClient, MockBenchmarkClient};
use crate::codegen::{CodeGeneratorTrait, CommandGenerator, MockCodeGenerator};
use crate::config::TuneConfig;
use crate::solution::{AssemblyKernelStore, KernelStoreTrait, ParameterRules, ProblemType, ValidityRulesTrait};
use std::sync::Arc;

/// @ai:intent External collaborators of the pipeline
pub struct Collaborators<C: BenchmarkClientTrait> {
    pub rules: Arc<dyn ValidityRulesTrait>,
    pub kernels: Arc<dyn KernelStoreTrait>,
    pub generator: Arc<dyn CodeGeneratorTrait>,
    pub client: Arc<C>,
}

impl<C: BenchmarkClientTrait> Collaborators<C> {
    /// @ai:intent Default rules and kernel store with a given generator and client
    /// @ai:effects pure
    pub fn with(config: &TuneConfig, generator: Arc<dyn CodeGeneratorTrait>, client: Arc<C>) -> Self {
        Self {
            rules: Arc::new(ParameterRules::new(config.rules.clone())),
            kernels: Arc::new(AssemblyKernelStore::new()),
            generator,
            client,
        }
    }
}

impl Collaborators<CommandClient> {
    /// @ai:intent Collaborators running the configured external tools
    /// @ai:effects pure
    pub fn external(config: &TuneConfig) -> Self {
        Self::with(
            config,
            Arc::new(CommandGenerator::new(config.tools.generator.clone())),
            Arc::new(CommandClient::new(config.tools.client.clone())),
        )
    }
}

impl Collaborators<MockBenchmarkClient> {
    /// @ai:intent Collaborators that touch no external tools
    /// @ai:effects pure
    pub fn dry_run(config: &TuneConfig) -> Self {
        Self::with(
            config,
            Arc::new(MockCodeGenerator::new()),
            Arc::new(MockBenchmarkClient::new()),
        )
    }
}

/// @ai:intent Settings derived per problem type rather than written globally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProblemScope {
    pub enable_half: bool,
}

impl ProblemScope {
    pub fn for_problem(problem_type: &ProblemType) -> Self {
        Self {
            enable_half: problem_type.data_type.is_half(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::DataType;

    #[test]
    fn test_half_scope() {
        assert!(ProblemScope::for_problem(&ProblemType::gemm(DataType::Half)).enable_half);
        assert!(!ProblemScope::for_problem(&ProblemType::gemm(DataType::Single)).enable_half);
    }
}
