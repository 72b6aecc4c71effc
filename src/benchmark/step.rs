//! @ai:module:intent One stage of measurement inside a benchmark process
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkStep
//! @ai:module:stateless true

use crate::solution::{construct_fork_permutations, ForkParameters, ParamBag, ProblemSizes};
use std::fmt;

/// @ai:intent Constant params, forks, custom kernels and sizes of one stage
#[derive(Debug, Clone)]
pub struct BenchmarkStep {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) constant_params: ParamBag,
    pub(crate) forks: ForkParameters,
    pub(crate) custom_kernels: Vec<String>,
    pub(crate) custom_kernel_wildcard: bool,
    pub(crate) problem_sizes: ProblemSizes,
    pub(crate) is_final: bool,
}

impl BenchmarkStep {
    /// @ai:intent Step name `NN_<label>`: Final, fork abbreviations, or Common
    /// @ai:effects pure
    pub fn default_name(index: usize, forks: &ForkParameters, is_final: bool) -> String {
        let label = if is_final {
            "Final".to_string()
        } else {
            forks.label().unwrap_or_else(|| "Common".to_string())
        };
        format!("{:02}_{}", index, label)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constant_params(&self) -> &ParamBag {
        &self.constant_params
    }

    pub fn forks(&self) -> &ForkParameters {
        &self.forks
    }

    pub fn custom_kernels(&self) -> &[String] {
        &self.custom_kernels
    }

    /// @ai:intent Strict custom-kernel matching unless the wildcard flag is set
    /// @ai:effects pure
    pub fn fail_on_mismatch(&self) -> bool {
        !self.custom_kernel_wildcard
    }

    pub fn problem_sizes(&self) -> &ProblemSizes {
        &self.problem_sizes
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn fork_permutations(&self) -> Vec<ParamBag> {
        construct_fork_permutations(&self.forks)
    }
}

impl fmt::Display for BenchmarkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
