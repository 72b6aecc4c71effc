//! @ai:module:intent Ordered benchmark steps for one (problem type, size group) pair
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkProcess
//! @ai:module:stateless true

use crate::benchmark::input::{SizeGroupConfig, StepConfig};
use crate::benchmark::step::BenchmarkStep;
use crate::error::{Result, TuneError};
use crate::solution::{ForkParameters, ProblemType};

/// @ai:intent Read-only step sequence derived once from a size group config
#[derive(Debug, Clone)]
pub struct BenchmarkProcess {
    problem_type: ProblemType,
    steps: Vec<BenchmarkStep>,
    tile_aware_summation_sizes: Vec<u64>,
}

impl BenchmarkProcess {
    /// @ai:intent Build the steps of a group; exactly one step ends up final
    /// @ai:pre at most one step is flagged Final; shorthand keys and Steps are exclusive
    /// @ai:effects pure
    pub fn new(problem_type: ProblemType, group: &SizeGroupConfig) -> Result<Self> {
        if !group.steps.is_empty() && group.has_shorthand_step() {
            return Err(TuneError::InvalidInputSpec(
                "a size group uses either Steps or ForkParameters/CustomKernels, not both"
                    .to_string(),
            ));
        }

        let step_configs = if group.steps.is_empty() {
            vec![StepConfig {
                fork_parameters: group.fork_parameters.clone(),
                custom_kernels: group.custom_kernels.clone(),
                ..Default::default()
            }]
        } else {
            group.steps.clone()
        };

        let flagged: Vec<usize> = step_configs
            .iter()
            .enumerate()
            .filter(|(_, step)| step.is_final)
            .map(|(idx, _)| idx)
            .collect();

        let final_idx = match flagged.as_slice() {
            [] => step_configs.len() - 1,
            [idx] => *idx,
            _ => return Err(TuneError::MultipleFinalSteps(flagged.clone())),
        };

        let mut steps = Vec::with_capacity(step_configs.len());

        for (index, config) in step_configs.into_iter().enumerate() {
            let forks = ForkParameters::from_declaration(config.fork_parameters)?;
            let is_final = index == final_idx;

            let mut constant_params = group.common_parameters.clone();
            constant_params.merge(&config.constant_parameters);

            let name = config
                .name
                .unwrap_or_else(|| BenchmarkStep::default_name(index, &forks, is_final));

            steps.push(BenchmarkStep {
                index,
                name,
                constant_params,
                forks,
                custom_kernels: config.custom_kernels,
                custom_kernel_wildcard: config
                    .custom_kernel_wildcard
                    .unwrap_or(group.custom_kernel_wildcard),
                problem_sizes: config
                    .problem_sizes
                    .unwrap_or_else(|| group.problem_sizes.clone()),
                is_final,
            });
        }

        Ok(Self {
            problem_type,
            steps,
            tile_aware_summation_sizes: group.tile_aware_summation_sizes.clone(),
        })
    }

    pub fn problem_type(&self) -> &ProblemType {
        &self.problem_type
    }

    pub fn steps(&self) -> &[BenchmarkStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn enable_tile_selection(&self) -> bool {
        self.problem_type.tile_aware_selection
    }

    /// @ai:intent Reduction sizes crossed with tile-derived M/N in tile-aware mode
    /// @ai:effects pure
    pub fn tile_aware_summation_sizes(&self) -> &[u64] {
        &self.tile_aware_summation_sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::input::InputSpec;
    use crate::solution::DataType;

    fn group(yaml: &str) -> SizeGroupConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_empty_group_is_single_final_step() {
        let process =
            BenchmarkProcess::new(ProblemType::gemm(DataType::Single), &SizeGroupConfig::default())
                .unwrap();

        assert_eq!(process.len(), 1);
        assert_eq!(process.steps()[0].name(), "00_Final");
        assert!(process.steps()[0].is_final());
        assert_eq!(process.steps()[0].fork_permutations().len(), 1);
    }

    #[test]
    fn test_last_step_is_final_by_default() {
        let g = group(
            "CommonParameters: {DepthU: 16}\nProblemSizes: [{Exact: [64, 64, 1, 64]}]\nSteps:\n  - ForkParameters: [{WorkGroup: [[16, 16, 1]]}]\n  - ConstantParameters: {DepthU: 32}\n",
        );
        let process = BenchmarkProcess::new(ProblemType::gemm(DataType::Single), &g).unwrap();

        assert_eq!(process.steps()[0].name(), "00_WG");
        assert!(!process.steps()[0].is_final());
        assert_eq!(process.steps()[1].name(), "01_Final");
        assert!(process.steps()[1].is_final());
        assert_eq!(process.steps()[0].constant_params().get_int("DepthU"), Some(16));
        assert_eq!(process.steps()[1].constant_params().get_int("DepthU"), Some(32));
        assert_eq!(process.steps()[1].problem_sizes().total(), 1);
    }

    #[test]
    fn test_two_final_flags_are_rejected() {
        let g = group("Steps:\n  - Final: true\n  - Final: true\n");
        assert!(matches!(
            BenchmarkProcess::new(ProblemType::gemm(DataType::Single), &g),
            Err(TuneError::MultipleFinalSteps(steps)) if steps == vec![0, 1]
        ));
    }

    #[test]
    fn test_mixed_shorthand_and_steps_rejected() {
        let g = group("ForkParameters: [{DepthU: [8]}]\nSteps:\n  - Final: true\n");
        assert!(BenchmarkProcess::new(ProblemType::gemm(DataType::Single), &g).is_err());
    }

    #[test]
    fn test_wildcard_falls_back_to_group() {
        let spec = InputSpec::from_yaml_str(
            "- - DataType: s\n  - CustomKernelWildcard: true\n    Steps:\n      - CustomKernels: [A]\n      - CustomKernels: [B]\n        CustomKernelWildcard: false\n",
        )
        .unwrap();
        let entry = &spec.entries[0];
        let process = BenchmarkProcess::new(entry.problem_type.clone(), &entry.groups[0]).unwrap();

        assert!(!process.steps()[0].fail_on_mismatch());
        assert!(process.steps()[1].fail_on_mismatch());
    }
}
