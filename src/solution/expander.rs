//! @ai:module:intent Expand fork permutations into valid, unique solutions
//! @ai:module:layer application
//! @ai:module:public_api ParameterExpander
//! @ai:module:stateless true

use crate::solution::descriptor::Solution;
use crate::solution::params::ParamBag;
use crate::solution::problem_type::ProblemType;
use crate::solution::rules::ValidityRulesTrait;
use std::collections::HashSet;

/// @ai:intent Builds solution descriptors for every fork permutation of a step
pub struct ParameterExpander<'a> {
    rules: &'a dyn ValidityRulesTrait,
    report_rejections: bool,
}

impl<'a> ParameterExpander<'a> {
    /// @ai:intent Create an expander; `report_rejections` enables per-candidate notices
    /// @ai:effects pure
    pub fn new(rules: &'a dyn ValidityRulesTrait, report_rejections: bool) -> Self {
        Self {
            rules,
            report_rejections,
        }
    }

    /// @ai:intent {ProblemType} + constants + permutation for each permutation,
    ///            keeping valid descriptors not seen earlier in this call
    /// @ai:post no two results are equal; every result is valid; order follows permutations
    /// @ai:effects pure (rejection notices are logged when enabled)
    pub fn expand(
        &self,
        problem_type: &ProblemType,
        constant_params: &ParamBag,
        permutations: &[ParamBag],
    ) -> Vec<Solution> {
        tracing::info!("Enumerating solutions");

        let mut solutions = Vec::new();
        let mut seen = HashSet::new();

        for perm in permutations {
            let mut params = constant_params.clone();
            params.merge(perm);

            let solution = Solution::new(problem_type.clone(), params, self.rules);

            if !solution.is_valid() {
                if self.report_rejections {
                    tracing::info!(
                        "rejecting solution {}: {}",
                        solution,
                        solution.rejection_reason().unwrap_or("invalid")
                    );
                }
                continue;
            }

            if seen.contains(&solution) {
                if self.report_rejections {
                    tracing::info!("rejecting solution {}: duplicate", solution);
                }
                continue;
            }

            seen.insert(solution.clone());
            solutions.push(solution);
        }

        solutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::problem_type::DataType;
    use crate::solution::rules::ParameterRules;
    use pretty_assertions::assert_eq;

    fn permutations() -> Vec<ParamBag> {
        vec![
            ParamBag::new().with("WorkGroup", vec![16, 16, 1]).with("ThreadTile", vec![4, 4]),
            ParamBag::new().with("WorkGroup", vec![8, 8, 1]).with("ThreadTile", vec![4, 4]),
            ParamBag::new().with("WorkGroup", vec![16, 16, 1]).with("ThreadTile", vec![4, 4]),
            ParamBag::new().with("WorkGroup", vec![32, 32, 1]).with("ThreadTile", vec![2, 2]),
            ParamBag::new().with("WorkGroup", vec![8, 8, 1]).with("ThreadTile", vec![8, 8]),
        ]
    }

    #[test]
    fn test_filters_invalid_and_duplicates_in_order() {
        let rules = ParameterRules::default();
        let expander = ParameterExpander::new(&rules, true);
        let constants = ParamBag::new().with("DepthU", 16);
        let pt = ProblemType::gemm(DataType::Single);

        let solutions = expander.expand(&pt, &constants, &permutations());

        // [32, 32, 1] exceeds the 256-thread limit; the third entry repeats the first
        assert_eq!(solutions.len(), 3);
        assert!(solutions.iter().all(Solution::is_valid));
        assert_eq!(solutions[0].get_int("MacroTile0"), Some(64));
        assert_eq!(solutions[1].get_int("MacroTile0"), Some(32));
        assert_eq!(solutions[2].get_int("MacroTile0"), Some(64));
        assert_eq!(solutions[2].get_int("MacroTile1"), Some(64));
        assert!(solutions.iter().all(|s| s.get_int("DepthU") == Some(16)));
    }

    #[test]
    fn test_expand_is_deterministic() {
        let rules = ParameterRules::default();
        let expander = ParameterExpander::new(&rules, false);
        let pt = ProblemType::gemm(DataType::Half);
        let constants = ParamBag::new();

        let first = expander.expand(&pt, &constants, &permutations());
        let second = expander.expand(&pt, &constants, &permutations());
        assert_eq!(first, second);
    }

    #[test]
    fn test_permutation_overrides_constants() {
        let rules = ParameterRules::default();
        let expander = ParameterExpander::new(&rules, false);
        let pt = ProblemType::gemm(DataType::Single);
        let constants = ParamBag::new().with("DepthU", 8);
        let perms = vec![ParamBag::new().with("DepthU", 32), ParamBag::new().with("DepthU", 8)];

        let solutions = expander.expand(&pt, &constants, &perms);
        assert_eq!(solutions.len(), 2);
        assert_eq!(solutions[0].get_int("DepthU"), Some(32));
    }

    #[test]
    fn test_all_invalid_yields_empty() {
        let rules = ParameterRules::default();
        let expander = ParameterExpander::new(&rules, false);
        let pt = ProblemType::gemm(DataType::Single);
        let perms = vec![ParamBag::new().with("DepthU", 0), ParamBag::new().with("DepthU", -8)];

        assert!(expander.expand(&pt, &ParamBag::new(), &perms).is_empty());
    }
}
