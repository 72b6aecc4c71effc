//! @ai:module:intent Solution descriptor: one candidate kernel configuration
//! @ai:module:layer domain
//! @ai:module:public_api Solution
//! @ai:module:stateless true

use crate::solution::params::{ParamBag, ParamValue};
use crate::solution::problem_type::ProblemType;
use crate::solution::rules::{Validity, ValidityRulesTrait};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key tagging descriptors that came from a hand-authored kernel.
pub const CUSTOM_KERNEL_NAME: &str = "CustomKernelName";

/// @ai:intent Parameter mapping plus ProblemType and a computed Valid flag
/// @ai:invariant equal iff problem type and every parameter value are equal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    #[serde(rename = "ProblemType")]
    problem_type: ProblemType,
    #[serde(flatten)]
    params: ParamBag,
    #[serde(rename = "Valid")]
    valid: bool,
    #[serde(skip)]
    rejection: Option<String>,
}

impl Solution {
    /// @ai:intent Build a descriptor and evaluate the validity predicate once
    /// @ai:effects pure
    pub fn new(problem_type: ProblemType, mut params: ParamBag, rules: &dyn ValidityRulesTrait) -> Self {
        params.remove("ProblemType");
        params.remove("Valid");
        rules.assign_derived(&problem_type, &mut params);

        let (valid, rejection) = match rules.validate(&problem_type, &params) {
            Validity::Valid => (true, None),
            Validity::Invalid(reason) => (false, Some(reason)),
        };

        Self {
            problem_type,
            params,
            valid,
            rejection,
        }
    }

    pub fn problem_type(&self) -> &ProblemType {
        &self.problem_type
    }

    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.params.get_int(key)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// @ai:intent Why the validity predicate rejected this descriptor
    /// @ai:effects pure
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// @ai:intent Name of the source kernel for hand-authored descriptors
    /// @ai:effects pure
    pub fn custom_kernel_name(&self) -> Option<&str> {
        self.params.get(CUSTOM_KERNEL_NAME).and_then(ParamValue::as_str)
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.problem_type == other.problem_type && self.params == other.params
    }
}

impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.problem_type.hash(state);
        self.params.hash(state);
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.problem_type)?;

        for (key, value) in &self.params {
            write!(f, " {}={}", key, value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::problem_type::DataType;
    use crate::solution::rules::ParameterRules;
    use std::collections::HashSet;

    #[test]
    fn test_equal_descriptors_hash_together() {
        let rules = ParameterRules::default();
        let pt = ProblemType::gemm(DataType::Single);

        let a = Solution::new(
            pt.clone(),
            ParamBag::new().with("DepthU", 16).with("WorkGroup", vec![16, 16, 1]),
            &rules,
        );
        let b = Solution::new(
            pt,
            ParamBag::new().with("WorkGroup", vec![16, 16, 1]).with("DepthU", 16),
            &rules,
        );

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_problem_type_participates_in_identity() {
        let rules = ParameterRules::default();
        let params = ParamBag::new().with("DepthU", 16);

        let a = Solution::new(ProblemType::gemm(DataType::Single), params.clone(), &rules);
        let b = Solution::new(ProblemType::gemm(DataType::Double), params, &rules);
        assert_ne!(a, b);
    }

    #[test]
    fn test_yaml_roundtrip_keeps_flattened_params() {
        let rules = ParameterRules::default();
        let solution = Solution::new(
            ProblemType::gemm(DataType::Half),
            ParamBag::new().with("WorkGroup", vec![8, 8, 1]).with("ThreadTile", vec![4, 4]),
            &rules,
        );

        let yaml = serde_yaml::to_string(&solution).unwrap();
        assert!(yaml.contains("ProblemType"));
        assert!(yaml.contains("MacroTile0: 32"));
        assert!(yaml.contains("Valid: true"));

        let back: Solution = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, solution);
    }
}
