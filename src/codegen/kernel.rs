//! @ai:module:intent Kernel units referenced by solutions, deduplicated by name
//! @ai:module:layer domain
//! @ai:module:public_api KernelUnit, HelperKernel, KernelSet
//! @ai:module:stateless true

use crate::solution::{abbreviate, ParamBag, ProblemType, Solution, CUSTOM_KERNEL_NAME};
use indexmap::IndexMap;
use serde::Serialize;

/// Solution-level bookkeeping keys that never reach a kernel.
const SOLUTION_ONLY_KEYS: &[&str] = &[CUSTOM_KERNEL_NAME];

/// @ai:intent Primary compute kernel of a solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KernelUnit {
    pub problem_type: ProblemType,
    pub params: ParamBag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

impl KernelUnit {
    /// @ai:intent Kernel-level view of a solution
    /// @ai:effects pure
    pub fn from_solution(solution: &Solution) -> Self {
        let params = solution
            .params()
            .iter()
            .filter(|(key, _)| !SOLUTION_ONLY_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            problem_type: solution.problem_type().clone(),
            params,
            custom_name: solution.custom_kernel_name().map(str::to_string),
        }
    }

    /// @ai:intent Parameters plus the custom name, so units distinct by name stay distinct
    /// @ai:effects pure
    pub fn identity_params(&self) -> ParamBag {
        match &self.custom_name {
            Some(name) => self.params.clone().with(CUSTOM_KERNEL_NAME, name.as_str()),
            None => self.params.clone(),
        }
    }

    /// @ai:intent Fully-qualified name: problem type plus every parameter
    /// @ai:effects pure
    pub fn full_name(&self) -> String {
        if let Some(name) = &self.custom_name {
            return name.clone();
        }

        let mut name = self.problem_type.to_string();

        for (key, value) in &self.params {
            name.push('_');
            name.push_str(&abbreviate(key));
            name.push_str(&value.name_fragment());
        }

        name
    }
}

/// @ai:intent Auxiliary kernel launched alongside a split-summation solution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum HelperKernel {
    BetaOnly(ProblemType),
    Conversion(ProblemType),
}

impl HelperKernel {
    pub fn name(&self) -> String {
        match self {
            HelperKernel::BetaOnly(pt) => format!("{}_BetaOnly", pt),
            HelperKernel::Conversion(pt) => {
                format!("{}_Convert{}", pt, pt.dest_type().as_char().to_uppercase())
            }
        }
    }

    /// @ai:intent Helpers required by a solution: GlobalSplitU > 1 needs beta-only,
    ///            plus conversion when the destination type differs
    /// @ai:effects pure
    pub fn for_solution(solution: &Solution) -> Vec<HelperKernel> {
        let split = solution.get_int("GlobalSplitU").unwrap_or(1);

        if split <= 1 {
            return Vec::new();
        }

        let pt = solution.problem_type();
        let mut helpers = vec![HelperKernel::BetaOnly(pt.clone())];

        if pt.dest_type() != pt.data_type {
            helpers.push(HelperKernel::Conversion(pt.clone()));
        }

        helpers
    }
}

/// @ai:intent Distinct kernels and helpers across a step's solutions, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct KernelSet {
    pub kernels: Vec<KernelUnit>,
    pub helpers: Vec<HelperKernel>,
}

impl KernelSet {
    /// @ai:intent Collect kernels by full name and helpers by name
    /// @ai:effects pure
    pub fn collect(solutions: &[Solution]) -> Self {
        let mut kernels: IndexMap<String, KernelUnit> = IndexMap::new();
        let mut helpers: IndexMap<String, HelperKernel> = IndexMap::new();

        for solution in solutions {
            let kernel = KernelUnit::from_solution(solution);
            kernels.entry(kernel.full_name()).or_insert(kernel);

            for helper in HelperKernel::for_solution(solution) {
                helpers.entry(helper.name()).or_insert(helper);
            }
        }

        Self {
            kernels: kernels.into_values().collect(),
            helpers: helpers.into_values().collect(),
        }
    }
}
