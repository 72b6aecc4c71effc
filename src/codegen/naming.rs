//! @ai:module:intent Serial and minimized naming schemes for solutions and kernels
//! @ai:module:layer domain
//! @ai:module:public_api serial_names, min_names, StepNames
//! @ai:module:stateless true

use crate::codegen::kernel::KernelUnit;
use crate::solution::{abbreviate, ParamBag, ParamValue, ProblemType, Solution};
use std::collections::{BTreeMap, BTreeSet};

/// @ai:intent Names assigned once per step over the full solution and kernel sets
#[derive(Debug, Clone, Default)]
pub struct StepNames {
    pub solution_serial: Vec<String>,
    pub solution_min: Vec<String>,
    pub kernel_serial: Vec<String>,
    pub kernel_min: Vec<String>,
}

impl StepNames {
    /// @ai:intent Compute both schemes for solutions and kernels
    /// @ai:effects pure
    pub fn assign(problem_type: &ProblemType, solutions: &[Solution], kernels: &[KernelUnit]) -> Self {
        let solution_bags: Vec<&ParamBag> = solutions.iter().map(Solution::params).collect();
        let solution_custom: Vec<Option<&str>> =
            solutions.iter().map(Solution::custom_kernel_name).collect();

        let kernel_bags: Vec<&ParamBag> = kernels.iter().map(|k| &k.params).collect();
        let kernel_custom: Vec<Option<&str>> =
            kernels.iter().map(|k| k.custom_name.as_deref()).collect();
        let kernel_identities: Vec<ParamBag> = kernels.iter().map(KernelUnit::identity_params).collect();
        let kernel_identity_refs: Vec<&ParamBag> = kernel_identities.iter().collect();

        Self {
            solution_serial: serial_names(&solution_bags, 'S'),
            solution_min: min_names(problem_type, &solution_bags, &solution_custom),
            kernel_serial: serial_names(&kernel_identity_refs, 'K'),
            kernel_min: min_names(problem_type, &kernel_bags, &kernel_custom),
        }
    }
}

/// Sorted distinct values per key; a bag missing a key counts as `None`.
fn value_domains<'a>(bags: &[&'a ParamBag]) -> BTreeMap<&'a str, BTreeSet<Option<&'a ParamValue>>> {
    let keys: BTreeSet<&str> = bags
        .iter()
        .copied()
        .flat_map(|bag| bag.keys().map(String::as_str))
        .collect();

    keys.into_iter()
        .map(|key| {
            let values = bags.iter().copied().map(|bag| bag.get(key)).collect();
            (key, values)
        })
        .collect()
}

/// @ai:intent Mixed-radix index over per-key sorted values, fixed width, prefixed
/// @ai:post equal bags get equal names; distinct bags get distinct names
/// @ai:effects pure
pub fn serial_names(bags: &[&ParamBag], prefix: char) -> Vec<String> {
    let domains = value_domains(bags);

    let total: u128 = domains
        .values()
        .map(|values| values.len() as u128)
        .try_fold(1u128, |acc, radix| acc.checked_mul(radix))
        .unwrap_or(u128::MAX);
    let width = total.saturating_sub(1).max(1).to_string().len();

    bags.iter()
        .map(|bag| {
            let mut index: u128 = 0;
            let mut stride: u128 = 1;

            for (key, values) in &domains {
                let value = bag.get(key);
                let position = values.iter().position(|v| *v == value).unwrap_or(0) as u128;
                index = index.wrapping_add(position.wrapping_mul(stride));
                stride = stride.wrapping_mul(values.len() as u128);
            }

            format!("{}{:0width$}", prefix, index, width = width)
        })
        .collect()
}

/// @ai:intent Problem-type name plus only the keys that vary across the set;
///            hand-authored kernels keep their own name
/// @ai:effects pure
pub fn min_names(
    problem_type: &ProblemType,
    bags: &[&ParamBag],
    custom: &[Option<&str>],
) -> Vec<String> {
    let varying: Vec<&str> = value_domains(bags)
        .into_iter()
        .filter(|(_, values)| values.len() > 1)
        .map(|(key, _)| key)
        .collect();

    bags.iter()
        .enumerate()
        .map(|(idx, bag)| {
            if let Some(name) = custom.get(idx).copied().flatten() {
                return name.to_string();
            }

            let mut name = problem_type.to_string();

            for key in &varying {
                if let Some(value) = bag.get(key) {
                    name.push('_');
                    name.push_str(&abbreviate(key));
                    name.push_str(&value.name_fragment());
                }
            }

            name
        })
        .collect()
}
