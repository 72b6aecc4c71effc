//! @ai:module:intent Fork parameter declarations and permutation construction
//! @ai:module:layer domain
//! @ai:module:public_api ForkParameter, ForkParameters, construct_fork_permutations
//! @ai:module:stateless true

use crate::error::{Result, TuneError};
use crate::solution::params::{abbreviate, ParamBag, ParamValue};
use indexmap::IndexMap;

/// Fork key whose value is a list of groups of partial parameter bags.
pub const GROUPS_KEY: &str = "Groups";

/// @ai:intent One declared fork dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkParameter {
    /// A single parameter varied over a value list
    Values { name: String, values: Vec<ParamValue> },
    /// Each group contributes exactly one of its bags to a permutation
    Groups(Vec<Vec<ParamBag>>),
}

impl ForkParameter {
    /// @ai:intent Number of choices this dimension contributes
    /// @ai:effects pure
    fn arity(&self) -> usize {
        match self {
            ForkParameter::Values { values, .. } => values.len(),
            ForkParameter::Groups(groups) => groups.iter().map(Vec::len).product(),
        }
    }

    /// @ai:intent Parameter names this dimension can set
    /// @ai:effects pure
    pub fn names(&self) -> Vec<String> {
        match self {
            ForkParameter::Values { name, .. } => vec![name.clone()],
            ForkParameter::Groups(groups) => {
                let mut names: Vec<String> = groups
                    .iter()
                    .flatten()
                    .flat_map(|bag| bag.keys().cloned())
                    .collect();
                names.sort();
                names.dedup();
                names
            }
        }
    }

    /// Applies choice `index` (first group varies fastest) onto `perm`.
    fn apply(&self, mut index: usize, perm: &mut ParamBag) {
        match self {
            ForkParameter::Values { name, values } => {
                perm.insert(name.clone(), values[index].clone());
            }
            ForkParameter::Groups(groups) => {
                for group in groups {
                    perm.merge(&group[index % group.len()]);
                    index /= group.len();
                }
            }
        }
    }
}

/// @ai:intent Ordered fork declaration of a benchmark step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForkParameters(Vec<ForkParameter>);

impl ForkParameters {
    pub fn new(params: Vec<ForkParameter>) -> Self {
        Self(params)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForkParameter> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// @ai:intent Parse the `[{Name: [values]}, {Groups: [[{..}], ..]}]` form
    /// @ai:pre each list entry maps names to value lists
    /// @ai:effects pure
    pub fn from_declaration(entries: Vec<IndexMap<String, serde_yaml::Value>>) -> Result<Self> {
        let mut params = Vec::new();

        for entry in entries {
            for (name, value) in entry {
                let param = if name == GROUPS_KEY {
                    let groups: Vec<Vec<ParamBag>> = serde_yaml::from_value(value)?;

                    if groups.iter().any(Vec::is_empty) {
                        return Err(TuneError::InvalidInputSpec(
                            "fork Groups entry contains an empty group".to_string(),
                        ));
                    }
                    ForkParameter::Groups(groups)
                } else {
                    let values: Vec<ParamValue> = serde_yaml::from_value(value)?;

                    if values.is_empty() {
                        return Err(TuneError::InvalidInputSpec(format!(
                            "fork parameter {} has no values",
                            name
                        )));
                    }
                    ForkParameter::Values { name, values }
                };
                params.push(param);
            }
        }

        Ok(Self(params))
    }

    /// @ai:intent Joined abbreviations of forked names, used in step labels
    /// @ai:effects pure
    pub fn label(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let parts: Vec<String> = self
            .0
            .iter()
            .flat_map(ForkParameter::names)
            .map(|name| abbreviate(&name))
            .collect();
        Some(parts.join("_"))
    }
}

/// @ai:intent Every permutation of the declared forks, first dimension fastest
/// @ai:effects pure
pub fn construct_fork_permutations(forks: &ForkParameters) -> Vec<ParamBag> {
    let total: usize = forks.iter().map(ForkParameter::arity).product();
    let mut permutations = Vec::with_capacity(total);

    for mut index in 0..total {
        let mut perm = ParamBag::new();

        for fork in forks.iter() {
            let arity = fork.arity();
            fork.apply(index % arity, &mut perm);
            index /= arity;
        }
        permutations.push(perm);
    }

    permutations
}
