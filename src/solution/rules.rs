//! @ai:module:intent Parameter validity predicate for candidate solutions
//! @ai:module:layer domain
//! @ai:module:public_api ValidityRulesTrait, ParameterRules, Validity
//! @ai:module:stateless true

use crate::config::RulesConfig;
use crate::error::{Result, TuneError};
use crate::solution::params::{ParamBag, ParamValue};
use crate::solution::problem_type::ProblemType;

/// @ai:intent Outcome of the validity predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// @ai:intent Trait for the kernel-configuration validity rules
pub trait ValidityRulesTrait: Send + Sync {
    /// @ai:intent Raise on unknown keys or disallowed values
    fn check_parameters(&self, params: &ParamBag) -> Result<()>;

    /// @ai:intent Fill in parameters implied by others
    fn assign_derived(&self, _problem_type: &ProblemType, _params: &mut ParamBag) {}

    /// @ai:intent Decide whether a full descriptor is a valid kernel configuration
    fn validate(&self, problem_type: &ProblemType, params: &ParamBag) -> Validity;
}

/// @ai:intent Default rule set driven by the [rules] config section
pub struct ParameterRules {
    config: RulesConfig,
}

impl ParameterRules {
    /// @ai:intent Create rules from configuration
    /// @ai:effects pure
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    fn check_tiles(&self, params: &ParamBag) -> Option<String> {
        if let Some(workgroup) = params.get_int_list("WorkGroup") {
            if workgroup.iter().any(|d| *d <= 0) {
                return Some(format!("WorkGroup {:?} has a non-positive dimension", workgroup));
            }

            let Some(threads) = workgroup.iter().try_fold(1i64, |acc, d| acc.checked_mul(*d)) else {
                return Some(format!("WorkGroup {:?} thread count overflows", workgroup));
            };

            if threads > self.config.max_workgroup_size {
                return Some(format!(
                    "WorkGroup {:?} uses {} threads > {}",
                    workgroup, threads, self.config.max_workgroup_size
                ));
            }
        }

        if let Some(thread_tile) = params.get_int_list("ThreadTile") {
            if thread_tile.iter().any(|d| *d <= 0) {
                return Some(format!("ThreadTile {:?} has a non-positive dimension", thread_tile));
            }
        }

        for key in ["MacroTile0", "MacroTile1"] {
            if let Some(tile) = params.get_int(key) {
                if tile <= 0 || tile > self.config.max_macro_tile {
                    return Some(format!(
                        "{}={} outside (0, {}]",
                        key, tile, self.config.max_macro_tile
                    ));
                }
            }
        }

        None
    }
}

impl Default for ParameterRules {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}

impl ValidityRulesTrait for ParameterRules {
    /// @ai:intent Reject keys or values outside the allowed table
    /// @ai:effects pure
    fn check_parameters(&self, params: &ParamBag) -> Result<()> {
        if self.config.allowed.is_empty() {
            return Ok(());
        }

        for (key, value) in params {
            let Some(allowed) = self.config.allowed.get(key) else {
                return Err(TuneError::InvalidParameter {
                    key: key.clone(),
                    value: value.clone(),
                    reason: "unknown parameter".to_string(),
                });
            };

            if !allowed.is_empty() && !allowed.contains(value) {
                return Err(TuneError::InvalidParameter {
                    key: key.clone(),
                    value: value.clone(),
                    reason: format!("allowed values are {}", ParamValue::List(allowed.clone())),
                });
            }
        }

        Ok(())
    }

    /// @ai:intent MacroTileN = WorkGroup[N] * ThreadTile[N] unless given explicitly
    /// @ai:post an overflowing product is left unset
    /// @ai:effects pure
    fn assign_derived(&self, _problem_type: &ProblemType, params: &mut ParamBag) {
        let (Some(workgroup), Some(thread_tile)) =
            (params.get_int_list("WorkGroup"), params.get_int_list("ThreadTile"))
        else {
            return;
        };

        for (dim, key) in ["MacroTile0", "MacroTile1"].iter().enumerate() {
            if params.contains(key) {
                continue;
            }

            if let Some(tile) = workgroup
                .get(dim)
                .zip(thread_tile.get(dim))
                .and_then(|(wg, tt)| wg.checked_mul(*tt))
            {
                params.insert(*key, tile);
            }
        }
    }

    /// @ai:intent Structural validity of a descriptor
    /// @ai:effects pure
    fn validate(&self, _problem_type: &ProblemType, params: &ParamBag) -> Validity {
        if let Some(depth_u) = params.get_int("DepthU") {
            if depth_u <= 0 {
                return Validity::Invalid(format!("DepthU={} must be positive", depth_u));
            }
        }

        if let Some(gsu) = params.get_int("GlobalSplitU") {
            if gsu < 1 {
                return Validity::Invalid(format!("GlobalSplitU={} must be >= 1", gsu));
            }
        }

        match self.check_tiles(params) {
            Some(reason) => Validity::Invalid(reason),
            None => Validity::Valid,
        }
    }
}
