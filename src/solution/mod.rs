//! @ai:module:intent Solution-space model: parameters, problem types, sizes, enumeration
//! @ai:module:layer domain
//! @ai:module:public_api ParamValue, ParamBag, ProblemType, ProblemSizes, Solution, ParameterExpander, CustomKernelResolver

pub mod custom;
pub mod descriptor;
pub mod expander;
pub mod forks;
pub mod params;
pub mod problem_type;
pub mod rules;
pub mod sizes;

pub use custom::{AssemblyKernelStore, CustomKernelConfig, CustomKernelResolver, KernelStoreTrait};
pub use descriptor::{Solution, CUSTOM_KERNEL_NAME};
pub use expander::ParameterExpander;
pub use forks::{construct_fork_permutations, ForkParameter, ForkParameters};
pub use params::{abbreviate, ParamBag, ParamValue};
pub use problem_type::{DataType, OperationType, ProblemType};
pub use rules::{ParameterRules, Validity, ValidityRulesTrait};
pub use sizes::{ProblemSize, ProblemSizes, SizeEntry};
