//! @ai:module:intent Error taxonomy for enumeration and pipeline failures
//! @ai:module:layer domain
//! @ai:module:public_api TuneError, Result
//! @ai:module:stateless true

use crate::solution::ParamValue;
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Fatal conditions that stop a tuning run
#[derive(Error, Debug)]
pub enum TuneError {
    #[error("step {step}: parameters resulted in 0 valid solutions.\n{hint}")]
    NoValidSolutions { step: String, hint: String },

    #[error("step {step}: no solutions survived kernel generation")]
    NoGeneratedSolutions { step: String },

    #[error(
        "problem type of custom kernel {kernel} does not match the benchmark problem type.\n\
         Differing parameters:\n\tConfig values:\n\t{}\n\tCustom kernel values:\n\t{}",
        format_entries(.config_only),
        format_entries(.kernel_only)
    )]
    ProblemTypeMismatch {
        kernel: String,
        config_only: Vec<(String, ParamValue)>,
        kernel_only: Vec<(String, ParamValue)>,
    },

    #[error("invalid parameter {key}={value}: {reason}")]
    InvalidParameter {
        key: String,
        value: ParamValue,
        reason: String,
    },

    #[error("custom kernel {name} not found in {}", .dir.display())]
    CustomKernelNotFound { name: String, dir: PathBuf },

    #[error("malformed custom kernel {}: {message}", .path.display())]
    CustomKernelFormat { path: PathBuf, message: String },

    #[error("invalid input specification: {0}")]
    InvalidInputSpec(String),

    #[error("steps {0:?} are all flagged Final; at most one step may be")]
    MultipleFinalSteps(Vec<usize>),

    #[error("invalid problem size: {0}")]
    InvalidProblemSize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TuneError>;

fn format_entries(entries: &[(String, ParamValue)]) -> String {
    let rendered: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("({}, {})", key, value))
        .collect();
    format!("[{}]", rendered.join(", "))
}
