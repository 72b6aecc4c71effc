//! @ai:module:intent Problem-size enumeration for a benchmark step
//! @ai:module:layer domain
//! @ai:module:public_api ProblemSizes, SizeEntry, ProblemSize
//! @ai:module:stateless true

use crate::error::{Result, TuneError};
use crate::solution::problem_type::ProblemType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent One concrete problem size: [M, N, (batch,) K]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemSize(pub Vec<u64>);

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", dims.join(","))
    }
}

/// @ai:intent A declared size entry, either exact or a per-index range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSizeEntry", into = "RawSizeEntry")]
pub enum SizeEntry {
    Exact(Vec<u64>),
    Range(Vec<Vec<u64>>),
}

/// Single-key map form: `{Exact: [...]}` or `{Range: [[...], ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct RawSizeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exact: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<Vec<Vec<u64>>>,
}

impl TryFrom<RawSizeEntry> for SizeEntry {
    type Error = String;

    fn try_from(raw: RawSizeEntry) -> std::result::Result<Self, Self::Error> {
        match (raw.exact, raw.range) {
            (Some(dims), None) => Ok(SizeEntry::Exact(dims)),
            (None, Some(ranges)) => Ok(SizeEntry::Range(ranges)),
            _ => Err("size entry needs exactly one of Exact or Range".to_string()),
        }
    }
}

impl From<SizeEntry> for RawSizeEntry {
    fn from(entry: SizeEntry) -> Self {
        match entry {
            SizeEntry::Exact(dims) => RawSizeEntry {
                exact: Some(dims),
                range: None,
            },
            SizeEntry::Range(ranges) => RawSizeEntry {
                exact: None,
                range: Some(ranges),
            },
        }
    }
}

/// @ai:intent Ordered problem-size declaration for a step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemSizes {
    entries: Vec<SizeEntry>,
}

impl ProblemSizes {
    pub fn new(entries: Vec<SizeEntry>) -> Self {
        Self { entries }
    }

    /// @ai:intent Exact-only size set
    /// @ai:effects pure
    pub fn exact(sizes: Vec<Vec<u64>>) -> Self {
        Self {
            entries: sizes.into_iter().map(SizeEntry::Exact).collect(),
        }
    }

    pub fn entries(&self) -> &[SizeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// @ai:intent Expand every entry into exact sizes, in declaration order
    /// @ai:pre each entry has problem_type.num_indices() dimensions
    /// @ai:effects pure
    pub fn expand(&self, problem_type: &ProblemType) -> Result<Vec<ProblemSize>> {
        let expected = problem_type.num_indices();
        let mut sizes = Vec::new();

        for entry in &self.entries {
            match entry {
                SizeEntry::Exact(dims) => {
                    check_rank(dims.len(), expected, problem_type)?;
                    sizes.push(ProblemSize(dims.clone()));
                }
                SizeEntry::Range(ranges) => {
                    check_rank(ranges.len(), expected, problem_type)?;
                    let axes = ranges
                        .iter()
                        .map(|r| expand_range(r))
                        .collect::<Result<Vec<_>>>()?;
                    sizes.extend(cartesian(&axes).into_iter().map(ProblemSize));
                }
            }
        }

        Ok(sizes)
    }

    /// @ai:intent Number of exact sizes after expansion, without validation
    /// @ai:effects pure
    pub fn total(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                SizeEntry::Exact(_) => 1,
                SizeEntry::Range(ranges) => ranges
                    .iter()
                    .map(|r| expand_range(r).map(|v| v.len()).unwrap_or(0))
                    .product(),
            })
            .sum()
    }
}

fn check_rank(found: usize, expected: usize, problem_type: &ProblemType) -> Result<()> {
    if found != expected {
        return Err(TuneError::InvalidProblemSize(format!(
            "{} expects {} indices per size, got {}",
            problem_type, expected, found
        )));
    }
    Ok(())
}

/// [v] | [start, stop] | [start, step, stop], inclusive
fn expand_range(range: &[u64]) -> Result<Vec<u64>> {
    let (start, step, stop) = match range {
        [v] => (*v, 1, *v),
        [start, stop] => (*start, 1, *stop),
        [start, step, stop] => (*start, *step, *stop),
        _ => {
            return Err(TuneError::InvalidProblemSize(format!(
                "range {:?} must have 1 to 3 elements",
                range
            )))
        }
    };

    if step == 0 || stop < start {
        return Err(TuneError::InvalidProblemSize(format!(
            "range {:?} is empty or has a zero step",
            range
        )));
    }

    Ok((start..=stop).step_by(step as usize).collect())
}

/// Last axis varies fastest.
fn cartesian(axes: &[Vec<u64>]) -> Vec<Vec<u64>> {
    axes.iter().fold(vec![Vec::new()], |acc, axis| {
        acc.iter()
            .flat_map(|prefix| {
                axis.iter().map(move |v| {
                    let mut next = prefix.clone();
                    next.push(*v);
                    next
                })
            })
            .collect()
    })
}
