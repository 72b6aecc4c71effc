//! @ai:module:intent YAML input specification: problem types and size groups
//! @ai:module:layer infrastructure
//! @ai:module:public_api InputSpec, ProblemEntry, SizeGroupConfig, StepConfig
//! @ai:module:stateless true

use crate::error::{Result, TuneError};
use crate::solution::{ParamBag, ProblemSizes, ProblemType};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Top-level key accepted when the spec is embedded in a larger document.
const PROBLEMS_KEY: &str = "BenchmarkProblems";

/// @ai:intent Raw fork declaration: ordered single-key maps
pub type ForkDeclaration = Vec<IndexMap<String, serde_yaml::Value>>;

/// @ai:intent One benchmark step as written in the input spec
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct StepConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub constant_parameters: ParamBag,
    #[serde(default)]
    pub fork_parameters: ForkDeclaration,
    #[serde(default)]
    pub custom_kernels: Vec<String>,
    #[serde(default)]
    pub custom_kernel_wildcard: Option<bool>,
    #[serde(default)]
    pub problem_sizes: Option<ProblemSizes>,
    #[serde(default, rename = "Final")]
    pub is_final: bool,
}

/// @ai:intent A problem-size group: shared constants plus its steps
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SizeGroupConfig {
    #[serde(default)]
    pub common_parameters: ParamBag,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
    #[serde(default)]
    pub fork_parameters: ForkDeclaration,
    #[serde(default)]
    pub custom_kernels: Vec<String>,
    #[serde(default)]
    pub custom_kernel_wildcard: bool,
    #[serde(default)]
    pub problem_sizes: ProblemSizes,
    #[serde(default)]
    pub tile_aware_summation_sizes: Vec<u64>,
}

impl SizeGroupConfig {
    /// @ai:intent Whether single-step shorthand keys are present
    /// @ai:effects pure
    pub fn has_shorthand_step(&self) -> bool {
        !self.fork_parameters.is_empty() || !self.custom_kernels.is_empty()
    }
}

/// @ai:intent One input entry: a problem type and its size groups
#[derive(Debug, Clone)]
pub struct ProblemEntry {
    pub problem_type: ProblemType,
    pub groups: Vec<SizeGroupConfig>,
}

/// @ai:intent Ordered list of problem entries to benchmark
#[derive(Debug, Clone, Default)]
pub struct InputSpec {
    pub entries: Vec<ProblemEntry>,
}

impl InputSpec {
    /// @ai:intent Load the input specification from a YAML file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input spec: {}", path.display()))?;
        let spec = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse input spec: {}", path.display()))?;
        Ok(spec)
    }

    /// @ai:intent Parse `[[problemType, group...], ...]`; no groups means one empty group
    /// @ai:effects pure
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(content)?;

        let raw = match document {
            serde_yaml::Value::Mapping(mut map) => map.remove(PROBLEMS_KEY).ok_or_else(|| {
                TuneError::InvalidInputSpec(format!("missing {} list", PROBLEMS_KEY))
            })?,
            other => other,
        };

        let raw_entries: Vec<Vec<serde_yaml::Value>> = serde_yaml::from_value(raw)?;
        let mut entries = Vec::with_capacity(raw_entries.len());

        for (idx, raw_entry) in raw_entries.into_iter().enumerate() {
            let mut items = raw_entry.into_iter();

            let Some(problem_type) = items.next() else {
                return Err(TuneError::InvalidInputSpec(format!(
                    "entry {} has no problem type",
                    idx
                )));
            };

            let problem_type: ProblemType = serde_yaml::from_value(problem_type)?;
            let mut groups = items
                .map(|group| {
                    if group.is_null() {
                        Ok(SizeGroupConfig::default())
                    } else {
                        serde_yaml::from_value(group)
                    }
                })
                .collect::<std::result::Result<Vec<SizeGroupConfig>, _>>()?;

            if groups.is_empty() {
                groups.push(SizeGroupConfig::default());
            }

            entries.push(ProblemEntry {
                problem_type,
                groups,
            });
        }

        Ok(Self { entries })
    }

    /// @ai:intent Every (problem type, group index, group) triple in order
    /// @ai:effects pure
    pub fn pairs(&self) -> impl Iterator<Item = (&ProblemType, usize, &SizeGroupConfig)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .groups
                .iter()
                .enumerate()
                .map(move |(idx, group)| (&entry.problem_type, idx, group))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::DataType;

    const SPEC: &str = r#"
- - OperationType: GEMM
    DataType: s
    TransposeB: true
    Batched: true
  - CommonParameters:
      DepthU: 16
    ForkParameters:
      - WorkGroup: [[16, 16, 1], [8, 8, 1]]
    ProblemSizes:
      - Exact: [128, 128, 1, 128]
  - Steps:
      - ForkParameters:
          - DepthU: [8, 16]
      - Final: true
        ProblemSizes:
          - Range: [[64, 64, 256], [64], [1], [64]]
- - DataType: h
"#;

    #[test]
    fn test_parse_entries_and_groups() {
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();

        assert_eq!(spec.entries.len(), 2);
        assert_eq!(spec.entries[0].groups.len(), 2);
        assert_eq!(spec.entries[0].problem_type.data_type, DataType::Single);
        assert!(spec.entries[0].groups[0].has_shorthand_step());
        assert_eq!(spec.entries[0].groups[1].steps.len(), 2);
        assert!(spec.entries[0].groups[1].steps[1].is_final);
    }

    #[test]
    fn test_entry_without_groups_gets_one_empty_group() {
        let spec = InputSpec::from_yaml_str(SPEC).unwrap();

        assert_eq!(spec.entries[1].groups.len(), 1);
        assert!(spec.entries[1].groups[0].steps.is_empty());
        assert_eq!(spec.pairs().count(), 3);
    }

    #[test]
    fn test_embedded_document() {
        let doc = "BenchmarkProblems:\n  - - DataType: d\n";
        let spec = InputSpec::from_yaml_str(doc).unwrap();
        assert_eq!(spec.entries[0].problem_type.data_type, DataType::Double);
    }

    #[test]
    fn test_unknown_group_key_is_rejected() {
        let doc = "- - DataType: s\n  - Forks: []\n";
        assert!(InputSpec::from_yaml_str(doc).is_err());
    }
}
