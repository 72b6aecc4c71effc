//! @ai:module:intent Hand-authored kernel configurations loaded by name
//! @ai:module:layer application
//! @ai:module:public_api KernelStoreTrait, AssemblyKernelStore, CustomKernelConfig, CustomKernelResolver
//! @ai:module:stateless true

use crate::error::{Result, TuneError};
use crate::solution::descriptor::{Solution, CUSTOM_KERNEL_NAME};
use crate::solution::params::ParamBag;
use crate::solution::problem_type::ProblemType;
use crate::solution::rules::ValidityRulesTrait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Language tag forced onto every hand-authored kernel.
pub const ASSEMBLY_LANGUAGE: &str = "Assembly";

/// @ai:intent Stored configuration of one custom kernel
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomKernelConfig {
    #[serde(rename = "ProblemType")]
    pub problem_type: ProblemType,
    #[serde(flatten)]
    pub params: ParamBag,
}

/// @ai:intent Trait for the named-kernel store
pub trait KernelStoreTrait: Send + Sync {
    /// @ai:intent Load a kernel's configuration by name from a directory
    fn load(&self, name: &str, dir: &Path) -> Result<CustomKernelConfig>;
}

/// @ai:intent Reads `<dir>/<name>.s` and parses its embedded YAML config block
pub struct AssemblyKernelStore;

#[derive(Debug, Deserialize)]
struct KernelHeader {
    #[serde(rename = "custom.config")]
    config: CustomKernelConfig,
}

impl AssemblyKernelStore {
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Path of the assembly source for a kernel name
    /// @ai:effects pure
    pub fn kernel_path(name: &str, dir: &Path) -> PathBuf {
        dir.join(format!("{}.s", name))
    }

    /// @ai:intent Kernel names present in a directory, sorted
    /// @ai:effects fs:read
    pub fn available(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "s").unwrap_or(false))
            .filter_map(|e| e.path().file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }

    /// @ai:intent Extract and parse the `---` ... `...` YAML block of a kernel source
    /// @ai:effects pure
    pub fn parse_source(source: &str, path: &Path) -> Result<CustomKernelConfig> {
        let block = Regex::new(r"(?ms)^---[ \t]*\r?\n(.*?)^\.\.\.[ \t]*$")
            .map_err(|e| TuneError::CustomKernelFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let Some(captures) = block.captures(source) else {
            return Err(TuneError::CustomKernelFormat {
                path: path.to_path_buf(),
                message: "no '---' ... '...' configuration block".to_string(),
            });
        };

        let header: KernelHeader =
            serde_yaml::from_str(&captures[1]).map_err(|e| TuneError::CustomKernelFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(header.config)
    }
}

impl Default for AssemblyKernelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelStoreTrait for AssemblyKernelStore {
    /// @ai:intent Load a custom kernel config from its assembly file
    /// @ai:effects fs:read
    fn load(&self, name: &str, dir: &Path) -> Result<CustomKernelConfig> {
        let path = Self::kernel_path(name, dir);

        if !path.is_file() {
            tracing::debug!("Known custom kernels in {}: {:?}", dir.display(), Self::available(dir));
            return Err(TuneError::CustomKernelNotFound {
                name: name.to_string(),
                dir: dir.to_path_buf(),
            });
        }

        let source = std::fs::read_to_string(&path)?;
        Self::parse_source(&source, &path)
    }
}

/// @ai:intent Turns named custom kernels into solution descriptors for a problem type
pub struct CustomKernelResolver<'a> {
    store: &'a dyn KernelStoreTrait,
    rules: &'a dyn ValidityRulesTrait,
    directory: &'a Path,
    report_rejections: bool,
}

impl<'a> CustomKernelResolver<'a> {
    /// @ai:intent Create a resolver reading kernels from `directory`
    /// @ai:effects pure
    pub fn new(
        store: &'a dyn KernelStoreTrait,
        rules: &'a dyn ValidityRulesTrait,
        directory: &'a Path,
        report_rejections: bool,
    ) -> Self {
        Self {
            store,
            rules,
            directory,
            report_rejections,
        }
    }

    /// @ai:intent Descriptor for one kernel: checked params, Assembly language, name tag
    /// @ai:effects fs:read
    fn solution_for(&self, name: &str) -> Result<Solution> {
        let config = self.store.load(name, self.directory)?;
        self.rules.check_parameters(&config.params)?;

        let mut params = config.params;
        params.insert("KernelLanguage", ASSEMBLY_LANGUAGE);
        params.insert(CUSTOM_KERNEL_NAME, name);

        Ok(Solution::new(config.problem_type, params, self.rules))
    }

    /// @ai:intent Resolve kernels in input order, keeping matching valid ones
    /// @ai:pre fail_on_mismatch turns a problem-type mismatch into a fatal error
    /// @ai:effects fs:read
    pub fn resolve(
        &self,
        problem_type: &ProblemType,
        kernel_names: &[String],
        fail_on_mismatch: bool,
    ) -> Result<Vec<Solution>> {
        let mut solutions = Vec::new();

        for name in kernel_names {
            tracing::info!("Processing custom kernel {}", name);
            let solution = self.solution_for(name)?;

            if solution.problem_type() != problem_type {
                if fail_on_mismatch {
                    let (config_only, kernel_only) =
                        problem_type.asymmetric_difference(solution.problem_type());
                    return Err(TuneError::ProblemTypeMismatch {
                        kernel: name.clone(),
                        config_only,
                        kernel_only,
                    });
                }

                tracing::info!("Rejected {}: problem type doesn't match", name);
                continue;
            }

            tracing::info!("Added {} to solutions", name);

            if solution.is_valid() {
                solutions.push(solution);
            } else if self.report_rejections {
                tracing::info!(
                    "rejecting solution {}: {}",
                    solution,
                    solution.rejection_reason().unwrap_or("invalid")
                );
            }
        }

        Ok(solutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::problem_type::DataType;
    use crate::solution::rules::ParameterRules;
    use tempfile::TempDir;

    const SGEMM_KERNEL: &str = r#"/******************************************/
/* hand tuned sgemm                        */
/******************************************/
/*
---
custom.config:
  ProblemType:
    OperationType: GEMM
    DataType: s
    TransposeA: false
    TransposeB: true
    Batched: true
  MacroTile0: 128
  MacroTile1: 128
  DepthU: 16
  WorkGroup: [16, 16, 1]
...
*/
.amdgcn_target "amdgcn-amd-amdhsa--gfx90a"
"#;

    const DGEMM_KERNEL: &str = "---\ncustom.config:\n  ProblemType:\n    DataType: d\n    TransposeB: true\n  DepthU: 8\n...\n";

    fn write_kernel(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(format!("{}.s", name)), body).unwrap();
    }

    fn sgemm_nt() -> ProblemType {
        let mut pt = ProblemType::gemm(DataType::Single);
        pt.transpose_b = true;
        pt
    }

    #[test]
    fn test_parse_source_extracts_config() {
        let config = AssemblyKernelStore::parse_source(SGEMM_KERNEL, Path::new("k.s")).unwrap();
        assert_eq!(config.problem_type, sgemm_nt());
        assert_eq!(config.params.get_int("MacroTile0"), Some(128));
        assert_eq!(config.params.get_int_list("WorkGroup"), Some(vec![16, 16, 1]));
    }

    #[test]
    fn test_missing_block_is_format_error() {
        let result = AssemblyKernelStore::parse_source("s_endpgm\n", Path::new("k.s"));
        assert!(matches!(result, Err(TuneError::CustomKernelFormat { .. })));
    }

    #[test]
    fn test_resolve_tags_matching_kernel() {
        let temp = TempDir::new().unwrap();
        write_kernel(temp.path(), "SGEMM_NT_MT128", SGEMM_KERNEL);

        let store = AssemblyKernelStore::new();
        let rules = ParameterRules::default();
        let resolver = CustomKernelResolver::new(&store, &rules, temp.path(), false);

        let solutions = resolver
            .resolve(&sgemm_nt(), &["SGEMM_NT_MT128".to_string()], true)
            .unwrap();

        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].custom_kernel_name(), Some("SGEMM_NT_MT128"));
        assert_eq!(
            solutions[0].get("KernelLanguage").and_then(|v| v.as_str()),
            Some(ASSEMBLY_LANGUAGE)
        );
    }

    #[test]
    fn test_mismatch_is_fatal_when_strict() {
        let temp = TempDir::new().unwrap();
        write_kernel(temp.path(), "DGEMM", DGEMM_KERNEL);

        let store = AssemblyKernelStore::new();
        let rules = ParameterRules::default();
        let resolver = CustomKernelResolver::new(&store, &rules, temp.path(), false);

        let err = resolver
            .resolve(&sgemm_nt(), &["DGEMM".to_string()], true)
            .unwrap_err();

        match err {
            TuneError::ProblemTypeMismatch { kernel, config_only, kernel_only } => {
                assert_eq!(kernel, "DGEMM");
                assert!(config_only.iter().any(|(k, _)| k == "DataType"));
                assert!(kernel_only.iter().any(|(k, _)| k == "DataType"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_explicit_dest_type_matches_implicit() {
        let temp = TempDir::new().unwrap();
        write_kernel(
            temp.path(),
            "SGEMM_DEST",
            "---\ncustom.config:\n  ProblemType:\n    DataType: s\n    DestDataType: s\n    TransposeB: true\n  DepthU: 16\n...\n",
        );

        let store = AssemblyKernelStore::new();
        let rules = ParameterRules::default();
        let resolver = CustomKernelResolver::new(&store, &rules, temp.path(), false);

        let strict = resolver
            .resolve(&sgemm_nt(), &["SGEMM_DEST".to_string()], true)
            .unwrap();
        assert_eq!(strict.len(), 1);

        let lenient = resolver
            .resolve(&sgemm_nt(), &["SGEMM_DEST".to_string()], false)
            .unwrap();
        assert_eq!(lenient.len(), 1);
    }

    #[test]
    fn test_mismatch_is_skipped_with_wildcard() {
        let temp = TempDir::new().unwrap();
        write_kernel(temp.path(), "DGEMM", DGEMM_KERNEL);
        write_kernel(temp.path(), "SGEMM", SGEMM_KERNEL);

        let store = AssemblyKernelStore::new();
        let rules = ParameterRules::default();
        let resolver = CustomKernelResolver::new(&store, &rules, temp.path(), false);

        let solutions = resolver
            .resolve(&sgemm_nt(), &["DGEMM".to_string(), "SGEMM".to_string()], false)
            .unwrap();

        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].custom_kernel_name(), Some("SGEMM"));
        assert_eq!(AssemblyKernelStore::available(temp.path()), vec!["DGEMM", "SGEMM"]);
    }

    #[test]
    fn test_unknown_kernel_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = AssemblyKernelStore::new();

        assert!(matches!(
            store.load("Nope", temp.path()),
            Err(TuneError::CustomKernelNotFound { .. })
        ));
    }
}
