//! @ai:module:intent Kernel generator/compiler collaborator
//! @ai:module:layer infrastructure
//! @ai:module:public_api CodeGeneratorTrait, GenerationRequest, GenerationOutcome, CommandGenerator, MockCodeGenerator
//! @ai:module:stateless true

use crate::codegen::kernel::{HelperKernel, KernelUnit};
use crate::solution::{ProblemType, Solution};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// @ai:intent A solution as handed to the generator, with its assigned names
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedSolution {
    pub serial_name: String,
    pub min_name: String,
    pub solution: Solution,
}

/// @ai:intent A kernel as handed to the generator, with its assigned names
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedKernel {
    pub full_name: String,
    pub serial_name: String,
    pub min_name: String,
    pub kernel: KernelUnit,
}

/// @ai:intent Everything the generator needs to materialize one step
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerationRequest {
    pub output_dir: PathBuf,
    pub compiler: String,
    pub problem_type: ProblemType,
    pub solutions: Vec<NamedSolution>,
    pub kernels: Vec<NamedKernel>,
    pub helper_kernels: Vec<String>,
    pub merge_files: bool,
    pub enable_half: bool,
    pub error_tolerant: bool,
}

impl GenerationRequest {
    pub fn helper_names(helpers: &[HelperKernel]) -> Vec<String> {
        helpers.iter().map(HelperKernel::name).collect()
    }
}

/// @ai:intent Code objects produced, plus indices of solutions that failed to generate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerationOutcome {
    pub code_objects: Vec<PathBuf>,
    #[serde(default)]
    pub failed: Vec<usize>,
}

/// @ai:intent Trait for the external generator/compiler
pub trait CodeGeneratorTrait: Send + Sync {
    /// @ai:intent Generate sources and code objects; per-solution failures go in the outcome
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome>;
}

/// @ai:intent Runs the configured generator executable over a JSON request file
pub struct CommandGenerator {
    executable: PathBuf,
}

impl CommandGenerator {
    /// @ai:intent Create a generator for an executable
    /// @ai:effects pure
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn request_path(output_dir: &Path) -> PathBuf {
        output_dir.join("generation_request.json")
    }

    fn outcome_path(output_dir: &Path) -> PathBuf {
        output_dir.join("generation_outcome.json")
    }
}

impl CodeGeneratorTrait for CommandGenerator {
    /// @ai:intent Write request, run generator, read outcome
    /// @ai:effects fs:write, fs:read, io
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let request_path = Self::request_path(&request.output_dir);
        let outcome_path = Self::outcome_path(&request.output_dir);

        let json = serde_json::to_string_pretty(request)?;
        std::fs::write(&request_path, json)
            .with_context(|| format!("Failed to write {}", request_path.display()))?;

        let output = Command::new(&self.executable)
            .arg("--request")
            .arg(&request_path)
            .arg("--outcome")
            .arg(&outcome_path)
            .current_dir(&request.output_dir)
            .output()
            .with_context(|| {
                format!("Failed to execute generator {}", self.executable.display())
            })?;

        if !output.status.success() {
            anyhow::bail!(
                "Generator exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let content = std::fs::read_to_string(&outcome_path)
            .with_context(|| format!("Failed to read {}", outcome_path.display()))?;
        let outcome: GenerationOutcome = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", outcome_path.display()))?;

        Ok(outcome)
    }
}

/// @ai:intent Generator stand-in for dry runs and tests; fails a fixed set of solutions
#[derive(Debug, Default)]
pub struct MockCodeGenerator {
    failing: BTreeSet<usize>,
}

impl MockCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Mark solution indices that will fail to generate
    /// @ai:effects pure
    pub fn with_failures(failing: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: failing.into_iter().collect(),
        }
    }
}

impl CodeGeneratorTrait for MockCodeGenerator {
    /// @ai:intent Emit one placeholder code object; report configured failures
    /// @ai:effects fs:write
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let library_dir = request.output_dir.join("library");
        std::fs::create_dir_all(&library_dir)?;

        let code_object = library_dir.join(format!("{}.co", request.problem_type));
        let names: Vec<&str> = request.kernels.iter().map(|k| k.serial_name.as_str()).collect();
        std::fs::write(&code_object, names.join("\n"))?;

        let failed = self
            .failing
            .iter()
            .copied()
            .filter(|idx| *idx < request.solutions.len())
            .collect();

        Ok(GenerationOutcome {
            code_objects: vec![code_object],
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::DataType;
    use tempfile::TempDir;

    fn request(dir: &Path, solutions: usize) -> GenerationRequest {
        let rules = crate::solution::ParameterRules::default();
        let pt = ProblemType::gemm(DataType::Single);

        GenerationRequest {
            output_dir: dir.to_path_buf(),
            compiler: "hipcc".to_string(),
            problem_type: pt.clone(),
            solutions: (0..solutions)
                .map(|idx| NamedSolution {
                    serial_name: format!("S{}", idx),
                    min_name: format!("sol{}", idx),
                    solution: Solution::new(
                        pt.clone(),
                        crate::solution::ParamBag::new().with("DepthU", 8 * (idx as i64 + 1)),
                        &rules,
                    ),
                })
                .collect(),
            kernels: Vec::new(),
            helper_kernels: Vec::new(),
            merge_files: true,
            enable_half: false,
            error_tolerant: true,
        }
    }

    #[test]
    fn test_mock_reports_configured_failures() {
        let temp = TempDir::new().unwrap();
        let generator = MockCodeGenerator::with_failures([1, 7]);

        let outcome = generator.generate(&request(temp.path(), 3)).unwrap();
        assert_eq!(outcome.failed, vec![1]);
        assert_eq!(outcome.code_objects.len(), 1);
        assert!(outcome.code_objects[0].exists());
    }

    #[test]
    fn test_outcome_json_failed_defaults_empty() {
        let outcome: GenerationOutcome =
            serde_json::from_str(r#"{"CodeObjects": ["library/a.co"]}"#).unwrap();
        assert_eq!(outcome.code_objects, vec![PathBuf::from("library/a.co")]);
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_command_generator_missing_executable() {
        let temp = TempDir::new().unwrap();
        let generator = CommandGenerator::new("nonexistent_generator_xyz");
        assert!(generator.generate(&request(temp.path(), 1)).is_err());
    }
}
