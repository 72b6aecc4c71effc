//! @ai:module:intent Configuration structs for the tuning pipeline
//! @ai:module:layer infrastructure
//! @ai:module:public_api TuneConfig, PathConfig, RunConfig, ToolsConfig, RulesConfig, LibraryFormat
//! @ai:module:stateless true

use crate::solution::ParamValue;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// @ai:intent Process-wide tunables, loaded once before the pipeline starts
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuneConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

/// @ai:intent Output and input directory layout
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_working_path")]
    pub working_path: PathBuf,
    #[serde(default = "default_problems_path")]
    pub benchmark_problems_path: PathBuf,
    #[serde(default = "default_data_path")]
    pub benchmark_data_path: PathBuf,
    #[serde(default = "default_custom_kernel_dir")]
    pub custom_kernel_dir: PathBuf,
}

/// @ai:intent Run policy flags
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub force_redo: bool,
    #[serde(default = "default_true")]
    pub exit_on_fails: bool,
    #[serde(default)]
    pub print_solution_rejection_reason: bool,
    #[serde(default)]
    pub csv_export_winner: bool,
    #[serde(default = "default_true")]
    pub merge_files: bool,
    #[serde(default)]
    pub library_format: LibraryFormat,
    #[serde(default)]
    pub dry_run: bool,
}

/// @ai:intent External executables driven by the pipeline
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_client")]
    pub client: PathBuf,
    #[serde(default = "default_generator")]
    pub generator: PathBuf,
    #[serde(default = "default_cxx_compiler")]
    pub cxx_compiler: String,
}

/// @ai:intent Parameter validity rule tunables
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_max_workgroup_size")]
    pub max_workgroup_size: i64,
    #[serde(default = "default_max_macro_tile")]
    pub max_macro_tile: i64,
    /// Allowed values per parameter; an empty table accepts every key.
    #[serde(default)]
    pub allowed: BTreeMap<String, Vec<ParamValue>>,
}

/// @ai:intent Serialization format of the selection library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LibraryFormat {
    #[default]
    Yaml,
    Json,
}

impl LibraryFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LibraryFormat::Yaml => "yaml",
            LibraryFormat::Json => "json",
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            working_path: default_working_path(),
            benchmark_problems_path: default_problems_path(),
            benchmark_data_path: default_data_path(),
            custom_kernel_dir: default_custom_kernel_dir(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            force_redo: false,
            exit_on_fails: true,
            print_solution_rejection_reason: false,
            csv_export_winner: false,
            merge_files: true,
            library_format: LibraryFormat::default(),
            dry_run: false,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            client: default_client(),
            generator: default_generator(),
            cxx_compiler: default_cxx_compiler(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_workgroup_size: default_max_workgroup_size(),
            max_macro_tile: default_max_macro_tile(),
            allowed: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_working_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_problems_path() -> PathBuf {
    PathBuf::from("1_BenchmarkProblems")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("2_BenchmarkData")
}

fn default_custom_kernel_dir() -> PathBuf {
    PathBuf::from("CustomKernels")
}

fn default_client() -> PathBuf {
    PathBuf::from("tilebench-client")
}

fn default_generator() -> PathBuf {
    PathBuf::from("tilebench-codegen")
}

fn default_cxx_compiler() -> String {
    "hipcc".to_string()
}

fn default_max_workgroup_size() -> i64 {
    256
}

fn default_max_macro_tile() -> i64 {
    256
}

impl TuneConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Directory holding the per-group benchmark trees
    /// @ai:effects pure
    pub fn problems_root(&self) -> PathBuf {
        self.paths.working_path.join(&self.paths.benchmark_problems_path)
    }

    /// @ai:intent Directory receiving promoted results
    /// @ai:effects pure
    pub fn data_root(&self) -> PathBuf {
        self.paths.working_path.join(&self.paths.benchmark_data_path)
    }

    /// @ai:intent Suffix appended to promoted result names
    /// @ai:effects pure
    pub fn promoted_suffix(&self) -> &'static str {
        if self.run.csv_export_winner {
            "_CSVWinner"
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: TuneConfig = toml::from_str(
            r#"
[run]
force_redo = true
library_format = "json"

[rules.allowed]
DepthU = [8, 16, 32]
"#,
        )
        .unwrap();

        assert!(config.run.force_redo);
        assert!(config.run.exit_on_fails);
        assert_eq!(config.run.library_format, LibraryFormat::Json);
        assert_eq!(config.rules.max_workgroup_size, 256);
        assert_eq!(config.rules.allowed["DepthU"].len(), 3);
        assert_eq!(config.paths.benchmark_problems_path, PathBuf::from("1_BenchmarkProblems"));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tilebench.toml");

        let mut config = TuneConfig::default();
        config.run.csv_export_winner = true;
        config.save(&path).unwrap();

        let loaded = TuneConfig::load(&path).unwrap();
        assert!(loaded.run.csv_export_winner);
        assert_eq!(loaded.promoted_suffix(), "_CSVWinner");
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        let err = TuneConfig::load(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));

        let broken = temp.path().join("broken.toml");
        std::fs::write(&broken, "[run\n").unwrap();
        let err = TuneConfig::load(&broken).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
