//! @ai:module:intent Check that the external generator and client are installed
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolchainValidator, ToolchainStatus, MissingTool
//! @ai:module:stateless true

use crate::config::ToolsConfig;
use std::path::{Path, PathBuf};
use std::process::Command;

/// @ai:intent An external tool the pipeline drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRole {
    Generator,
    Client,
}

impl ToolRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolRole::Generator => "kernel generator",
            ToolRole::Client => "benchmark client",
        }
    }
}

/// @ai:intent Status of toolchain validation
#[derive(Debug, Default)]
pub struct ToolchainStatus {
    pub missing_tools: Vec<MissingTool>,
}

impl ToolchainStatus {
    pub fn is_complete(&self) -> bool {
        self.missing_tools.is_empty()
    }
}

/// @ai:intent Information about a missing tool
#[derive(Debug)]
pub struct MissingTool {
    pub role: ToolRole,
    pub executable: PathBuf,
    pub install_hint: &'static str,
}

/// @ai:intent Probes the configured tools
pub struct ToolchainValidator;

impl ToolchainValidator {
    /// @ai:effects pure
    fn install_hint(role: ToolRole) -> &'static str {
        match role {
            ToolRole::Generator => "Set [tools].generator to the kernel generator executable",
            ToolRole::Client => "Set [tools].client to the benchmark client executable",
        }
    }

    /// @ai:intent Check if a command runs with `--version`
    /// @ai:effects io
    fn is_tool_available(tool: &Path) -> bool {
        Command::new(tool)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// @ai:intent Validate the generator and client executables
    /// @ai:effects io
    pub fn validate(tools: &ToolsConfig) -> ToolchainStatus {
        let mut status = ToolchainStatus::default();

        for (role, executable) in [
            (ToolRole::Generator, &tools.generator),
            (ToolRole::Client, &tools.client),
        ] {
            if !Self::is_tool_available(executable) {
                status.missing_tools.push(MissingTool {
                    role,
                    executable: executable.clone(),
                    install_hint: Self::install_hint(role),
                });
            }
        }

        status
    }

    /// @ai:intent Fail with install hints when any tool is missing
    /// @ai:effects io
    pub fn require(tools: &ToolsConfig) -> anyhow::Result<()> {
        let status = Self::validate(tools);

        for missing in &status.missing_tools {
            tracing::error!(
                "{} '{}' not found. {}",
                missing.role.as_str(),
                missing.executable.display(),
                missing.install_hint
            );
        }

        if !status.is_complete() {
            anyhow::bail!(
                "{} required tool(s) missing; use --dry-run to run without them",
                status.missing_tools.len()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_hints_name_config_keys() {
        assert!(ToolchainValidator::install_hint(ToolRole::Generator).contains("[tools].generator"));
        assert!(ToolchainValidator::install_hint(ToolRole::Client).contains("[tools].client"));
    }

    #[test]
    fn test_missing_tools_are_reported() {
        let tools = ToolsConfig {
            client: PathBuf::from("nonexistent_client_xyz"),
            generator: PathBuf::from("nonexistent_generator_xyz"),
            cxx_compiler: "hipcc".to_string(),
        };

        let status = ToolchainValidator::validate(&tools);
        assert_eq!(status.missing_tools.len(), 2);
        assert!(ToolchainValidator::require(&tools).is_err());
    }
}
