//! @ai:module:intent Minimal solution-selection library for a benchmark step
//! @ai:module:layer infrastructure
//! @ai:module:public_api SelectionLibrary, LibraryEntry, LIBRARY_FILE_STEM
//! @ai:module:stateless true

use crate::config::LibraryFormat;
use crate::solution::{ProblemType, Solution};
use crate::workspace::write_atomic;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const LIBRARY_FILE_STEM: &str = "TileLibrary";

/// @ai:intent One selectable solution in the library
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LibraryEntry {
    pub index: usize,
    pub name: String,
    pub solution: Solution,
}

/// @ai:intent Benchmarking library: every solution selectable by index
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelectionLibrary {
    pub library_type: &'static str,
    pub problem_type: ProblemType,
    pub solutions: Vec<LibraryEntry>,
}

impl SelectionLibrary {
    /// @ai:intent Build from surviving solutions and their minimized names
    /// @ai:pre names.len() == solutions.len()
    /// @ai:effects pure
    pub fn benchmarking(problem_type: &ProblemType, solutions: &[Solution], names: &[String]) -> Self {
        let solutions = solutions
            .iter()
            .zip(names)
            .enumerate()
            .map(|(index, (solution, name))| LibraryEntry {
                index,
                name: name.clone(),
                solution: solution.clone(),
            })
            .collect();

        Self {
            library_type: "Benchmark",
            problem_type: problem_type.clone(),
            solutions,
        }
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// @ai:intent Serialize to `<dir>/TileLibrary.<ext>` in the configured format
    /// @ai:effects fs:write
    pub fn write(&self, dir: &Path, format: LibraryFormat) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", LIBRARY_FILE_STEM, format.extension()));

        let content = match format {
            LibraryFormat::Yaml => serde_yaml::to_string(self)?,
            LibraryFormat::Json => serde_json::to_string_pretty(self)?,
        };

        write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{DataType, ParamBag, ParameterRules};
    use tempfile::TempDir;

    #[test]
    fn test_write_both_formats() {
        let temp = TempDir::new().unwrap();
        let pt = ProblemType::gemm(DataType::Single);
        let solution = Solution::new(
            pt.clone(),
            ParamBag::new().with("DepthU", 16),
            &ParameterRules::default(),
        );
        let library =
            SelectionLibrary::benchmarking(&pt, &[solution], &["Cijk_Ailk_Bljk_SB".to_string()]);

        let yaml = library.write(temp.path(), LibraryFormat::Yaml).unwrap();
        let json = library.write(temp.path(), LibraryFormat::Json).unwrap();

        assert!(yaml.ends_with("TileLibrary.yaml"));
        assert!(json.ends_with("TileLibrary.json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(parsed["Solutions"][0]["Index"], 0);
        assert_eq!(parsed["Solutions"][0]["Solution"]["DepthU"], 16);
    }
}
