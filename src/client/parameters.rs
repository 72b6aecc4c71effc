//! @ai:module:intent Client-facing configuration file for one benchmark step
//! @ai:module:layer infrastructure
//! @ai:module:public_api ClientParameters, ClientConfigWriter, partial_results_path
//! @ai:module:stateless true

use crate::solution::ProblemSize;
use crate::workspace::write_atomic;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const CLIENT_PARAMETERS_FILE: &str = "ClientParameters.ini";

/// @ai:intent Temporary name the client writes results to before promotion
/// @ai:effects pure
pub fn partial_results_path(results_path: &Path) -> PathBuf {
    let mut name = results_path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// @ai:intent Values written to ClientParameters.ini
#[derive(Debug, Clone)]
pub struct ClientParameters {
    pub library_file: PathBuf,
    pub code_objects: Vec<PathBuf>,
    pub results_file: PathBuf,
    pub problem_sizes: Vec<ProblemSize>,
    pub num_solutions: usize,
    pub tile_aware_selection: bool,
    pub benchmark: bool,
}

impl ClientParameters {
    /// @ai:intent Render as `key=value` lines; repeated keys for lists
    /// @ai:effects pure
    pub fn render(&self) -> String {
        let mut out = String::new();
        let flag = |b: bool| if b { "true" } else { "false" };

        let _ = writeln!(out, "library-file={}", self.library_file.display());
        for code_object in &self.code_objects {
            let _ = writeln!(out, "code-object={}", code_object.display());
        }
        let _ = writeln!(out, "results-file={}", partial_results_path(&self.results_file).display());
        let _ = writeln!(out, "num-solutions={}", self.num_solutions);
        let _ = writeln!(out, "benchmark={}", flag(self.benchmark));
        let _ = writeln!(out, "tile-aware-selection={}", flag(self.tile_aware_selection));
        for size in &self.problem_sizes {
            let _ = writeln!(out, "problem-size={}", size);
        }

        out
    }
}

/// @ai:intent Writes the client configuration into a step directory
pub struct ClientConfigWriter;

impl ClientConfigWriter {
    /// @ai:intent Write `<step_dir>/ClientParameters.ini`
    /// @ai:effects fs:write
    pub fn write(step_dir: &Path, parameters: &ClientParameters) -> Result<PathBuf> {
        let path = step_dir.join(CLIENT_PARAMETERS_FILE);
        write_atomic(&path, parameters.render().as_bytes())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_results_path_appends_suffix() {
        assert_eq!(
            partial_results_path(Path::new("group/Data/00_Final.csv")),
            PathBuf::from("group/Data/00_Final.csv.partial")
        );
    }

    #[test]
    fn test_writes_client_parameters() {
        let temp = TempDir::new().unwrap();
        let parameters = ClientParameters {
            library_file: PathBuf::from("source/library/TileLibrary.yaml"),
            code_objects: vec![PathBuf::from("library/a.co")],
            results_file: temp.path().join("00_Final.csv"),
            problem_sizes: vec![ProblemSize(vec![4608, 2304, 1, 256])],
            num_solutions: 2,
            tile_aware_selection: true,
            benchmark: true,
        };

        let path = ClientConfigWriter::write(temp.path(), &parameters).unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("code-object=library/a.co"));
        assert!(content.contains("00_Final.csv.partial"));
        assert!(content.contains("problem-size=4608,2304,1,256"));
        assert!(content.contains("tile-aware-selection=true"));
    }
}
