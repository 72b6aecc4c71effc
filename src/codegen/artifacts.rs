//! @ai:module:intent Materialize a step's solutions into code objects, library and client config
//! @ai:module:layer application
//! @ai:module:public_api StepArtifactBuilder, StepLayout, MaterializedStep, tile_probe_sizes
//! @ai:module:stateless true

use crate::client::{ClientConfigWriter, ClientParameters};
use crate::codegen::generator::{CodeGeneratorTrait, GenerationRequest, NamedKernel, NamedSolution};
use crate::codegen::kernel::KernelSet;
use crate::codegen::library::SelectionLibrary;
use crate::codegen::naming::StepNames;
use crate::config::TuneConfig;
use crate::error::TuneError;
use crate::solution::{ProblemSize, ProblemSizes, ProblemType, Solution};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Probe M/N are this multiple of the largest macro tile.
pub const TILE_PROBE_MULTIPLIER: u64 = 36;

/// @ai:intent Where a step's artifacts go
#[derive(Debug, Clone)]
pub struct StepLayout {
    pub name: String,
    pub step_dir: PathBuf,
    pub source_dir: PathBuf,
    /// `<group>/Data/<step>.csv`
    pub results_file: PathBuf,
}

/// @ai:intent Paths and sizes produced by materialization
#[derive(Debug, Clone)]
pub struct MaterializedStep {
    pub library_file: PathBuf,
    /// Relative to the step's source directory.
    pub code_objects: Vec<PathBuf>,
    pub problem_sizes: Vec<ProblemSize>,
    pub client_config: PathBuf,
    pub tile_selection: bool,
}

/// @ai:intent Synthetic sizes from the largest macro tiles crossed with reduction sizes
/// @ai:post one Exact entry per K: [M, N, 1, K] when batched, else [M, N, K]
/// @ai:effects pure
pub fn tile_probe_sizes(
    problem_type: &ProblemType,
    solutions: &[Solution],
    summation_sizes: &[u64],
) -> ProblemSizes {
    let max_tile = |key: &str| {
        solutions
            .iter()
            .filter_map(|s| s.get_int(key))
            .max()
            .unwrap_or(0)
            .max(0) as u64
    };

    let m = TILE_PROBE_MULTIPLIER * max_tile("MacroTile0");
    let n = TILE_PROBE_MULTIPLIER * max_tile("MacroTile1");

    let sizes = summation_sizes
        .iter()
        .map(|&k| {
            if problem_type.batched {
                vec![m, n, 1, k]
            } else {
                vec![m, n, k]
            }
        })
        .collect();

    ProblemSizes::exact(sizes)
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// @ai:intent Drives the generator in error-tolerant mode and writes step artifacts
pub struct StepArtifactBuilder<'a> {
    generator: &'a dyn CodeGeneratorTrait,
    config: &'a TuneConfig,
    enable_half: bool,
}

impl<'a> StepArtifactBuilder<'a> {
    /// @ai:intent Create a builder for one problem scope
    /// @ai:effects pure
    pub fn new(generator: &'a dyn CodeGeneratorTrait, config: &'a TuneConfig, enable_half: bool) -> Self {
        Self {
            generator,
            config,
            enable_half,
        }
    }

    /// @ai:intent Generate, prune failures, write library and client config
    /// @ai:post returned solutions are the generated subset, in input order, non-empty
    /// @ai:effects fs:write, io
    pub fn build(
        &self,
        layout: &StepLayout,
        problem_type: &ProblemType,
        solutions: &[Solution],
        problem_sizes: &ProblemSizes,
        summation_sizes: &[u64],
    ) -> Result<(Vec<Solution>, MaterializedStep)> {
        let kernel_set = KernelSet::collect(solutions);
        let names = StepNames::assign(problem_type, solutions, &kernel_set.kernels);

        if !self.config.run.merge_files {
            for dir in ["Solutions", "Kernels"] {
                let path = layout.source_dir.join(dir);
                std::fs::create_dir_all(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
            }
        }

        let request = GenerationRequest {
            output_dir: layout.source_dir.clone(),
            compiler: self.config.tools.cxx_compiler.clone(),
            problem_type: problem_type.clone(),
            solutions: solutions
                .iter()
                .enumerate()
                .map(|(idx, solution)| NamedSolution {
                    serial_name: names.solution_serial[idx].clone(),
                    min_name: names.solution_min[idx].clone(),
                    solution: solution.clone(),
                })
                .collect(),
            kernels: kernel_set
                .kernels
                .iter()
                .enumerate()
                .map(|(idx, kernel)| NamedKernel {
                    full_name: kernel.full_name(),
                    serial_name: names.kernel_serial[idx].clone(),
                    min_name: names.kernel_min[idx].clone(),
                    kernel: kernel.clone(),
                })
                .collect(),
            helper_kernels: GenerationRequest::helper_names(&kernel_set.helpers),
            merge_files: self.config.run.merge_files,
            enable_half: self.enable_half,
            error_tolerant: true,
        };

        tracing::info!(
            "Generating {} solutions, {} kernels, {} helpers",
            solutions.len(),
            kernel_set.kernels.len(),
            kernel_set.helpers.len()
        );

        let outcome = self
            .generator
            .generate(&request)
            .with_context(|| format!("Kernel generation failed for step {}", layout.name))?;

        let failed: BTreeSet<usize> = outcome.failed.into_iter().collect();
        let mut survivors = Vec::with_capacity(solutions.len());
        let mut survivor_names = Vec::with_capacity(solutions.len());

        for (idx, solution) in solutions.iter().enumerate() {
            if failed.contains(&idx) {
                tracing::warn!("Solution {} failed to generate; dropped", names.solution_min[idx]);
                continue;
            }
            tracing::debug!("{} -> {}", names.solution_serial[idx], names.solution_min[idx]);
            survivors.push(solution.clone());
            survivor_names.push(names.solution_min[idx].clone());
        }

        if survivors.is_empty() {
            return Err(TuneError::NoGeneratedSolutions {
                step: layout.name.clone(),
            }
            .into());
        }

        tracing::info!(
            "{} of {} solutions survived generation",
            survivors.len(),
            solutions.len()
        );

        let library = SelectionLibrary::benchmarking(problem_type, &survivors, &survivor_names);
        let library_file = library.write(&layout.source_dir.join("library"), self.config.run.library_format)?;

        let code_objects: Vec<PathBuf> = outcome
            .code_objects
            .iter()
            .map(|path| relative_to(path, &layout.source_dir))
            .collect();

        let tile_selection = problem_type.tile_aware_selection;
        let sizes = if tile_selection {
            tile_probe_sizes(problem_type, &survivors, summation_sizes)
        } else {
            problem_sizes.clone()
        };
        let problem_sizes = sizes.expand(problem_type)?;

        let parameters = ClientParameters {
            library_file: library_file.clone(),
            code_objects: code_objects.clone(),
            results_file: layout.results_file.clone(),
            problem_sizes: problem_sizes.clone(),
            num_solutions: survivors.len(),
            tile_aware_selection: tile_selection,
            benchmark: true,
        };
        let client_config = ClientConfigWriter::write(&layout.step_dir, &parameters)?;

        Ok((
            survivors,
            MaterializedStep {
                library_file,
                code_objects,
                problem_sizes,
                client_config,
                tile_selection,
            },
        ))
    }
}
