//! @ai:module:intent Benchmarking client collaborator
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkClientTrait, ClientInvocation, CommandClient, MockBenchmarkClient
//! @ai:module:stateless false

use crate::client::parameters::partial_results_path;
use crate::solution::ProblemSize;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

/// @ai:intent One client run for a step
#[derive(Debug, Clone)]
pub struct ClientInvocation {
    pub step_name: String,
    pub step_dir: PathBuf,
    pub config_file: PathBuf,
    /// Library logic to validate against; `None` while benchmarking.
    pub library_logic: Option<PathBuf>,
    pub benchmark: bool,
    pub tile_selection: bool,
    /// Final results path; the client writes to its `.partial` sibling.
    pub results_file: PathBuf,
    pub problem_sizes: Vec<ProblemSize>,
    pub num_solutions: usize,
}

impl ClientInvocation {
    pub fn partial_results_file(&self) -> PathBuf {
        partial_results_path(&self.results_file)
    }
}

/// @ai:intent Trait for the external benchmarking client
#[allow(async_fn_in_trait)]
pub trait BenchmarkClientTrait: Send + Sync {
    /// @ai:intent Run the client to completion and return its exit code
    async fn run(&self, invocation: &ClientInvocation) -> Result<i32>;
}

/// @ai:intent Spawns the configured client executable in the step directory
pub struct CommandClient {
    executable: PathBuf,
}

impl CommandClient {
    /// @ai:intent Create a client for an executable
    /// @ai:effects pure
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl BenchmarkClientTrait for CommandClient {
    /// @ai:intent Spawn and wait; a signal-terminated client reports -1
    /// @ai:effects io
    async fn run(&self, invocation: &ClientInvocation) -> Result<i32> {
        let mut cmd = tokio::process::Command::new(&self.executable);
        cmd.arg("--config-file").arg(&invocation.config_file);

        if let Some(logic) = &invocation.library_logic {
            cmd.arg("--library-logic").arg(logic);
        }

        cmd.current_dir(&invocation.step_dir);

        tracing::info!(
            "Running client for {} in {}",
            invocation.step_name,
            invocation.step_dir.display()
        );

        let status = cmd.status().await.with_context(|| {
            format!("Failed to execute client {}", self.executable.display())
        })?;

        Ok(status.code().unwrap_or(-1))
    }
}

/// @ai:intent Client stand-in: writes a synthetic results table, returns a fixed code
#[derive(Debug, Default)]
pub struct MockBenchmarkClient {
    exit_code: i32,
    invocations: Mutex<Vec<String>>,
}

impl MockBenchmarkClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Mock that reports the given exit code on every run
    /// @ai:effects pure
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// @ai:intent Step names of every run so far, in order
    /// @ai:effects pure
    pub fn invocations(&self) -> Vec<String> {
        self.invocations
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn results_table(invocation: &ClientInvocation) -> String {
        let mut table = String::from("size,solution,gflops\n");

        for (size_idx, size) in invocation.problem_sizes.iter().enumerate() {
            for solution in 0..invocation.num_solutions {
                let gflops = 1000.0 + (size_idx * invocation.num_solutions + solution) as f64;
                let _ = writeln!(table, "\"{}\",{},{:.1}", size, solution, gflops);
            }
        }

        table
    }
}

impl BenchmarkClientTrait for MockBenchmarkClient {
    /// @ai:intent Record the run and write the partial results table
    /// @ai:effects fs:write
    async fn run(&self, invocation: &ClientInvocation) -> Result<i32> {
        if let Ok(mut guard) = self.invocations.lock() {
            guard.push(invocation.step_name.clone());
        }

        let partial = invocation.partial_results_file();
        if let Some(parent) = partial.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&partial, Self::results_table(invocation))
            .with_context(|| format!("Failed to write {}", partial.display()))?;

        Ok(self.exit_code)
    }
}
