//! @ai:module:intent CLI for the kernel autotuning pipeline
//! @ai:module:layer presentation

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tilebench::{
    benchmark::{BenchmarkProcess, InputSpec},
    client::BenchmarkClientTrait,
    config::{LibraryFormat, TuneConfig},
    pipeline::{BenchmarkStepRunner, Collaborators, ProblemScope, RunOutcome, TopLevelDriver},
    report::{RunSummary, SummaryReporter, SummaryReporterTrait},
    toolchain::ToolchainValidator,
};

#[derive(Parser)]
#[command(name = "tilebench")]
#[command(about = "Enumerate, generate and benchmark kernel configurations")]
#[command(version)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark pipeline for an input specification
    Run {
        /// Input specification (YAML)
        spec: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Re-run steps and pairs even when results exist
        #[arg(long)]
        force_redo: bool,

        /// Exit 0 even when client runs failed
        #[arg(long)]
        no_exit_on_fails: bool,

        /// Log why each candidate solution was rejected
        #[arg(long)]
        print_rejections: bool,

        /// Use mock generator and client instead of external tools
        #[arg(long)]
        dry_run: bool,

        /// Selection library format
        #[arg(long, value_enum)]
        library_format: Option<LibraryFormat>,
    },

    /// Print the candidate solutions of every step without benchmarking
    Enumerate {
        /// Input specification (YAML)
        spec: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log why each candidate solution was rejected
        #[arg(long)]
        print_rejections: bool,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "tilebench.toml")]
        output: PathBuf,
    },
}

struct RunArgs {
    spec: PathBuf,
    config: Option<PathBuf>,
    force_redo: bool,
    no_exit_on_fails: bool,
    print_rejections: bool,
    dry_run: bool,
    library_format: Option<LibraryFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let directive = if cli.verbose {
        "tilebench=debug"
    } else {
        "tilebench=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    match cli.command {
        Commands::Run {
            spec,
            config,
            force_redo,
            no_exit_on_fails,
            print_rejections,
            dry_run,
            library_format,
        } => {
            let code = run_pipeline(RunArgs {
                spec,
                config,
                force_redo,
                no_exit_on_fails,
                print_rejections,
                dry_run,
                library_format,
            })
            .await?;

            if code != 0 {
                std::process::exit(code);
            }

            Ok(())
        }
        Commands::Enumerate {
            spec,
            config,
            print_rejections,
        } => enumerate(spec, config, print_rejections),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Run every pair and return the process exit code
/// @ai:effects fs:write, io
async fn run_pipeline(args: RunArgs) -> Result<i32> {
    let mut config = load_or_default_config(args.config)?;

    config.run.force_redo |= args.force_redo;
    config.run.dry_run |= args.dry_run;
    config.run.print_solution_rejection_reason |= args.print_rejections;
    if args.no_exit_on_fails {
        config.run.exit_on_fails = false;
    }
    if let Some(format) = args.library_format {
        config.run.library_format = format;
    }

    let spec = InputSpec::load(&args.spec)?;
    tracing::info!("Loaded {} problem entries from {}", spec.entries.len(), args.spec.display());

    let outcome = if config.run.dry_run {
        tracing::info!("Running in dry-run mode");
        drive(&config, Collaborators::dry_run(&config), &spec).await?
    } else {
        ToolchainValidator::require(&config.tools)?;
        drive(&config, Collaborators::external(&config), &spec).await?
    };

    let summary = RunSummary::from_outcome(&outcome, config.run.dry_run, config.run.force_redo);
    SummaryReporter::new().write(&summary, &config.data_root())?;

    print_summary(&outcome);

    let code = outcome.exit_code(config.run.exit_on_fails);
    if code != 0 {
        tracing::error!("{} benchmark client run(s) failed", outcome.failures);
    }

    Ok(code)
}

async fn drive<C: BenchmarkClientTrait>(
    config: &TuneConfig,
    collaborators: Collaborators<C>,
    spec: &InputSpec,
) -> Result<RunOutcome> {
    TopLevelDriver::new(config, &collaborators).run(spec).await
}

/// @ai:intent List candidate solutions per step
/// @ai:effects fs:read
fn enumerate(spec_path: PathBuf, config_path: Option<PathBuf>, print_rejections: bool) -> Result<()> {
    let mut config = load_or_default_config(config_path)?;
    config.run.print_solution_rejection_reason |= print_rejections;

    let spec = InputSpec::load(&spec_path)?;
    let collaborators = Collaborators::dry_run(&config);

    for (problem_type, group_idx, group) in spec.pairs() {
        let process = BenchmarkProcess::new(problem_type.clone(), group)?;
        let runner = BenchmarkStepRunner::new(
            &config,
            &collaborators,
            ProblemScope::for_problem(problem_type),
        );

        println!("{}_{:02}", problem_type, group_idx);

        for step in process.steps() {
            let solutions = runner.enumerate(&process, step)?;
            println!("  {} ({} solutions)", step.name(), solutions.len());

            for solution in &solutions {
                println!("    {}", solution);
            }
        }
    }

    Ok(())
}

/// @ai:intent Write default configuration
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = TuneConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<TuneConfig> {
    match path {
        Some(p) => TuneConfig::load(&p),
        None => {
            let default_path = PathBuf::from("tilebench.toml");

            if default_path.exists() {
                TuneConfig::load(&default_path)
            } else {
                Ok(TuneConfig::default())
            }
        }
    }
}

/// @ai:effects io
fn print_summary(outcome: &RunOutcome) {
    println!();
    println!("Benchmark Summary");
    println!("=================");
    println!();
    println!("{:<40} {:>12} {:>8} {:>10}", "Pair", "Status", "Steps", "Failures");
    println!("{}", "-".repeat(73));

    for pair in &outcome.pairs {
        println!(
            "{:<40} {:>12} {:>8} {:>10}",
            pair.name,
            format!("{:?}", pair.status),
            pair.steps,
            pair.failures
        );
    }

    println!();
    println!("Total failures: {}", outcome.failures);
}
