//! Command-line entry point: batch filtering or the network viewer.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use mirna_target_network::app::run_viewer;
use mirna_target_network::config::ProjectConfig;
use mirna_target_network::data::{loader, Thresholds};
use mirna_target_network::logging;
use mirna_target_network::network::DuplicatePolicy;
use mirna_target_network::pipeline::{self, RunOptions, RunOverrides};
use mirna_target_network::state::AppState;

/// CLI-friendly duplicate policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDuplicates {
    /// Later rows overwrite earlier ones
    Last,
    /// Keep the most negative MFE
    Strongest,
}

impl From<CliDuplicates> for DuplicatePolicy {
    fn from(policy: CliDuplicates) -> Self {
        match policy {
            CliDuplicates::Last => DuplicatePolicy::LastWins,
            CliDuplicates::Strongest => DuplicatePolicy::Strongest,
        }
    }
}

/// Filter miRAW target predictions and build gene/miRNA interaction networks
#[derive(Parser)]
#[command(name = "mirna-target-network")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a result file, log a summary and write the filtered table
    Filter {
        /// miRAW result file (TSV, CSV, JSON or Parquet)
        #[arg(short = 'm', long = "miraw-result-file")]
        input: Option<PathBuf>,

        /// Only keep predictions with probability above this cutoff
        #[arg(short = 'p', long, allow_hyphen_values = true)]
        probability_min: Option<String>,

        /// Only keep predictions with MFE below this cutoff
        #[arg(short = 'e', long, allow_hyphen_values = true)]
        mfe_max: Option<String>,

        /// YAML project file; command-line values take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for the filtered table (default: next to the input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write the interaction edge list to this TSV
        #[arg(long)]
        edges: Option<PathBuf>,

        /// How to resolve repeated gene/miRNA pairs
        #[arg(long, value_enum)]
        duplicates: Option<CliDuplicates>,

        /// Largest genes x miRNAs matrix to allocate
        #[arg(long)]
        max_cells: Option<usize>,

        /// Directory for run log files
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Open the interactive network viewer
    View {
        /// Prediction file to open at start-up
        input: Option<PathBuf>,

        /// Initial probability cutoff
        #[arg(short = 'p', long, allow_hyphen_values = true)]
        probability_min: Option<String>,

        /// Initial MFE cutoff
        #[arg(short = 'e', long, allow_hyphen_values = true)]
        mfe_max: Option<String>,

        /// How to resolve repeated gene/miRNA pairs
        #[arg(long, value_enum)]
        duplicates: Option<CliDuplicates>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Filter {
            input,
            probability_min,
            mfe_max,
            config,
            output_dir,
            edges,
            duplicates,
            max_cells,
            log_dir,
        } => run_filter(FilterArgs {
            input,
            probability_min,
            mfe_max,
            config,
            output_dir,
            edges,
            duplicates,
            max_cells,
            log_dir,
        }),
        Commands::View {
            input,
            probability_min,
            mfe_max,
            duplicates,
        } => run_view(input, probability_min, mfe_max, duplicates),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

struct FilterArgs {
    input: Option<PathBuf>,
    probability_min: Option<String>,
    mfe_max: Option<String>,
    config: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    edges: Option<PathBuf>,
    duplicates: Option<CliDuplicates>,
    max_cells: Option<usize>,
    log_dir: Option<PathBuf>,
}

fn run_filter(args: FilterArgs) -> Result<()> {
    let project = match &args.config {
        Some(path) => ProjectConfig::from_path(path)?,
        None => ProjectConfig::default(),
    };

    let options = RunOptions::from_project(
        &project,
        RunOverrides {
            input: args.input,
            probability_min: args.probability_min,
            mfe_max: args.mfe_max,
            output_dir: args.output_dir,
            edges: args.edges,
            duplicates: args.duplicates.map(Into::into),
            max_cells: args.max_cells,
        },
    )?;

    let log_dir = args
        .log_dir
        .or(project.log_dir)
        .unwrap_or_else(|| PathBuf::from(logging::DEFAULT_LOG_DIR));
    logging::init(&options.input, &log_dir)?;
    log::info!("miRAW result file is <{}>", options.input.display());
    if let Some(path) = &args.config {
        log::info!("project file is <{}>", path.display());
    }

    let report = pipeline::run(&options)?;

    match &report.matrix {
        Some(m) => log::info!(
            "kept {} of {} predictions: {} genes, {} miRNAs, {} interactions",
            report.n_kept,
            report.n_loaded,
            m.shape().0,
            m.shape().1,
            m.n_interactions()
        ),
        None => log::info!("kept {} of {} predictions", report.n_kept, report.n_loaded),
    }
    log::info!("program completed");
    Ok(())
}

fn run_view(
    input: Option<PathBuf>,
    probability_min: Option<String>,
    mfe_max: Option<String>,
    duplicates: Option<CliDuplicates>,
) -> Result<()> {
    logging::init_console();

    let mut state = AppState::default();
    if let Some(d) = duplicates {
        state.matrix_options.duplicates = d.into();
    }
    if probability_min.is_some() || mfe_max.is_some() {
        let p = probability_min.unwrap_or_else(|| state.thresholds.probability_min.to_string());
        let e = mfe_max.unwrap_or_else(|| state.thresholds.mfe_max.to_string());
        let thresholds = Thresholds::parse(&p, &e)?;
        state.thresholds = thresholds;
        state.draft = thresholds;
    }
    if let Some(path) = input {
        open_at_start(&mut state, &path)?;
    }

    run_viewer(state).map_err(|e| anyhow!("viewer failed: {e}"))
}

fn open_at_start(state: &mut AppState, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }
    let table = loader::load_file(path).with_context(|| format!("loading {}", path.display()))?;
    state.set_table(path.to_path_buf(), table);
    Ok(())
}
