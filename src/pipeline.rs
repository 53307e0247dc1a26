//! Batch run: load → filter → summarize → write → interaction matrix.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::ProjectConfig;
use crate::data::{self, filter_predictions, summarize, ColumnSchema, Summary, Thresholds};
use crate::error::MirnaError;
use crate::network::{build_matrix, DuplicatePolicy, InteractionMatrix, MatrixOptions};

/// Everything one batch run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub probability_min: String,
    pub mfe_max: String,
    pub schema: ColumnSchema,
    pub matrix: MatrixOptions,
    /// Directory for the filtered table; defaults to the input's directory.
    pub output_dir: Option<PathBuf>,
    /// Where to write the edge list, if anywhere.
    pub edges: Option<PathBuf>,
}

/// Values given on the command line; each one that is set replaces the
/// project file's value.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub input: Option<PathBuf>,
    pub probability_min: Option<String>,
    pub mfe_max: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub edges: Option<PathBuf>,
    pub duplicates: Option<DuplicatePolicy>,
    pub max_cells: Option<usize>,
}

impl RunOptions {
    /// Merge command-line values over a project file. The input and both
    /// cutoffs must be known after merging.
    pub fn from_project(project: &ProjectConfig, overrides: RunOverrides) -> Result<Self> {
        let input = overrides
            .input
            .or_else(|| project.input.clone())
            .context("you must specify a miRAW result file (-m or `input` in the project file)")?;
        let probability_min = overrides
            .probability_min
            .or_else(|| project.probability_min.as_ref().map(|c| c.as_text()))
            .context("no probability cutoff given (-p or `probability_min`)")?;
        let mfe_max = overrides
            .mfe_max
            .or_else(|| project.mfe_max.as_ref().map(|c| c.as_text()))
            .context("no MFE cutoff given (-e or `mfe_max`)")?;

        let mut matrix = project.matrix;
        if let Some(d) = overrides.duplicates {
            matrix.duplicates = d;
        }
        if let Some(n) = overrides.max_cells {
            matrix.max_cells = Some(n);
        }

        Ok(Self {
            input,
            probability_min,
            mfe_max,
            schema: project.columns.clone(),
            matrix,
            output_dir: overrides.output_dir.or_else(|| project.output_dir.clone()),
            edges: overrides.edges.or_else(|| project.edges.clone()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub thresholds: Thresholds,
    pub n_loaded: usize,
    pub n_kept: usize,
    pub summary: Summary,
    pub filtered_path: PathBuf,
    /// `None` when no prediction survived filtering.
    pub matrix: Option<InteractionMatrix>,
    pub edges_path: Option<PathBuf>,
}

pub fn run(options: &RunOptions) -> Result<RunReport> {
    // Cutoffs are checked before anything is read or written.
    let thresholds = Thresholds::parse(&options.probability_min, &options.mfe_max)?;
    log::info!("applying thresholds: {thresholds}");

    let table = data::loader::load_file(&options.input)
        .with_context(|| format!("loading {}", options.input.display()))?;
    // Every schema column must exist before any output is written.
    options.schema.resolve(&table)?;

    let outcome = filter_predictions(&table, &options.schema, &thresholds)?;
    log::info!("\n{outcome}");

    let summary = summarize(&outcome.table, &options.schema)?;
    log::info!("\n{summary}");

    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    let filtered_path = data::writer::filtered_file_name(
        &options.input,
        &thresholds,
        options.output_dir.as_deref(),
    );
    data::writer::write_table_to_path(&outcome.table, &filtered_path)
        .with_context(|| format!("writing {}", filtered_path.display()))?;
    log::info!("filtered predictions written to <{}>", filtered_path.display());

    let matrix = match build_matrix(&outcome.table, &options.schema, &options.matrix) {
        Ok(m) => Some(m),
        Err(MirnaError::EmptyInput(reason)) => {
            log::warn!("no interaction matrix: {reason}");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let mut edges_path = None;
    if let (Some(path), Some(m)) = (&options.edges, &matrix) {
        data::writer::write_edges_to_path(m, path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("{} interactions written to <{}>", m.n_interactions(), path.display());
        edges_path = Some(path.clone());
    }

    Ok(RunReport {
        thresholds,
        n_loaded: outcome.n_before,
        n_kept: outcome.n_after,
        summary,
        filtered_path,
        matrix,
        edges_path,
    })
}
