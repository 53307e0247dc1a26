use std::path::PathBuf;

use crate::color::ColorMap;
use crate::data::{
    filter_predictions, summarize, ColumnSchema, FilterOutcome, PredictionTable, Summary,
    Thresholds,
};
use crate::error::{MirnaError, Result};
use crate::network::{
    build_matrix, spring_layout, InteractionMatrix, LayoutConfig, MatrixOptions, NetworkLayout,
};

const DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    probability_min: 0.5,
    mfe_max: 0.0,
};

/// Networks with more nodes than this are not laid out in the viewer.
pub const MAX_LAYOUT_NODES: usize = 1500;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Path of the loaded prediction file.
    pub source: Option<PathBuf>,

    /// Loaded predictions (None until user loads a file).
    pub table: Option<PredictionTable>,

    pub schema: ColumnSchema,

    /// Cutoffs the derived artifacts were built with.
    pub thresholds: Thresholds,

    /// Cutoffs being edited in the side panel, applied on release.
    pub draft: Thresholds,

    pub matrix_options: MatrixOptions,

    pub layout_config: LayoutConfig,

    /// Everything below is derived from `table` and rebuilt by `recompute`.
    pub outcome: Option<FilterOutcome>,
    pub summary: Option<Summary>,
    pub matrix: Option<InteractionMatrix>,
    pub layout: Option<NetworkLayout>,
    pub color_map: Option<ColorMap>,

    pub show_labels: bool,
    pub show_weights: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source: None,
            table: None,
            schema: ColumnSchema::default(),
            thresholds: DEFAULT_THRESHOLDS,
            draft: DEFAULT_THRESHOLDS,
            matrix_options: MatrixOptions::default(),
            layout_config: LayoutConfig::default(),
            outcome: None,
            summary: None,
            matrix: None,
            layout: None,
            color_map: None,
            show_labels: true,
            show_weights: false,
            status_message: None,
        }
    }
}

/// Artifacts derived from one table under one set of cutoffs.
struct Derived {
    outcome: FilterOutcome,
    summary: Summary,
    matrix: Option<InteractionMatrix>,
    layout: Option<NetworkLayout>,
    note: Option<String>,
}

fn derive(state: &AppState, table: &PredictionTable) -> Result<Derived> {
    let outcome = filter_predictions(table, &state.schema, &state.thresholds)?;
    let summary = summarize(&outcome.table, &state.schema)?;
    let matrix = match build_matrix(&outcome.table, &state.schema, &state.matrix_options) {
        Ok(m) => Some(m),
        Err(MirnaError::EmptyInput(_)) => None,
        Err(e) => return Err(e),
    };

    let mut note = None;
    let layout = matrix.as_ref().and_then(|m| {
        let (genes, mirnas) = m.shape();
        if genes + mirnas > MAX_LAYOUT_NODES {
            note = Some(format!(
                "{} nodes is too many to draw; tighten the thresholds",
                genes + mirnas
            ));
            None
        } else {
            Some(spring_layout(m, &state.layout_config))
        }
    });

    Ok(Derived {
        outcome,
        summary,
        matrix,
        layout,
        note,
    })
}

impl AppState {
    /// Ingest a newly loaded table and rebuild the network.
    pub fn set_table(&mut self, source: PathBuf, table: PredictionTable) {
        self.source = Some(source);
        self.table = Some(table);
        self.recompute();
    }

    /// Change the cutoffs and rebuild.
    pub fn set_thresholds(&mut self, probability_min: f64, mfe_max: f64) {
        match Thresholds::new(probability_min, mfe_max) {
            Ok(t) => {
                self.thresholds = t;
                self.draft = t;
                self.recompute();
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    /// Rebuild filter → summary → matrix → layout from scratch.
    pub fn recompute(&mut self) {
        self.outcome = None;
        self.summary = None;
        self.matrix = None;
        self.layout = None;
        self.color_map = None;

        let Some(table) = &self.table else {
            return;
        };
        match derive(self, table) {
            Ok(d) => {
                log::info!(
                    "{} of {} predictions kept ({})",
                    d.outcome.n_after,
                    d.outcome.n_before,
                    self.thresholds
                );
                self.color_map = d.matrix.as_ref().map(|m| ColorMap::new(m.mirnas().iter()));
                self.status_message = d.note;
                self.outcome = Some(d.outcome);
                self.summary = Some(d.summary);
                self.matrix = d.matrix;
                self.layout = d.layout;
            }
            Err(e) => {
                log::error!("Failed to build network: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
