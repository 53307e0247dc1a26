//! Filtering of miRNA target predictions and gene/miRNA interaction networks.
//!
//! The crate takes the tab-separated output of a target predictor such as
//! miRAW (one row per candidate gene/miRNA interaction, with a prediction
//! probability and a minimum free energy), keeps the rows that beat two
//! cutoffs, summarizes what is left, and turns it into a weighted
//! gene × miRNA matrix for network visualization.
//!
//! - **data**: table model, loaders, threshold filter, summaries, TSV output
//! - **network**: interaction matrix and force-directed layout
//! - **pipeline**: the batch run behind the `filter` subcommand
//! - **config** / **logging**: YAML project files and run logs
//! - **app**, **state**, **ui**, **color**: the egui network viewer
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use mirna_target_network::data::{filter_predictions, loader, ColumnSchema, Thresholds};
//! use mirna_target_network::network::{build_matrix, MatrixOptions};
//!
//! let table = loader::load_file(Path::new("miraw_results.tsv")).unwrap();
//! let schema = ColumnSchema::default();
//! let thresholds = Thresholds::parse("0.8", "-15").unwrap();
//! let outcome = filter_predictions(&table, &schema, &thresholds).unwrap();
//! let matrix = build_matrix(&outcome.table, &schema, &MatrixOptions::default()).unwrap();
//! println!("{} genes x {} miRNAs", matrix.shape().0, matrix.shape().1);
//! ```

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod network;
pub mod pipeline;
pub mod state;
pub mod ui;

pub use error::{MirnaError, Result};
