//! YAML project files.
//!
//! ```yaml
//! input: miraw_results.tsv
//! probability_min: 0.8
//! mfe_max: -15
//! output_dir: filtered
//! edges: filtered/edges.tsv
//! log_dir: logfiles
//! columns:
//!   gene: GeneName
//!   mirna: miRNA
//!   probability: Prediction
//!   mfe: MFE
//! matrix:
//!   duplicates: strongest
//!   max_cells: 1000000
//! ```
//!
//! Relative paths are resolved against the directory holding the project file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::ColumnSchema;
use crate::network::MatrixOptions;

/// A cutoff as written in YAML: a plain number or a string to be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cutoff {
    Number(f64),
    Text(String),
}

impl Cutoff {
    pub fn as_text(&self) -> String {
        match self {
            Cutoff::Number(v) => v.to_string(),
            Cutoff::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub input: Option<PathBuf>,
    pub probability_min: Option<Cutoff>,
    pub mfe_max: Option<Cutoff>,
    pub output_dir: Option<PathBuf>,
    pub edges: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub columns: ColumnSchema,
    pub matrix: MatrixOptions,
}

impl ProjectConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing project file")
    }

    /// Read a project file and anchor its relative paths to its directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading project file {}", path.display()))?;
        let mut config = Self::from_yaml_str(&text)
            .with_context(|| format!("in project file {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for p in [
            &mut self.input,
            &mut self.output_dir,
            &mut self.edges,
            &mut self.log_dir,
        ]
        .into_iter()
        .flatten()
        {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}
