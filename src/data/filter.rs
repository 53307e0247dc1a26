//! Threshold filtering of target predictions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{ColumnSchema, PredictionTable};
use crate::error::{MirnaError, Result};

// ---------------------------------------------------------------------------
// Threshold configuration
// ---------------------------------------------------------------------------

/// Cutoffs a prediction must beat to survive filtering.
///
/// A row survives iff `probability > probability_min` and `mfe < mfe_max`.
/// Both comparisons are strict, so a value sitting exactly on a cutoff is
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub probability_min: f64,
    pub mfe_max: f64,
}

impl Thresholds {
    pub fn new(probability_min: f64, mfe_max: f64) -> Result<Self> {
        if probability_min.is_nan() {
            return Err(MirnaError::InvalidThreshold {
                name: "probability",
                value: probability_min.to_string(),
            });
        }
        if mfe_max.is_nan() {
            return Err(MirnaError::InvalidThreshold {
                name: "MFE",
                value: mfe_max.to_string(),
            });
        }
        Ok(Self {
            probability_min,
            mfe_max,
        })
    }

    /// Parse the two cutoffs as given on the command line.
    pub fn parse(probability_min: &str, mfe_max: &str) -> Result<Self> {
        let probability = parse_cutoff("probability", probability_min)?;
        let mfe = parse_cutoff("MFE", mfe_max)?;
        Self::new(probability, mfe)
    }

    /// Whether a prediction with these scores is kept. Missing scores never pass.
    pub fn admits(&self, probability: Option<f64>, mfe: Option<f64>) -> bool {
        match (probability, mfe) {
            (Some(p), Some(e)) => p > self.probability_min && e < self.mfe_max,
            _ => false,
        }
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probability > {} and MFE < {}",
            self.probability_min, self.mfe_max
        )
    }
}

fn parse_cutoff(name: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| MirnaError::InvalidThreshold {
            name,
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Filtered table plus bookkeeping about what was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub table: PredictionTable,
    pub thresholds: Thresholds,
    /// Number of rows before filtering.
    pub n_before: usize,
    /// Number of rows after filtering.
    pub n_after: usize,
    /// Number of rows removed.
    pub n_removed: usize,
}

impl FilterOutcome {
    /// Proportion of rows retained; 0 for an empty input.
    pub fn retention_rate(&self) -> f64 {
        if self.n_before == 0 {
            0.0
        } else {
            self.n_after as f64 / self.n_before as f64
        }
    }
}

impl fmt::Display for FilterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Threshold Filter Result ({})", self.thresholds)?;
        writeln!(f, "  Predictions before: {}", self.n_before)?;
        writeln!(f, "  Predictions after:  {}", self.n_after)?;
        writeln!(f, "  Removed:            {}", self.n_removed)?;
        writeln!(f, "  Retention:          {:.1}%", self.retention_rate() * 100.0)?;
        Ok(())
    }
}

/// Keep only rows that satisfy both cutoffs, preserving their order.
///
/// Only the probability and MFE columns are read; every other column is
/// carried through untouched.
pub fn filter_predictions(
    table: &PredictionTable,
    schema: &ColumnSchema,
    thresholds: &Thresholds,
) -> Result<FilterOutcome> {
    let probability_col = table.column_index(&schema.probability)?;
    let mfe_col = table.column_index(&schema.mfe)?;

    let mut keep = Vec::new();
    for row in 0..table.len() {
        let probability = table.numeric(row, probability_col)?;
        let mfe = table.numeric(row, mfe_col)?;
        if thresholds.admits(probability, mfe) {
            keep.push(row);
        }
    }

    let filtered = table.subset(&keep);
    let n_before = table.len();
    let n_after = filtered.len();
    log::info!("filtering removed <{}>", n_before - n_after);

    Ok(FilterOutcome {
        table: filtered,
        thresholds: *thresholds,
        n_before,
        n_after,
        n_removed: n_before - n_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn row(gene: &str, mirna: &str, p: f64, mfe: f64) -> Vec<CellValue> {
        vec![
            CellValue::String(gene.into()),
            CellValue::String(mirna.into()),
            CellValue::Float(p),
            CellValue::Float(mfe),
        ]
    }

    fn create_test_table() -> PredictionTable {
        PredictionTable::from_rows(
            vec!["GeneName".into(), "miRNA".into(), "Prediction".into(), "MFE".into()],
            vec![
                row("g1", "m1", 0.9, -10.0),
                row("g1", "m2", 0.2, -3.0),
                row("g2", "m1", 0.95, -8.0),
                row("g3", "m3", 0.5, -20.0),
                row("g4", "m3", 0.8, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_filter_keeps_rows_beating_both_cutoffs() {
        let table = create_test_table();
        let thresholds = Thresholds::new(0.5, 0.0).unwrap();
        let outcome = filter_predictions(&table, &ColumnSchema::default(), &thresholds).unwrap();

        assert_eq!(outcome.n_before, 5);
        assert_eq!(outcome.n_after, 2);
        assert_eq!(outcome.n_removed, 3);
        assert_eq!(outcome.table.rows()[0], row("g1", "m1", 0.9, -10.0));
        assert_eq!(outcome.table.rows()[1], row("g2", "m1", 0.95, -8.0));
    }

    #[test]
    fn test_boundary_values_are_excluded() {
        let table = create_test_table();
        // g3 sits on the probability cutoff, g4 on the MFE cutoff
        let thresholds = Thresholds::new(0.5, 0.0).unwrap();
        let outcome = filter_predictions(&table, &ColumnSchema::default(), &thresholds).unwrap();
        let schema = ColumnSchema::default();
        let genes: Vec<String> = outcome
            .table
            .predictions(&schema)
            .unwrap()
            .into_iter()
            .map(|p| p.gene_name.into_owned())
            .collect();
        assert!(!genes.contains(&"g3".to_string()));
        assert!(!genes.contains(&"g4".to_string()));
    }

    #[test]
    fn test_every_surviving_row_satisfies_invariant() {
        let table = create_test_table();
        let schema = ColumnSchema::default();
        for (p, m) in [(0.0, 0.0), (0.85, -5.0), (0.1, -9.0), (1.0, 10.0)] {
            let thresholds = Thresholds::new(p, m).unwrap();
            let outcome = filter_predictions(&table, &schema, &thresholds).unwrap();
            assert!(outcome.n_after <= outcome.n_before);
            for pred in outcome.table.predictions(&schema).unwrap() {
                assert!(pred.probability.unwrap() > p);
                assert!(pred.mfe.unwrap() < m);
            }
        }
    }

    #[test]
    fn test_filter_is_deterministic() {
        let table = create_test_table();
        let thresholds = Thresholds::new(0.3, -1.0).unwrap();
        let schema = ColumnSchema::default();
        let a = filter_predictions(&table, &schema, &thresholds).unwrap();
        let b = filter_predictions(&table, &schema, &thresholds).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_table_filters_to_empty() {
        let table = PredictionTable::new(vec!["Prediction".into(), "MFE".into()]);
        let thresholds = Thresholds::new(0.5, 0.0).unwrap();
        let outcome = filter_predictions(&table, &ColumnSchema::default(), &thresholds).unwrap();
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.n_removed, 0);
        assert_eq!(outcome.retention_rate(), 0.0);
    }

    #[test]
    fn test_missing_scores_never_pass() {
        let table = PredictionTable::from_rows(
            vec!["Prediction".into(), "MFE".into()],
            vec![
                vec![CellValue::Null, CellValue::Float(-30.0)],
                vec![CellValue::Float(0.99), CellValue::Null],
            ],
        )
        .unwrap();
        let thresholds = Thresholds::new(0.0, 0.0).unwrap();
        let outcome = filter_predictions(&table, &ColumnSchema::default(), &thresholds).unwrap();
        assert_eq!(outcome.n_after, 0);
    }

    #[test]
    fn test_missing_column() {
        let table = PredictionTable::new(vec!["GeneName".into(), "Prediction".into()]);
        let thresholds = Thresholds::new(0.5, 0.0).unwrap();
        let err = filter_predictions(&table, &ColumnSchema::default(), &thresholds).unwrap_err();
        assert!(matches!(err, MirnaError::MissingColumn(c) if c == "MFE"));
    }

    #[test]
    fn test_parse_thresholds() {
        let t = Thresholds::parse("0.8", " -12.5 ").unwrap();
        assert_eq!(t.probability_min, 0.8);
        assert_eq!(t.mfe_max, -12.5);

        assert!(matches!(
            Thresholds::parse("high", "0"),
            Err(MirnaError::InvalidThreshold { name: "probability", .. })
        ));
        assert!(matches!(
            Thresholds::parse("0.5", "NaN"),
            Err(MirnaError::InvalidThreshold { name: "MFE", .. })
        ));
        assert!(Thresholds::parse("", "-1").is_err());
    }
}
