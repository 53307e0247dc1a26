use std::collections::BTreeMap;
use std::fmt;

use super::model::{CellValue, ColumnSchema, PredictionTable};
use crate::error::Result;

/// Occurrence counts over a (usually filtered) prediction table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub n_rows: usize,
    /// miRNA → occurrences, most frequent first.
    pub mirna_counts: Vec<(String, usize)>,
    /// Probability value → occurrences, most frequent first.
    pub probability_counts: Vec<(CellValue, usize)>,
    /// MFE value → occurrences, most frequent first.
    pub mfe_counts: Vec<(CellValue, usize)>,
}

impl Summary {
    pub fn n_mirnas(&self) -> usize {
        self.mirna_counts.len()
    }
}

/// Count miRNA, probability and MFE occurrences.
///
/// Null cells are skipped. Ties in count are broken by value so the output
/// is stable across runs.
pub fn summarize(table: &PredictionTable, schema: &ColumnSchema) -> Result<Summary> {
    let mirna_col = table.column_index(&schema.mirna)?;
    let probability_col = table.column_index(&schema.probability)?;
    let mfe_col = table.column_index(&schema.mfe)?;

    let mirnas = table
        .rows()
        .iter()
        .filter_map(|r| r[mirna_col].as_identifier().map(|s| s.into_owned()));

    Ok(Summary {
        n_rows: table.len(),
        mirna_counts: value_counts(mirnas),
        probability_counts: value_counts(column_values(table, probability_col)),
        mfe_counts: value_counts(column_values(table, mfe_col)),
    })
}

fn column_values(table: &PredictionTable, col: usize) -> impl Iterator<Item = CellValue> + '_ {
    table
        .rows()
        .iter()
        .map(move |r| r[col].clone())
        .filter(|v| !v.is_null())
}

fn value_counts<K: Ord>(values: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(K, usize)> = counts.into_iter().collect();
    // stable sort keeps the BTreeMap value order among equal counts
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

fn write_counts<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    counts: &[(K, usize)],
) -> fmt::Result {
    writeln!(f, "{title}")?;
    if counts.is_empty() {
        writeln!(f, "  (none)")?;
    }
    for (value, n) in counts {
        writeln!(f, "  {value:<24} {n}")?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_counts(f, "miRNA occurrences are as follows:", &self.mirna_counts)?;
        write_counts(
            f,
            "Probability distribution is as follows:",
            &self.probability_counts,
        )?;
        write_counts(f, "MFE distribution is as follows:", &self.mfe_counts)
    }
}
