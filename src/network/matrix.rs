//! Weighted gene × miRNA interaction matrix.

use indexmap::IndexSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::{ColumnSchema, PredictionTable};
use crate::error::{MirnaError, Result};

/// What to do when the same (gene, miRNA) pair appears in several rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later row overwrites the earlier one.
    #[default]
    LastWins,
    /// Keep the strongest interaction (largest negated MFE).
    Strongest,
}

/// Matrix construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixOptions {
    pub duplicates: DuplicatePolicy,
    /// Upper bound on `genes × miRNAs` cells; `None` disables the check.
    pub max_cells: Option<usize>,
}

pub const DEFAULT_MAX_CELLS: usize = 25_000_000;

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::LastWins,
            max_cells: Some(DEFAULT_MAX_CELLS),
        }
    }
}

/// One observed gene/miRNA pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<'a> {
    pub gene_index: usize,
    pub mirna_index: usize,
    pub gene: &'a str,
    pub mirna: &'a str,
    /// Negated MFE; `None` when the pair was observed without an MFE.
    pub weight: Option<f64>,
}

/// Genes (rows) against miRNAs (columns), both in first-seen order.
///
/// Storage is `|genes| × |miRNAs|`. A cell is either unobserved, observed
/// with a weight (`-mfe`), or observed without one; `observed` is the
/// presence mask that tells the last two apart from the first.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    genes: IndexSet<String>,
    mirnas: IndexSet<String>,
    weights: Array2<Option<f64>>,
    observed: Array2<bool>,
    max_cells: Option<usize>,
}

impl InteractionMatrix {
    pub fn genes(&self) -> &IndexSet<String> {
        &self.genes
    }

    pub fn mirnas(&self) -> &IndexSet<String> {
        &self.mirnas
    }

    pub fn gene_index(&self, gene: &str) -> Option<usize> {
        self.genes.get_index_of(gene)
    }

    pub fn mirna_index(&self, mirna: &str) -> Option<usize> {
        self.mirnas.get_index_of(mirna)
    }

    /// `(genes, miRNAs)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.genes.len(), self.mirnas.len())
    }

    /// Side length of the padded square view, `max(genes, miRNAs)`.
    pub fn dimension(&self) -> usize {
        self.genes.len().max(self.mirnas.len())
    }

    pub fn weight(&self, gene: usize, mirna: usize) -> Option<f64> {
        self.weights.get((gene, mirna)).copied().flatten()
    }

    pub fn weight_by_name(&self, gene: &str, mirna: &str) -> Option<f64> {
        self.weight(self.gene_index(gene)?, self.mirna_index(mirna)?)
    }

    pub fn is_observed(&self, gene: usize, mirna: usize) -> bool {
        self.observed.get((gene, mirna)).copied().unwrap_or(false)
    }

    /// Number of distinct observed pairs.
    pub fn n_interactions(&self) -> usize {
        self.observed.iter().filter(|&&o| o).count()
    }

    pub fn gene_degree(&self, gene: usize) -> usize {
        self.observed.row(gene).iter().filter(|&&o| o).count()
    }

    pub fn mirna_degree(&self, mirna: usize) -> usize {
        self.observed.column(mirna).iter().filter(|&&o| o).count()
    }

    /// Observed pairs in row-major order.
    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> + '_ {
        self.observed
            .indexed_iter()
            .filter(|&(_, &o)| o)
            .map(move |((g, m), _)| Edge {
                gene_index: g,
                mirna_index: m,
                gene: self.genes[g].as_str(),
                mirna: self.mirnas[m].as_str(),
                weight: self.weights[[g, m]],
            })
    }

    /// Rectangular numeric matrix; absent weights become `0.0`.
    pub fn to_dense(&self) -> Array2<f64> {
        self.weights.mapv(|w| w.unwrap_or(0.0))
    }

    /// Square `dimension() × dimension()` matrix with the unused rows or
    /// columns of the smaller axis left at `0.0`.
    ///
    /// The padded view is held to the same `max_cells` ceiling the matrix
    /// was built with, so a lopsided matrix can still be refused here.
    pub fn to_square(&self) -> Result<Array2<f64>> {
        let n = self.dimension();
        if let Some(limit) = self.max_cells {
            if n.saturating_mul(n) > limit {
                return Err(MirnaError::TooManyEntities {
                    genes: self.genes.len(),
                    mirnas: self.mirnas.len(),
                    limit,
                });
            }
        }
        let mut square = Array2::zeros((n, n));
        for ((g, m), w) in self.weights.indexed_iter() {
            square[[g, m]] = w.unwrap_or(0.0);
        }
        Ok(square)
    }
}

/// Build the interaction matrix from every row of `table`.
///
/// Each row sets `[gene][mirna] = -mfe`. Rows without an MFE mark the pair
/// as observed but leave its weight empty. All four schema columns must be
/// present, even when the table has no rows.
pub fn build_matrix(
    table: &PredictionTable,
    schema: &ColumnSchema,
    options: &MatrixOptions,
) -> Result<InteractionMatrix> {
    let predictions = table.predictions(schema)?;
    if predictions.is_empty() {
        return Err(MirnaError::EmptyInput(
            "no predictions to build an interaction matrix from".to_string(),
        ));
    }

    let mut genes: IndexSet<String> = IndexSet::new();
    let mut mirnas: IndexSet<String> = IndexSet::new();
    let mut cells = Vec::with_capacity(predictions.len());
    for p in predictions {
        let (g, _) = genes.insert_full(p.gene_name.into_owned());
        let (m, _) = mirnas.insert_full(p.mirna_name.into_owned());
        cells.push((g, m, p.mfe.map(|mfe| -mfe)));
    }

    let n_cells = genes.len().saturating_mul(mirnas.len());
    if let Some(limit) = options.max_cells {
        if n_cells > limit {
            return Err(MirnaError::TooManyEntities {
                genes: genes.len(),
                mirnas: mirnas.len(),
                limit,
            });
        }
    }

    let shape = (genes.len(), mirnas.len());
    let mut weights: Array2<Option<f64>> = Array2::from_elem(shape, None);
    let mut observed: Array2<bool> = Array2::from_elem(shape, false);
    let mut duplicates = 0usize;

    for (g, m, weight) in cells {
        let seen = observed[[g, m]];
        if seen {
            duplicates += 1;
        }
        let cell = &mut weights[[g, m]];
        *cell = match options.duplicates {
            DuplicatePolicy::LastWins => weight,
            DuplicatePolicy::Strongest if seen => match (*cell, weight) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
            DuplicatePolicy::Strongest => weight,
        };
        observed[[g, m]] = true;
    }

    if duplicates > 0 {
        log::warn!(
            "{duplicates} duplicate gene/miRNA pairs resolved with {:?}",
            options.duplicates
        );
    }
    log::info!(
        "interaction matrix: {} genes x {} miRNAs",
        shape.0,
        shape.1
    );

    Ok(InteractionMatrix {
        genes,
        mirnas,
        weights,
        observed,
        max_cells: options.max_cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;
    use ndarray::array;

    fn table(rows: &[(&str, &str, Option<f64>)]) -> PredictionTable {
        PredictionTable::from_rows(
            vec!["GeneName".into(), "miRNA".into(), "Prediction".into(), "MFE".into()],
            rows.iter()
                .map(|&(g, m, e)| {
                    vec![
                        CellValue::String(g.into()),
                        CellValue::String(m.into()),
                        CellValue::Float(0.9),
                        e.map(CellValue::Float).unwrap_or(CellValue::Null),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    fn build(rows: &[(&str, &str, Option<f64>)]) -> InteractionMatrix {
        build_matrix(&table(rows), &ColumnSchema::default(), &MatrixOptions::default()).unwrap()
    }

    #[test]
    fn test_cell_holds_negated_mfe() {
        let m = build(&[("geneA", "mirX", Some(-12.5))]);
        assert_eq!(m.weight_by_name("geneA", "mirX"), Some(12.5));
    }

    #[test]
    fn test_indices_follow_first_seen_order() {
        let m = build(&[
            ("g2", "m3", Some(-1.0)),
            ("g1", "m1", Some(-2.0)),
            ("g2", "m2", Some(-3.0)),
        ]);
        assert_eq!(m.genes().iter().collect::<Vec<_>>(), ["g2", "g1"]);
        assert_eq!(m.mirnas().iter().collect::<Vec<_>>(), ["m3", "m1", "m2"]);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.dimension(), 3);
        assert_eq!(m.to_square().unwrap().dim(), (3, 3));
        assert_eq!(
            m.to_dense(),
            array![[1.0, 0.0, 3.0], [0.0, 2.0, 0.0]]
        );
    }

    #[test]
    fn test_last_write_wins() {
        let m = build(&[("geneA", "mirX", Some(-5.0)), ("geneA", "mirX", Some(-9.0))]);
        assert_eq!(m.weight_by_name("geneA", "mirX"), Some(9.0));
        assert_eq!(m.n_interactions(), 1);

        let m = build(&[("geneA", "mirX", Some(-9.0)), ("geneA", "mirX", Some(-5.0))]);
        assert_eq!(m.weight_by_name("geneA", "mirX"), Some(5.0));
    }

    #[test]
    fn test_strongest_policy_keeps_most_negative_mfe() {
        let options = MatrixOptions {
            duplicates: DuplicatePolicy::Strongest,
            ..MatrixOptions::default()
        };
        let t = table(&[
            ("geneA", "mirX", Some(-9.0)),
            ("geneA", "mirX", Some(-5.0)),
            ("geneA", "mirX", None),
        ]);
        let m = build_matrix(&t, &ColumnSchema::default(), &options).unwrap();
        assert_eq!(m.weight_by_name("geneA", "mirX"), Some(9.0));
    }

    #[test]
    fn test_missing_mfe_is_observed_without_weight() {
        let m = build(&[("g1", "m1", None), ("g1", "m2", Some(-4.0))]);
        assert!(m.is_observed(0, 0));
        assert_eq!(m.weight(0, 0), None);
        assert_eq!(m.to_dense()[[0, 0]], 0.0);
        assert_eq!(m.gene_degree(0), 2);

        let edges: Vec<_> = m.edges().collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].weight, None);
        assert_eq!(edges[1].mirna, "m2");
        assert_eq!(edges[1].weight, Some(4.0));
    }

    #[test]
    fn test_square_view_pads_smaller_axis() {
        let m = build(&[("g1", "m1", Some(-10.0)), ("g2", "m1", Some(-8.0))]);
        assert_eq!(m.shape(), (2, 1));
        assert_eq!(m.to_dense(), array![[10.0], [8.0]]);
        assert_eq!(m.to_square().unwrap(), array![[10.0, 0.0], [8.0, 0.0]]);
        assert_eq!(m.mirna_degree(0), 2);
    }

    #[test]
    fn test_empty_input() {
        let t = table(&[]);
        let err = build_matrix(&t, &ColumnSchema::default(), &MatrixOptions::default()).unwrap_err();
        assert!(matches!(err, MirnaError::EmptyInput(_)));
    }

    #[test]
    fn test_missing_column_beats_empty_input() {
        let t = PredictionTable::new(vec!["miRNA".into(), "Prediction".into(), "MFE".into()]);
        let err = build_matrix(&t, &ColumnSchema::default(), &MatrixOptions::default()).unwrap_err();
        assert!(matches!(err, MirnaError::MissingColumn(c) if c == "GeneName"));
    }

    #[test]
    fn test_square_view_respects_ceiling() {
        // 1 x 3 fits in 4 cells, its 3 x 3 square does not
        let t = table(&[
            ("g1", "m1", Some(-1.0)),
            ("g1", "m2", Some(-2.0)),
            ("g1", "m3", Some(-3.0)),
        ]);
        let options = MatrixOptions {
            max_cells: Some(4),
            ..MatrixOptions::default()
        };
        let m = build_matrix(&t, &ColumnSchema::default(), &options).unwrap();
        assert_eq!(m.to_dense().dim(), (1, 3));
        assert!(matches!(
            m.to_square(),
            Err(MirnaError::TooManyEntities { genes: 1, mirnas: 3, limit: 4 })
        ));
    }

    #[test]
    fn test_cell_ceiling() {
        let t = table(&[
            ("g1", "m1", Some(-1.0)),
            ("g2", "m2", Some(-1.0)),
            ("g3", "m3", Some(-1.0)),
        ]);
        let options = MatrixOptions {
            max_cells: Some(8),
            ..MatrixOptions::default()
        };
        let err = build_matrix(&t, &ColumnSchema::default(), &options).unwrap_err();
        assert!(matches!(
            err,
            MirnaError::TooManyEntities { genes: 3, mirnas: 3, limit: 8 }
        ));

        let unbounded = MatrixOptions {
            max_cells: None,
            ..MatrixOptions::default()
        };
        assert!(build_matrix(&t, &ColumnSchema::default(), &unbounded).is_ok());
    }

    #[test]
    fn test_blank_identifier() {
        let t = table(&[("g1", "  ", Some(-1.0))]);
        let err = build_matrix(&t, &ColumnSchema::default(), &MatrixOptions::default()).unwrap_err();
        assert!(matches!(err, MirnaError::MissingIdentifier { row: 0, .. }));
    }
}
