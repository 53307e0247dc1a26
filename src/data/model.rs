use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MirnaError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the prediction table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring the dtypes a TSV reader infers.
/// Summaries count cells in ordered maps, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so floats can be counted and sorted --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        if let (Integer(a), Integer(b)) = (self, other) {
            return a.cmp(b);
        }
        // Numbers compare by value regardless of integer/float storage.
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.total_cmp(&b);
        }
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form of an identifier cell; `None` for null or empty cells.
    pub fn as_identifier(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            CellValue::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// Infer a cell type from raw text the way a TSV reader would.
    pub fn guess(s: &str) -> Self {
        if s.is_empty() || matches!(s, "NA" | "NaN" | "nan" | "null" | "NULL") {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// ColumnSchema – names of the interpreted columns
// ---------------------------------------------------------------------------

/// Names of the four columns the filter, summarizer and matrix builder read.
/// Defaults follow the miRAW result file header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    pub gene: String,
    pub mirna: String,
    pub probability: String,
    pub mfe: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            gene: "GeneName".to_string(),
            mirna: "miRNA".to_string(),
            probability: "Prediction".to_string(),
            mfe: "MFE".to_string(),
        }
    }
}

/// Positions of the four schema columns in one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub gene: usize,
    pub mirna: usize,
    pub probability: usize,
    pub mfe: usize,
}

impl ColumnSchema {
    /// Look up every schema column, failing on the first one the table lacks.
    pub fn resolve(&self, table: &PredictionTable) -> Result<ColumnIndices> {
        Ok(ColumnIndices {
            gene: table.column_index(&self.gene)?,
            mirna: table.column_index(&self.mirna)?,
            probability: table.column_index(&self.probability)?,
            mfe: table.column_index(&self.mfe)?,
        })
    }
}

// ---------------------------------------------------------------------------
// PredictionRow – typed view of one table row
// ---------------------------------------------------------------------------

/// One candidate interaction, borrowed from a [`PredictionTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow<'a> {
    pub gene_name: Cow<'a, str>,
    pub mirna_name: Cow<'a, str>,
    pub probability: Option<f64>,
    pub mfe: Option<f64>,
}

// ---------------------------------------------------------------------------
// PredictionTable – the complete loaded table
// ---------------------------------------------------------------------------

/// Rows of target predictions with a fixed, named column layout.
/// Row order is the order of the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl PredictionTable {
    /// Empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table, checking every row against the header width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row; its width must match the header.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(MirnaError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| MirnaError::MissingColumn(name.to_string()))
    }

    /// Numeric value of a cell. Null cells give `None`; text that is not a
    /// number is an error.
    pub fn numeric(&self, row: usize, col: usize) -> Result<Option<f64>> {
        let cell = &self.rows[row][col];
        match cell {
            CellValue::Null => Ok(None),
            CellValue::String(s) => match s.trim().parse::<f64>() {
                Ok(v) if !v.is_nan() => Ok(Some(v)),
                Ok(_) => Ok(None),
                Err(_) => Err(MirnaError::NonNumeric {
                    column: self.columns[col].clone(),
                    row,
                    value: s.clone(),
                }),
            },
            CellValue::Bool(b) => Err(MirnaError::NonNumeric {
                column: self.columns[col].clone(),
                row,
                value: b.to_string(),
            }),
            other => Ok(other.as_f64().filter(|v| !v.is_nan())),
        }
    }

    /// Identifier text of a cell; null or blank cells are an error.
    pub fn identifier(&self, row: usize, col: usize) -> Result<Cow<'_, str>> {
        self.rows[row][col]
            .as_identifier()
            .ok_or_else(|| MirnaError::MissingIdentifier {
                column: self.columns[col].clone(),
                row,
            })
    }

    /// Typed view over every row, resolving the schema columns once.
    /// Missing columns are reported even when the table has no rows.
    pub fn predictions(&self, schema: &ColumnSchema) -> Result<Vec<PredictionRow<'_>>> {
        let cols = schema.resolve(self)?;

        (0..self.rows.len())
            .map(|row| {
                Ok(PredictionRow {
                    gene_name: self.identifier(row, cols.gene)?,
                    mirna_name: self.identifier(row, cols.mirna)?,
                    probability: self.numeric(row, cols.probability)?,
                    mfe: self.numeric(row, cols.mfe)?,
                })
            })
            .collect()
    }

    /// New table holding the given rows, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PredictionTable {
        PredictionTable::from_rows(
            vec!["GeneName".into(), "miRNA".into(), "Prediction".into(), "MFE".into()],
            vec![
                vec![
                    CellValue::String("g1".into()),
                    CellValue::String("m1".into()),
                    CellValue::Float(0.9),
                    CellValue::Float(-10.0),
                ],
                vec![
                    CellValue::Integer(7157),
                    CellValue::String("m2".into()),
                    CellValue::Integer(1),
                    CellValue::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_guess_cell_types() {
        assert_eq!(CellValue::guess("12"), CellValue::Integer(12));
        assert_eq!(CellValue::guess("-3.5"), CellValue::Float(-3.5));
        assert_eq!(CellValue::guess("NaN"), CellValue::Null);
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("true"), CellValue::Bool(true));
        assert_eq!(CellValue::guess("hsa-miR-21-5p"), CellValue::String("hsa-miR-21-5p".into()));
    }

    #[test]
    fn test_numeric_ordering_ignores_storage() {
        assert!(CellValue::Integer(1) > CellValue::Float(0.5));
        assert!(CellValue::Null < CellValue::Integer(0));
        assert!(CellValue::Float(2.0) < CellValue::String("a".into()));
    }

    #[test]
    fn test_large_integers_stay_distinct() {
        let a = CellValue::Integer(i64::MAX);
        let b = CellValue::Integer(i64::MAX - 1);
        assert!(a > b);
        assert_ne!(a, b);
        assert_eq!(CellValue::Integer(3), CellValue::Float(3.0));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut t = PredictionTable::new(vec!["a".into(), "b".into()]);
        let err = t.push_row(vec![CellValue::Null]).unwrap_err();
        assert!(matches!(err, MirnaError::RaggedRow { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_predictions_view() {
        let t = table();
        let rows = t.predictions(&ColumnSchema::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gene_name, "g1");
        assert_eq!(rows[0].mfe, Some(-10.0));
        // numeric gene ids are still identifiers
        assert_eq!(rows[1].gene_name, "7157");
        assert_eq!(rows[1].probability, Some(1.0));
        assert_eq!(rows[1].mfe, None);
    }

    #[test]
    fn test_missing_column() {
        let t = table();
        let schema = ColumnSchema {
            mfe: "dG".into(),
            ..ColumnSchema::default()
        };
        assert!(matches!(
            t.predictions(&schema),
            Err(MirnaError::MissingColumn(c)) if c == "dG"
        ));

        let empty = PredictionTable::new(vec!["miRNA".into(), "Prediction".into(), "MFE".into()]);
        assert!(matches!(
            ColumnSchema::default().resolve(&empty),
            Err(MirnaError::MissingColumn(c)) if c == "GeneName"
        ));
    }

    #[test]
    fn test_non_numeric_text() {
        let t = PredictionTable::from_rows(
            vec!["MFE".into()],
            vec![vec![CellValue::String("strong".into())]],
        )
        .unwrap();
        assert!(matches!(t.numeric(0, 0), Err(MirnaError::NonNumeric { row: 0, .. })));
    }
}
