//! Delimited output for filtered tables and interaction edge lists.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::filter::Thresholds;
use super::model::PredictionTable;
use crate::error::Result;
use crate::network::InteractionMatrix;

/// Cutoff as it appears in a file name; negative values get an `m` prefix
/// instead of a minus sign.
pub fn format_cutoff(value: f64) -> String {
    if value < 0.0 {
        format!("m{}", -value)
    } else {
        format!("{value}")
    }
}

/// `<stem>__p<probability_min>__e<mfe_max>.tsv`, placed in `out_dir` or next
/// to the source file, so runs with different cutoffs never collide.
pub fn filtered_file_name(source: &Path, thresholds: &Thresholds, out_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "predictions".to_string());
    let name = format!(
        "{stem}__p{}__e{}.tsv",
        format_cutoff(thresholds.probability_min),
        format_cutoff(thresholds.mfe_max)
    );
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(name)
}

/// Write a table as TSV with its header row.
pub fn write_table<W: Write>(table: &PredictionTable, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_table_to_path(table: &PredictionTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_table(table, std::io::BufWriter::new(file))
}

/// Write every observed gene/miRNA pair as `gene  mirna  weight`.
/// Pairs observed without an MFE get an empty weight field.
pub fn write_edges<W: Write>(matrix: &InteractionMatrix, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
    writer.write_record(["gene", "mirna", "weight"])?;
    for edge in matrix.edges() {
        let weight = edge.weight.map(|w| w.to_string()).unwrap_or_default();
        writer.write_record([edge.gene, edge.mirna, weight.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_edges_to_path(matrix: &InteractionMatrix, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_edges(matrix, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn test_filtered_file_name() {
        let t = Thresholds::new(0.5, -10.0).unwrap();
        assert_eq!(
            filtered_file_name(Path::new("runs/preds.tsv"), &t, None),
            PathBuf::from("runs/preds__p0.5__em10.tsv")
        );
        let t = Thresholds::new(0.95, 0.0).unwrap();
        assert_eq!(
            filtered_file_name(Path::new("runs/preds.tsv"), &t, Some(Path::new("out"))),
            PathBuf::from("out/preds__p0.95__e0.tsv")
        );
    }

    #[test]
    fn test_format_cutoff() {
        assert_eq!(format_cutoff(-12.5), "m12.5");
        assert_eq!(format_cutoff(3.0), "3");
    }

    #[test]
    fn test_write_table_tsv() {
        let table = PredictionTable::from_rows(
            vec!["GeneName".into(), "MFE".into(), "Note".into()],
            vec![vec![
                CellValue::String("TP53".into()),
                CellValue::Float(-20.5),
                CellValue::Null,
            ]],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "GeneName\tMFE\tNote\nTP53\t-20.5\t\n");
    }
}
