use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, PredictionTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a prediction table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.tsv` / `.txt` / `.tab` – tab-separated miRAW result file, `#` comments
/// * `.csv`     – comma-separated, same layout
/// * `.json`    – `[{ "GeneName": ..., "miRNA": ..., ... }, ...]`
/// * `.parquet` – one scalar column per field
pub fn load_file(path: &Path) -> Result<PredictionTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    log::info!("loading prediction file <{}>", path.display());
    let table = match ext.as_str() {
        "tsv" | "txt" | "tab" => load_delimited(path, b'\t'),
        "csv" => load_delimited(path, b','),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    log::info!("read <{}> lines", table.len());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one prediction per line.
/// Lines starting with `#` are skipped; every column is kept.
fn load_delimited(path: &Path, delimiter: u8) -> Result<PredictionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .from_path(path)
        .context("opening prediction file")?;
    parse_delimited(&mut reader)
}

/// Parse an already configured reader; split out so tests can feed strings.
pub(crate) fn parse_delimited<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<PredictionTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("prediction file has no header row");
    }

    let mut table = PredictionTable::new(headers);
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        let row = record.iter().map(|v| CellValue::guess(v.trim())).collect();
        table
            .push_row(row)
            .with_context(|| format!("row {row_no}"))?;
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`).
/// Columns are the union of keys over all records; a record lacking a key
/// gets a null cell.
fn load_json(path: &Path) -> Result<PredictionTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub(crate) fn parse_json(text: &str) -> Result<PredictionTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut keys: BTreeSet<&str> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().map(|k| k.as_str()));
        objects.push(obj);
    }

    let columns: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    let mut table = PredictionTable::new(columns.clone());
    for obj in objects {
        let row = columns
            .iter()
            .map(|c| obj.get(c).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of predictions, one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<PredictionTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = PredictionTable::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let normalized = batch
            .columns()
            .iter()
            .zip(table.columns())
            .map(|(col, name)| normalize_column(name, col))
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            let cells = normalized.iter().map(|col| extract_cell(col, row)).collect();
            table.push_row(cells)?;
        }
    }

    Ok(table)
}

/// The Arrow type a column is read as: text, 64-bit integer, 64-bit float or
/// boolean. Dictionary columns (pandas categoricals) decode to their values.
fn read_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(DataType::Utf8),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(DataType::Int64),
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Some(DataType::Float64),
        DataType::Boolean => Some(DataType::Boolean),
        DataType::Dictionary(_, values) => read_type(values),
        _ => None,
    }
}

/// Cast a column to its read type so every cell can be extracted directly.
fn normalize_column(name: &str, col: &ArrayRef) -> Result<ArrayRef> {
    let Some(target) = read_type(col.data_type()) else {
        bail!(
            "column '{name}' has unsupported type {:?}",
            col.data_type()
        );
    };
    if col.data_type() == &target {
        return Ok(col.clone());
    }
    cast(col.as_ref(), &target).with_context(|| {
        format!(
            "column '{name}': cannot read {:?} as {target:?}",
            col.data_type()
        )
    })
}

/// Extract a single cell from a normalized column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tsv(text: &str) -> Result<PredictionTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .comment(Some(b'#'))
            .from_reader(text.as_bytes());
        parse_delimited(&mut reader)
    }

    #[test]
    fn test_tsv_with_comments() {
        let table = tsv("# miRAW run 2024-04-03\n\
             GeneName\tmiRNA\tSiteStart\tPrediction\tMFE\n\
             # filtered by seed\n\
             TP53\thsa-miR-125b-5p\t120\t0.91\t-22.4\n\
             PTEN\thsa-miR-21-5p\t88\t0.67\t-15\n")
        .unwrap();

        assert_eq!(
            table.columns(),
            &["GeneName", "miRNA", "SiteStart", "Prediction", "MFE"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][2], CellValue::Integer(120));
        assert_eq!(table.rows()[1][4], CellValue::Integer(-15));
        assert_eq!(table.rows()[1][1], CellValue::String("hsa-miR-21-5p".into()));
    }

    #[test]
    fn test_tsv_ragged_row_is_error() {
        assert!(tsv("GeneName\tmiRNA\nTP53\n").is_err());
    }

    #[test]
    fn test_json_records() {
        let table = parse_json(
            r#"[{"GeneName": "TP53", "miRNA": "m1", "Prediction": 0.9, "MFE": -20.5},
                {"GeneName": "PTEN", "miRNA": "m2", "Prediction": 1}]"#,
        )
        .unwrap();
        assert_eq!(table.columns(), &["GeneName", "MFE", "Prediction", "miRNA"]);
        assert_eq!(table.rows()[0][1], CellValue::Float(-20.5));
        assert_eq!(table.rows()[1][1], CellValue::Null);
        assert_eq!(table.rows()[1][2], CellValue::Integer(1));
    }

    #[test]
    fn test_json_must_be_array_of_objects() {
        assert!(parse_json(r#"{"GeneName": "TP53"}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_parquet_categorical_and_narrow_columns() {
        use arrow::array::{DictionaryArray, Float32Array, Int16Array, StringArray};
        use arrow::datatypes::{Field, Int32Type, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let genes: DictionaryArray<Int32Type> = vec!["g1", "g2", "g3"].into_iter().collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("GeneName", genes.data_type().clone(), false),
            Field::new("miRNA", DataType::Utf8, false),
            Field::new("SiteStart", DataType::Int16, false),
            Field::new("Prediction", DataType::Float32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(genes),
                Arc::new(StringArray::from(vec!["m1", "m1", "m2"])),
                Arc::new(Int16Array::from(vec![10, 20, 30])),
                Arc::new(Float32Array::from(vec![0.5, 0.25, 1.0])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        let genes: Vec<_> = table.rows().iter().map(|r| r[0].clone()).collect();
        assert_eq!(
            genes,
            ["g1", "g2", "g3"].map(|g| CellValue::String(g.into()))
        );
        assert_eq!(table.rows()[1][2], CellValue::Integer(20));
        assert_eq!(table.rows()[1][3], CellValue::Float(0.25));
    }

    #[test]
    fn test_unsupported_arrow_type_names_column() {
        use arrow::array::Date32Array;

        let col: ArrayRef = Arc::new(Date32Array::from(vec![19000]));
        let err = normalize_column("Sampled", &col).unwrap_err();
        assert!(err.to_string().contains("Sampled"));
        assert!(err.to_string().contains("Date32"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("predictions.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
