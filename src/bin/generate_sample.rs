use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const GENES: [&str; 12] = [
    "TP53", "PTEN", "KRAS", "MYC", "BCL2", "CDKN1A", "E2F1", "VEGFA", "SOX4", "ZEB1", "ZEB2",
    "HMGA2",
];

const MIRNAS: [&str; 6] = [
    "hsa-miR-21-5p",
    "hsa-miR-155-5p",
    "hsa-miR-200c-3p",
    "hsa-let-7a-5p",
    "hsa-miR-34a-5p",
    "hsa-miR-125b-5p",
];

struct Prediction {
    gene: &'static str,
    mirna: &'static str,
    site_start: i64,
    site_end: i64,
    probability: f64,
    mfe: f64,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Prediction> {
    (0..n)
        .map(|_| {
            let gene = GENES[rng.below(GENES.len())];
            let mirna = MIRNAS[rng.below(MIRNAS.len())];
            let site_start = 1 + rng.below(3000) as i64;
            // stronger binding tends to come with higher confidence
            let probability = (rng.next_f64() * 1000.0).round() / 1000.0;
            let mfe = (rng.gauss(-12.0 - 10.0 * probability, 4.0) * 10.0).round() / 10.0;
            Prediction {
                gene,
                mirna,
                site_start,
                site_end: site_start + 22,
                probability,
                mfe: mfe.min(-0.1),
            }
        })
        .collect()
}

fn write_tsv(path: &str, rows: &[Prediction]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "# synthetic miRAW target predictions")?;
    writeln!(out, "GeneName\tmiRNA\tSiteStart\tSiteEnd\tPrediction\tMFE")?;
    for r in rows {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            r.gene, r.mirna, r.site_start, r.site_end, r.probability, r.mfe
        )?;
    }
    out.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Prediction]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("GeneName", DataType::Utf8, false),
        Field::new("miRNA", DataType::Utf8, false),
        Field::new("SiteStart", DataType::Int64, false),
        Field::new("SiteEnd", DataType::Int64, false),
        Field::new("Prediction", DataType::Float64, false),
        Field::new("MFE", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(rows.iter().map(|r| r.gene).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.mirna).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.site_start).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.site_end).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.probability).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.mfe).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 400);

    write_tsv("sample_predictions.tsv", &rows)?;
    write_parquet("sample_predictions.parquet", &rows)?;

    println!(
        "Wrote {} predictions ({} genes x {} miRNAs) to sample_predictions.tsv and .parquet",
        rows.len(),
        GENES.len(),
        MIRNAS.len()
    );
    Ok(())
}
