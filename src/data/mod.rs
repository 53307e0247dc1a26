/// Data layer: table model, loading, filtering, summaries and output.
///
/// Architecture:
/// ```text
///  .tsv / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PredictionTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  probability / MFE cutoffs → FilterOutcome
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ summary   │   │  writer   │  <stem>__p…__e….tsv
///   └──────────┘   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
pub mod writer;

pub use filter::{filter_predictions, FilterOutcome, Thresholds};
pub use model::{CellValue, ColumnIndices, ColumnSchema, PredictionRow, PredictionTable};
pub use summary::{summarize, Summary};
