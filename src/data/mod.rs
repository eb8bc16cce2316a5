/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordTable   (reload: worker thread, latest wins)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ RecordTable  │  Vec<Record>, immutable once loaded
///   └─────────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌───────────┐     ┌───────────┐
///   │ aggregate  │     │ histogram  │
///   └───────────┘     └───────────┘
///   GroupSummary,      HistogramBin
///   TrendPoint
/// ```

pub mod aggregate;
pub mod histogram;
pub mod loader;
pub mod model;
pub mod reload;
