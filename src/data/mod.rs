/// Data layer: core types, ingestion/export, and row selection.
///
/// Architecture:
/// ```text
///   Arrow RecordBatch / column vectors
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  validate schema once → TensileSeries
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TensileSeries   │  time_ms, time_s, strain, stress
///   └────────────────┘
///        │   (extrema, cycles, calibrate)
///        ▼
///   ┌──────────┐
///   │  filter   │  flags / cycle labels → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
