/// Data layer: core types, loading, and the degraded-mode fixture.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → normalize headers → typed rows
///   └──────────┘
///        │             (on failure: fixture, logged as degraded)
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, immutable after load
///   └──────────┘
/// ```

pub mod fixture;
pub mod loader;
pub mod model;
