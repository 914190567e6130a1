/// Data layer: source tables, the four-way join and per-cell lookup.
///
/// Architecture:
/// ```text
///  csr_africa_{dni,glo,tilt,dif}.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → MeasurementTable ×4
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   join    │  dni ⋈ glo ⋈ tilt ⋈ dif on PSECELLID → JoinedTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  lookup   │  cell id → four monthly series + LAT/LON
///   └──────────┘
/// ```

pub mod join;
pub mod loader;
pub mod lookup;
pub mod model;
