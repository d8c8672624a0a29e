//! Data layer: reference tables and their loaders.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → rows, check ages are whole ka
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ ReferenceTable  │  BTreeMap<age_ka, SeaLevelRecord>, one row per age
//!   │ Vec<MisInterval>│  glacial / interglacial stages
//!   └────────────────┘
//! ```

pub mod loader;
pub mod model;

pub use loader::{load_mis_boundaries, load_reference_table};
pub use model::{MisInterval, ReferenceTable, SeaLevelRecord};
