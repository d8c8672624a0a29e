//! Seawater properties for paleoclimate figures.
//!
//! Two independent calculations:
//!
//! * [`density::compute_grid`] – a σ2 field over a temperature/salinity box,
//!   for drawing isopycnals behind T–S scatter points.
//! * [`salinity::reconstruct`] – past salinity from a δ18O_sw measurement,
//!   corrected for ice volume and sea level using a [`ReferenceTable`].
//!
//! [`glacials`] supplies the glacial stages that stacked time-series figures
//! shade. Rendering is left to the caller.

pub mod config;
pub mod data;
pub mod density;
pub mod error;
pub mod glacials;
pub mod salinity;
pub mod teos10;

pub use data::model::{MisInterval, ReferenceTable, SeaLevelRecord};
pub use density::{compute_grid, DensityGridRequest, DensityGridResult};
pub use error::{SeawaterError, SeawaterResult};
pub use salinity::{reconstruct, AgeRounding, Estimator, SalinityReconstructionRequest};
pub use teos10::{SeawaterEquations, Teos10};
