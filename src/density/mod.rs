//! Density field over a temperature–salinity box.
//!
//! ```text
//!  DensityGridRequest
//!        │  validate (ranges, depth, isopycnal count)
//!        ▼
//!   linspace × 2 ──▶ sea pressure at depth ──▶ SA per salinity row
//!        │                                            │
//!        └──────────────── sigma2(SA, T) ◀────────────┘
//!                               │
//!                               ▼
//!                     DensityGridResult ──▶ levels::isopycnal_levels
//! ```

pub mod levels;

use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{SeawaterError, SeawaterResult};
use crate::teos10::SeawaterEquations;

pub use levels::isopycnal_levels;

/// Samples along each axis of the grid.
pub const GRID_RESOLUTION: usize = 156;

/// Seawater density used to turn water depth into pressure (kg/m³).
pub const SEAWATER_DENSITY: f64 = 1023.6;

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Standard atmospheric pressure in the units of [`absolute_pressure`].
pub const ATMOSPHERIC_PRESSURE: f64 = 10.1325;

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// Temperature/salinity box plus the site it is evaluated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityGridRequest {
    /// °C
    pub min_temp: f64,
    /// °C
    pub max_temp: f64,
    /// PSU
    pub min_sal: f64,
    /// PSU
    pub max_sal: f64,
    /// Water depth of the site (m). Sets the sea pressure handed to
    /// `sa_from_sp`. [`Teos10`](crate::teos10::Teos10) has no SAAR atlas and
    /// ignores pressure, so with it the depth does not change σ2.
    pub water_depth: f64,
    /// Degrees east. With the default [`Teos10`](crate::teos10::Teos10) the
    /// site position only matters inside the Baltic polygon; open-ocean
    /// grids are identical for every longitude and latitude.
    pub longitude: f64,
    /// Degrees north. See `longitude`.
    pub latitude: f64,
    /// Number of contour levels requested by the plotting side.
    pub num_isopycnals: usize,
}

impl Default for DensityGridRequest {
    fn default() -> Self {
        Self {
            min_temp: -4.0,
            max_temp: 15.0,
            min_sal: 33.0,
            max_sal: 36.0,
            water_depth: 2340.0,
            longitude: 158.506,
            latitude: 32.652,
            num_isopycnals: 10,
        }
    }
}

impl DensityGridRequest {
    /// Reject malformed requests before any computation.
    pub fn validate(&self) -> SeawaterResult<()> {
        check_range("temperature", self.min_temp, self.max_temp)?;
        check_range("salinity", self.min_sal, self.max_sal)?;
        if !(self.water_depth.is_finite() && self.water_depth > 0.0) {
            return Err(SeawaterError::InvalidDepth(self.water_depth));
        }
        if self.num_isopycnals == 0 {
            return Err(SeawaterError::InvalidIsopycnalCount);
        }
        Ok(())
    }
}

fn check_range(axis: &'static str, min: f64, max: f64) -> SeawaterResult<()> {
    // Written so that NaN bounds fail as well.
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(SeawaterError::InvalidRange { axis, min, max })
    }
}

/// σ2 values on the temperature × salinity mesh.
///
/// `sigma2[[i, j]]` is the density at `salinity[i]` and `temperature[j]`.
/// The salinity axis holds practical salinity so contours can be labelled
/// in PSU, while the densities were computed from absolute salinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityGridResult {
    pub temperature: Array1<f64>,
    pub salinity: Array1<f64>,
    pub sigma2: Array2<f64>,
    /// Sea pressure the salinity conversion was evaluated at.
    pub sea_pressure: f64,
}

impl DensityGridResult {
    /// `(salinity samples, temperature samples)`
    pub fn shape(&self) -> (usize, usize) {
        self.sigma2.dim()
    }

    pub fn density_at(&self, sal_idx: usize, temp_idx: usize) -> Option<f64> {
        self.sigma2.get([sal_idx, temp_idx]).copied()
    }

    pub fn min_density(&self) -> f64 {
        self.sigma2.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_density(&self) -> f64 {
        self.sigma2.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Pressure at `water_depth` metres of seawater.
pub fn absolute_pressure(water_depth: f64) -> f64 {
    (SEAWATER_DENSITY * GRAVITY * water_depth) / 100000.0
}

/// Absolute pressure minus one standard atmosphere.
pub fn sea_pressure(water_depth: f64) -> f64 {
    absolute_pressure(water_depth) - ATMOSPHERIC_PRESSURE
}

/// `num` evenly spaced samples over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Array1<f64> {
    match num {
        0 => return Array1::zeros(0),
        1 => return Array1::from_elem(1, start),
        _ => {}
    }
    let step = (stop - start) / (num - 1) as f64;
    let mut axis = Array1::from_shape_fn(num, |i| start + i as f64 * step);
    axis[num - 1] = stop;
    axis
}

/// Compute the σ2 field for `req` using the supplied seawater equations.
pub fn compute_grid<E>(req: &DensityGridRequest, eqs: &E) -> SeawaterResult<DensityGridResult>
where
    E: SeawaterEquations + ?Sized,
{
    req.validate()?;

    let temperature = linspace(req.min_temp, req.max_temp, GRID_RESOLUTION);
    let salinity = linspace(req.min_sal, req.max_sal, GRID_RESOLUTION);
    let sea_pressure = sea_pressure(req.water_depth);
    debug!(
        "density grid: depth={} m, sea_pressure={sea_pressure:.4}, lon={}, lat={}",
        req.water_depth, req.longitude, req.latitude
    );

    // The conversion only depends on SP along a row of the mesh.
    let absolute_salinity = salinity
        .iter()
        .map(|&sp| eqs.sa_from_sp(sp, sea_pressure, req.longitude, req.latitude))
        .collect::<SeawaterResult<Vec<f64>>>()?;

    let mut sigma2 = Array2::<f64>::zeros((salinity.len(), temperature.len()));
    for ((i, j), value) in sigma2.indexed_iter_mut() {
        *value = eqs.sigma2(absolute_salinity[i], temperature[j])?;
    }

    Ok(DensityGridResult {
        temperature,
        salinity,
        sigma2,
        sea_pressure,
    })
}
