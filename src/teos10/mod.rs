//! TEOS-10 seawater equations used by the density field.
//!
//! The density calculation only needs two functions from the Gibbs Seawater
//! toolbox, so they sit behind the [`SeawaterEquations`] trait:
//!
//! ```text
//!   practical salinity ──sa_from_sp──▶ absolute salinity
//!                                              │
//!   temperature ─────────────────────────sigma2┴──▶ σ2 (kg/m³ − 1000)
//! ```
//!
//! [`Teos10`] is the default implementation, backed by the `gsw` crate
//! (GSW-rs). `gsw` ships no absolute-salinity anomaly atlas, so outside the
//! Baltic the conversion scales Reference Salinity by a fixed SAAR. Callers
//! with access to the atlas can supply their own implementation.

use serde::{Deserialize, Serialize};

use crate::error::SeawaterResult;

/// Standard Ocean Reference Salinity (g/kg).
pub const SSO: f64 = 35.16504;

/// Reference pressure of sigma-2 (dbar).
pub const SIGMA2_REFERENCE_PRESSURE: f64 = 2000.0;

/// Pure functions consumed by [`crate::density::compute_grid`].
pub trait SeawaterEquations {
    /// Absolute Salinity (g/kg) from Practical Salinity, sea pressure (dbar),
    /// longitude and latitude (degrees).
    fn sa_from_sp(&self, sp: f64, p: f64, lon: f64, lat: f64) -> SeawaterResult<f64>;

    /// Potential density anomaly referenced to 2000 dbar (kg/m³).
    fn sigma2(&self, sa: f64, ct: f64) -> SeawaterResult<f64>;
}

// ---------------------------------------------------------------------------
// Teos10 – gsw-backed implementation
// ---------------------------------------------------------------------------

/// TEOS-10 implementation delegating to the `gsw` crate.
///
/// `saar` is the Absolute Salinity Anomaly Ratio applied outside the Baltic.
/// The default of zero gives Reference Salinity. Pressure, longitude and
/// latitude therefore only change the result inside the Baltic polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Teos10 {
    pub saar: f64,
}

impl Default for Teos10 {
    fn default() -> Self {
        Self { saar: 0.0 }
    }
}

impl Teos10 {
    pub fn with_saar(saar: f64) -> Self {
        Self { saar }
    }

    /// Specific volume (m³/kg), 75-term polynomial.
    pub fn specvol(&self, sa: f64, ct: f64, p: f64) -> SeawaterResult<f64> {
        Ok(gsw::volume::specvol(sa, ct, p)?)
    }

    /// In-situ density (kg/m³).
    pub fn rho(&self, sa: f64, ct: f64, p: f64) -> SeawaterResult<f64> {
        Ok(gsw::volume::rho(sa, ct, p)?)
    }
}

impl SeawaterEquations for Teos10 {
    fn sa_from_sp(&self, sp: f64, _p: f64, lon: f64, lat: f64) -> SeawaterResult<f64> {
        let sp = sp.max(0.0);
        if let Some(sa) = sa_from_sp_baltic(sp, lon, lat) {
            return Ok(sa);
        }
        Ok(gsw::conversions::sr_from_sp(sp) * (1.0 + self.saar))
    }

    fn sigma2(&self, sa: f64, ct: f64) -> SeawaterResult<f64> {
        Ok(gsw::volume::sigma2(sa, ct)?)
    }
}

// ---------------------------------------------------------------------------
// Baltic Sea branch
// ---------------------------------------------------------------------------

const BALTIC_LEFT_LON: [f64; 3] = [12.6, 7.0, 26.0];
const BALTIC_LEFT_LAT: [f64; 3] = [50.0, 59.0, 69.0];
const BALTIC_RIGHT_LON: [f64; 2] = [45.0, 26.0];
const BALTIC_RIGHT_LAT: [f64; 2] = [50.0, 69.0];

/// Absolute Salinity in the Baltic Sea (Feistel et al., 2010), or `None`
/// when the position lies outside the Baltic polygon.
pub fn sa_from_sp_baltic(sp: f64, lon: f64, lat: f64) -> Option<f64> {
    let lon = lon.rem_euclid(360.0);
    let inside_box = BALTIC_LEFT_LON[1] < lon
        && lon < BALTIC_RIGHT_LON[0]
        && BALTIC_LEFT_LAT[0] < lat
        && lat < BALTIC_LEFT_LAT[2];
    if !inside_box {
        return None;
    }
    let left = interp(&BALTIC_LEFT_LAT, &BALTIC_LEFT_LON, lat);
    let right = interp(&BALTIC_RIGHT_LAT, &BALTIC_RIGHT_LON, lat);
    if left <= lon && lon <= right {
        Some(((SSO - 0.087) / 35.0) * sp + 0.087)
    } else {
        None
    }
}

/// Piecewise-linear interpolation of `y(x)` over ascending `xs`.
fn interp(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let last = xs.len() - 1;
    let k = xs
        .windows(2)
        .position(|w| x <= w[1])
        .unwrap_or(last - 1);
    let t = (x - xs[k]) / (xs[k + 1] - xs[k]);
    ys[k] + t * (ys[k + 1] - ys[k])
}
