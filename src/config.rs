//! Run configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [density]
//! water_depth = 3100.0
//! num_isopycnals = 8
//!
//! [reconstruction]
//! salinity_modern = 34.62
//! rounding = "half_even"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::density::DensityGridRequest;
use crate::salinity::AgeRounding;
use crate::teos10::Teos10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub density: DensityGridRequest,
    pub reconstruction: ReconstructionConfig,
    pub equations: Teos10,
}

/// Modern baselines for salinity reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Modern δ18O_sw at the site (‰).
    ///
    /// Default: -0.078
    pub d18o_sw_modern: f64,

    /// Modern salinity at the site (PSU).
    ///
    /// Default: 34.580
    pub salinity_modern: f64,

    pub rounding: AgeRounding,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            d18o_sw_modern: -0.078,
            salinity_modern: 34.580,
            rounding: AgeRounding::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing TOML config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}
