//! Paleo-salinity from seawater δ18O.
//!
//! The measured δ18O_sw is first stripped of the global ice-volume signal
//! for its age, compared with the modern value, and turned into a salinity
//! difference with the Pacific δ18O–salinity slope of LeGrande & Schmidt
//! (2008). A second term accounts for the smaller (or larger) ocean volume at
//! that sea level:
//!
//! $$S = S_{modern} + \frac{\delta^{18}O_{sw} - \delta^{18}O_{IV} - \delta^{18}O_{modern}}{0.44}
//!       + \frac{SL}{3682} \cdot 34.7$$

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::model::ReferenceTable;
use crate::error::{SeawaterError, SeawaterResult};

/// δ18O–salinity slope for the Pacific Ocean (‰ per PSU).
pub const PACIFIC_D18O_SALINITY_SLOPE: f64 = 0.44;

/// Mean depth of the global ocean (m).
pub const MEAN_OCEAN_DEPTH: f64 = 3682.0;

/// Mean salinity of the global ocean (PSU).
pub const MEAN_OCEAN_SALINITY: f64 = 34.7;

// ---------------------------------------------------------------------------
// Age rounding
// ---------------------------------------------------------------------------

/// How a continuous age is snapped to the whole-ka rows of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRounding {
    /// 18.5 → 19, -0.5 → -1.
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding: 18.5 → 18, 19.5 → 20.
    HalfEven,
}

impl AgeRounding {
    pub fn round(self, age: f64) -> f64 {
        match self {
            AgeRounding::HalfAwayFromZero => age.round(),
            AgeRounding::HalfEven => age.round_ties_even(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalinityReconstructionRequest {
    /// Measured δ18O of past seawater (‰).
    pub d18o_sw: f64,
    /// Sample age (ka).
    pub age: f64,
    /// Modern δ18O_sw at the site (‰).
    pub d18o_sw_modern: f64,
    /// Modern salinity at the site (PSU).
    pub salinity_modern: f64,
}

/// Every intermediate term of a reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalinityReconstruction {
    /// Table row the age resolved to.
    pub age_ka: i64,
    /// Ice-volume δ18O removed from the measurement.
    pub d18o_ivc: f64,
    pub adjusted_d18o_sw: f64,
    pub delta_d18o_sw: f64,
    pub delta_salinity_isotope: f64,
    pub delta_salinity_sea_level: f64,
    /// Reconstructed salinity (PSU).
    pub salinity: f64,
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Reconstructs salinities against one borrowed reference table.
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    table: &'a ReferenceTable,
    rounding: AgeRounding,
}

impl<'a> Estimator<'a> {
    pub fn new(table: &'a ReferenceTable) -> Self {
        Self {
            table,
            rounding: AgeRounding::default(),
        }
    }

    pub fn with_rounding(mut self, rounding: AgeRounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn rounding(&self) -> AgeRounding {
        self.rounding
    }

    /// Reconstructed salinity (PSU).
    pub fn reconstruct(&self, req: &SalinityReconstructionRequest) -> SeawaterResult<f64> {
        self.reconstruct_detailed(req).map(|r| r.salinity)
    }

    /// Reconstructed salinity together with the intermediate terms.
    pub fn reconstruct_detailed(
        &self,
        req: &SalinityReconstructionRequest,
    ) -> SeawaterResult<SalinityReconstruction> {
        let age_round = self.rounding.round(req.age);
        let not_found = SeawaterError::AgeNotFound {
            age: req.age,
            age_ka: age_round,
        };
        if !age_round.is_finite() || age_round.abs() >= i64::MAX as f64 {
            return Err(not_found);
        }
        let age_ka = age_round as i64;
        let row = self.table.get(age_ka).ok_or(not_found)?;

        let d18o_ivc = row.d18ow_iv;
        let adjusted_d18o_sw = req.d18o_sw - d18o_ivc;
        let delta_d18o_sw = adjusted_d18o_sw - req.d18o_sw_modern;
        let delta_salinity_isotope = delta_d18o_sw * (1.0 / PACIFIC_D18O_SALINITY_SLOPE);
        let delta_salinity_sea_level = (row.sl_m / MEAN_OCEAN_DEPTH) * MEAN_OCEAN_SALINITY;
        let delta_salinity = delta_salinity_isotope + delta_salinity_sea_level;
        let salinity = req.salinity_modern + delta_salinity;

        debug!(
            "age {} -> {age_ka} ka: d18O_ivc={d18o_ivc}, Δd18O_sw={delta_d18o_sw:.4}, \
             ΔS_isotope={delta_salinity_isotope:.4}, ΔS_sea_level={delta_salinity_sea_level:.4}, S={salinity:.4}",
            req.age
        );

        Ok(SalinityReconstruction {
            age_ka,
            d18o_ivc,
            adjusted_d18o_sw,
            delta_d18o_sw,
            delta_salinity_isotope,
            delta_salinity_sea_level,
            salinity,
        })
    }
}

/// Reconstruct with the default age rounding.
pub fn reconstruct(
    req: &SalinityReconstructionRequest,
    table: &ReferenceTable,
) -> SeawaterResult<f64> {
    Estimator::new(table).reconstruct(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SeaLevelRecord;
    use is_close::is_close;

    fn table() -> ReferenceTable {
        ReferenceTable::from_records(vec![
            SeaLevelRecord {
                age_ka: 18,
                d18ow_iv: 1.0,
                sl_m: -120.0,
            },
            SeaLevelRecord {
                age_ka: 19,
                d18ow_iv: 1.02,
                sl_m: -124.0,
            },
            SeaLevelRecord {
                age_ka: 20,
                d18ow_iv: 1.04,
                sl_m: -126.0,
            },
        ])
        .unwrap()
    }

    fn request(age: f64) -> SalinityReconstructionRequest {
        SalinityReconstructionRequest {
            d18o_sw: -0.5,
            age,
            d18o_sw_modern: -0.078,
            salinity_modern: 34.580,
        }
    }

    #[test]
    fn test_last_glacial_maximum_example() {
        let table = table();
        let salinity = reconstruct(&request(18.4), &table).unwrap();

        let expected =
            34.580 + ((-0.5 - 1.0 - (-0.078)) * (1.0 / 0.44)) + ((-120.0 / 3682.0) * 34.7);
        assert!(is_close!(salinity, expected), "Expected {expected}, got {salinity}");
        assert!((salinity - 30.217274702483827).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_terms() {
        let table = table();
        let r = Estimator::new(&table)
            .reconstruct_detailed(&request(18.4))
            .unwrap();
        assert_eq!(r.age_ka, 18);
        assert_eq!(r.d18o_ivc, 1.0);
        assert!(is_close!(r.adjusted_d18o_sw, -1.5));
        assert!(is_close!(r.delta_d18o_sw, -1.422));
        assert!(is_close!(r.delta_salinity_isotope, -3.231818181818182));
        assert!(is_close!(r.delta_salinity_sea_level, -1.1309071156979904));
        assert!(is_close!(
            r.salinity,
            34.580 + r.delta_salinity_isotope + r.delta_salinity_sea_level
        ));
    }

    #[test]
    fn test_age_not_found() {
        let table = table();
        let err = reconstruct(&request(25.2), &table).unwrap_err();
        assert_eq!(
            err,
            SeawaterError::AgeNotFound {
                age: 25.2,
                age_ka: 25.0
            }
        );
    }

    #[test]
    fn test_non_finite_age_not_found() {
        let table = table();
        assert!(matches!(
            reconstruct(&request(f64::NAN), &table),
            Err(SeawaterError::AgeNotFound { .. })
        ));
        assert!(matches!(
            reconstruct(&request(f64::INFINITY), &table),
            Err(SeawaterError::AgeNotFound { .. })
        ));
    }

    #[test]
    fn test_half_away_from_zero_boundary() {
        let table = table();
        let estimator = Estimator::new(&table);
        let below = estimator.reconstruct_detailed(&request(18.49)).unwrap();
        let at = estimator.reconstruct_detailed(&request(18.5)).unwrap();
        assert_eq!(below.age_ka, 18);
        assert_eq!(at.age_ka, 19);
        assert_eq!(estimator.reconstruct_detailed(&request(19.5)).unwrap().age_ka, 20);
    }

    #[test]
    fn test_half_even_boundary() {
        let table = table();
        let estimator = Estimator::new(&table).with_rounding(AgeRounding::HalfEven);
        assert_eq!(estimator.rounding(), AgeRounding::HalfEven);
        assert_eq!(estimator.reconstruct_detailed(&request(18.49)).unwrap().age_ka, 18);
        assert_eq!(estimator.reconstruct_detailed(&request(18.5)).unwrap().age_ka, 18);
        assert_eq!(estimator.reconstruct_detailed(&request(18.51)).unwrap().age_ka, 19);
        assert_eq!(estimator.reconstruct_detailed(&request(19.5)).unwrap().age_ka, 20);
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(AgeRounding::HalfAwayFromZero.round(-0.5), -1.0);
        assert_eq!(AgeRounding::HalfEven.round(-0.5), 0.0);
        assert_eq!(AgeRounding::HalfEven.round(2.5), 2.0);
        assert_eq!(AgeRounding::HalfAwayFromZero.round(2.5), 3.0);
    }

    #[test]
    fn test_idempotent() {
        let table = table();
        let req = request(19.2);
        let first = reconstruct(&req, &table).unwrap();
        let second = reconstruct(&req, &table).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_rounding_serde_names() {
        let json = serde_json::to_string(&AgeRounding::HalfEven).unwrap();
        assert_eq!(json, "\"half_even\"");
    }
}
