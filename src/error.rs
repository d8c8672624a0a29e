use thiserror::Error;

/// Errors raised by the density and salinity calculations.
///
/// Every variant halts the request that produced it; no calculation falls
/// back to a default value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeawaterError {
    #[error("Invalid {axis} range: min={min}, max={max} (min must be strictly below max)")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
    },
    #[error("Invalid water depth: {0} m (must be positive)")]
    InvalidDepth(f64),
    #[error("Number of isopycnals must be positive")]
    InvalidIsopycnalCount,
    #[error("No reference row for age {age} ka (rounded to {age_ka} ka)")]
    AgeNotFound { age: f64, age_ka: f64 },
    #[error("Reference table has more than one row for age {0} ka")]
    DuplicateAge(i64),
    #[error("Invalid interval '{name}': start {age_start} ka is after end {age_end} ka")]
    InvalidInterval {
        name: String,
        age_start: f64,
        age_end: f64,
    },
    #[error("Seawater equation failed: {0}")]
    Equation(String),
}

impl From<gsw::Error> for SeawaterError {
    fn from(err: gsw::Error) -> Self {
        SeawaterError::Equation(err.to_string())
    }
}

/// Convenience type for `Result<T, SeawaterError>`.
pub type SeawaterResult<T> = Result<T, SeawaterError>;
