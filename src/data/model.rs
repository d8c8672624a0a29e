use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SeawaterError, SeawaterResult};

// ---------------------------------------------------------------------------
// SeaLevelRecord – one row of the sea-level / ice-volume series
// ---------------------------------------------------------------------------

/// Ice-volume δ18O and relative sea level at one age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeaLevelRecord {
    /// Age in thousands of years before present.
    pub age_ka: i64,
    /// Ice-volume contribution to seawater δ18O (‰).
    #[serde(rename = "d18Ow_IV")]
    pub d18ow_iv: f64,
    /// Relative sea level (m), negative when below present.
    #[serde(rename = "SL_m")]
    pub sl_m: f64,
}

// ---------------------------------------------------------------------------
// ReferenceTable – the complete loaded series
// ---------------------------------------------------------------------------

/// Sea-level series keyed by integer age.
///
/// Holds exactly one row per age. The table is built once and then only
/// read; calculations borrow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    rows: BTreeMap<i64, SeaLevelRecord>,
}

impl ReferenceTable {
    /// Build the table, rejecting repeated ages.
    pub fn from_records<I>(records: I) -> SeawaterResult<Self>
    where
        I: IntoIterator<Item = SeaLevelRecord>,
    {
        let mut rows = BTreeMap::new();
        for record in records {
            if rows.insert(record.age_ka, record).is_some() {
                return Err(SeawaterError::DuplicateAge(record.age_ka));
            }
        }
        Ok(Self { rows })
    }

    /// Row for an exact integer age.
    pub fn get(&self, age_ka: i64) -> Option<&SeaLevelRecord> {
        self.rows.get(&age_ka)
    }

    /// Rows in ascending age order.
    pub fn iter(&self) -> impl Iterator<Item = &SeaLevelRecord> {
        self.rows.values()
    }

    /// Youngest and oldest ages covered.
    pub fn age_range(&self) -> Option<(i64, i64)> {
        let first = self.rows.keys().next()?;
        let last = self.rows.keys().next_back()?;
        Some((*first, *last))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MisInterval – one Marine Isotope Stage
// ---------------------------------------------------------------------------

/// A Marine Isotope Stage and its age bounds (ka).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MisInterval {
    /// Stage name, e.g. `"MIS 2"`.
    pub interval: String,
    pub age_start: f64,
    pub age_end: f64,
    pub glacial: bool,
}

impl MisInterval {
    pub fn contains(&self, age: f64) -> bool {
        self.age_start <= age && age <= self.age_end
    }

    /// Where an interval label sits on the age axis: 3 ka before the
    /// midpoint, so the text ends up roughly centred.
    pub fn label_anchor(&self) -> f64 {
        (self.age_start + self.age_end) / 2.0 - 3.0
    }
}

impl fmt::Display for MisInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.glacial { "glacial" } else { "interglacial" };
        write!(
            f,
            "{} ({}–{} ka, {kind})",
            self.interval, self.age_start, self.age_end
        )
    }
}
