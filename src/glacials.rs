//! Glacial intervals on an age axis.
//!
//! Stacked time-series figures shade every glacial Marine Isotope Stage and
//! may label each stage. This module answers the data side of that: which
//! stages are glacial, which stage an age falls in, and which glacial spans
//! are visible in a given age window.

use serde::Serialize;

use crate::data::model::MisInterval;
use crate::error::{SeawaterError, SeawaterResult};

/// A glacial stage clipped to an age window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlacialSpan {
    pub interval: String,
    pub age_start: f64,
    pub age_end: f64,
    /// Label position of the whole (unclipped) stage.
    pub label_anchor: f64,
}

/// MIS boundaries ordered by start age.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MisBoundaries {
    intervals: Vec<MisInterval>,
}

impl MisBoundaries {
    pub fn new(mut intervals: Vec<MisInterval>) -> SeawaterResult<Self> {
        if let Some(bad) = intervals.iter().find(|i| !(i.age_start <= i.age_end)) {
            return Err(SeawaterError::InvalidInterval {
                name: bad.interval.clone(),
                age_start: bad.age_start,
                age_end: bad.age_end,
            });
        }
        intervals.sort_by(|a, b| a.age_start.total_cmp(&b.age_start));
        Ok(Self { intervals })
    }

    pub fn intervals(&self) -> &[MisInterval] {
        &self.intervals
    }

    pub fn glacials(&self) -> impl Iterator<Item = &MisInterval> {
        self.intervals.iter().filter(|i| i.glacial)
    }

    /// Stage containing `age`. Shared boundaries resolve to the younger stage.
    pub fn interval_at(&self, age: f64) -> Option<&MisInterval> {
        self.intervals.iter().find(|i| i.contains(age))
    }

    pub fn is_glacial(&self, age: f64) -> bool {
        self.interval_at(age).is_some_and(|i| i.glacial)
    }

    /// Glacial stages overlapping `[min_age, max_age]`, clipped to it.
    pub fn glacial_spans(&self, min_age: f64, max_age: f64) -> Vec<GlacialSpan> {
        self.glacials()
            .filter(|i| i.age_end > min_age && i.age_start < max_age)
            .map(|i| GlacialSpan {
                interval: i.interval.clone(),
                age_start: i.age_start.max(min_age),
                age_end: i.age_end.min(max_age),
                label_anchor: i.label_anchor(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
