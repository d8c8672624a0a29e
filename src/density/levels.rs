use super::DensityGridResult;

/// Step multipliers tried for each power of ten.
const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Contour levels for a density grid.
///
/// Picks the smallest "nice" spacing (1, 2, 2.5 or 5 × 10^k) that splits the
/// density range into at most `num_isopycnals + 1` bins and returns the
/// multiples of that spacing lying strictly inside the range. A flat field or
/// a zero count yields no levels.
pub fn isopycnal_levels(grid: &DensityGridResult, num_isopycnals: usize) -> Vec<f64> {
    levels_between(grid.min_density(), grid.max_density(), num_isopycnals)
}

/// Same as [`isopycnal_levels`] over an explicit `[lo, hi]` range.
pub fn levels_between(lo: f64, hi: f64, num_isopycnals: usize) -> Vec<f64> {
    if num_isopycnals == 0 || !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Vec::new();
    }
    let step = nice_step((hi - lo) / (num_isopycnals + 1) as f64);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|&level| level > lo && level < hi)
        .collect()
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    NICE_STEPS
        .iter()
        .map(|m| m * magnitude)
        .find(|&step| step >= raw * (1.0 - 1e-12))
        .unwrap_or(10.0 * magnitude)
}
