//! Descriptive statistics over `f64` slices.

/// Arithmetic mean, 0.0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance, 0.0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Population standard deviation, 0.0 for an empty slice.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Fraction of values satisfying `pred`, 0.0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
pub fn fraction(values: &[f64], pred: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| pred(v)).count() as f64 / values.len() as f64
}

/// Median, averaging the two middle values for even lengths.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut scratch = values.to_vec();
    percentile_in_place(&mut scratch, 50.0)
}

/// Linear-interpolated percentile, `q` in `[0, 100]`.
#[must_use]
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let mut scratch = values.to_vec();
    percentile_in_place(&mut scratch, q)
}

/// Percentile that reorders `values` instead of copying them.
///
/// Uses the rank `q / 100 * (n - 1)` and interpolates between the two
/// neighbouring order statistics. Returns 0.0 for an empty slice.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile_in_place(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let t = rank - rank.floor();

    let (_, &mut below, above) = values.select_nth_unstable_by(lo, f64::total_cmp);
    if t == 0.0 || above.is_empty() {
        return below;
    }
    let next = above.iter().copied().fold(f64::INFINITY, f64::min);
    lerp(below, next, t)
}

/// Interpolation that stays exact at both ends.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t < 0.5 {
        a + diff * t
    } else {
        b - diff * (1.0 - t)
    }
}
