//! Peak finding in 1D profiles and 2D planes.

use std::collections::HashMap;

/// Sliding-window maximum along one axis with nearest borders.
fn max_filter_1d(line: &[f64], radius: usize, out: &mut [f64]) {
    let n = line.len();
    for (i, slot) in out.iter_mut().enumerate() {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius).min(n - 1);
        *slot = line[lo..=hi]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
    }
}

/// Square maximum filter of side `2 * radius + 1` with nearest borders.
///
/// Clamping indices to the edge yields the same maxima as replicating the
/// border pixels.
fn max_filter(data: &[f64], width: usize, height: usize, radius: usize) -> Vec<f64> {
    let mut horizontal = vec![0.0; data.len()];
    for y in 0..height {
        max_filter_1d(
            &data[y * width..(y + 1) * width],
            radius,
            &mut horizontal[y * width..(y + 1) * width],
        );
    }

    let mut out = vec![0.0; data.len()];
    let mut column = vec![0.0; height];
    let mut filtered = vec![0.0; height];
    for x in 0..width {
        for y in 0..height {
            column[y] = horizontal[y * width + x];
        }
        max_filter_1d(&column, radius, &mut filtered);
        for y in 0..height {
            out[y * width + x] = filtered[y];
        }
    }
    out
}

/// Local maxima of a plane, strongest first, separated by more than
/// `min_distance` in Chebyshev distance.
///
/// A pixel qualifies when it equals the maximum of its
/// `(2 * min_distance + 1)` square neighbourhood, is strictly above the plane
/// minimum, and lies at least `min_distance` pixels from every border.
/// Candidates are visited in descending order (ties keep raster order) and
/// dropped if a kept peak lies within `min_distance`.
#[must_use]
pub fn local_maxima(
    data: &[f64],
    width: usize,
    height: usize,
    min_distance: usize,
) -> Vec<(usize, usize)> {
    if width <= 2 * min_distance || height <= 2 * min_distance {
        return Vec::new();
    }
    let floor = data.iter().copied().fold(f64::INFINITY, f64::min);
    let maxima = max_filter(data, width, height, min_distance);

    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for y in min_distance..height - min_distance {
        for x in min_distance..width - min_distance {
            let v = data[y * width + x];
            if v == maxima[y * width + x] && v > floor {
                candidates.push((x, y));
            }
        }
    }
    candidates.sort_by(|a, b| data[b.1 * width + b.0].total_cmp(&data[a.1 * width + a.0]));

    // Kept peaks bucketed by cells of side `min_distance + 1`; any conflict
    // lives in the 3x3 block of cells around a candidate.
    let cell = min_distance + 1;
    let mut grid: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    let mut kept = Vec::new();
    for (x, y) in candidates {
        let (cx, cy) = (x / cell, y / cell);
        let conflict = (cy.saturating_sub(1)..=cy + 1).any(|gy| {
            (cx.saturating_sub(1)..=cx + 1).any(|gx| {
                grid.get(&(gx, gy)).is_some_and(|peaks| {
                    peaks
                        .iter()
                        .any(|&(px, py)| px.abs_diff(x).max(py.abs_diff(y)) <= min_distance)
                })
            })
        });
        if !conflict {
            grid.entry((cx, cy)).or_default().push((x, y));
            kept.push((x, y));
        }
    }
    kept
}

/// Indices of local maxima in a 1D profile with value at least `min_height`.
///
/// A sample is a peak when it is strictly greater than its left neighbour
/// and the run of equal values it starts ends in a strictly smaller value;
/// flat peaks are reported once, at the middle of the run. The first and last
/// samples are never peaks.
#[must_use]
pub fn find_peaks(values: &[f64], min_height: f64) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }
    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let peak = (i + ahead - 1) / 2;
                if values[peak] >= min_height {
                    peaks.push(peak);
                }
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_basic() {
        let values = [0.0, 1.0, 0.0, 2.0, 0.0, 0.5, 0.0];
        assert_eq!(find_peaks(&values, 0.0), vec![1, 3, 5]);
        assert_eq!(find_peaks(&values, 1.0), vec![1, 3]);
    }

    #[test]
    fn test_find_peaks_plateau_counted_once() {
        let values = [0.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks(&values, 0.0), vec![2]);
        // Plateau running into the edge is not a peak
        let values = [0.0, 1.0, 1.0, 1.0];
        assert!(find_peaks(&values, 0.0).is_empty());
    }

    #[test]
    fn test_find_peaks_edges_excluded() {
        let values = [5.0, 1.0, 5.0];
        assert!(find_peaks(&values, 0.0).is_empty());
    }

    #[test]
    fn test_local_maxima_respects_border_and_spacing() {
        let (w, h) = (100, 100);
        let mut data = vec![0.0; w * h];
        // Two bumps 10 px apart: only the stronger survives
        data[50 * w + 40] = 1.0;
        data[50 * w + 50] = 0.9;
        // A far bump survives
        data[30 * w + 75] = 0.8;
        // Too close to the border
        data[5 * w + 5] = 2.0;

        let peaks = local_maxima(&data, w, h, 20);
        assert_eq!(peaks, vec![(40, 50), (75, 30)]);
    }

    #[test]
    fn test_local_maxima_constant_plane_is_empty() {
        let data = vec![0.5; 64 * 64];
        assert!(local_maxima(&data, 64, 64, 20).is_empty());
    }

    #[test]
    fn test_local_maxima_small_plane() {
        let data: Vec<f64> = (0..30 * 30).map(|i| i as f64).collect();
        assert!(local_maxima(&data, 30, 30, 20).is_empty());
    }
}
