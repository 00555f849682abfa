//! Spatial filters over `f64` planes.
//!
//! Three border modes are used, matching the conventions each metric was
//! calibrated with:
//! - reflect-101 (`dcb|abcd|cba`) for the Laplacian and Sobel derivatives
//! - reflect (`cba|abcd|dcb`) for the float median
//! - nearest (`aaa|abcd|ddd`) for Gaussian smoothing

use image::GrayImage;

use crate::preprocess::GrayPlane;

/// Reflect-101 border index.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * (n - 1);
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - i;
    }
    i as usize
}

/// Reflect border index (edge sample repeated).
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut i = i.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}

/// Nearest border index.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn nearest(i: isize, n: usize) -> usize {
    i.clamp(0, n as isize - 1) as usize
}

/// Correlates the plane with a 3x3 kernel using reflect-101 borders.
#[allow(clippy::cast_possible_wrap)]
fn correlate3x3(plane: &GrayPlane, kernel: &[[f64; 3]; 3]) -> Vec<f64> {
    let (w, h) = (plane.width(), plane.height());
    let data = plane.data();
    let mut out = Vec::with_capacity(data.len());
    for y in 0..h {
        let rows = [
            reflect101(y as isize - 1, h),
            y,
            reflect101(y as isize + 1, h),
        ];
        for x in 0..w {
            let cols = [
                reflect101(x as isize - 1, w),
                x,
                reflect101(x as isize + 1, w),
            ];
            let mut acc = 0.0;
            for (ky, &row) in rows.iter().enumerate() {
                for (kx, &col) in cols.iter().enumerate() {
                    acc += kernel[ky][kx] * data[row * w + col];
                }
            }
            out.push(acc);
        }
    }
    out
}

/// 4-neighbour Laplacian.
#[must_use]
pub fn laplacian(plane: &GrayPlane) -> Vec<f64> {
    const KERNEL: [[f64; 3]; 3] = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];
    correlate3x3(plane, &KERNEL)
}

/// 3x3 Sobel derivative along x.
#[must_use]
pub fn sobel_x(plane: &GrayPlane) -> Vec<f64> {
    const KERNEL: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
    correlate3x3(plane, &KERNEL)
}

/// 3x3 Sobel derivative along y.
#[must_use]
pub fn sobel_y(plane: &GrayPlane) -> Vec<f64> {
    const KERNEL: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];
    correlate3x3(plane, &KERNEL)
}

/// Normalized 1D Gaussian kernel with radius `round(truncate * sigma)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as usize;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64 - radius as f64;
            (-0.5 * x * x / (sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with nearest borders, truncated at 4 sigma.
///
/// Filters along columns first, then along rows.
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub fn gaussian_blur(data: &[f64], width: usize, height: usize, sigma: f64) -> Vec<f64> {
    let kernel = gaussian_kernel(sigma, 4.0);
    let radius = (kernel.len() / 2) as isize;

    let mut vertical = vec![0.0; data.len()];
    for y in 0..height {
        for x in 0..width {
            vertical[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let yy = nearest(y as isize + k as isize - radius, height);
                    weight * data[yy * width + x]
                })
                .sum();
        }
    }

    let mut out = vec![0.0; data.len()];
    for y in 0..height {
        let row = &vertical[y * width..(y + 1) * width];
        for x in 0..width {
            out[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| weight * row[nearest(x as isize + k as isize - radius, width)])
                .sum();
        }
    }
    out
}

/// Sharpens the plane: `v + amount * (v - gaussian(v, sigma))`.
///
/// The result is clipped to `[0, 1]`, or `[-1, 1]` when the plane has
/// negative values.
#[must_use]
pub fn unsharp_mask(plane: &GrayPlane, sigma: f64, amount: f64) -> Vec<f64> {
    let data = plane.data();
    let blurred = gaussian_blur(data, plane.width(), plane.height(), sigma);
    let lower = if data.iter().any(|&v| v < 0.0) { -1.0 } else { 0.0 };
    data.iter()
        .zip(&blurred)
        .map(|(&v, &b)| (v + (v - b) * amount).clamp(lower, 1.0))
        .collect()
}

/// 3x3 median over float values with reflect borders.
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub fn median3(plane: &GrayPlane) -> Vec<f64> {
    let (w, h) = (plane.width(), plane.height());
    let data = plane.data();
    let mut out = Vec::with_capacity(data.len());
    let mut window = [0.0f64; 9];
    for y in 0..h {
        for x in 0..w {
            let mut n = 0;
            for dy in -1..=1 {
                let row = reflect(y as isize + dy, h);
                for dx in -1..=1 {
                    window[n] = data[row * w + reflect(x as isize + dx, w)];
                    n += 1;
                }
            }
            let (_, median, _) = window.select_nth_unstable_by(4, f64::total_cmp);
            out.push(*median);
        }
    }
    out
}

/// 3x3 median over the 8-bit view, replicating border pixels.
#[must_use]
pub fn median_blur_u8(image: &GrayImage) -> GrayImage {
    imageproc::filter::median_filter(image, 1, 1)
}
