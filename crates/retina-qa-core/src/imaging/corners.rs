//! Shi-Tomasi corner detection on 8-bit images.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Parameters of the corner detector.
#[derive(Debug, Clone, Copy)]
pub struct CornerParams {
    /// Maximum number of corners returned.
    pub max_corners: usize,
    /// Minimum response as a fraction of the strongest response.
    pub quality_level: f64,
    /// Minimum Euclidean distance between returned corners.
    pub min_distance: f64,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            max_corners: 100,
            quality_level: 0.01,
            min_distance: 10.0,
        }
    }
}

/// 3x3 box sum with replicated borders.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn box_sum3(data: &[f64], width: usize, height: usize) -> Vec<f64> {
    let clamp = |v: isize, n: usize| v.clamp(0, n as isize - 1) as usize;
    let mut out = Vec::with_capacity(data.len());
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for dy in -1..=1 {
                let yy = clamp(y as isize + dy, height);
                for dx in -1..=1 {
                    acc += data[yy * width + clamp(x as isize + dx, width)];
                }
            }
            out.push(acc);
        }
    }
    out
}

/// Minimum eigenvalue of the gradient structure tensor at every pixel.
fn min_eigenvalues(image: &GrayImage) -> Vec<f64> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);

    let mut xx = Vec::with_capacity(w * h);
    let mut xy = Vec::with_capacity(w * h);
    let mut yy = Vec::with_capacity(w * h);
    for (dx, dy) in gx.pixels().zip(gy.pixels()) {
        let (dx, dy) = (f64::from(dx.0[0]), f64::from(dy.0[0]));
        xx.push(dx * dx);
        xy.push(dx * dy);
        yy.push(dy * dy);
    }
    let (a, b, c) = (box_sum3(&xx, w, h), box_sum3(&xy, w, h), box_sum3(&yy, w, h));

    a.iter()
        .zip(&b)
        .zip(&c)
        .map(|((&a, &b), &c)| {
            let half_trace = (a + c) / 2.0;
            let root = ((a - c) * (a - c) / 4.0 + b * b).sqrt();
            half_trace - root
        })
        .collect()
}

/// Returns the strongest well-separated corners as `(x, y)`, strongest first.
///
/// A pixel is a candidate when its response exceeds `quality_level` times
/// the image maximum and is the maximum of its 3x3 neighbourhood; border
/// pixels are skipped. Candidates closer than `min_distance` to an already
/// accepted corner are dropped.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn good_features(image: &GrayImage, params: &CornerParams) -> Vec<(usize, usize)> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    if w < 3 || h < 3 {
        return Vec::new();
    }
    let response = min_eigenvalues(image);
    let max = response.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }
    let threshold = max * params.quality_level;
    let thresholded: Vec<f64> = response
        .iter()
        .map(|&v| if v > threshold { v } else { 0.0 })
        .collect();

    let mut candidates = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let v = thresholded[y * w + x];
            if v == 0.0 {
                continue;
            }
            let is_max = (y - 1..=y + 1)
                .all(|yy| (x - 1..=x + 1).all(|xx| thresholded[yy * w + xx] <= v));
            if is_max {
                candidates.push((x, y, v));
            }
        }
    }
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

    let min_dist_sq = params.min_distance * params.min_distance;
    let mut corners: Vec<(usize, usize)> = Vec::new();
    for (x, y, _) in candidates {
        if corners.len() >= params.max_corners {
            break;
        }
        let spaced = corners.iter().all(|&(cx, cy)| {
            let dx = cx.abs_diff(x) as f64;
            let dy = cy.abs_diff(y) as f64;
            dx * dx + dy * dy >= min_dist_sq
        });
        if spaced {
            corners.push((x, y));
        }
    }
    corners
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_flat_image_has_no_corners() {
        let image = GrayImage::from_pixel(64, 64, Luma([100]));
        assert!(good_features(&image, &CornerParams::default()).is_empty());
    }

    #[test]
    fn test_square_has_four_corners() {
        let image = GrayImage::from_fn(64, 64, |x, y| {
            if (16..48).contains(&x) && (16..48).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let corners = good_features(&image, &CornerParams::default());
        assert_eq!(corners.len(), 4, "{corners:?}");
        for (x, y) in corners {
            assert!(x.abs_diff(16) <= 2 || x.abs_diff(47) <= 2, "x={x}");
            assert!(y.abs_diff(16) <= 2 || y.abs_diff(47) <= 2, "y={y}");
        }
    }

    #[test]
    fn test_corner_limit() {
        let image = GrayImage::from_fn(256, 256, |x, y| {
            if ((x / 16) + (y / 16)) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let params = CornerParams {
            max_corners: 10,
            ..CornerParams::default()
        };
        assert_eq!(good_features(&image, &params).len(), 10);
    }

    #[test]
    fn test_box_sum_replicates_border() {
        let data = vec![1.0; 16];
        let sums = box_sum3(&data, 4, 4);
        assert!(sums.iter().all(|&s| (s - 9.0).abs() < 1e-12));
    }
}
