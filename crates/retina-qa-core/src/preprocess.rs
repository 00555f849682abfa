//! Normalization of raw buffers into the grayscale analysis plane.

use image::{GrayImage, Luma};

use crate::domain::{Channels, ImageBuffer, Samples};
use crate::imaging::stats;

/// Luma coefficients applied to RGB samples.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Normalized grayscale plane shared by every analyzer.
///
/// Values are computed in 32-bit float and widened to `f64` for analysis, so
/// an 8-bit input and its `/255` float equivalent produce the same plane.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayPlane {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl GrayPlane {
    /// Normalizes a buffer to `[0, 1]` grayscale.
    ///
    /// Samples are divided by 255 only when the largest sample exceeds 1.0;
    /// RGB input is then reduced with `0.299 R + 0.587 G + 0.114 B`.
    #[must_use]
    pub fn from_buffer(buffer: &ImageBuffer) -> Self {
        let normalized: Vec<f32> = match buffer.samples() {
            Samples::U8(values) => {
                let scale = values.iter().any(|&v| v > 1);
                values
                    .iter()
                    .map(|&v| if scale { f32::from(v) / 255.0 } else { f32::from(v) })
                    .collect()
            }
            Samples::F32(values) => {
                let scale = values.iter().any(|&v| v > 1.0);
                values
                    .iter()
                    .map(|&v| if scale { v / 255.0 } else { v })
                    .collect()
            }
        };

        let gray: Vec<f32> = match buffer.channels() {
            Channels::Gray => normalized,
            Channels::Rgb => normalized
                .chunks_exact(3)
                .map(|px| px[0] * LUMA_R + px[1] * LUMA_G + px[2] * LUMA_B)
                .collect(),
        };

        Self {
            width: buffer.width() as usize,
            height: buffer.height() as usize,
            data: gray.into_iter().map(f64::from).collect(),
        }
    }

    /// Builds a plane from a per-pixel function of `(x, y)`.
    ///
    /// Values go through `f32` like preprocessed buffers do.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> f32) -> Self {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f64::from(f(x, y)))
            .collect();
        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Shorter of width and height.
    #[must_use]
    pub fn min_side(&self) -> usize {
        self.width.min(self.height)
    }

    /// Number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the plane has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major pixel values.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at column `x`, row `y`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// One row of the plane.
    #[must_use]
    pub fn row(&self, y: usize) -> &[f64] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// 8-bit view: `trunc(clamp(v * 255, 0, 255))`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn to_luma8(&self) -> GrayImage {
        let mut image = GrayImage::new(self.width as u32, self.height as u32);
        for (pixel, &v) in image.pixels_mut().zip(&self.data) {
            // Truncation is the intended quantization
            *pixel = Luma([(v * 255.0).clamp(0.0, 255.0) as u8]);
        }
        image
    }

    /// Mean pixel value.
    #[must_use]
    pub fn mean(&self) -> f64 {
        stats::mean(&self.data)
    }

    /// Population standard deviation.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        stats::std_dev(&self.data)
    }

    /// Linear-interpolated percentile, `q` in `[0, 100]`.
    #[must_use]
    pub fn percentile(&self, q: f64) -> f64 {
        stats::percentile(&self.data, q)
    }

    /// Spread between the 95th and 5th percentiles.
    #[must_use]
    pub fn dynamic_range(&self) -> f64 {
        let mut scratch = self.data.clone();
        let p95 = stats::percentile_in_place(&mut scratch, 95.0);
        let p5 = stats::percentile_in_place(&mut scratch, 5.0);
        p95 - p5
    }

    /// Fraction of pixels satisfying `pred`.
    pub fn fraction(&self, pred: impl Fn(f64) -> bool) -> f64 {
        stats::fraction(&self.data, pred)
    }
}
