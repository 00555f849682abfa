//! Centered 2D magnitude spectrum.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::preprocess::GrayPlane;

use super::stats;

/// Magnitude of the 2D DFT with the zero frequency moved to the center.
#[derive(Debug, Clone)]
pub struct Spectrum {
    width: usize,
    height: usize,
    magnitude: Vec<f64>,
}

impl Spectrum {
    /// Computes the shifted magnitude spectrum of a plane.
    ///
    /// Each call plans its own transforms, so no state is shared between
    /// analyses.
    #[must_use]
    pub fn from_plane(plane: &GrayPlane) -> Self {
        let (w, h) = (plane.width(), plane.height());
        let mut planner = FftPlanner::<f64>::new();

        // Rows
        let mut rows: Vec<Complex64> = plane
            .data()
            .iter()
            .map(|&v| Complex64::new(v, 0.0))
            .collect();
        planner.plan_fft_forward(w).process(&mut rows);

        // Columns, via a transposed copy
        let mut cols = vec![Complex64::new(0.0, 0.0); w * h];
        for y in 0..h {
            for x in 0..w {
                cols[x * h + y] = rows[y * w + x];
            }
        }
        planner.plan_fft_forward(h).process(&mut cols);

        let mut magnitude = vec![0.0; w * h];
        for x in 0..w {
            let sx = (x + w / 2) % w;
            for y in 0..h {
                let sy = (y + h / 2) % h;
                magnitude[sy * w + sx] = cols[x * h + y].norm();
            }
        }

        Self {
            width: w,
            height: h,
            magnitude,
        }
    }

    /// Radius of the low-frequency disk: a quarter of the shorter side.
    #[must_use]
    pub fn low_frequency_radius(&self) -> usize {
        self.width.min(self.height) / 4
    }

    /// Whether `(x, y)` lies inside the centered low-frequency disk (inclusive).
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn in_low_frequency_disk(&self, x: usize, y: usize) -> bool {
        let dx = x as isize - (self.width / 2) as isize;
        let dy = y as isize - (self.height / 2) as isize;
        let r = self.low_frequency_radius() as isize;
        dx * dx + dy * dy <= r * r
    }

    /// Magnitudes inside the low-frequency disk.
    #[must_use]
    pub fn low_frequency_values(&self) -> Vec<f64> {
        self.partition(true)
    }

    /// Sum of magnitudes outside the low-frequency disk, divided by the
    /// total number of bins.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn high_frequency_energy(&self) -> f64 {
        let outside: f64 = self.partition(false).iter().sum();
        outside / self.magnitude.len() as f64
    }

    /// Coefficient of variation inside the low-frequency disk.
    ///
    /// `None` when the disk has zero mean.
    #[must_use]
    pub fn low_frequency_variation(&self) -> Option<f64> {
        let values = self.low_frequency_values();
        let mean = stats::mean(&values);
        if mean > 0.0 {
            Some(stats::std_dev(&values) / mean)
        } else {
            None
        }
    }

    fn partition(&self, inside: bool) -> Vec<f64> {
        let mut values = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.in_low_frequency_disk(x, y) == inside {
                    values.push(self.magnitude[y * self.width + x]);
                }
            }
        }
        values
    }
}
