//! Synthetic image builders for testing.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retina_qa_core::LoadedImage;

/// Builder for synthetic test images.
///
/// Covers flat and patterned images for exercising single analyzers, plus
/// crude fundus and OCT renderings for end-to-end scoring.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Flat and patterned images ===

    /// Creates a uniform gray image.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> LoadedImage {
        let img = GrayImage::from_pixel(width, height, Luma([value]));
        LoadedImage::new("synthetic://uniform_gray", DynamicImage::ImageLuma8(img))
    }

    /// Creates a completely white image.
    #[must_use]
    pub fn saturated(width: u32, height: u32) -> LoadedImage {
        Self::uniform_gray(width, height, 255)
    }

    /// Creates a completely black image.
    #[must_use]
    pub fn black(width: u32, height: u32) -> LoadedImage {
        Self::uniform_gray(width, height, 0)
    }

    /// Creates a black and white checkerboard with 8-pixel cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> LoadedImage {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Creates a checkerboard with a custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> LoadedImage {
        let cell = cell_size.max(1);
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        LoadedImage::new("synthetic://checkerboard", DynamicImage::ImageLuma8(img))
    }

    /// Creates a left-to-right ramp from 0 to 255.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> LoadedImage {
        let span = width.saturating_sub(1).max(1);
        let img = GrayImage::from_fn(width, height, |x, _| {
            Luma([((u32::from(u8::MAX) * x) / span) as u8])
        });
        LoadedImage::new(
            "synthetic://horizontal_gradient",
            DynamicImage::ImageLuma8(img),
        )
    }

    /// Creates a top-to-bottom ramp from 0 to 255.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertical_gradient(width: u32, height: u32) -> LoadedImage {
        let span = height.saturating_sub(1).max(1);
        let img = GrayImage::from_fn(width, height, |_, y| {
            Luma([((u32::from(u8::MAX) * y) / span) as u8])
        });
        LoadedImage::new(
            "synthetic://vertical_gradient",
            DynamicImage::ImageLuma8(img),
        )
    }

    /// Creates a uniform RGB image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> LoadedImage {
        let img = RgbImage::from_pixel(width, height, Rgb([r, g, b]));
        LoadedImage::new("synthetic://rgb_uniform", DynamicImage::ImageRgb8(img))
    }

    // === Ophthalmic renderings ===

    /// Renders a square fundus photograph.
    ///
    /// A vignetted orange field of view on a black surround, with a bright
    /// optic disc right of center and dark vessels radiating from it.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn fundus(size: u32) -> LoadedImage {
        let s = f64::from(size);
        let (cx, cy, field) = (s / 2.0, s / 2.0, s * 0.45);
        let (disc_x, disc_y, disc_r) = (s * 0.68, s * 0.5, s / 12.0);
        let vessel_len = s * 0.4;
        let angles: Vec<f64> = (0..8)
            .map(|i| f64::from(i) * std::f64::consts::FRAC_PI_4 + 0.3)
            .collect();

        let img = RgbImage::from_fn(size, size, |x, y| {
            let (px, py) = (f64::from(x), f64::from(y));
            let d = (px - cx).hypot(py - cy);
            if d > field {
                return Rgb([0, 0, 0]);
            }

            let dd = (px - disc_x).hypot(py - disc_y);
            if dd <= disc_r {
                return Rgb([250, 232, 170]);
            }

            let on_vessel = angles.iter().any(|&a| {
                let (dx, dy) = (a.cos(), a.sin());
                let t = (px - disc_x) * dx + (py - disc_y) * dy;
                let perp = ((px - disc_x) * dy - (py - disc_y) * dx).abs();
                t > 0.0 && t < vessel_len && perp < 1.5 + 1.5 * (1.0 - t / vessel_len)
            });
            if on_vessel {
                return Rgb([110, 30, 20]);
            }

            let shade = 1.0 - 0.45 * (d / field).powi(2);
            Rgb([
                (190.0 * shade) as u8,
                (90.0 * shade) as u8,
                (45.0 * shade) as u8,
            ])
        });
        LoadedImage::new("synthetic://fundus", DynamicImage::ImageRgb8(img))
    }

    /// Renders an OCT B-scan with `layers` horizontal retinal bands.
    ///
    /// Bands alternate between bright and mid reflectivity inside the middle
    /// 40% of the rows; the vitreous above and choroid below are dark.
    #[must_use]
    pub fn oct(width: u32, height: u32, layers: u32) -> LoadedImage {
        let top = height * 3 / 10;
        let bottom = height * 7 / 10;
        let thickness = ((bottom - top) / layers.max(1)).max(1);
        let img = GrayImage::from_fn(width, height, |_, y| {
            if y < top || y >= bottom {
                Luma([15u8])
            } else if ((y - top) / thickness) % 2 == 0 {
                Luma([210u8])
            } else {
                Luma([90u8])
            }
        });
        LoadedImage::new("synthetic://oct", DynamicImage::ImageLuma8(img))
    }

    // === Degradations ===

    /// Adds seeded zero-mean Gaussian noise with standard deviation `sigma`
    /// (in units of full scale) to every sample.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_gaussian_noise(image: &LoadedImage, sigma: f64, seed: u64) -> LoadedImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut perturb = |v: u8| -> u8 {
            // Box-Muller; 1 - u keeps the logarithm finite
            let u1: f64 = 1.0 - rng.random::<f64>();
            let u2: f64 = rng.random::<f64>();
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            (f64::from(v) + z * sigma * 255.0).round().clamp(0.0, 255.0) as u8
        };

        let noisy = match &image.image {
            DynamicImage::ImageLuma8(gray) => {
                let mut out = gray.clone();
                out.pixels_mut().for_each(|p| p.0[0] = perturb(p.0[0]));
                DynamicImage::ImageLuma8(out)
            }
            other => {
                let mut out = other.to_rgb8();
                out.pixels_mut()
                    .for_each(|p| p.0.iter_mut().for_each(|c| *c = perturb(*c)));
                DynamicImage::ImageRgb8(out)
            }
        };
        LoadedImage::new(format!("{}+noise", image.path), noisy)
    }

    /// Applies a Gaussian blur with standard deviation `sigma` pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn blurred(image: &LoadedImage, sigma: f64) -> LoadedImage {
        let sigma = sigma as f32;
        let blurred = match &image.image {
            DynamicImage::ImageLuma8(gray) => {
                DynamicImage::ImageLuma8(gaussian_blur_f32(gray, sigma))
            }
            other => DynamicImage::ImageRgb8(gaussian_blur_f32(&other.to_rgb8(), sigma)),
        };
        LoadedImage::new(format!("{}+blur", image.path), blurred)
    }
}
