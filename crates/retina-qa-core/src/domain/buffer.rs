//! Raw image buffers accepted by the scorer.

use image::DynamicImage;

use super::InputError;

/// Smallest width and height the analyzers accept.
pub const MIN_DIMENSION: u32 = 8;

/// Channel layout of an [`ImageBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Single luminance channel.
    Gray,
    /// Interleaved red, green, blue.
    Rgb,
}

impl Channels {
    /// Number of samples per pixel.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

/// Sample storage, either 8-bit integers or 32-bit floats.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// 8-bit samples (0-255).
    U8(Vec<u8>),
    /// Float samples, usually in `[0, 1]` but any finite value is accepted.
    F32(Vec<f32>),
}

impl Samples {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// Whether there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A validated, row-major pixel buffer.
///
/// Construction checks that the buffer is non-empty, that the sample count
/// matches `width * height * channels`, and that float samples are finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    samples: Samples,
}

impl ImageBuffer {
    /// Creates a buffer after validating its shape and contents.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] for empty dimensions, a sample count that does
    /// not match the shape, or a non-finite float sample.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        samples: Samples,
    ) -> Result<Self, InputError> {
        if width == 0 || height == 0 {
            return Err(InputError::Empty { width, height });
        }

        let expected = width as usize * height as usize * channels.count();
        if samples.len() != expected {
            return Err(InputError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }

        if let Samples::F32(values) = &samples {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(InputError::NonFiniteSample { index });
            }
        }

        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Creates an 8-bit grayscale buffer.
    ///
    /// # Errors
    ///
    /// See [`ImageBuffer::new`].
    pub fn gray_u8(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, InputError> {
        Self::new(width, height, Channels::Gray, Samples::U8(samples))
    }

    /// Creates a float grayscale buffer.
    ///
    /// # Errors
    ///
    /// See [`ImageBuffer::new`].
    pub fn gray_f32(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, InputError> {
        Self::new(width, height, Channels::Gray, Samples::F32(samples))
    }

    /// Creates an 8-bit RGB buffer.
    ///
    /// # Errors
    ///
    /// See [`ImageBuffer::new`].
    pub fn rgb_u8(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, InputError> {
        Self::new(width, height, Channels::Rgb, Samples::U8(samples))
    }

    /// Creates a float RGB buffer.
    ///
    /// # Errors
    ///
    /// See [`ImageBuffer::new`].
    pub fn rgb_f32(width: u32, height: u32, samples: Vec<f32>) -> Result<Self, InputError> {
        Self::new(width, height, Channels::Rgb, Samples::F32(samples))
    }

    /// Converts a decoded image.
    ///
    /// 8-bit gray and RGB images are taken as-is, 16-bit and float images are
    /// converted to float samples in `[0, 1]`, and alpha is dropped.
    ///
    /// # Errors
    ///
    /// See [`ImageBuffer::new`].
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self, InputError> {
        let (width, height) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(gray) => Self::gray_u8(width, height, gray.as_raw().clone()),
            DynamicImage::ImageLumaA8(_) => {
                Self::gray_u8(width, height, image.to_luma8().into_raw())
            }
            DynamicImage::ImageRgb8(rgb) => Self::rgb_u8(width, height, rgb.as_raw().clone()),
            DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
                Self::gray_f32(width, height, image.to_luma32f().into_raw())
            }
            DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgb32F(_)
            | DynamicImage::ImageRgba32F(_) => {
                Self::rgb_f32(width, height, image.to_rgb32f().into_raw())
            }
            _ => Self::rgb_u8(width, height, image.to_rgb8().into_raw()),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw samples, row-major and channel-interleaved.
    #[must_use]
    pub const fn samples(&self) -> &Samples {
        &self.samples
    }
}

/// An image decoded by an [`ImageSource`](crate::ports::ImageSource).
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Path to the image file.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: DynamicImage,
}

impl LoadedImage {
    /// Wraps a decoded image, recording its dimensions.
    #[must_use]
    pub fn new(path: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Converts the decoded image to a validated scorer input.
    ///
    /// # Errors
    ///
    /// See [`ImageBuffer::from_dynamic`].
    pub fn to_buffer(&self) -> Result<ImageBuffer, InputError> {
        ImageBuffer::from_dynamic(&self.image)
    }
}
