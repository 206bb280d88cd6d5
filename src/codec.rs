//! # Codec Module
//!
//! Decode, resample and JPEG encode behind the [`VariantEncoder`] seam.
//!
//! The search in [`crate::search`] only needs three things from an image:
//! its original dimensions, a fresh resample to a given resolution and an
//! in-memory encode at a given quality. [`JpegCodec`] provides them on top
//! of the `image` crate (Lanczos3 resampling, baseline JPEG output).

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, RgbImage};
use std::path::Path;

use crate::error::{FitError, FitResult};

/// Operations the variant search needs from a decoded source image
pub trait VariantEncoder {
    /// Image resampled to a candidate resolution
    type Resampled;

    /// Original width and height in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Resample the original (never a previous result) to `width` x `height`
    fn resample(&self, width: u32, height: u32) -> FitResult<Self::Resampled>;

    /// Encode a resampled image at `quality`, returning the encoded bytes
    fn encode(&self, image: &Self::Resampled, quality: u8) -> FitResult<Vec<u8>>;
}

/// Decoded source image that encodes to JPEG
pub struct JpegCodec {
    image: RgbImage,
}

impl JpegCodec {
    /// Decode an image file, sniffing the format from its content
    pub fn open(path: &Path) -> FitResult<Self> {
        let decode_error = |source: image::ImageError| FitError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let image = image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(decode_error)?;

        // JPEG has no alpha channel
        Ok(Self {
            image: image.to_rgb8(),
        })
    }

    #[cfg(test)]
    fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }
}

impl VariantEncoder for JpegCodec {
    type Resampled = RgbImage;

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resample(&self, width: u32, height: u32) -> FitResult<RgbImage> {
        Ok(imageops::resize(&self.image, width, height, FilterType::Lanczos3))
    }

    fn encode(&self, image: &RgbImage, quality: u8) -> FitResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let (width, height) = image.dimensions();

        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode(image.as_raw(), width, height, ColorType::Rgb8)
            .map_err(|source| FitError::Encode {
                width,
                height,
                quality,
                source,
            })?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        })
    }

    #[test]
    fn test_resample_dimensions() {
        let codec = JpegCodec::from_rgb(gradient(120, 80));
        assert_eq!(codec.dimensions(), (120, 80));

        let resized = codec.resample(60, 40).unwrap();
        assert_eq!(resized.dimensions(), (60, 40));
        // The original stays untouched
        assert_eq!(codec.dimensions(), (120, 80));
    }

    #[test]
    fn test_encode_is_jpeg_and_quality_shrinks() {
        let codec = JpegCodec::from_rgb(gradient(128, 128));
        let resized = codec.resample(128, 128).unwrap();

        let high = codec.encode(&resized, 95).unwrap();
        let low = codec.encode(&resized, 10).unwrap();

        assert_eq!(&high[..2], &[0xFF, 0xD8]);
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_open_decodes_png_with_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alpha.png");
        image::RgbaImage::from_pixel(32, 16, image::Rgba([10, 20, 30, 128]))
            .save(&path)
            .unwrap();

        let codec = JpegCodec::open(&path).unwrap();
        assert_eq!(codec.dimensions(), (32, 16));
        let resized = codec.resample(32, 16).unwrap();
        assert!(codec.encode(&resized, 80).is_ok());
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        assert!(matches!(
            JpegCodec::open(&path),
            Err(FitError::Decode { .. })
        ));
    }
}
