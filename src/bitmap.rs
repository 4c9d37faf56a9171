//! Decoded images attached to exchanges
//!
//! Uploads and webcam frames are decoded once into a [`Bitmap`]; the
//! encoded forms needed downstream (PNG for the model, JPEG for the
//! transcript) are produced from memory on demand.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use thiserror::Error;

use crate::llm::InlineImage;

/// Formats accepted from the file picker
const SUPPORTED_FORMATS: &[(ImageFormat, &str)] = &[
    (ImageFormat::Png, "png"),
    (ImageFormat::Jpeg, "jpeg"),
];

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("Unsupported image format: {0} (supported: png, jpg, jpeg)")]
    Unsupported(String),
    #[error("Image data is empty")]
    Empty,
    #[error("Raw frame has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// An in-memory decoded image
#[derive(Debug, Clone)]
pub struct Bitmap {
    image: DynamicImage,
}

impl Bitmap {
    #[cfg(test)]
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Decode an uploaded file. Only PNG and JPEG are accepted.
    pub fn decode(bytes: &[u8]) -> Result<Self, BitmapError> {
        if bytes.is_empty() {
            return Err(BitmapError::Empty);
        }

        let format = image::guess_format(bytes)
            .map_err(|_| BitmapError::Unsupported("unrecognized".to_string()))?;
        if !SUPPORTED_FORMATS.iter().any(|(f, _)| *f == format) {
            return Err(BitmapError::Unsupported(format!("{format:?}").to_lowercase()));
        }

        let image = image::load_from_memory_with_format(bytes, format)?;
        Ok(Self { image })
    }

    /// Build from a packed 8-bit RGB buffer, as produced by capture devices.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        let expected = width as usize * height as usize * 3;
        let actual = pixels.len();
        let size_error = BitmapError::FrameSize {
            width,
            height,
            expected,
            actual,
        };
        if actual != expected || expected == 0 {
            return Err(size_error);
        }
        let buffer = RgbImage::from_raw(width, height, pixels).ok_or(size_error)?;
        Ok(Self {
            image: DynamicImage::ImageRgb8(buffer),
        })
    }

    /// Same as [`Bitmap::from_rgb`] but with the channel order capture
    /// pipelines commonly hand out (BGR).
    pub fn from_bgr(width: u32, height: u32, mut pixels: Vec<u8>) -> Result<Self, BitmapError> {
        for px in pixels.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        Self::from_rgb(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, BitmapError> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// JPEG encoding of the RGB channels (alpha is dropped).
    pub fn to_jpeg(&self) -> Result<Vec<u8>, BitmapError> {
        let rgb = DynamicImage::ImageRgb8(self.image.to_rgb8());
        let mut buf = Cursor::new(Vec::new());
        rgb.write_to(&mut buf, ImageFormat::Jpeg)?;
        Ok(buf.into_inner())
    }

    /// Base64 PNG payload for a model request
    pub fn to_inline_image(&self) -> Result<InlineImage, BitmapError> {
        Ok(InlineImage {
            media_type: "image/png".to_string(),
            data: BASE64.encode(self.to_png()?),
        })
    }
}
