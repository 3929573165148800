//! Resized image renditions
//!
//! Image uploads get one derived rendition per entry of
//! [`VARIANT_DEFINITIONS`], always generated in table order. Renditions never
//! upscale: a source that already fits inside the bounds is re-encoded at its
//! original dimensions.
//!
//! # Examples
//!
//! ```rust
//! use media_vault::variant::{MediaVariant, VariantPlanner, VARIANT_DEFINITIONS};
//! use image::{DynamicImage, RgbImage};
//!
//! let source = DynamicImage::ImageRgb8(RgbImage::new(4000, 1000));
//! let planner = VariantPlanner::new();
//!
//! let thumb = VARIANT_DEFINITIONS
//!     .iter()
//!     .find(|d| d.variant == MediaVariant::Thumb)
//!     .unwrap();
//! let rendered = planner.generate(&source, thumb, "png").unwrap();
//! assert_eq!((rendered.width, rendered.height), (320, 80));
//! ```

use crate::error::{MediaError, MediaResult};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Named derived rendition of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaVariant {
    /// Desktop web rendition
    Web,
    /// Mobile rendition
    Mobile,
    /// Small thumbnail
    Thumb,
}

impl MediaVariant {
    /// Lower-case name used in variant object keys
    #[must_use]
    pub const fn as_path_segment(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Thumb => "thumb",
        }
    }
}

impl fmt::Display for MediaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Web => "WEB",
            Self::Mobile => "MOBILE",
            Self::Thumb => "THUMB",
        })
    }
}

/// Target bounds and encoding quality for one variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantDefinition {
    /// Which rendition this entry produces
    pub variant: MediaVariant,

    /// Maximum output width in pixels
    pub max_width: u32,

    /// Maximum output height in pixels
    pub max_height: u32,

    /// Lossy encoding quality in `0.0..=1.0`; ignored by lossless formats
    pub quality: f32,
}

/// Variant table, consulted in this order
pub static VARIANT_DEFINITIONS: [VariantDefinition; 3] = [
    VariantDefinition {
        variant: MediaVariant::Web,
        max_width: 1920,
        max_height: 1920,
        quality: 0.85,
    },
    VariantDefinition {
        variant: MediaVariant::Mobile,
        max_width: 1080,
        max_height: 1080,
        quality: 0.80,
    },
    VariantDefinition {
        variant: MediaVariant::Thumb,
        max_width: 320,
        max_height: 320,
        quality: 0.75,
    },
];

/// An encoded rendition ready to upload
#[derive(Debug, Clone)]
pub struct RenderedVariant {
    /// Encoded bytes
    pub data: Vec<u8>,

    /// MIME type of the encoding
    pub content_type: &'static str,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,
}

/// Decodes source images and renders variants
#[derive(Debug, Clone, Copy)]
pub struct VariantPlanner {
    /// Filter used when downscaling
    filter: FilterType,
}

impl Default for VariantPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantPlanner {
    /// Creates a planner using `FilterType::Lanczos3`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Creates a planner with a specific resize filter
    #[must_use]
    pub const fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Decodes an uploaded image, sniffing the format from its content
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] wrapping the codec failure if the bytes
    /// are not a decodable image.
    pub fn decode(&self, data: &[u8]) -> MediaResult<DynamicImage> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| MediaError::storage_with("failed to read image", e))?;

        reader
            .decode()
            .map_err(|e| MediaError::storage_with("failed to decode image", e))
    }

    /// Renders one variant of `source`, encoded for `extension`
    ///
    /// JPEG output has any alpha channel flattened onto white first and is
    /// encoded at the definition's quality. PNG and WebP output is lossless,
    /// so the quality value does not apply to them.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Storage`] if the extension has no supported
    /// encoder or encoding fails.
    pub fn generate(
        &self,
        source: &DynamicImage,
        definition: &VariantDefinition,
        extension: &str,
    ) -> MediaResult<RenderedVariant> {
        let format = output_format(extension)?;

        let fits = source.width() <= definition.max_width && source.height() <= definition.max_height;
        let resized;
        let image = if fits {
            source
        } else {
            resized = source.resize(definition.max_width, definition.max_height, self.filter);
            &resized
        };

        let data = encode(image, format, definition.quality).map_err(|e| {
            MediaError::storage_with(
                format!("failed to encode {} variant as {extension}", definition.variant),
                e,
            )
        })?;

        Ok(RenderedVariant {
            data,
            content_type: format.to_mime_type(),
            width: image.width(),
            height: image.height(),
        })
    }
}

fn output_format(extension: &str) -> MediaResult<ImageFormat> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "webp" => Ok(ImageFormat::WebP),
        other => Err(MediaError::storage(format!(
            "no variant encoder for extension {other}"
        ))),
    }
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: f32) -> image::ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
            DynamicImage::ImageRgb8(flatten_onto_white(image)).write_with_encoder(encoder)?;
        }
        ImageFormat::WebP => {
            // Lossless only; the WebP encoder rejects 16-bit and float buffers
            let encoder = WebPEncoder::new_lossless(&mut buffer);
            DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)?;
        }
        _ => {
            let encoder = PngEncoder::new(&mut buffer);
            image.write_with_encoder(encoder)?;
        }
    }
    Ok(buffer)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Composites the image over an opaque white background
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| {
            let mixed = (u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255;
            u8::try_from(mixed).unwrap_or(u8::MAX)
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
