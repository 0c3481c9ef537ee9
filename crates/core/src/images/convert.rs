//! Raster image conversion.
//!
//! Each output kind with a non-standard encoding contract gets its own
//! code path: ICO packs a multi-resolution frame set, BMP needs an
//! explicit RGBA encode, SVG traces the bitmap into vectors, WebP uses
//! the dedicated lossy encoder. The remaining formats share the generic
//! codec with an optional quality knob where the codec has one.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::codecs::bmp::BmpEncoder;
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageFormat, RgbaImage};
use thiserror::Error;
use uuid::Uuid;

/// Icon resolutions packed into one ICO, largest first.
const ICO_SIZES: [u32; 6] = [256, 128, 64, 48, 32, 16];

const DEFAULT_LOSSY_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum ImageConvertError {
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode {format}: {reason}")]
    Encode {
        format: &'static str,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported image output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutputFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
    Tiff,
    Ico,
    Bmp,
    Svg,
}

impl ImageOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Ico => "ico",
            Self::Bmp => "bmp",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageOutputFormat {
    type Err = crate::pipeline::UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "gif" => Ok(Self::Gif),
            "tiff" | "tif" => Ok(Self::Tiff),
            "ico" => Ok(Self::Ico),
            "bmp" => Ok(Self::Bmp),
            "svg" => Ok(Self::Svg),
            _ => Err(crate::pipeline::UnknownFormat {
                format: raw.to_string(),
            }),
        }
    }
}

/// Converts one raster image. Synchronous CPU work; async callers wrap
/// this in `spawn_blocking`.
pub fn convert_image(
    input: &Path,
    output: &Path,
    format: ImageOutputFormat,
    quality: Option<u8>,
    scratch_dir: &Path,
) -> Result<(), ImageConvertError> {
    let img = image::open(input).map_err(|e| ImageConvertError::Decode(e.to_string()))?;

    match format {
        ImageOutputFormat::Ico => encode_ico(&img, output),
        ImageOutputFormat::Bmp => encode_bmp(&img, output),
        ImageOutputFormat::Svg => trace_svg(&img, output, scratch_dir),
        ImageOutputFormat::Webp => encode_webp(&img, output, quality),
        ImageOutputFormat::Jpeg => encode_jpeg(&img, output, quality),
        ImageOutputFormat::Png => save_generic(&img, output, ImageFormat::Png),
        ImageOutputFormat::Gif => save_generic(&img, output, ImageFormat::Gif),
        ImageOutputFormat::Tiff => save_generic(&img, output, ImageFormat::Tiff),
    }
}

fn save_generic(
    img: &DynamicImage,
    output: &Path,
    format: ImageFormat,
) -> Result<(), ImageConvertError> {
    img.save_with_format(output, format)
        .map_err(|e| ImageConvertError::Encode {
            format: "image",
            reason: e.to_string(),
        })
}

/// Multi-resolution icon pack: every size rendered contain-fit onto a
/// transparent square canvas, each frame PNG-compressed.
fn encode_ico(img: &DynamicImage, output: &Path) -> Result<(), ImageConvertError> {
    let mut frames = Vec::with_capacity(ICO_SIZES.len());
    for size in ICO_SIZES {
        let square = contain_on_square(img, size);
        let frame = IcoFrame::as_png(square.as_raw(), size, size, ExtendedColorType::Rgba8)
            .map_err(|e| ImageConvertError::Encode {
                format: "ico",
                reason: e.to_string(),
            })?;
        frames.push(frame);
    }

    let writer = BufWriter::new(File::create(output)?);
    IcoEncoder::new(writer)
        .encode_images(&frames)
        .map_err(|e| ImageConvertError::Encode {
            format: "ico",
            reason: e.to_string(),
        })
}

fn contain_on_square(img: &DynamicImage, size: u32) -> RgbaImage {
    let resized = img.resize(size, size, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::new(size, size);
    let x = (size - resized.width()) / 2;
    let y = (size - resized.height()) / 2;
    image::imageops::overlay(&mut canvas, &resized, x as i64, y as i64);
    canvas
}

fn encode_bmp(img: &DynamicImage, output: &Path) -> Result<(), ImageConvertError> {
    let rgba = img.to_rgba8();
    let mut writer = BufWriter::new(File::create(output)?);
    BmpEncoder::new(&mut writer)
        .encode(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ImageConvertError::Encode {
            format: "bmp",
            reason: e.to_string(),
        })
}

fn encode_webp(
    img: &DynamicImage,
    output: &Path,
    quality: Option<u8>,
) -> Result<(), ImageConvertError> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let encoder = webp::Encoder::from_image(&rgba).map_err(|e| ImageConvertError::Encode {
        format: "webp",
        reason: e.to_string(),
    })?;
    let quality = quality.unwrap_or(DEFAULT_LOSSY_QUALITY).min(100) as f32;
    let memory = encoder.encode(quality);
    std::fs::write(output, &*memory)?;
    Ok(())
}

fn encode_jpeg(
    img: &DynamicImage,
    output: &Path,
    quality: Option<u8>,
) -> Result<(), ImageConvertError> {
    // JPEG has no alpha channel.
    let rgb = img.to_rgb8();
    let writer = BufWriter::new(File::create(output)?);
    let mut encoder =
        JpegEncoder::new_with_quality(writer, quality.unwrap_or(DEFAULT_LOSSY_QUALITY).min(100));
    encoder
        .encode_image(&rgb)
        .map_err(|e| ImageConvertError::Encode {
            format: "jpeg",
            reason: e.to_string(),
        })
}

/// Raster-to-vector: normalize to PNG in the scratch directory, then
/// trace the bitmap.
fn trace_svg(
    img: &DynamicImage,
    output: &Path,
    scratch_dir: &Path,
) -> Result<(), ImageConvertError> {
    let suffix = Uuid::new_v4().simple().to_string();
    let png_path: PathBuf = scratch_dir.join(format!("trace-{}.png", &suffix[..8]));
    img.save_with_format(&png_path, ImageFormat::Png)
        .map_err(|e| ImageConvertError::Encode {
            format: "svg",
            reason: e.to_string(),
        })?;

    let output_buf = output.to_path_buf();
    let result = vtracer::convert_image_to_svg(&png_path, &output_buf, vtracer::Config::default())
        .map_err(|reason| ImageConvertError::Encode {
            format: "svg",
            reason,
        });
    let _ = std::fs::remove_file(&png_path);
    result
}
