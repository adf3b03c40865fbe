//! Portrait decoding, color normalization and JPEG thumbnail rendering.

use crate::error::PortraitError;
use crate::types::ThumbnailSpec;
use image::error::{LimitError, LimitErrorKind};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, Rgb, RgbImage, Rgba};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JPEG quality used for every thumbnail.
pub const JPEG_QUALITY: u8 = 85;

/// Decodes downloaded bytes and normalizes the color mode.
pub fn decode_portrait(bytes: &[u8]) -> Result<DynamicImage, PortraitError> {
    let image = image::load_from_memory(bytes)?;
    debug!(
        "Decoded {}x{} image ({:?})",
        image.width(),
        image.height(),
        image.color()
    );
    Ok(normalize_color(image))
}

/// Converts anything other than 8-bit RGB or RGBA to 8-bit RGB.
///
/// Grayscale, grayscale with alpha and 16/32-bit images are not writable
/// as baseline JPEG, so they are converted up front.
pub fn normalize_color(image: DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::Rgb8 | ColorType::Rgba8 => image,
        other => {
            debug!("Converting {:?} image to RGB", other);
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
    }
}

/// Shrinks `image` to fit within `width` x `height`, keeping the aspect ratio.
///
/// Images already inside the box are returned unchanged; nothing is ever
/// enlarged.
pub fn fit_within(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if image.width() <= width && image.height() <= height {
        return image.clone();
    }
    image.resize(width, height, FilterType::Lanczos3)
}

/// JPEG has no alpha channel: composite RGBA over white.
fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgba8(rgba) => RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let alpha = u16::from(a);
            let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
            Rgb([blend(r), blend(g), blend(b)])
        }),
        other => other.to_rgb8(),
    }
}

/// Encodes RGB pixels as a 4:2:0 JPEG with optimized Huffman tables.
fn encode_jpeg<W: Write>(rgb: &RgbImage, writer: W) -> Result<(), PortraitError> {
    let (width, height) = rgb.dimensions();
    let (width, height) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(PortraitError::ImageError(image::ImageError::Limits(
                LimitError::from_kind(LimitErrorKind::DimensionError),
            )))
        }
    };

    let mut encoder = jpeg_encoder::Encoder::new(writer, JPEG_QUALITY);
    encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_2_0);
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(rgb.as_raw(), width, height, jpeg_encoder::ColorType::Rgb)?;
    Ok(())
}

/// Encodes `image` as a JPEG at `destination`, creating parent directories.
pub fn write_jpeg(image: &DynamicImage, destination: &Path) -> Result<(), PortraitError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(std::fs::File::create(destination)?);
    encode_jpeg(&flatten_to_rgb(image), &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes one thumbnail per spec into `person_dir`.
///
/// # Returns
///
/// The paths written, in spec order.
pub fn render_thumbnails(
    image: &DynamicImage,
    person_dir: &Path,
    specs: &[ThumbnailSpec],
) -> Result<Vec<PathBuf>, PortraitError> {
    let mut written = Vec::with_capacity(specs.len());
    for spec in specs {
        let destination = spec.destination(person_dir);
        let thumbnail = fit_within(image, spec.width, spec.height);
        write_jpeg(&thumbnail, &destination)?;
        info!(
            "Saved {} ({}x{})",
            destination.display(),
            thumbnail.width(),
            thumbnail.height()
        );
        written.push(destination);
    }
    Ok(written)
}

/// Decodes `bytes` and renders every thumbnail on the blocking pool.
pub async fn render_portrait(
    bytes: Vec<u8>,
    person_dir: PathBuf,
    specs: &'static [ThumbnailSpec],
) -> Result<Vec<PathBuf>, PortraitError> {
    tokio::task::spawn_blocking(move || {
        let image = decode_portrait(&bytes)?;
        render_thumbnails(&image, &person_dir, specs)
    })
    .await
    .map_err(|e| PortraitError::IoError(std::io::Error::other(format!("Task join error: {}", e))))?
}
