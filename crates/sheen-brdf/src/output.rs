//! Persisting lookup tables as 16-bit images.
//!
//! Texels are stored as `R = A`, `G = B`, `B = 0`, `A = 0`, each quantized to
//! `u16`. Non-finite values are written as zero.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, ImageFormat, Rgba};
use tracing::{debug, info};

use crate::error::{LutError, Result};
use crate::integrate::SplitSum;
use crate::lut::LutImage;

/// 16-bit RGBA image holding an encoded LUT.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

#[inline]
fn quantize(value: f32) -> u16 {
    if value.is_finite() {
        (value.clamp(0.0, 1.0) * f32::from(u16::MAX)).round() as u16
    } else {
        0
    }
}

#[inline]
fn dequantize(value: u16) -> f32 {
    f32::from(value) / f32::from(u16::MAX)
}

/// Encode a LUT into a 16-bit RGBA image.
pub fn encode_rgba16(lut: &LutImage) -> Rgba16Image {
    let (width, height) = lut.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        let texel = lut.get(x, y);
        Rgba([quantize(texel.a), quantize(texel.b), 0, 0])
    })
}

/// Decode a 16-bit RGBA image back into a LUT.
pub fn decode_rgba16(image: &Rgba16Image) -> Result<LutImage> {
    let (width, height) = image.dimensions();
    let texels = image
        .pixels()
        .map(|p| SplitSum {
            a: dequantize(p[0]),
            b: dequantize(p[1]),
        })
        .collect();
    LutImage::from_texels(width, height, texels)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write a LUT to `path`, replacing any existing file.
///
/// The image is encoded to a sibling temporary file first and renamed into
/// place, so a failed write never leaves a truncated LUT behind.
pub fn save_lut(lut: &LutImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)
        .map_err(|_| LutError::UnsupportedFormat(path.to_path_buf()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = temp_path(path);
    let image = encode_rgba16(lut);
    if let Err(source) = image.save_with_format(&staging, format) {
        let _ = fs::remove_file(&staging);
        return Err(LutError::Save {
            path: path.to_path_buf(),
            source,
        });
    }
    debug!("Encoded LUT to {}", staging.display());

    fs::rename(&staging, path)?;
    info!("Saved BRDF LUT image: {}", path.display());
    Ok(())
}

/// Read a LUT previously written by [`save_lut`].
pub fn load_lut(path: impl AsRef<Path>) -> Result<LutImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LutError::MissingInput(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|source| LutError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    decode_rgba16(&image.to_rgba16())
}
