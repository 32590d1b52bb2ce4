//! Input parameter image for image-driven LUT generation.
//!
//! The red channel holds roughness, the green channel the sample-count
//! scale. Lookups use bilinear filtering with clamp-to-edge addressing, the
//! same way a fragment shader would sample the texture, so the output
//! resolution is independent of the input resolution.

use std::path::Path;

use glam::Vec2;
use image::Rgba32FImage;
use tracing::debug;

use crate::error::{LutError, Result};

/// Roughness and sample-scale parameters decoded from an image.
#[derive(Debug, Clone)]
pub struct ParameterMap {
    texels: Rgba32FImage,
}

impl ParameterMap {
    /// Load the parameter map from disk.
    ///
    /// A missing path and anything that exists but does not decode (including
    /// a directory) are both fatal, but reported as distinct errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LutError::MissingInput(path.to_path_buf()));
        }
        let image = image::open(path).map_err(|source| LutError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Loaded parameter map {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::from_image(image.to_rgba32f())
    }

    /// Wrap an already decoded image.
    pub fn from_image(texels: Rgba32FImage) -> Result<Self> {
        if texels.width() == 0 || texels.height() == 0 {
            return Err(LutError::InvalidSize {
                width: texels.width(),
                height: texels.height(),
            });
        }
        Ok(Self { texels })
    }

    /// Build a map from per-texel `(roughness, sample_scale)` pairs in row-major order.
    pub fn from_pairs(width: u32, height: u32, pairs: &[(f32, f32)]) -> Result<Self> {
        if pairs.len() != width as usize * height as usize {
            return Err(LutError::InvalidSize { width, height });
        }
        let texels = Rgba32FImage::from_fn(width, height, |x, y| {
            let (roughness, scale) = pairs[(y * width + x) as usize];
            image::Rgba([roughness, scale, 0.0, 1.0])
        });
        Self::from_image(texels)
    }

    /// Input width over input height.
    pub fn aspect_ratio(&self) -> f32 {
        self.texels.width() as f32 / self.texels.height() as f32
    }

    /// Input dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.texels.dimensions()
    }

    /// Bilinearly filtered `(roughness, sample_scale)` at normalized coordinates.
    pub fn sample(&self, uv: Vec2) -> (f32, f32) {
        let (width, height) = self.texels.dimensions();
        let x = (uv.x * width as f32 - 0.5).clamp(0.0, (width - 1) as f32);
        let y = (uv.y * height as f32 - 0.5).clamp(0.0, (height - 1) as f32);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(width - 1);
        let y1 = (y0 + 1).min(height - 1);
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;

        let fetch = |px: u32, py: u32| {
            let p = self.texels.get_pixel(px, py);
            Vec2::new(p[0], p[1])
        };
        let top = fetch(x0, y0).lerp(fetch(x1, y0), tx);
        let bottom = fetch(x0, y1).lerp(fetch(x1, y1), tx);
        let value = top.lerp(bottom, ty);
        (value.x, value.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn checker() -> ParameterMap {
        ParameterMap::from_pairs(2, 2, &[(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.5, 0.5)]).unwrap()
    }

    #[test]
    fn texel_centers_return_exact_values() {
        let map = checker();
        assert_eq!(map.sample(Vec2::new(0.25, 0.25)), (0.0, 1.0));
        assert_eq!(map.sample(Vec2::new(0.75, 0.25)), (1.0, 1.0));
        assert_eq!(map.sample(Vec2::new(0.25, 0.75)), (1.0, 0.0));
        assert_eq!(map.sample(Vec2::new(0.75, 0.75)), (0.5, 0.5));
    }

    #[test]
    fn center_is_bilinear_average() {
        let (roughness, scale) = checker().sample(Vec2::new(0.5, 0.5));
        assert_abs_diff_eq!(roughness, 0.625);
        assert_abs_diff_eq!(scale, 0.625);
    }

    #[test]
    fn edges_clamp() {
        let map = checker();
        assert_eq!(map.sample(Vec2::new(0.0, 0.0)), (0.0, 1.0));
        assert_eq!(map.sample(Vec2::new(1.0, 1.0)), (0.5, 0.5));
        assert_eq!(map.sample(Vec2::new(-4.0, 9.0)), (1.0, 0.0));
    }

    #[test]
    fn aspect_ratio_is_width_over_height() {
        let map = ParameterMap::from_pairs(4, 2, &[(0.0, 1.0); 8]).unwrap();
        assert_abs_diff_eq!(map.aspect_ratio(), 2.0);
    }

    #[test]
    fn mismatched_pair_count_is_rejected() {
        assert!(ParameterMap::from_pairs(2, 2, &[(0.0, 1.0)]).is_err());
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let err = ParameterMap::open("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, LutError::MissingInput(_)));
    }

    #[test]
    fn directory_is_a_decode_error() {
        let dir = std::env::temp_dir().join("sheen-brdf-input-dir");
        std::fs::create_dir_all(&dir).unwrap();
        let err = ParameterMap::open(&dir).unwrap_err();
        assert!(matches!(err, LutError::Decode { .. }));
    }
}
