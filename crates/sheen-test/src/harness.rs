//! Image regression testing for generated lookup tables.
//!
//! A table is generated to the output directory and compared against a
//! stored baseline; the first run of a case records the baseline.

use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgba};
use sheen_brdf::{encode_rgba16, generate, LutConfig, Rgba16Image};
use tracing::info;

use crate::{Result, TestError, VisualTestConfig};

/// Regression runner for LUT images.
#[derive(Debug, Clone)]
pub struct LutRegressionTest {
    config: VisualTestConfig,
}

impl LutRegressionTest {
    /// Create a new regression runner.
    pub fn new(config: VisualTestConfig) -> Self {
        Self { config }
    }

    fn baseline_path(&self, name: &str) -> PathBuf {
        Path::new(&self.config.baseline_dir).join(format!("{name}.png"))
    }

    fn output_path(&self, name: &str) -> PathBuf {
        Path::new(&self.config.output_dir).join(format!("{name}.png"))
    }

    /// Generate the table described by `lut` into the output directory and
    /// compare it with the baseline named `name`.
    ///
    /// The output path in `lut` is replaced.
    pub fn run_test(&self, name: &str, lut: &LutConfig) -> Result<()> {
        let output = self.output_path(name);
        let table = generate(&lut.clone().with_output(&output))?;
        self.compare_and_save(name, &encode_rgba16(&table))
    }

    fn compare_and_save(&self, name: &str, image: &Rgba16Image) -> Result<()> {
        std::fs::create_dir_all(&self.config.baseline_dir)?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let baseline_path = self.baseline_path(name);
        if baseline_path.exists() {
            let baseline = image::open(&baseline_path)?.to_rgba16();
            let diff = compare_images(&baseline, image)?;
            if diff > self.config.threshold {
                let diff_path = Path::new(&self.config.output_dir).join(format!("{name}_diff.png"));
                create_diff_image(&baseline, image).save(&diff_path)?;

                return Err(TestError::ImageComparison(format!(
                    "Image difference {:.4} exceeds threshold {:.4} (see {})",
                    diff,
                    self.config.threshold,
                    diff_path.display()
                )));
            }
        } else {
            image.save(&baseline_path)?;
            info!("Created new baseline: {}", baseline_path.display());
        }

        Ok(())
    }
}

/// Normalized difference (0.0-1.0) over the two table channels.
pub fn compare_images(a: &Rgba16Image, b: &Rgba16Image) -> Result<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(TestError::ImageComparison(format!(
            "Image dimensions don't match: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    let total_diff: u64 = a
        .pixels()
        .zip(b.pixels())
        .map(|(pa, pb)| {
            u64::from(pa[0].abs_diff(pb[0])) + u64::from(pa[1].abs_diff(pb[1]))
        })
        .sum();

    let max_diff = u64::from(a.width()) * u64::from(a.height()) * 2 * u64::from(u16::MAX);
    if max_diff == 0 {
        return Ok(0.0);
    }
    Ok(total_diff as f64 / max_diff as f64)
}

/// 8-bit image marking texels that differ in red, others as the dimmed table.
pub fn create_diff_image(a: &Rgba16Image, b: &Rgba16Image) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let (width, height) = a.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        let max_diff = pa[0].abs_diff(pb[0]).max(pa[1].abs_diff(pb[1]));
        if max_diff > 256 {
            Rgba([255, 0, 0, 255])
        } else {
            let dim = |v: u16| (v >> 9) as u8;
            Rgba([dim(pa[0]), dim(pa[1]), 0, 255])
        }
    })
}
