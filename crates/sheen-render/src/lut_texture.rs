//! Binding a BRDF lookup table at run time.

use std::path::{Path, PathBuf};

use sheen_brdf::LutImage;
use sheen_core::LinearRgba;
use tracing::{info, warn};

use crate::error::Result;
use crate::host::{HostError, RenderHost, TextureId};

/// Where the bound LUT came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LutOrigin {
    /// Loaded from an image file.
    File(PathBuf),
    /// The file was absent; a solid texture of this color stands in.
    Placeholder(LinearRgba),
    /// Uploaded from memory.
    Generated { width: u32, height: u32 },
}

/// A LUT texture living in the host.
#[derive(Debug, Clone, PartialEq)]
pub struct BrdfLut {
    texture: TextureId,
    origin: LutOrigin,
}

impl BrdfLut {
    /// Load a LUT image, falling back to a solid `fill` texture when the file
    /// does not exist.
    ///
    /// A file that exists but cannot be decoded is an error.
    pub fn load(host: &mut dyn RenderHost, path: impl AsRef<Path>, fill: LinearRgba) -> Result<Self> {
        let path = path.as_ref();
        match host.load_texture(path) {
            Ok(texture) => {
                info!("Loaded BRDF LUT from {}", path.display());
                Ok(Self {
                    texture,
                    origin: LutOrigin::File(path.to_path_buf()),
                })
            }
            Err(HostError::Missing(_)) => {
                warn!(
                    "BRDF LUT {} not found, using a placeholder texture",
                    path.display()
                );
                let texture = host.solid_texture(fill)?;
                Ok(Self {
                    texture,
                    origin: LutOrigin::Placeholder(fill),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Upload an in-memory LUT as a two-channel float texture.
    pub fn upload(host: &mut dyn RenderHost, lut: &LutImage) -> Result<Self> {
        let (width, height) = lut.dimensions();
        let texture = host.create_texture_rg32f(width, height, lut.as_rg32f())?;
        info!("Uploaded {}x{} BRDF LUT", width, height);
        Ok(Self {
            texture,
            origin: LutOrigin::Generated { width, height },
        })
    }

    pub const fn texture(&self) -> TextureId {
        self.texture
    }

    pub const fn origin(&self) -> &LutOrigin {
        &self.origin
    }

    /// Returns `true` if a placeholder stands in for a real table.
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.origin, LutOrigin::Placeholder(_))
    }
}
