//! Shared value types.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct LinearRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearRgba {
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fill used when no BRDF LUT is available: full scale, zero bias.
    pub const LUT_FALLBACK: Self = Self::new(1.0, 0.0, 0.0, 1.0);

    /// Create a color from its components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

/// Per-material shader parameters bound alongside the PBR shaders.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialInputs {
    /// Scale applied to image-based lighting (0 disables IBL).
    pub ibl_intensity: f32,
    /// Extra darkening applied inside shadowed regions.
    pub shadow_boost: f32,
    /// Height-map displacement distance in world units.
    pub displacement_scale: f32,
    /// Multiplier on the specular lobe.
    pub specular_factor: f32,
}

impl Default for MaterialInputs {
    fn default() -> Self {
        Self {
            ibl_intensity: 1.0,
            shadow_boost: 0.0,
            displacement_scale: 0.0,
            specular_factor: 1.0,
        }
    }
}

impl MaterialInputs {
    /// Reject negative or non-finite parameters.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("ibl_intensity", self.ibl_intensity),
            ("shadow_boost", self.shadow_boost),
            ("displacement_scale", self.displacement_scale),
            ("specular_factor", self.specular_factor),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::OutOfRange(format!("{name} = {value}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lut_fallback_is_full_scale_zero_bias() {
        assert_eq!(LinearRgba::LUT_FALLBACK, LinearRgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn default_material_inputs_are_valid() {
        assert!(MaterialInputs::default().validate().is_ok());
    }

    #[test]
    fn negative_material_input_is_rejected() {
        let inputs = MaterialInputs {
            shadow_boost: -0.5,
            ..Default::default()
        };
        assert!(matches!(inputs.validate(), Err(Error::OutOfRange(_))));
    }
}
