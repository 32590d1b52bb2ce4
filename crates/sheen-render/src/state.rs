//! Setup progress of a pipeline.

use bitflags::bitflags;

bitflags! {
    /// Setup steps a [`crate::PbrPipeline`] has completed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InitState: u8 {
        /// Shader sources were written to the shader directory.
        const SHADERS_EXPORTED = 0b0000_0001;
        /// A BRDF LUT texture is bound.
        const LUT_BOUND        = 0b0000_0010;
        /// The environment cube-map rig exists.
        const ENVIRONMENT      = 0b0000_0100;
        /// The screen-space chain is active.
        const SCREEN_SPACE     = 0b0000_1000;
    }
}

impl InitState {
    #[inline]
    #[must_use]
    pub const fn shaders_exported(self) -> bool {
        self.contains(Self::SHADERS_EXPORTED)
    }

    #[inline]
    #[must_use]
    pub const fn lut_bound(self) -> bool {
        self.contains(Self::LUT_BOUND)
    }

    #[inline]
    #[must_use]
    pub const fn environment(self) -> bool {
        self.contains(Self::ENVIRONMENT)
    }

    #[inline]
    #[must_use]
    pub const fn screen_space(self) -> bool {
        self.contains(Self::SCREEN_SPACE)
    }
}
