//! GLSL sources and shader templates for the sheen PBR toolkit.
//!
//! The sources are embedded at compile time. Hosts that compile shaders from
//! files get them through [`ShaderLibrary`]; custom code is spliced in at
//! named slots (see [`template`]).

pub mod error;
pub mod library;
pub mod template;

pub use error::{Result, ShaderError};
pub use library::{
    CleanupReport, CustomCode, Program, ProgramPaths, ShaderLibrary, ShaderSource, ShaderStage,
    ALL_SOURCES,
};
pub use template::{ShaderTemplate, SlotFills, SLOT_PRAGMA};
