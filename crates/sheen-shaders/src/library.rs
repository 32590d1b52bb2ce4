//! Embedded shader sources and their on-disk export.
//!
//! Hosts that load shaders by path get copies of the embedded sources written
//! into a directory of the caller's choosing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, ShaderError};
use crate::template::{ShaderTemplate, SlotFills};

/// Pipeline stage of a shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// A GLSL source compiled into the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource {
    /// File name used on export.
    pub name: &'static str,
    pub stage: ShaderStage,
    pub source: &'static str,
}

impl ShaderSource {
    /// Parse the source as a slot template.
    pub fn template(&self) -> Result<ShaderTemplate> {
        ShaderTemplate::parse(self.name, self.source)
    }
}

pub const PBR_VERTEX: ShaderSource = ShaderSource {
    name: "pbr_v.vert",
    stage: ShaderStage::Vertex,
    source: include_str!("../shaders/pbr_v.vert"),
};

pub const PBR_SKINNED_VERTEX: ShaderSource = ShaderSource {
    name: "pbr_v_arm.vert",
    stage: ShaderStage::Vertex,
    source: include_str!("../shaders/pbr_v_arm.vert"),
};

pub const PBR_FRAGMENT: ShaderSource = ShaderSource {
    name: "pbr_f.frag",
    stage: ShaderStage::Fragment,
    source: include_str!("../shaders/pbr_f.frag"),
};

pub const QUAD_VERTEX: ShaderSource = ShaderSource {
    name: "min_v.vert",
    stage: ShaderStage::Vertex,
    source: include_str!("../shaders/min_v.vert"),
};

pub const SCREENSPACE_FRAGMENT: ShaderSource = ShaderSource {
    name: "screenspace_f.frag",
    stage: ShaderStage::Fragment,
    source: include_str!("../shaders/screenspace_f.frag"),
};

/// Every embedded source.
pub const ALL_SOURCES: [ShaderSource; 5] = [
    PBR_VERTEX,
    PBR_SKINNED_VERTEX,
    PBR_FRAGMENT,
    QUAD_VERTEX,
    SCREENSPACE_FRAGMENT,
];

/// Vertex + fragment pairs the toolkit loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Static meshes.
    Pbr,
    /// Hardware-skinned meshes; shares the PBR fragment stage.
    PbrSkinned,
    /// Full-screen post chain.
    ScreenSpace,
}

impl Program {
    pub const fn vertex(self) -> &'static ShaderSource {
        match self {
            Self::Pbr => &PBR_VERTEX,
            Self::PbrSkinned => &PBR_SKINNED_VERTEX,
            Self::ScreenSpace => &QUAD_VERTEX,
        }
    }

    pub const fn fragment(self) -> &'static ShaderSource {
        match self {
            Self::Pbr | Self::PbrSkinned => &PBR_FRAGMENT,
            Self::ScreenSpace => &SCREENSPACE_FRAGMENT,
        }
    }
}

/// Paths of an exported program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

/// Code injected into a program's vertex and fragment templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomCode {
    pub vertex: SlotFills,
    pub fragment: SlotFills,
}

impl CustomCode {
    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty() && self.fragment.is_empty()
    }
}

/// Outcome of removing exported shader files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    /// Files that were already gone.
    pub missing: Vec<PathBuf>,
}

/// Directory that exported shader files live in.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    dir: PathBuf,
}

impl ShaderLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an embedded source is exported to.
    pub fn path_of(&self, source: &ShaderSource) -> PathBuf {
        self.dir.join(source.name)
    }

    /// Paths of a program's stock sources.
    pub fn paths(&self, program: Program) -> ProgramPaths {
        ProgramPaths {
            vertex: self.path_of(program.vertex()),
            fragment: self.path_of(program.fragment()),
        }
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&path, contents))
            .map_err(|source| ShaderError::Write {
                path: path.clone(),
                source,
            })?;
        debug!("Wrote shader {}", path.display());
        Ok(path)
    }

    /// Write every embedded source, overwriting existing files.
    pub fn export(&self) -> Result<Vec<PathBuf>> {
        let paths = ALL_SOURCES
            .iter()
            .map(|source| self.write(source.name, source.source))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Exported {} shader sources to {}",
            paths.len(),
            self.dir.display()
        );
        Ok(paths)
    }

    /// Write one program's stock sources.
    pub fn export_program(&self, program: Program) -> Result<ProgramPaths> {
        let vertex = program.vertex();
        let fragment = program.fragment();
        Ok(ProgramPaths {
            vertex: self.write(vertex.name, vertex.source)?,
            fragment: self.write(fragment.name, fragment.source)?,
        })
    }

    /// Render a program's templates with `code` and write them as
    /// `<prefix>_<name>`.
    ///
    /// Nothing is written if either stage fails to render.
    pub fn export_custom(
        &self,
        program: Program,
        prefix: &str,
        code: &CustomCode,
    ) -> Result<ProgramPaths> {
        let vertex = program.vertex().template()?.render(&code.vertex)?;
        let fragment = program.fragment().template()?.render(&code.fragment)?;
        let paths = ProgramPaths {
            vertex: self.write(&format!("{prefix}_{}", program.vertex().name), &vertex)?,
            fragment: self.write(&format!("{prefix}_{}", program.fragment().name), &fragment)?,
        };
        info!("Exported custom {:?} program '{}'", program, prefix);
        Ok(paths)
    }

    /// Delete the exported screen-space program.
    ///
    /// Files that are already gone are reported, not treated as errors.
    pub fn remove_screenspace(&self) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();
        let paths = self.paths(Program::ScreenSpace);
        for path in [paths.vertex, paths.fragment] {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed shader {}", path.display());
                    report.removed.push(path);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    warn!("Screen-space shader {} was already removed", path.display());
                    report.missing.push(path);
                }
                Err(source) => return Err(ShaderError::Remove { path, source }),
            }
        }
        Ok(report)
    }
}
