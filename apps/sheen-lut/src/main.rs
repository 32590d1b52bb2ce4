//! Offline BRDF lookup table generator.
//!
//! Reads a parameter image (red = roughness, green = sample-count scale) and
//! writes the split-sum scale/bias table as a 16-bit RGBA image.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sheen-lut --release -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `-i, --input <PATH>`: Parameter image (default: `input_texture.png`)
//! - `-o, --output <PATH>`: Output image (default: `output_brdf_lut.png`)
//! - `-s, --size <WxH>`: Output size in texels (default: 1080x1920)
//! - `--uniform`: Generate the classic roughness x view-cosine table instead
//! - `--seed <N>`: Rotate the sample points by a seed-derived offset
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod args;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::LutArgs;

fn main() -> anyhow::Result<()> {
    let args = LutArgs::from_args()?;
    if args.help {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = args.to_config();
    let lut = sheen_brdf::generate(&config)
        .with_context(|| format!("failed to generate {}", config.output.display()))?;

    let (width, height) = lut.dimensions();
    info!("Done: {}x{} table", width, height);
    Ok(())
}

fn print_help() {
    eprintln!(
        "sheen-lut: offline BRDF lookup table generator

USAGE:
    cargo run -p sheen-lut --release -- [OPTIONS]

OPTIONS:
    -i, --input <PATH>      Parameter image; red = roughness, green = sample scale
                            Default: {input}
    -o, --output <PATH>     Output image, overwritten if present
                            Default: {output}
    -s, --size <WxH>        Output size in texels (default: {width}x{height})
    --uniform               Classic table: roughness along x, view cosine along y
    --seed <N>              Rotate sample points by a seed-derived offset
    -h, --help              Print this help message

EXAMPLES:
    # Default paths
    cargo run -p sheen-lut --release

    # Small analytic table
    cargo run -p sheen-lut --release -- --uniform -s 256x256 -o brdf_lut.png

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)",
        input = sheen_core::constants::DEFAULT_INPUT_FILE,
        output = sheen_core::constants::DEFAULT_LUT_FILE,
        width = sheen_core::constants::DEFAULT_LUT_WIDTH,
        height = sheen_core::constants::DEFAULT_LUT_HEIGHT,
    );
}
