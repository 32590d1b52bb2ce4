//! Command line parsing.

use std::path::PathBuf;

use anyhow::{bail, Context};
use sheen_brdf::{LutConfig, SampleSequence};

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub size: Option<(u32, u32)>,
    pub uniform: bool,
    pub seed: Option<u32>,
    pub help: bool,
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(value: &str) -> anyhow::Result<(u32, u32)> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("size '{value}' is not WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .with_context(|| format!("invalid width in '{value}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        bail!("size '{value}' must be non-zero");
    }
    Ok((width, height))
}

impl LutArgs {
    /// Parse from the process arguments.
    pub fn from_args() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse_args(&args)
    }

    /// Parse from a slice of arguments; the first element is the program name.
    pub fn parse_args(args: &[String]) -> anyhow::Result<Self> {
        let mut parsed = Self {
            input: None,
            output: None,
            size: None,
            uniform: false,
            seed: None,
            help: false,
        };

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .with_context(|| format!("{arg} expects a value"))
            };
            match arg.as_str() {
                "-i" | "--input" => parsed.input = Some(PathBuf::from(value()?)),
                "-o" | "--output" => parsed.output = Some(PathBuf::from(value()?)),
                "-s" | "--size" => parsed.size = Some(parse_size(value()?)?),
                "--seed" => {
                    let raw = value()?;
                    parsed.seed = Some(
                        raw.parse()
                            .with_context(|| format!("invalid seed '{raw}'"))?,
                    );
                }
                "--uniform" => parsed.uniform = true,
                "-h" | "--help" => parsed.help = true,
                other => bail!("unknown argument '{other}' (see --help)"),
            }
        }

        if parsed.uniform && parsed.input.is_some() {
            bail!("--uniform and --input are mutually exclusive");
        }
        Ok(parsed)
    }

    /// Build the generator configuration.
    pub fn to_config(&self) -> LutConfig {
        let mut config = LutConfig::new();
        if let Some(input) = &self.input {
            config = config.with_input(input);
        }
        if self.uniform {
            config = config.uniform();
        }
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }
        if let Some((width, height)) = self.size {
            config = config.with_size(width, height);
        }
        if let Some(seed) = self.seed {
            config = config.with_sequence(SampleSequence::Rotated { seed });
        }
        config
    }
}
