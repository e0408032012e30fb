#![deny(unsafe_code)]

mod batch;
mod common;
mod config;
mod constants;
mod font;
mod glyphs;
mod pipeline;
mod writer;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use crate::config::{BuildManifest, BuildOptions, CharacterSet, RenderOverrides, UserDefaults};
use crate::font::FontdueRenderer;
use crate::pipeline::{BuildResult, GlyphBuildPipeline, TracingDiagnostics};
use crate::writer::AtlasWriter;

#[derive(Parser)]
#[command(name = "glyph-builder")]
#[command(version)]
#[command(about = "Convert vector fonts to bitmap glyph atlases with kerning", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a single font
    Build(BuildArgs),
    /// Build every font listed in a JSON manifest
    Batch {
        /// Manifest file
        manifest: PathBuf,

        /// Maximum builds running at once
        #[arg(short, long, default_value_t = constants::defaults::BATCH_JOBS)]
        jobs: usize,
    },
    /// List fonts known to fontconfig
    ListFonts,
}

#[derive(Args)]
struct BuildArgs {
    /// Font name (used for output file names and fontconfig lookup)
    #[arg(long)]
    font_name: String,

    /// Font file; looked up by name via fontconfig when omitted
    #[arg(long)]
    font_path: Option<PathBuf>,

    /// Characters to render, e.g. "ascii,latin1" or "A-Z,0-9,U+20AC"
    #[arg(long)]
    chars: Option<CharacterSet>,

    /// Pixel size
    #[arg(long)]
    size: Option<f32>,

    /// Transparent pixels around each glyph in the atlas
    #[arg(long)]
    padding: Option<u32>,

    /// Antialias glyph edges (true/false); overrides defaults.json
    #[arg(long, value_name = "BOOL")]
    antialias: Option<bool>,

    /// Glyph color as RRGGBB or AARRGGBB
    #[arg(long, value_parser = parse_color)]
    color: Option<common::HexColor>,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,
}

impl BuildArgs {
    fn overrides(&self) -> RenderOverrides {
        RenderOverrides {
            characters: self.chars.clone(),
            size: self.size,
            padding: self.padding,
            antialias: self.antialias,
            color: self.color,
        }
    }

    fn into_options(self, user: &RenderOverrides) -> Result<BuildOptions> {
        let mut options = BuildOptions::new(&self.font_name, &self.output);
        options.font_path = self.font_path.clone();
        self.overrides().layered_over(user).apply_to(&mut options);
        options.validate()?;
        Ok(options)
    }
}

fn parse_color(raw: &str) -> Result<common::HexColor, String> {
    common::HexColor::parse(raw).ok_or_else(|| format!("invalid hex color '{}'", raw))
}

/// Run one build with the default fontdue renderer and atlas writer
fn build_font(options: &BuildOptions) -> BuildResult {
    GlyphBuildPipeline::new(
        FontdueRenderer::new(),
        AtlasWriter::new(options.render.padding),
        TracingDiagnostics,
    )
    .build(options)
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Build(args) => {
            let user = UserDefaults::load()?;
            let options = args.into_options(&user).context("Invalid build options")?;
            let result = build_font(&options);
            if result.is_success() {
                info!(font = %options.font_name, chars = %options.characters, "Build finished");
            }
            Ok(result.is_success())
        }
        Command::Batch { manifest, jobs } => {
            let user = UserDefaults::load()?;
            let builds = BuildManifest::load(&manifest)?.to_build_options(&user)?;
            let report = batch::run_batch(&builds, jobs, build_font)?;
            for entry in report.failed() {
                warn!(font = %entry.font_name, result = ?entry.result, "Build failed");
            }
            Ok(report.is_success())
        }
        Command::ListFonts => {
            for installed in font::list_fonts()? {
                match installed.path {
                    Some(path) => println!("{}\t{}", installed.name, path.display()),
                    None => println!("{}", installed.name),
                }
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    common::debug::init_logging(cli.verbose);
    common::debug::log_build_environment();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            info!("Run with -v for more detail");
            ExitCode::FAILURE
        }
    }
}
