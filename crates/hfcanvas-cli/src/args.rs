//! Command-line argument definitions for the hfcanvas CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, viewport fitting, palette listing and logging verbosity.

use clap::Parser;

/// Command-line arguments for the hfcanvas diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input BPMN document
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output SVG file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the palette entries to stdout
    #[arg(long)]
    pub list_palette: bool,

    /// Keep the default viewbox instead of fitting the diagram
    #[arg(long)]
    pub no_fit: bool,
}
