//! Command-line argument definitions for the Axon CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, text measurement and logging verbosity.

use clap::{Parser, ValueEnum};

/// How label widths are measured during layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MeasureKind {
    /// Shape text with the system fonts
    #[default]
    Font,
    /// Fixed advance per character, for reproducible output
    Fixed,
}

/// Command-line arguments for the Axon diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram document
    #[arg(help = "Path to the input JSON document")]
    pub input: String,

    /// Path to the output document
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Text measurement used by layout
    #[arg(long, value_enum, default_value_t = MeasureKind::Font)]
    pub measure: MeasureKind,
}
