//! Command-line argument definitions for the Beamline CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input file, the output format, the
//! transforms to apply, configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

use beamline::family::Family;

/// What to write.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// MADX definitions and sequence
    Madx,
    /// Elegant lattice
    Elegant,
    /// Tracy lattice
    Tracy,
    /// MADX script installing the lattice rows into an existing sequence
    Install,
    /// MADX script removing the lattice rows from an existing sequence
    Remove,
    /// MADX script adding MSTART and MEND markers to the sequence ends
    Markers,
}

/// Command-line arguments for the Beamline lattice converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input MADX sequence file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Target::Madx)]
    pub to: Target,

    /// Path to the output file; standard output when absent
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Path to a dipole split plan (TOML)
    #[arg(long)]
    pub split: Option<String>,

    /// Fill the gaps between elements with drifts
    #[arg(long)]
    pub add_drifts: bool,

    /// Sequence name for edit scripts; defaults to the lattice name
    #[arg(long)]
    pub sequence: Option<String>,

    /// Restrict edit scripts to elements of this family
    #[arg(long)]
    pub family: Option<Family>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
