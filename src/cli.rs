//! CLI interface for ChromeForge
//!
//! The binary has a single job — run the forge server — so the CLI is a flat
//! set of flags rather than subcommands.

use clap::Parser;
use std::path::PathBuf;

/// ChromeForge extension engine
///
/// A local server that drafts, audits, and materializes Manifest V3 browser
/// extensions from natural-language instructions.
#[derive(Parser, Debug)]
#[command(name = "chromeforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Specify alternate configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the listen address from config (e.g. 127.0.0.1:5000)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}
