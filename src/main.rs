//! # spectracrawl
//!
//! Command-line front end for merging gas absorption simulation archives.
//!
//! ## Usage
//!
//! ```bash
//! # Merge one downloaded archive into a directory
//! spectracrawl merge SpectraPlotSimulations.zip -o output/CH4
//!
//! # Show how a configured domain is split into requests and archives
//! spectracrawl plan --config spectracrawl.toml
//!
//! # Canonical form of a few values
//! spectracrawl format 300 0.35 -1e-6
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
