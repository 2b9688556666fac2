use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use spectracrawl::config::Overrides;
use std::path::PathBuf;

mod format;
mod merge;
mod name;
mod plan;
mod style;

/// spectracrawl - Gas Absorption Spectra Merger
#[derive(Parser)]
#[command(name = "spectracrawl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every simulation table in an archive into one CSV file
    Merge {
        /// Archive downloaded from the calculator
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Directory the merged file is written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },

    /// Show the file name a merge would produce, without writing it
    Name {
        /// Archive downloaded from the calculator
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },

    /// Show how a spectral domain is split into requests and archives
    Plan {
        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Print the canonical form of numeric values
    Format {
        /// Values to render
        #[arg(value_name = "VALUE", required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
}

/// Settings that take precedence over the config file
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Gas identifier, e.g. CH4
    #[arg(long, value_name = "GAS")]
    gas: Option<String>,

    /// Concentration in ppm
    #[arg(long)]
    ppm: Option<f64>,

    /// Start wavenumber (cm^-1)
    #[arg(long)]
    start: Option<f64>,

    /// End wavenumber (cm^-1)
    #[arg(long)]
    end: Option<f64>,

    /// Widest wavenumber span per request
    #[arg(long)]
    max_range: Option<f64>,

    /// Requests per downloaded archive
    #[arg(long)]
    max_plots: Option<usize>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            gas_id: args.gas,
            ppm: args.ppm,
            start_nu: args.start,
            end_nu: args.end,
            max_range: args.max_range,
            max_plots: args.max_plots,
        }
    }
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge { archive, output } => merge::run(archive, output),
        Commands::Name { archive } => name::run(archive),
        Commands::Plan { config, overrides } => plan::run(config, overrides.into()),
        Commands::Format { values } => format::run(&values),
    }
}
