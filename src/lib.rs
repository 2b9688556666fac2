//! # spectracrawl - Gas Absorption Spectra Merger
//!
//! `spectracrawl` turns batches of per-interval absorption simulations into one
//! consolidated CSV dataset per batch, named canonically after the physical
//! conditions and the spectral range it covers.
//!
//! ## Key Features
//!
//! - **Request Partitioning**: Splits a requested wavenumber domain into
//!   contiguous chunks the online calculator accepts.
//!
//! - **Strict Batch Validation**: Every table in an archive must carry exactly
//!   the same condition tokens; a single mismatch rejects the batch.
//!
//! - **Canonical Numbers**: Physical quantities render to one short,
//!   deterministic string used both in file names and in data headers.
//!
//! - **Atomic Output**: A merged file either appears complete or not at all.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spectracrawl::merge::merge_archive;
//!
//! let written = merge_archive("SpectraPlotSimulations.zip", "output/CH4")?;
//! // e.g. output/CH4/nu=1000-3000,CH4,x=1e-06,T=300K,P=1atm,L=100cm.csv
//! println!("{}", written.display());
//! # Ok::<(), spectracrawl::merge::MergeError>(())
//! ```
//!
//! ## Data Layout
//!
//! Each archive entry is a comma-separated table:
//!
//! ```text
//! simulation-1,CH4/x=1e-06/T=300K/P=1atm/L=100cm
//! 1000.00,1.2e-05
//! 1000.01,1.3e-05
//! ...
//! ```
//!
//! The merged file keeps every data row, ordered by each table's lowest
//! wavenumber, behind a `nu,<conditions>` header.
//!
//! ## Architecture
//!
//! - [`partition`]: domain → request-sized [`partition::Interval`]s
//! - [`format`]: canonical rendering of physical quantities
//! - [`conditions`]: condition token codec ([`conditions::ConditionSet`])
//! - [`merge`]: archive ingestion, validation and merged output
//! - [`config`]: TOML configuration passed explicitly to every stage
//! - [`pipeline`]: batch planning and the acquisition driver seam

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod conditions;
pub mod config;
pub mod format;
pub mod merge;
pub mod partition;
pub mod pipeline;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::conditions::{ConditionError, ConditionSet};
    pub use crate::config::{Config, ConfigError, Overrides};
    pub use crate::format::{canonical, Canonical};
    pub use crate::merge::{merge_archive, MergeError, MergedSpectrum, SpectralRun};
    pub use crate::partition::{partition, Interval};
    pub use crate::pipeline::{BatchRequest, Deadline, Pipeline, PipelineError, SpectraSource};
}
