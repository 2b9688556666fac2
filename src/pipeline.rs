//! Driving a whole crawl: partition, request, wait, merge.
//!
//! The browser automation that actually fills in the calculator form and
//! clicks "download" lives outside this crate behind [`SpectraSource`]. This
//! module only decides which intervals go into which archive, waits (with an
//! explicit [`Deadline`]) for each archive to land, and merges it.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::conditions::ConditionSet;
use crate::config::{Config, ConfigError};
use crate::merge::{merge_archive, MergeError};
use crate::partition::Interval;

/// Default delay between two checks for a downloaded archive
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors that can occur while running a crawl
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The acquisition driver failed for a batch
    #[error("Source failed for nu=[{start}-{end}]: {message}")]
    Source {
        /// Lowest wavenumber of the batch
        start: f64,
        /// Highest wavenumber of the batch
        end: f64,
        /// Driver message
        message: String,
    },

    /// A file did not appear before its deadline
    #[error("Timed out after {waited:?} waiting for {}", path.display())]
    TimedOut {
        /// File that was waited for
        path: PathBuf,
        /// How long the wait lasted
        waited: Duration,
    },

    /// Configuration problem (output directory)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Merging a downloaded archive failed
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// I/O error while cleaning up archives
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Point in time after which a blocking wait gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            at: started + timeout,
        }
    }

    /// Whether the deadline has passed
    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left before the deadline (zero once expired)
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Time since the deadline was set
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Block until `path` exists, checking every `poll` until `deadline`.
pub fn wait_for_file(path: &Path, deadline: Deadline, poll: Duration) -> Result<(), PipelineError> {
    loop {
        if path.exists() {
            return Ok(());
        }
        if deadline.expired() {
            return Err(PipelineError::TimedOut {
                path: path.to_path_buf(),
                waited: deadline.elapsed(),
            });
        }
        thread::sleep(poll.min(deadline.remaining()));
    }
}

/// Group consecutive intervals into batches of at most `max_plots`.
///
/// Every batch becomes one downloaded archive. A `max_plots` of zero is
/// treated as one.
pub fn plan_batches(intervals: &[Interval], max_plots: usize) -> Vec<&[Interval]> {
    intervals.chunks(max_plots.max(1)).collect()
}

/// Everything a driver needs to submit one batch to the calculator.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    /// Conditions every interval is simulated under
    pub conditions: &'a ConditionSet,
    /// Intervals of this batch, one calculation each
    pub intervals: &'a [Interval],
    /// Wavenumber resolution in cm⁻¹
    pub step_nu: f64,
    /// How long one calculation may take
    pub calc_timeout: Duration,
    /// Pause between two calculations
    pub calc_delay: Duration,
}

impl BatchRequest<'_> {
    /// Lowest wavenumber of the batch
    pub fn start(&self) -> f64 {
        self.intervals.first().map_or(f64::NAN, |i| i.start)
    }

    /// Highest wavenumber of the batch
    pub fn end(&self) -> f64 {
        self.intervals.last().map_or(f64::NAN, |i| i.end)
    }
}

/// Acquisition driver seam.
///
/// Implementations submit every interval of a batch under the given
/// conditions and trigger the archive download, then return the path the
/// archive will appear at. They do not need to wait for it.
pub trait SpectraSource {
    /// Request one batch, returning the expected archive path.
    fn request_batch(&mut self, request: &BatchRequest<'_>) -> Result<PathBuf, PipelineError>;
}

/// Runs every batch of a configured crawl through a [`SpectraSource`].
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    config: &'a Config,
    poll_interval: Duration,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over a validated configuration
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the delay between checks for a downloaded archive
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the crawl, returning the merged files in batch order.
    ///
    /// Stops at the first failing batch; files merged before it are kept.
    pub fn run<S: SpectraSource>(&self, source: &mut S) -> Result<Vec<PathBuf>, PipelineError> {
        let stale = self.config.archive_path();
        if stale.exists() {
            warn!("Removing stale archive {}", stale.display());
            std::fs::remove_file(&stale)?;
        }

        let output_dir = self.config.prepare_output_dir()?;
        let conditions = self.config.conditions();
        let intervals = self.config.intervals();
        let batches = plan_batches(&intervals, self.config.spectraplot.max_plots);

        info!(
            "Crawling {} intervals in {} batches for {}",
            intervals.len(),
            batches.len(),
            conditions
        );

        let mut written = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            let request = BatchRequest {
                conditions: &conditions,
                intervals: batch,
                step_nu: self.config.step_nu(),
                calc_timeout: self.config.calc_timeout(),
                calc_delay: self.config.calc_delay(),
            };
            let archive = source.request_batch(&request)?;
            let deadline = Deadline::after(self.config.download_timeout());
            wait_for_file(&archive, deadline, self.poll_interval)?;

            let merged = merge_archive(&archive, &output_dir)?;
            std::fs::remove_file(&archive)?;
            info!(
                "Finished batch {}/{} -> {}",
                index + 1,
                batches.len(),
                merged.display()
            );
            written.push(merged);
        }

        Ok(written)
    }
}
