//! # Batch Merge Module
//!
//! Turns one archive of per-interval simulation tables into a single CSV file.
//!
//! ## Pipeline
//!
//! 1. Every archive entry is parsed into a [`SpectralRun`].
//! 2. All runs must carry exactly the same condition tokens; the first entry is
//!    the reference and any mismatch rejects the whole batch.
//! 3. Runs are stably sorted by their lowest spectral position.
//! 4. The reference tokens are decoded into a [`ConditionSet`] to name the
//!    output file (see [`output_file_name`]).
//! 5. Data rows are written behind a single `nu, <conditions>` header.
//!
//! Output is written to a temporary file in the destination directory and
//! renamed into place, so a failed merge never leaves a partial file behind.
//!
//! ```rust,no_run
//! use spectracrawl::merge::merge_archive;
//!
//! let written = merge_archive("SpectraPlotSimulations.zip", "output/CH4")?;
//! println!("merged into {}", written.display());
//! # Ok::<(), spectracrawl::merge::MergeError>(())
//! ```
//!
//! Overlapping or non-contiguous runs are merged as-is; no gap check is made.

mod error;
mod naming;
mod run;


pub use error::MergeError;
pub use naming::{output_file_name, OUTPUT_EXTENSION};
pub use run::SpectralRun;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, info};
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::conditions::{join_header, ConditionSet};

/// Name of the first header column in merged output
pub const NU_COLUMN: &str = "nu";

/// Runs of one batch, validated and ordered, ready to be written.
#[derive(Debug, Clone)]
pub struct MergedSpectrum {
    runs: Vec<SpectralRun>,
    nu_min: f64,
    nu_max: f64,
    condition_tokens: Vec<String>,
    conditions: ConditionSet,
}

impl MergedSpectrum {
    /// Read and validate every dataset in a batch archive.
    pub fn from_archive<P: AsRef<Path>>(path: P) -> Result<Self, MergeError> {
        let path = path.as_ref();
        let unreadable = |source: ZipError| MergeError::ArchiveUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| unreadable(e.into()))?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(unreadable)?;

        let mut runs = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index(index).map_err(unreadable)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let run = SpectralRun::from_reader(&name, entry)?;
            debug!(
                "Extracted {} ({} rows, nu=[{}-{}])",
                run.entry,
                run.row_count(),
                run.nu_min,
                run.nu_max
            );
            if let Some(reference) = runs.first() {
                check_conditions(reference, &run)?;
            }
            runs.push(run);
        }

        Self::from_runs(runs)
    }

    /// Validate and order already extracted runs.
    ///
    /// The first run's condition tokens are the reference for the batch.
    pub fn from_runs(mut runs: Vec<SpectralRun>) -> Result<Self, MergeError> {
        let reference = runs.first().ok_or(MergeError::EmptyBatch)?;
        for run in &runs[1..] {
            check_conditions(reference, run)?;
        }
        let condition_tokens = reference.conditions.clone();

        // Stable: archive order is kept among equal minimums.
        runs.sort_by(|a, b| a.nu_min.total_cmp(&b.nu_min));

        let nu_min = runs[0].nu_min;
        let nu_max = runs
            .iter()
            .map(|run| run.nu_max)
            .fold(f64::NEG_INFINITY, f64::max);

        let conditions = ConditionSet::from_tokens(&condition_tokens)?;

        Ok(Self {
            runs,
            nu_min,
            nu_max,
            condition_tokens,
            conditions,
        })
    }

    /// Runs in output order
    pub fn runs(&self) -> &[SpectralRun] {
        &self.runs
    }

    /// Lowest spectral position in the batch
    pub fn nu_min(&self) -> f64 {
        self.nu_min
    }

    /// Highest spectral position in the batch
    pub fn nu_max(&self) -> f64 {
        self.nu_max
    }

    /// Raw condition tokens shared by every run
    pub fn condition_tokens(&self) -> &[String] {
        &self.condition_tokens
    }

    /// Decoded conditions shared by every run
    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    /// Total number of data rows across all runs
    pub fn data_row_count(&self) -> usize {
        self.runs.iter().map(|run| run.data_rows().len()).sum()
    }

    /// Output file name for this batch
    pub fn file_name(&self) -> String {
        output_file_name(&self.conditions, self.nu_min, self.nu_max)
    }

    /// Header row of the merged table
    pub fn header(&self) -> StringRecord {
        StringRecord::from(vec![
            NU_COLUMN.to_string(),
            join_header(&self.condition_tokens),
        ])
    }

    /// Write the merged table into `output_dir`, returning the file path.
    ///
    /// The file appears atomically; an existing file of the same name is
    /// replaced.
    pub fn write_into<P: AsRef<Path>>(&self, output_dir: P) -> Result<PathBuf, MergeError> {
        let output_dir = output_dir.as_ref();
        let path = output_dir.join(self.file_name());
        let failure = |source: std::io::Error| MergeError::WriteFailure {
            path: path.clone(),
            source,
        };

        let temp = NamedTempFile::new_in(output_dir).map_err(failure)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(temp.as_file());
            writer
                .write_record(&self.header())
                .map_err(|e| failure(e.into()))?;
            for run in &self.runs {
                for row in run.data_rows() {
                    writer.write_record(row).map_err(|e| failure(e.into()))?;
                }
            }
            writer.flush().map_err(failure)?;
        }
        temp.persist(&path).map_err(|e| failure(e.error))?;

        Ok(path)
    }
}

fn check_conditions(reference: &SpectralRun, run: &SpectralRun) -> Result<(), MergeError> {
    if run.conditions == reference.conditions {
        return Ok(());
    }
    Err(MergeError::InconsistentRunConditions {
        entry: run.entry.clone(),
        expected: join_header(&reference.conditions),
        found: join_header(&run.conditions),
    })
}

/// Merge every dataset in `archive` into one CSV file inside `output_dir`.
///
/// Nothing is written unless the whole batch validates. The source archive is
/// never modified.
pub fn merge_archive<A, O>(archive: A, output_dir: O) -> Result<PathBuf, MergeError>
where
    A: AsRef<Path>,
    O: AsRef<Path>,
{
    let archive = archive.as_ref();
    let output_dir = output_dir.as_ref();

    if !output_dir.is_dir() {
        return Err(MergeError::OutputDirectoryMissing(output_dir.to_path_buf()));
    }

    let merged = MergedSpectrum::from_archive(archive)?;
    let written = merged.write_into(output_dir)?;

    info!(
        "Merged {} runs ({} rows, nu=[{}-{}]) from {} into {}",
        merged.runs().len(),
        merged.data_row_count(),
        merged.nu_min(),
        merged.nu_max(),
        archive.display(),
        written.display()
    );

    Ok(written)
}
