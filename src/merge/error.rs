use std::path::PathBuf;

use crate::conditions::ConditionError;

/// Errors that can occur while merging a batch archive
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Output directory does not exist
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirectoryMissing(PathBuf),

    /// Archive could not be opened or its structure is corrupt
    #[error("Cannot read archive {}: {source}", path.display())]
    ArchiveUnreadable {
        /// Archive path
        path: PathBuf,
        /// Underlying ZIP error
        #[source]
        source: zip::result::ZipError,
    },

    /// Entry is not a well-formed simulation table
    #[error("Malformed dataset in entry {entry:?}: {reason}")]
    MalformedDataset {
        /// Archive entry name
        entry: String,
        /// What was wrong with it
        reason: String,
    },

    /// First column of the first or last data row is not a number
    #[error("Non-numeric spectral position {value:?} in entry {entry:?}")]
    NonNumericSpectralBound {
        /// Archive entry name
        entry: String,
        /// Offending cell
        value: String,
    },

    /// Entry conditions differ from the first entry of the batch
    #[error("Gas absorption conditions differ in entry {entry:?}: expected {expected:?}, found {found:?}")]
    InconsistentRunConditions {
        /// Archive entry name
        entry: String,
        /// Reference condition header
        expected: String,
        /// Condition header of this entry
        found: String,
    },

    /// Batch holds no datasets
    #[error("No datasets found in batch")]
    EmptyBatch,

    /// Condition tokens could not be decoded
    #[error("Condition error: {0}")]
    Conditions(#[from] ConditionError),

    /// Writing the merged file failed
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
