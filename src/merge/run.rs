use std::io::Read;

use csv::StringRecord;

use super::MergeError;
use crate::conditions::split_header;

/// One simulation table extracted from an archive entry.
///
/// Row 0 is the metadata row (`identifier, conditions`); the remaining rows
/// are `[spectral position, value...]` and are kept verbatim.
#[derive(Debug, Clone)]
pub struct SpectralRun {
    /// Archive entry the table came from
    pub entry: String,
    /// All rows, metadata row included
    pub rows: Vec<StringRecord>,
    /// Spectral position of the first data row
    pub nu_min: f64,
    /// Spectral position of the last data row
    pub nu_max: f64,
    /// Raw condition tokens from the metadata row
    pub conditions: Vec<String>,
}

impl SpectralRun {
    /// Parse one comma-separated table.
    pub fn from_reader<R: Read>(entry: &str, reader: R) -> Result<Self, MergeError> {
        let malformed = |reason: String| MergeError::MalformedDataset {
            entry: entry.to_string(),
            reason,
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let rows = csv_reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(e.to_string()))?;

        if rows.len() < 2 {
            return Err(malformed(format!(
                "expected a metadata row and at least one data row, got {} row(s)",
                rows.len()
            )));
        }

        let header = rows[0]
            .get(1)
            .ok_or_else(|| malformed("metadata row has no condition column".to_string()))?;
        let conditions = split_header(header);

        let nu_min = spectral_position(entry, &rows[1])?;
        let nu_max = spectral_position(entry, &rows[rows.len() - 1])?;

        Ok(Self {
            entry: entry.to_string(),
            rows,
            nu_min,
            nu_max,
            conditions,
        })
    }

    /// Number of rows, metadata row included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Data rows (metadata row excluded)
    pub fn data_rows(&self) -> &[StringRecord] {
        &self.rows[1..]
    }
}

fn spectral_position(entry: &str, row: &StringRecord) -> Result<f64, MergeError> {
    let cell = row.get(0).unwrap_or_default();
    cell.parse::<f64>()
        .map_err(|_| MergeError::NonNumericSpectralBound {
            entry: entry.to_string(),
            value: cell.to_string(),
        })
}
