use anyhow::{Context, Result};
use std::path::PathBuf;

use spectracrawl::merge::MergedSpectrum;

use super::style::{heading, label};

/// Describe the merge of an archive without writing anything
pub fn run(archive: PathBuf) -> Result<()> {
    let merged = MergedSpectrum::from_archive(&archive)
        .with_context(|| format!("Failed to read {}", archive.display()))?;

    println!("{}", heading("Batch Summary"));
    println!("{}", heading("============="));
    println!("{}: {}", label("Archive"), archive.display());
    println!("{}: {}", label("Runs"), merged.runs().len());
    println!("{}: {}", label("Data rows"), merged.data_row_count());
    println!(
        "{}: [{}-{}]",
        label("Spectral range"),
        merged.nu_min(),
        merged.nu_max()
    );
    println!("{}: {}", label("Conditions"), merged.condition_tokens().join("/"));
    println!();
    for run in merged.runs() {
        println!(
            "  {:<40} nu=[{}-{}] ({} rows)",
            run.entry,
            run.nu_min,
            run.nu_max,
            run.data_rows().len()
        );
    }
    println!();
    println!("{}", merged.file_name());

    Ok(())
}
