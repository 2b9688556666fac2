use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use spectracrawl::merge::merge_archive;

/// Merge one archive into `output`
pub fn run(archive: PathBuf, output: PathBuf) -> Result<()> {
    if !archive.exists() {
        anyhow::bail!("Archive does not exist: {}", archive.display());
    }

    info!("Archive: {}", archive.display());
    info!("Output:  {}", output.display());

    let written = merge_archive(&archive, &output)
        .with_context(|| format!("Failed to merge {}", archive.display()))?;

    println!("{}", written.display());
    Ok(())
}
