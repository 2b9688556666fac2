use anyhow::{Context, Result};
use std::path::PathBuf;

use spectracrawl::config::{Config, Overrides};
use spectracrawl::pipeline::plan_batches;

use super::style::{heading, label};

/// Print the request and archive plan for a domain
pub fn run(config: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = match config {
        Some(path) => Config::from_file(&path)
            .map(|config| config.with_overrides(&overrides))
            .and_then(Config::validate)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?,
        None => Config::default().with_overrides(&overrides),
    };
    config
        .check_request_span()
        .context("Invalid --max-range")?;

    let (start, end) = config.spectral_domain();
    let intervals = config.intervals();
    let batches = plan_batches(&intervals, config.spectraplot.max_plots);

    println!("{}", heading("Request Plan"));
    println!("{}", heading("============"));
    if !config.hitran.gas_id.is_empty() {
        println!("{}: {}", label("Conditions"), config.conditions());
    }
    println!("{}: [{}-{}]", label("Domain"), start, end);
    println!("{}: {}", label("Step"), config.step_nu());
    println!("{}: {}", label("Max range"), config.spectraplot.max_range);
    println!("{}: {}", label("Requests"), intervals.len());
    println!("{}: {}", label("Archives"), batches.len());
    println!();

    for (index, batch) in batches.iter().enumerate() {
        println!("{} {}:", label("Archive"), index + 1);
        for interval in batch.iter() {
            println!("  {}", interval);
        }
    }

    Ok(())
}
