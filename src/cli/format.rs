use anyhow::Result;

use spectracrawl::format::canonical;

/// Print one canonical rendering per line
pub fn run(values: &[f64]) -> Result<()> {
    for value in values {
        if !value.is_finite() {
            anyhow::bail!("Cannot render non-finite value {}", value);
        }
        println!("{}", canonical(*value));
    }
    Ok(())
}
