//! TOML configuration for a crawl.
//!
//! The configuration is loaded once and passed by reference to whatever needs
//! it; nothing here is global.
//!
//! ```toml
//! # spectracrawl.toml
//! [hitran]
//! gas_id = "CH4"
//! ppm = 1.0
//! temperature = 300.0
//! pressure = 1.0
//! path_length = 100.0
//! start_nu = 1000.0
//! end_nu = 3000.0
//!
//! [spectraplot]
//! max_range = 500.0
//! max_plots = 10
//!
//! [output]
//! dir = "auto"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::conditions::ConditionSet;
use crate::partition::{partition, Interval};

/// Highest wavenumber (cm⁻¹) the calculator covers
pub const MAX_WAVENUMBER: f64 = 47365.0;
/// Highest temperature (K) accepted
pub const MAX_TEMPERATURE: f64 = 4e12;
/// Finest wavenumber step (cm⁻¹) accepted
pub const MIN_NU_STEP: f64 = 0.01;
/// Archive name the calculator downloads
pub const DEFAULT_ARCHIVE_NAME: &str = "SpectraPlotSimulations.zip";

const DEFAULT_TIMEOUT_S: i64 = 99;
const DEFAULT_CALC_DELAY_S: i64 = 1;
const AUTO_OUTPUT_DIR: &str = "auto";

/// Errors raised while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading the config file
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Spectral domain outside the supported range
    #[error("Exceeded spectral range [0-47365]: got start={start}, end={end}")]
    SpectralRange {
        /// Requested start wavenumber
        start: f64,
        /// Requested end wavenumber
        end: f64,
    },

    /// A value is out of its allowed range
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Dotted config key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Output directory could not be created
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Root configuration structure for spectracrawl.toml files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulation conditions and spectral domain
    pub hitran: HitranConfig,
    /// Request chunking and calculator timing
    pub spectraplot: SpectraplotConfig,
    /// Where downloaded archives appear
    pub download: DownloadConfig,
    /// Where merged files go
    pub output: OutputConfig,
}

/// Simulation conditions and requested domain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HitranConfig {
    /// Gas identifier, e.g. "CH4"
    pub gas_id: String,
    /// Concentration in ppm
    pub ppm: f64,
    /// Temperature in K
    pub temperature: f64,
    /// Pressure in atm
    pub pressure: f64,
    /// Path length in cm
    pub path_length: f64,
    /// Start wavenumber in cm⁻¹
    pub start_nu: f64,
    /// End wavenumber in cm⁻¹
    pub end_nu: f64,
    /// Start wavelength in µm, used when no wavenumbers are given
    pub start_lambda: f64,
    /// End wavelength in µm, used when no wavenumbers are given
    pub end_lambda: f64,
    /// Wavenumber resolution in cm⁻¹
    pub step_nu: f64,
}

/// Request chunking and calculator timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpectraplotConfig {
    /// Widest wavenumber span per request
    pub max_range: f64,
    /// Requests accumulated before one archive is downloaded
    pub max_plots: usize,
    /// Seconds to wait for one calculation
    pub calc_timeout_s: i64,
    /// Seconds to pause between calculations
    pub calc_delay_s: i64,
}

impl Default for SpectraplotConfig {
    fn default() -> Self {
        Self {
            max_range: 500.0,
            max_plots: 10,
            calc_timeout_s: DEFAULT_TIMEOUT_S,
            calc_delay_s: DEFAULT_CALC_DELAY_S,
        }
    }
}

/// Download location of archives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory the driver downloads into
    pub dir: PathBuf,
    /// File name of the downloaded archive
    pub archive_name: String,
    /// Seconds to wait for a download to appear
    pub timeout_s: i64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            timeout_s: DEFAULT_TIMEOUT_S,
        }
    }
}

/// Output location of merged files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, or "auto" for `./output/<gas_id>`
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: AUTO_OUTPUT_DIR.to_string(),
        }
    }
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Gas identifier
    pub gas_id: Option<String>,
    /// Concentration in ppm
    pub ppm: Option<f64>,
    /// Start wavenumber in cm⁻¹
    pub start_nu: Option<f64>,
    /// End wavenumber in cm⁻¹
    pub end_nu: Option<f64>,
    /// Widest wavenumber span per request
    pub max_range: Option<f64>,
    /// Requests per downloaded archive
    pub max_plots: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Check every value and fill in derived defaults.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.spectraplot.calc_timeout_s <= 0 {
            info!("spectraplot.calc_timeout_s set to {} seconds", DEFAULT_TIMEOUT_S);
            self.spectraplot.calc_timeout_s = DEFAULT_TIMEOUT_S;
        }
        if self.spectraplot.calc_delay_s < 0 {
            info!("spectraplot.calc_delay_s set to {} second", DEFAULT_CALC_DELAY_S);
            self.spectraplot.calc_delay_s = DEFAULT_CALC_DELAY_S;
        }
        if self.download.timeout_s <= 0 {
            info!("download.timeout_s set to {} seconds", DEFAULT_TIMEOUT_S);
            self.download.timeout_s = DEFAULT_TIMEOUT_S;
        }

        let hitran = &mut self.hitran;
        if hitran.start_nu == 0.0 && hitran.end_nu == 0.0 {
            hitran.start_nu = wavelength_to_wavenumber(hitran.start_lambda);
            hitran.end_nu = wavelength_to_wavenumber(hitran.end_lambda);
        }
        let in_range = |nu: f64| (0.0..=MAX_WAVENUMBER).contains(&nu);
        if !in_range(hitran.start_nu) || !in_range(hitran.end_nu) {
            return Err(ConfigError::SpectralRange {
                start: hitran.start_nu,
                end: hitran.end_nu,
            });
        }
        if hitran.step_nu < MIN_NU_STEP {
            info!("hitran.step_nu too low or not present, using {:.2}", MIN_NU_STEP);
            hitran.step_nu = MIN_NU_STEP;
        }

        if hitran.gas_id.trim().is_empty() {
            return Err(invalid("hitran.gas_id", "must not be empty"));
        }
        if !(hitran.temperature > 0.0 && hitran.temperature <= MAX_TEMPERATURE) {
            return Err(invalid(
                "hitran.temperature",
                format!("must be in (0, {}], got {}", MAX_TEMPERATURE, hitran.temperature),
            ));
        }
        if !(hitran.pressure > 0.0) {
            return Err(invalid("hitran.pressure", "must be positive"));
        }
        if !(hitran.path_length > 0.0) {
            return Err(invalid("hitran.path_length", "must be positive"));
        }
        if !(hitran.ppm > 0.0 && hitran.ppm <= 1e6) {
            return Err(invalid(
                "hitran.ppm",
                format!("must be in (0, 1e6], got {}", hitran.ppm),
            ));
        }

        self.check_request_span()?;
        if self.spectraplot.max_plots == 0 {
            return Err(invalid("spectraplot.max_plots", "must be at least 1"));
        }

        Ok(self)
    }

    /// Check that `spectraplot.max_range` is finite and at least one
    /// resolution step wide (`hitran.step_nu`, never below [`MIN_NU_STEP`]).
    pub fn check_request_span(&self) -> Result<(), ConfigError> {
        let max_range = self.spectraplot.max_range;
        let step = self.step_nu();
        if !(max_range.is_finite() && max_range >= step) {
            return Err(invalid(
                "spectraplot.max_range",
                format!("must be finite and at least step_nu ({}), got {}", step, max_range),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(gas_id) = &overrides.gas_id {
            self.hitran.gas_id = gas_id.clone();
        }
        if let Some(ppm) = overrides.ppm {
            self.hitran.ppm = ppm;
        }
        if let Some(start_nu) = overrides.start_nu {
            self.hitran.start_nu = start_nu;
        }
        if let Some(end_nu) = overrides.end_nu {
            self.hitran.end_nu = end_nu;
        }
        if let Some(max_range) = overrides.max_range {
            self.spectraplot.max_range = max_range;
        }
        if let Some(max_plots) = overrides.max_plots {
            self.spectraplot.max_plots = max_plots;
        }
        self
    }

    /// Wavenumber resolution of every request, never below [`MIN_NU_STEP`]
    pub fn step_nu(&self) -> f64 {
        self.hitran.step_nu.max(MIN_NU_STEP)
    }

    /// How long the calculator may take for one interval
    pub fn calc_timeout(&self) -> Duration {
        Duration::from_secs(self.spectraplot.calc_timeout_s.max(0) as u64)
    }

    /// Pause between two calculations
    pub fn calc_delay(&self) -> Duration {
        Duration::from_secs(self.spectraplot.calc_delay_s.max(0) as u64)
    }

    /// Conditions every request of this crawl is simulated under
    pub fn conditions(&self) -> ConditionSet {
        ConditionSet {
            gas_id: self.hitran.gas_id.clone(),
            ppm: self.hitran.ppm,
            temperature: self.hitran.temperature,
            pressure: self.hitran.pressure,
            path_length: self.hitran.path_length,
        }
    }

    /// Requested `(start, end)` wavenumber domain
    pub fn spectral_domain(&self) -> (f64, f64) {
        (self.hitran.start_nu, self.hitran.end_nu)
    }

    /// The requested domain split into request-sized intervals
    pub fn intervals(&self) -> Vec<Interval> {
        let (start, end) = self.spectral_domain();
        partition(start, end, self.spectraplot.max_range)
    }

    /// Full path of the archive the driver downloads
    pub fn archive_path(&self) -> PathBuf {
        self.download.dir.join(&self.download.archive_name)
    }

    /// How long to wait for one archive to download
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout_s.max(0) as u64)
    }

    /// Output directory, with "auto" resolved to `./output/<gas_id>`
    pub fn output_dir(&self) -> PathBuf {
        if self.output.dir == AUTO_OUTPUT_DIR {
            Path::new(".").join("output").join(&self.hitran.gas_id)
        } else {
            PathBuf::from(&self.output.dir)
        }
    }

    /// Resolve the output directory and create it if missing.
    pub fn prepare_output_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = self.output_dir();
        if !dir.exists() {
            info!("Creating output directory {}", dir.display());
            std::fs::create_dir_all(&dir).map_err(|source| ConfigError::CreateOutputDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(dir)
    }
}

/// Convert a wavelength in µm to a wavenumber in cm⁻¹.
pub fn wavelength_to_wavenumber(lambda_um: f64) -> f64 {
    1e4 / lambda_um
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.into(),
    }
}
