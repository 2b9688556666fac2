//! Integration tests for driving a crawl through a fake acquisition driver

use spectracrawl::config::Config;
use spectracrawl::partition::Interval;
use spectracrawl::pipeline::{BatchRequest, Pipeline, PipelineError, SpectraSource};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Writes one archive per batch straight into the download directory
struct FakeCalculator {
    archive: PathBuf,
    requests: Vec<Vec<Interval>>,
    steps: Vec<f64>,
    timings: Vec<(Duration, Duration)>,
    fail_on_batch: Option<usize>,
}

impl FakeCalculator {
    fn new(archive: PathBuf) -> Self {
        Self {
            archive,
            requests: Vec::new(),
            steps: Vec::new(),
            timings: Vec::new(),
            fail_on_batch: None,
        }
    }
}

impl SpectraSource for FakeCalculator {
    fn request_batch(&mut self, request: &BatchRequest<'_>) -> Result<PathBuf, PipelineError> {
        if self.fail_on_batch == Some(self.requests.len()) {
            return Err(PipelineError::Source {
                start: request.start(),
                end: request.end(),
                message: "calculation timed out".to_string(),
            });
        }
        self.requests.push(request.intervals.to_vec());
        self.steps.push(request.step_nu);
        self.timings.push((request.calc_timeout, request.calc_delay));

        let intervals = request.intervals;
        let header = request.conditions.to_tokens().join("/");
        let file = File::create(&self.archive).unwrap();
        let mut zip = ZipWriter::new(file);
        for (i, interval) in intervals.iter().enumerate() {
            zip.start_file(format!("sim{}.csv", i), SimpleFileOptions::default())
                .unwrap();
            writeln!(zip, "sim{},{}", i, header).unwrap();
            writeln!(zip, "{},0.1", interval.start).unwrap();
            writeln!(zip, "{},0.2", interval.end).unwrap();
        }
        zip.finish().unwrap();
        Ok(self.archive.clone())
    }
}

/// Source that never produces its archive
struct SilentCalculator(PathBuf);

impl SpectraSource for SilentCalculator {
    fn request_batch(&mut self, _request: &BatchRequest<'_>) -> Result<PathBuf, PipelineError> {
        Ok(self.0.clone())
    }
}

fn crawl_config(dir: &TempDir, timeout_s: i64) -> Config {
    let toml = format!(
        r#"
        [hitran]
        gas_id = "CO2"
        ppm = 400.0
        temperature = 296.0
        pressure = 1.0
        path_length = 10.0
        start_nu = 2000.0
        end_nu = 2500.0
        step_nu = 0.05

        [spectraplot]
        max_range = 100.0
        max_plots = 2
        calc_timeout_s = 30
        calc_delay_s = 0

        [download]
        dir = {download:?}
        timeout_s = {timeout_s}

        [output]
        dir = {output:?}
        "#,
        download = dir.path().join("downloads").display().to_string(),
        output = dir.path().join("merged").display().to_string(),
        timeout_s = timeout_s,
    );
    std::fs::create_dir_all(dir.path().join("downloads")).unwrap();
    Config::from_str(&toml).unwrap().validate().unwrap()
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_pipeline_merges_every_batch() {
    let dir = tempdir().unwrap();
    let config = crawl_config(&dir, 5);
    let mut source = FakeCalculator::new(config.archive_path());

    let written = Pipeline::new(&config)
        .with_poll_interval(Duration::from_millis(1))
        .run(&mut source)
        .unwrap();

    assert_eq!(source.requests.len(), 3);
    assert_eq!(source.requests[0].len(), 2);
    assert_eq!(source.requests[2], vec![Interval::new(2400.0, 2500.0)]);
    assert_eq!(
        file_names(&written),
        vec![
            "nu=2000-2200,CO2,x=4e-04,T=296K,P=1atm,L=10cm.csv",
            "nu=2200-2400,CO2,x=4e-04,T=296K,P=1atm,L=10cm.csv",
            "nu=2400-2500,CO2,x=4e-04,T=296K,P=1atm,L=10cm.csv",
        ]
    );
    assert!(written.iter().all(|p| p.starts_with(dir.path().join("merged"))));
    assert!(!config.archive_path().exists());
}

#[test]
fn test_pipeline_hands_request_settings_to_source() {
    let dir = tempdir().unwrap();
    let config = crawl_config(&dir, 5);
    let mut source = FakeCalculator::new(config.archive_path());

    Pipeline::new(&config)
        .with_poll_interval(Duration::from_millis(1))
        .run(&mut source)
        .unwrap();

    assert_eq!(source.steps, vec![0.05; 3]);
    assert!(source
        .timings
        .iter()
        .all(|timing| *timing == (Duration::from_secs(30), Duration::ZERO)));
}

/// Driver that is unreachable
struct UnavailableDriver;

impl SpectraSource for UnavailableDriver {
    fn request_batch(&mut self, request: &BatchRequest<'_>) -> Result<PathBuf, PipelineError> {
        Err(PipelineError::Source {
            start: request.start(),
            end: request.end(),
            message: "driver unavailable".to_string(),
        })
    }
}

#[test]
fn test_pipeline_removes_stale_archive() {
    let dir = tempdir().unwrap();
    let config = crawl_config(&dir, 5);
    std::fs::write(config.archive_path(), b"left over from a crashed run").unwrap();

    let err = Pipeline::new(&config)
        .with_poll_interval(Duration::from_millis(1))
        .run(&mut UnavailableDriver)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Source { .. }));
    assert!(!config.archive_path().exists());
    assert!(dir.path().join("merged").is_dir());
}

#[test]
fn test_pipeline_download_timeout() {
    let dir = tempdir().unwrap();
    let mut config = crawl_config(&dir, 1);
    config.download.timeout_s = 0;

    let mut source = SilentCalculator(dir.path().join("downloads").join("never.zip"));
    let err = Pipeline::new(&config)
        .with_poll_interval(Duration::from_millis(1))
        .run(&mut source)
        .unwrap_err();
    match err {
        PipelineError::TimedOut { path, .. } => assert!(path.ends_with("never.zip")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_pipeline_stops_at_failing_batch() {
    let dir = tempdir().unwrap();
    let config = crawl_config(&dir, 5);
    let mut source = FakeCalculator::new(config.archive_path());
    source.fail_on_batch = Some(1);

    let err = Pipeline::new(&config)
        .with_poll_interval(Duration::from_millis(1))
        .run(&mut source)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Source { .. }));

    let merged_dir: &Path = &dir.path().join("merged");
    assert_eq!(std::fs::read_dir(merged_dir).unwrap().count(), 1);
}
