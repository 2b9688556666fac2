//! End-to-end tests for merging downloaded simulation archives
//!
//! These tests verify:
//! 1. A three-table batch merges into one canonically named file
//! 2. Rows come out ordered by each table's lowest wavenumber
//! 3. Rejected batches leave the output directory untouched
//! 4. The source archive is never modified

use spectracrawl::conditions::ConditionSet;
use spectracrawl::merge::{merge_archive, MergeError, MergedSpectrum};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONDITIONS: &str = "CH4/x=1e-06/T=300K/P=1atm/L=100cm";

/// Table with `points` evenly spaced rows covering `[start, end]`
fn simulation_table(name: &str, conditions: &str, start: f64, end: f64, points: usize) -> String {
    let mut table = format!("{},{}\n", name, conditions);
    let step = (end - start) / (points - 1) as f64;
    for i in 0..points {
        let nu = start + step * i as f64;
        table.push_str(&format!("{},{:e}\n", nu, 1e-5 * (1.0 + nu)));
    }
    table
}

fn create_archive(path: &Path, entries: &[(String, String)]) {
    let file = File::create(path).expect("Failed to create archive");
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, contents) in entries {
        zip.start_file(name.as_str(), options)
            .expect("Failed to start file");
        zip.write_all(contents.as_bytes()).expect("Failed to write");
    }
    zip.finish().expect("Failed to finish");
}

fn three_chunk_batch() -> Vec<(String, String)> {
    [(0.0, 10.0), (10.0, 20.0), (20.0, 30.0)]
        .iter()
        .enumerate()
        .map(|(i, (start, end))| {
            let name = format!("CH4,x=1e-6,T=300K,P=1atm,L=100cm,simNum{}.csv", i);
            let table = simulation_table(&format!("simNum{}", i), CONDITIONS, *start, *end, 6);
            (name, table)
        })
        .collect()
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_end_to_end_three_chunks() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("SpectraPlotSimulations.zip");
    let out = dir.path().join("output");
    std::fs::create_dir(&out).unwrap();

    let entries = three_chunk_batch();
    create_archive(&archive, &entries);

    let written = merge_archive(&archive, &out).unwrap();
    assert_eq!(
        written.file_name().unwrap().to_string_lossy(),
        "nu=0-30,CH4,x=1e-06,T=300K,P=1atm,L=100cm.csv"
    );
    assert_eq!(written.parent().unwrap(), out.as_path());

    let rows = read_rows(&written);
    assert_eq!(rows[0], vec!["nu".to_string(), CONDITIONS.to_string()]);
    assert_eq!(rows.len(), 1 + 3 * 6);

    let expected: Vec<Vec<String>> = entries
        .iter()
        .flat_map(|(_, table)| {
            table
                .lines()
                .skip(1)
                .map(|line| line.split(',').map(str::to_string).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(&rows[1..], expected.as_slice());

    // Only the merged file was created
    let created: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(created.len(), 1);
}

#[test]
fn test_unordered_archive_is_sorted() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("batch.zip");

    let entries: Vec<(String, String)> = [50.0, 10.0, 30.0]
        .iter()
        .map(|start| {
            (
                format!("run_{}.csv", start),
                simulation_table("sim", CONDITIONS, *start, start + 5.0, 3),
            )
        })
        .collect();
    create_archive(&archive, &entries);

    let written = merge_archive(&archive, dir.path()).unwrap();
    let positions: Vec<f64> = read_rows(&written)[1..]
        .iter()
        .map(|row| row[0].parse().unwrap())
        .collect();
    assert_eq!(
        positions,
        vec![10.0, 12.5, 15.0, 30.0, 32.5, 35.0, 50.0, 52.5, 55.0]
    );
    assert!(written
        .to_string_lossy()
        .ends_with("nu=10-55,CH4,x=1e-06,T=300K,P=1atm,L=100cm.csv"));
}

#[test]
fn test_rejected_batch_writes_nothing() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("batch.zip");
    let out = dir.path().join("output");
    std::fs::create_dir(&out).unwrap();

    let mut entries = three_chunk_batch();
    entries[2].1 = simulation_table("simNum2", "CH4/x=2e-06/T=300K/P=1atm/L=100cm", 20.0, 30.0, 6);
    create_archive(&archive, &entries);

    let err = merge_archive(&archive, &out).unwrap_err();
    assert!(matches!(err, MergeError::InconsistentRunConditions { .. }));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_archive_is_left_untouched() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("batch.zip");
    create_archive(&archive, &three_chunk_batch());
    let before = std::fs::read(&archive).unwrap();

    merge_archive(&archive, dir.path()).unwrap();

    assert_eq!(std::fs::read(&archive).unwrap(), before);
}

#[test]
fn test_remerge_replaces_output() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("batch.zip");
    let out = dir.path().join("output");
    std::fs::create_dir(&out).unwrap();
    create_archive(&archive, &three_chunk_batch());

    let first = merge_archive(&archive, &out).unwrap();
    let second = merge_archive(&archive, &out).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
}

#[test]
fn test_header_conditions_decode() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("batch.zip");
    create_archive(&archive, &three_chunk_batch());

    let merged = MergedSpectrum::from_archive(&archive).unwrap();
    let header = merged.header();
    let decoded: ConditionSet = header.get(1).unwrap().parse().unwrap();
    assert_eq!(&decoded, merged.conditions());
    assert_eq!(decoded.gas_id, "CH4");
    assert_eq!(decoded.temperature, 300.0);
}
