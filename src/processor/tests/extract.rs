//! Derived-parameter extraction tests

use super::fixtures::*;
use crate::models::StationRequest;
use crate::processor::StationExtractor;
use std::fs;
use tempfile::TempDir;

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_save_derived_splits_by_hour() {
    let temp_dir = TempDir::new().unwrap();
    let derived_dir = temp_dir.path().join("derived");
    let output_dir = temp_dir.path().join("output");
    write_zip_archive(&derived_dir, STATION_ID, SOUNDINGS);

    let extractor = StationExtractor::new(derived_dir, output_dir.clone())
        .with_config(offline_config());
    let stats = extractor
        .save_derived(&[StationRequest::new("KeyWest", STATION_ID)], january_window())
        .await
        .unwrap();

    assert_eq!(stats.stations_processed, 1);
    assert_eq!(stats.stations_failed, 0);
    assert_eq!(stats.files_written, 2);
    assert_eq!(stats.soundings_written, 3);
    assert_eq!(stats.output_path, output_dir);

    let station_dir = output_dir.join("KeyWest");
    let midnight = read_lines(&station_dir.join("Derived_USM00072201_20200101to20200102_00Z.csv"));
    assert_eq!(midnight.len(), 3);
    assert!(midnight[0].starts_with("date,hour,reltime,numlev,pw_mm,invpress"));
    assert!(midnight[1].starts_with("2020-01-01,0,2302.0,2.0,20.16,NaN"));
    assert!(midnight[2].starts_with("2020-01-02,0,2305.0,1.0,20.16,NaN"));

    let noon = read_lines(&station_dir.join("Derived_USM00072201_20200101to20200102_12Z.csv"));
    assert_eq!(noon.len(), 2);
    assert!(noon[1].starts_with("2020-01-01,12,1102.0,"));
}

#[tokio::test]
async fn test_save_derived_custom_hours() {
    let temp_dir = TempDir::new().unwrap();
    let derived_dir = temp_dir.path().join("derived");
    let output_dir = temp_dir.path().join("output");
    write_zip_archive(&derived_dir, STATION_ID, SOUNDINGS);

    let config = offline_config().with_synoptic_hours(vec![6]);
    let stats = StationExtractor::new(derived_dir, output_dir.clone())
        .with_config(config)
        .save_derived(&[StationRequest::new("KeyWest", STATION_ID)], january_window())
        .await
        .unwrap();

    // No 06Z soundings, but the file is still written with its header
    assert_eq!(stats.files_written, 1);
    assert_eq!(stats.soundings_written, 0);
    let lines = read_lines(
        &output_dir
            .join("KeyWest")
            .join("Derived_USM00072201_20200101to20200102_06Z.csv"),
    );
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_failing_station_does_not_stop_others() {
    let temp_dir = TempDir::new().unwrap();
    let derived_dir = temp_dir.path().join("derived");
    let output_dir = temp_dir.path().join("output");
    write_zip_archive(&derived_dir, STATION_ID, SOUNDINGS);

    // Present locally, but not a zip archive
    fs::write(derived_dir.join("GMM00010393-drvd.txt.zip"), "not a zip").unwrap();

    let stations = [
        StationRequest::new("Lindenberg", "GMM00010393"),
        StationRequest::new("KeyWest", STATION_ID),
    ];
    let stats = StationExtractor::new(derived_dir, output_dir.clone())
        .with_config(offline_config())
        .save_derived(&stations, january_window())
        .await
        .unwrap();

    assert_eq!(stats.stations_processed, 1);
    assert_eq!(stats.stations_failed, 1);
    assert!(output_dir.join("KeyWest").exists());
}

#[tokio::test]
async fn test_missing_archive_falls_back_to_download() {
    let temp_dir = TempDir::new().unwrap();
    let derived_dir = temp_dir.path().join("derived");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&derived_dir).unwrap();

    let stats = StationExtractor::new(derived_dir.clone(), output_dir)
        .with_config(offline_config())
        .save_derived(&[StationRequest::new("KeyWest", STATION_ID)], january_window())
        .await
        .unwrap();

    // The offline server refuses the download
    assert_eq!(stats.stations_failed, 1);
    assert!(fs::read_dir(&derived_dir).unwrap().next().is_none());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = offline_config().with_max_concurrent_stations(0);

    let result = StationExtractor::new(temp_dir.path().to_path_buf(), temp_dir.path().join("out"))
        .with_config(config)
        .save_derived(&[StationRequest::new("KeyWest", STATION_ID)], january_window())
        .await;

    assert!(result.is_err());
}
