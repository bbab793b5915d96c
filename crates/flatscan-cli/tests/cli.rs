// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end tests of the `flatscan` binary.

use std::path::Path;
use std::process::{Command, Output};

use image::{GrayImage, Luma};
use tempfile::TempDir;

fn flatscan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flatscan"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run flatscan")
}

fn write_gray_photo(dir: &Path) -> String {
    let path = dir.join("photo.png");
    GrayImage::from_pixel(200, 150, Luma([128]))
        .save(&path)
        .expect("write photo");
    path.to_string_lossy().into_owned()
}

#[test]
fn rectify_writes_an_a4_page() {
    let dir = TempDir::new().unwrap();
    let input = write_gray_photo(dir.path());
    let output = dir.path().join("page.png");

    let run = flatscan(&["rectify", &input, "-o", output.to_str().unwrap()]);
    assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

    let page = image::open(&output).unwrap();
    assert_eq!((page.width(), page.height()), (778, 1100));
}

#[test]
fn rectify_black_and_white_with_corners() {
    let dir = TempDir::new().unwrap();
    let input = write_gray_photo(dir.path());
    let output = dir.path().join("page.png");

    let run = flatscan(&[
        "rectify",
        &input,
        "-o",
        output.to_str().unwrap(),
        "--mode",
        "bw",
        "--corners",
        "[[190,140],[10,10],[190,10],[10,140]]",
    ]);
    assert!(run.status.success(), "stderr: {}", String::from_utf8_lossy(&run.stderr));

    let page = image::open(&output).unwrap().to_luma8();
    assert_eq!(page.dimensions(), (778, 1100));
    assert!(page.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

#[test]
fn detect_prints_fallback_corners_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write_gray_photo(dir.path());

    let run = flatscan(&["detect", &input]);
    assert!(run.status.success());

    let report: serde_json::Value = serde_json::from_slice(&run.stdout).unwrap();
    assert_eq!(report["fallback"], true);
    let corners = report["corners"].as_array().unwrap();
    assert_eq!(corners.len(), 4);
    assert_eq!(corners[2]["x"], 199.0);
    assert_eq!(corners[2]["y"], 149.0);
}

#[test]
fn collinear_corners_fail_with_a_readable_message() {
    let dir = TempDir::new().unwrap();
    let input = write_gray_photo(dir.path());
    let output = dir.path().join("page.png");

    let run = flatscan(&[
        "rectify",
        &input,
        "-o",
        output.to_str().unwrap(),
        "--corners",
        "[[0,0],[50,50],[100,100],[150,150]]",
    ]);
    assert!(!run.status.success());
    let stderr = String::from_utf8_lossy(&run.stderr);
    assert!(stderr.contains("don't outline a page"), "stderr: {stderr}");
    assert!(!output.exists());
}

#[test]
fn malformed_corners_are_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_gray_photo(dir.path());
    let output = dir.path().join("page.png");

    let run = flatscan(&[
        "rectify",
        &input,
        "-o",
        output.to_str().unwrap(),
        "--corners",
        "[[0,0],[10,0],[10,10]]",
    ]);
    assert!(!run.status.success());
    assert!(String::from_utf8_lossy(&run.stderr).contains("corners couldn't be read"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_gray_photo(dir.path());
    let config = dir.path().join("flatscan.json");
    std::fs::write(&config, r#"{ "binarizer": { "block_size": 4 } }"#).unwrap();

    let run = flatscan(&["detect", &input, "--config", config.to_str().unwrap()]);
    assert!(!run.status.success());
    assert!(String::from_utf8_lossy(&run.stderr).contains("settings are invalid"));
}
