use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn writes_a_png_of_the_requested_size() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mandel.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "32x24", "-i", "60", "--seed", "3"])
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (32, 24));
}

#[test]
fn equalized_smooth_render_with_negative_center() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("zoomed.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "20x20",
            "-c",
            "-0.75,0.1",
            "-z",
            "8",
            "-t",
            "2",
            "--coloring",
            "equalized",
            "--invert",
            "--smooth",
        ])
        .assert()
        .success();
    assert_eq!(image::open(&out).unwrap().dimensions(), (20, 20));
}

#[test]
fn same_seed_writes_the_same_image() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a.png");
    let second = dir.path().join("b.png");
    for out in &[&first, &second] {
        Command::cargo_bin("mandel")
            .unwrap()
            .args(&["-o", out.to_str().unwrap(), "-s", "16x16", "-i", "80", "--seed", "11"])
            .assert()
            .success();
    }
    let a = image::open(&first).unwrap().to_rgba();
    let b = image::open(&second).unwrap().to_rgba();
    assert_eq!(a.into_raw(), b.into_raw());
}

#[test]
fn refuses_an_empty_image() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Image dimensions must be positive"));
    assert!(!out.exists());
}

#[test]
fn refuses_a_bad_zoom() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "never.png", "-z", "-3"])
        .assert()
        .failure();
}

#[test]
fn requires_an_output_file() {
    Command::cargo_bin("mandel")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn reports_an_unwritable_output() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("missing").join("mandel.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "-i", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}
