//! Integration tests for pts-export
//!
//! Tests the full pipeline: generate test point files -> run the binary -> verify output

mod generate_test_assets;

use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

use pointcloud_common::{PointCloud, decode_points};

/// Test .pts -> binary PLY conversion
#[test]
fn test_pts_to_ply() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pts_path = dir.path().join("cube.pts");
    let ply_path = dir.path().join("cube.ply");

    let points =
        generate_test_assets::generate_cube_corners(&pts_path).expect("Failed to generate cube");

    let out = pts_export(&["convert", path_str(&pts_path), "ply"]);
    assert!(out.status.success(), "convert failed: {}", stderr(&out));
    assert!(ply_path.exists(), "PLY file should exist at default path");

    let data = std::fs::read(&ply_path).expect("Failed to read PLY");
    let body = verify_ply_header(&data, "binary_little_endian", 8);
    let decoded = decode_points(body).expect("PLY body should be raw f32 triples");
    assert!(decoded.bit_eq(&PointCloud::from_points(points)));
}

/// Test the documented scenario: floats 1, 2, 3 -> one point
#[test]
fn test_single_point_to_obj() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pts_path = dir.path().join("foo.pts");
    let obj_path = dir.path().join("custom.obj");

    generate_test_assets::generate_single_point(&pts_path).expect("Failed to generate point");

    let out = pts_export(&[
        "convert",
        path_str(&pts_path),
        "obj",
        "-o",
        path_str(&obj_path),
    ]);
    assert!(out.status.success(), "convert failed: {}", stderr(&out));

    let text = std::fs::read_to_string(&obj_path).expect("Failed to read OBJ");
    assert_eq!(text, "# 1 vertices\no foo\nv 1 2 3\n");
}

/// Test .pts -> .pts re-encode to an explicit path
#[test]
fn test_pts_reencode() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("in.pts");
    let output = dir.path().join("out.pts");
    generate_test_assets::generate_cube_corners(&input).expect("Failed to generate cube");

    let out = pts_export(&["convert", path_str(&input), "pts", "-o", path_str(&output)]);
    assert!(out.status.success(), "convert failed: {}", stderr(&out));
    assert_eq!(
        std::fs::read(&input).unwrap(),
        std::fs::read(&output).unwrap()
    );
}

/// Converting .pts to pts without -o must not overwrite the input
#[test]
fn test_refuses_to_overwrite_input() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("in.pts");
    generate_test_assets::generate_single_point(&input).expect("Failed to generate point");
    let before = std::fs::read(&input).unwrap();

    let out = pts_export(&["convert", path_str(&input), "pts"]);
    assert!(!out.status.success());
    assert_eq!(std::fs::read(&input).unwrap(), before);
}

/// Nonexistent input -> non-zero exit, message, no output file
#[test]
fn test_missing_input() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("missing.pts");
    let output = dir.path().join("missing.xyz");

    let out = pts_export(&["convert", path_str(&input), "xyz"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("not found"), "stderr: {}", stderr(&out));
    assert!(!output.exists());
}

/// Length not a multiple of 12 -> non-zero exit, no output file
#[test]
fn test_malformed_input() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("bad.pts");
    let output = dir.path().join("bad.xyz");
    generate_test_assets::generate_truncated(&input).expect("Failed to generate file");

    let out = pts_export(&["convert", path_str(&input), "xyz"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("malformed"), "stderr: {}", stderr(&out));
    assert!(!output.exists());
}

/// Unknown format names are rejected by argument parsing
#[test]
fn test_unknown_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("foo.pts");
    generate_test_assets::generate_single_point(&input).expect("Failed to generate point");

    let out = pts_export(&["convert", path_str(&input), "stl"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unsupported export format"));
}

/// Test info on an empty file
#[test]
fn test_info_empty_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("empty.pts");
    std::fs::write(&input, []).unwrap();

    let out = pts_export(&["info", path_str(&input)]);
    assert!(out.status.success(), "info failed: {}", stderr(&out));
    assert!(stderr(&out).contains("0 points"));
}

/// Test manifest check + build
#[test]
fn test_manifest_build() {
    let dir = tempdir().expect("Failed to create temp dir");
    generate_test_assets::generate_cube_corners(&dir.path().join("cube.pts"))
        .expect("Failed to generate cube");
    generate_test_assets::generate_single_point(&dir.path().join("one.pts"))
        .expect("Failed to generate point");

    let manifest = dir.path().join("points.toml");
    std::fs::write(
        &manifest,
        r#"
[output]
dir = "out"
format = "ply-ascii"

[[clouds]]
id = "cube"
path = "cube.pts"

[[clouds]]
id = "one"
path = "one.pts"
format = "xyz"
"#,
    )
    .unwrap();

    let out = pts_export(&["check", path_str(&manifest)]);
    assert!(out.status.success(), "check failed: {}", stderr(&out));

    let out = pts_export(&["build", path_str(&manifest), "-v"]);
    assert!(out.status.success(), "build failed: {}", stderr(&out));

    let cube = std::fs::read(dir.path().join("out/cube.ply")).unwrap();
    let body = verify_ply_header(&cube, "ascii", 8);
    assert_eq!(std::str::from_utf8(body).unwrap().lines().count(), 8);

    let one = std::fs::read_to_string(dir.path().join("out/one.xyz")).unwrap();
    assert_eq!(one, "1 2 3\n");
}

// Helper to run the pts-export binary
fn pts_export(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pts-export"))
        .args(args)
        .output()
        .expect("Failed to run pts-export")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path should be UTF-8")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// Verify a vertex-only PLY header and return the body
fn verify_ply_header<'a>(data: &'a [u8], encoding: &str, vertex_count: usize) -> &'a [u8] {
    let marker = b"end_header";
    let at = data
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("PLY should have end_header");
    let end = at
        + data[at..]
            .iter()
            .position(|&b| b == b'\n')
            .expect("end_header should end its line")
        + 1;

    let header = std::str::from_utf8(&data[..end]).expect("PLY header should be ASCII");
    let lines: Vec<&str> = header.lines().collect();
    assert_eq!(lines[0], "ply");
    assert_eq!(lines[1], format!("format {} 1.0", encoding));
    assert!(lines.contains(&format!("element vertex {}", vertex_count).as_str()));
    for axis in ["x", "y", "z"] {
        assert!(lines.contains(&format!("property float {}", axis).as_str()));
    }

    &data[end..]
}
