// tests/config_load.rs

use std::fs;

use tempfile::tempdir;

use packdag::config::load_config;

const SAMPLE: &str = r#"
[app]
name = "Demo"
identifier = "com.example.demo"
binary = "demo"

[ui]
dir = "ui"
build = "yarn build"
exclude = ["node_modules/**"]

[build]
command = "cargo build --release"
artifact = "target/release/demo"

[tool]
name = "ffmpeg"
source = "https://example.com/ffmpeg-static.zip"
"#;

#[test]
fn loads_a_valid_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Packdag.toml");
    fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config(&path).unwrap();

    assert_eq!(cfg.app.name, "Demo");
    assert_eq!(cfg.ui.exclude, vec!["node_modules/**"]);
    assert!(cfg.embed.is_none());
    assert!(cfg.tool.as_ref().unwrap().is_url());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_config(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn empty_build_command_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Packdag.toml");
    fs::write(&path, SAMPLE.replace("cargo build --release", "  ")).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("[build].command"));
}

#[test]
fn png_icon_without_convert_command_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Packdag.toml");
    let with_icon = format!("{SAMPLE}\n[icon]\nsource = \"assets/icon.png\"\n");
    fs::write(&path, with_icon).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("convert"));
}

#[test]
fn icns_icon_needs_no_convert_command() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Packdag.toml");
    let with_icon = format!("{SAMPLE}\n[icon]\nsource = \"assets/icon.icns\"\n");
    fs::write(&path, with_icon).unwrap();

    let cfg = load_config(&path).unwrap();
    assert!(!cfg.icon.unwrap().is_png());
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Packdag.toml");
    fs::write(&path, format!("{SAMPLE}\n[surprise]\nkey = 1\n")).unwrap();

    assert!(load_config(&path).is_err());
}
