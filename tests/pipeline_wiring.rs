// tests/pipeline_wiring.rs

use std::path::Path;

use tempfile::tempdir;

use packdag::config::{
    AppSection, BuildSection, Config, EmbedSection, IconSection, ToolSection, UiSection,
};
use packdag::dag::DependencyGraph;
use packdag::pipeline::{Platform, render_plan, tasks_for};

fn sample_config(root: &Path) -> Config {
    Config {
        app: AppSection {
            name: "Demo".to_string(),
            identifier: "com.example.demo".to_string(),
            binary: "demo".to_string(),
        },
        ui: UiSection {
            dir: root.join("ui"),
            build: "yarn build".to_string(),
            exclude: vec!["node_modules/**".to_string(), "dist/**".to_string()],
        },
        build: BuildSection {
            command: "cargo build --release".to_string(),
            artifact: root.join("target/release/demo"),
        },
        embed: Some(EmbedSection {
            command: "embed-assets".to_string(),
        }),
        icon: Some(IconSection {
            source: root.join("assets/icon.icns"),
            convert: None,
        }),
        tool: Some(ToolSection {
            name: "ffmpeg".to_string(),
            source: root.join("vendor/ffmpeg").display().to_string(),
        }),
    }
}

fn index_of(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|entry| entry == name)
        .unwrap_or_else(|| panic!("'{name}' missing from {order:?}"))
}

#[test]
fn macos_task_set_wires_dependencies() {
    let dir = tempdir().unwrap();
    let cfg = sample_config(dir.path());

    let tasks = tasks_for(Platform::MacOs, &cfg, &dir.path().join("dist")).unwrap();
    let names: Vec<&str> = tasks.iter().map(|task| task.name()).collect();

    for expected in [
        "compile ui",
        "write launcher script",
        "compile binary",
        "embed resources",
        "render icon",
        "write Info.plist",
        "bundle tool",
    ] {
        assert!(names.contains(&expected), "missing task '{expected}'");
    }

    let graph = DependencyGraph::from_tasks(&tasks).unwrap();
    let order = graph.resolve().unwrap();
    assert!(index_of(&order, "compile ui") < index_of(&order, "compile binary"));
    assert!(index_of(&order, "compile binary") < index_of(&order, "embed resources"));
}

#[test]
fn macos_bundle_layout_is_prepared() {
    let dir = tempdir().unwrap();
    let cfg = sample_config(dir.path());
    let dist = dir.path().join("dist");

    tasks_for(Platform::MacOs, &cfg, &dist).unwrap();

    assert!(dist.join("Demo.app/Contents/MacOS").is_dir());
    assert!(dist.join("Demo.app/Contents/Resources").is_dir());
}

#[test]
fn windows_embed_waits_for_binary_and_ui() {
    let dir = tempdir().unwrap();
    let cfg = sample_config(dir.path());

    let tasks = tasks_for(Platform::Windows, &cfg, &dir.path().join("dist")).unwrap();
    let graph = DependencyGraph::from_tasks(&tasks).unwrap();

    let deps = graph.dependencies_of("embed resources");
    assert!(deps.contains(&"compile binary".to_string()));
    assert!(deps.contains(&"compile ui".to_string()));
}

#[test]
fn optional_sections_drop_their_tasks() {
    let dir = tempdir().unwrap();
    let mut cfg = sample_config(dir.path());
    cfg.embed = None;
    cfg.icon = None;
    cfg.tool = None;

    let tasks = tasks_for(Platform::MacOs, &cfg, &dir.path().join("dist")).unwrap();
    let names: Vec<&str> = tasks.iter().map(|task| task.name()).collect();

    assert!(!names.contains(&"embed resources"));
    assert!(!names.contains(&"render icon"));
    assert!(!names.contains(&"bundle tool"));
    assert!(names.contains(&"compile ui"));
    assert!(names.contains(&"compile binary"));
}

#[test]
fn render_plan_lists_every_task_with_its_dependencies() {
    let dir = tempdir().unwrap();
    let cfg = sample_config(dir.path());

    let tasks = tasks_for(Platform::MacOs, &cfg, &dir.path().join("dist")).unwrap();
    let plan = render_plan(&tasks).unwrap();

    for task in &tasks {
        assert!(plan.contains(task.name()), "plan missing '{}'", task.name());
    }
    assert!(plan.contains("compile binary (after: compile ui)"));
}
