// src/pipeline/mod.rs

//! Packaging pipelines built on the orchestration core.
//!
//! Each platform module assembles a task set out of thin leaf actions
//! (shell commands, file copies, descriptor writes) and the core decides
//! ordering and parallelism. The tasks communicate only via completion or
//! failure; nothing flows between them except files on disk.

pub mod macos;
pub mod windows;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, ToolSection, UiSection};
use crate::dag::DependencyGraph;
use crate::digest::{DigestGate, FileDigestStore, TreeDigest};
use crate::errors::GraphError;
use crate::exec;
use crate::task::Task;

/// Packaging target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this build is running on, if it is a packaging target.
    pub fn host() -> Option<Platform> {
        if cfg!(target_os = "macos") {
            Some(Platform::MacOs)
        } else if cfg!(windows) {
            Some(Platform::Windows)
        } else {
            None
        }
    }
}

/// Assemble the task set for the given platform.
///
/// Prepares the dist layout up front (directory creation is not worth a
/// task) and returns the tasks ready for a [`crate::Runner`].
pub fn tasks_for(platform: Platform, cfg: &Config, dist: &Path) -> Result<Vec<Task>> {
    match platform {
        Platform::MacOs => macos::tasks(cfg, dist),
        Platform::Windows => windows::tasks(cfg, dist),
    }
}

/// Render the resolved execution plan for `--dry-run`.
pub fn render_plan(tasks: &[Task]) -> Result<String, GraphError> {
    let graph = DependencyGraph::from_tasks(tasks)?;
    let order = graph.resolve()?;

    let mut plan = String::new();
    for (ii, name) in order.iter().enumerate() {
        let deps = graph.dependencies_of(name);
        if deps.is_empty() {
            plan.push_str(&format!("{}. {}\n", ii + 1, name));
        } else {
            plan.push_str(&format!("{}. {} (after: {})\n", ii + 1, name, deps.join(", ")));
        }
    }
    Ok(plan)
}

/// UI compilation task shared by every platform: run the configured build
/// command inside the UI directory, gated on the digest of its sources so an
/// unchanged UI skips the (slow) asset build entirely.
pub(crate) fn compile_ui_task(ui: &UiSection) -> Task {
    let dir = ui.dir.clone();
    let build = ui.build.clone();
    let exclude = ui.exclude.clone();

    Task::new("compile ui", move || async move {
        let tree = TreeDigest::new(&dir).exclude(&exclude)?;
        let store = FileDigestStore::new(&dir);
        let mut gate = DigestGate::new("compile ui", tree, store);

        let build_dir = dir.clone();
        gate.refresh_with(move || exec::run(build, Some(build_dir))).await
    })
}

/// Bundled-tool task shared by every platform: copy a local static build or
/// fetch one from a URL, then mark it executable.
pub(crate) fn bundle_tool_task(tool: &ToolSection, dest: PathBuf) -> Task {
    let source = tool.source.clone();
    let is_url = tool.is_url();

    Task::new("bundle tool", move || async move {
        if is_url {
            info!(url = %source, dest = %dest.display(), "fetching tool");
            exec::run(
                format!("curl -fsSL -o '{}' '{}'", dest.display(), source),
                None,
            )
            .await?;
        } else {
            copy_file(PathBuf::from(&source), dest.clone()).await?;
        }
        make_executable(&dest)
    })
}

pub(crate) async fn copy_file(src: PathBuf, dest: PathBuf) -> Result<()> {
    tokio::fs::copy(&src, &dest)
        .await
        .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;
    Ok(())
}

pub(crate) fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("marking {} executable", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
