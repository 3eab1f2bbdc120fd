// src/pipeline/windows.rs

//! Windows packaging: lays the application out as a flat dist folder with
//! the executable and the bundled tool side by side.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::exec;
use crate::task::Task;

use super::{bundle_tool_task, compile_ui_task, copy_file};

/// Assemble the Windows task set.
///
/// Unlike the macOS bundle there is no launcher or descriptor; resource
/// embedding (when configured) patches the built executable and therefore
/// waits for both the binary and the compiled UI assets.
pub fn tasks(cfg: &Config, dist: &Path) -> Result<Vec<Task>> {
    fs::create_dir_all(dist)
        .with_context(|| format!("preparing dist directory {}", dist.display()))?;

    let mut tasks = Vec::new();

    tasks.push(compile_ui_task(&cfg.ui));

    {
        let command = cfg.build.command.clone();
        let artifact = cfg.build.artifact.clone();
        let dest = dist.join(exe_name(&cfg.app.binary));

        tasks.push(Task::new("compile binary", move || async move {
            exec::run(command, None).await?;
            copy_file(artifact, dest).await
        }));
    }

    if let Some(embed) = &cfg.embed {
        let command = embed.command.clone();
        tasks.push(
            Task::new("embed resources", move || async move {
                exec::run(command, None).await
            })
            .after("compile binary")
            .after("compile ui"),
        );
    }

    if let Some(tool) = &cfg.tool {
        tasks.push(bundle_tool_task(tool, dist.join(exe_name(&tool.name))));
    }

    Ok(tasks)
}

fn exe_name(name: &str) -> String {
    if name.ends_with(".exe") {
        name.to_string()
    } else {
        format!("{name}.exe")
    }
}
