// src/pipeline/macos.rs

//! macOS packaging: lays the application out as a `.app` bundle.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{AppSection, Config};
use crate::exec;
use crate::task::Task;

use super::{bundle_tool_task, compile_ui_task, copy_file, make_executable};

/// Assemble the `.app` bundle task set.
///
/// Layout: `<dist>/<Name>.app/Contents/{MacOS,Resources}` plus
/// `Contents/Info.plist`. The binary is wrapped in a launcher script so it
/// can locate the bundled tool relative to the bundle.
pub fn tasks(cfg: &Config, dist: &Path) -> Result<Vec<Task>> {
    let contents = dist.join(format!("{}.app", cfg.app.name)).join("Contents");
    let macos_dir = contents.join("MacOS");
    let resources = contents.join("Resources");

    for dir in [&macos_dir, &resources] {
        fs::create_dir_all(dir)
            .with_context(|| format!("preparing bundle directory {}", dir.display()))?;
    }

    let mut tasks = Vec::new();

    tasks.push(compile_ui_task(&cfg.ui));

    // Launcher script, so the binary runs with bundle-relative paths.
    {
        let binary = cfg.app.binary.clone();
        let tool = cfg.tool.as_ref().map(|tool| tool.name.clone());
        let script_path = macos_dir.join(format!("{binary}.sh"));

        tasks.push(Task::new("write launcher script", move || async move {
            let invocation = match tool {
                Some(tool) => {
                    format!("exec \"$DIR/{binary}\" --tool \"$DIR/../Resources/{tool}\"")
                }
                None => format!("exec \"$DIR/{binary}\""),
            };
            let script = format!(
                "#!/usr/bin/env bash\nDIR=$(cd \"$(dirname \"$0\")\"; pwd)\n{invocation}\n"
            );
            tokio::fs::write(&script_path, script)
                .await
                .with_context(|| format!("writing launcher at {}", script_path.display()))?;
            make_executable(&script_path)
        }));
    }

    // Binary compilation waits for the UI so compiled assets can be picked
    // up (embedded or copied) by the build command.
    {
        let command = cfg.build.command.clone();
        let artifact = cfg.build.artifact.clone();
        let dest = macos_dir.join(&cfg.app.binary);

        tasks.push(
            Task::new("compile binary", move || async move {
                exec::run(command, None).await?;
                copy_file(artifact, dest.clone()).await?;
                make_executable(&dest)
            })
            .after("compile ui"),
        );
    }

    if let Some(embed) = &cfg.embed {
        let command = embed.command.clone();
        tasks.push(
            Task::new("embed resources", move || async move {
                exec::run(command, None).await
            })
            .after("compile binary"),
        );
    }

    if let Some(icon) = &cfg.icon {
        let source = icon.source.clone();
        let convert = icon.convert.clone();
        let is_png = icon.is_png();
        let dest = resources.join("icon.icns");

        tasks.push(Task::new("render icon", move || async move {
            if is_png {
                // Config validation guarantees a convert command for .png.
                let command = convert
                    .unwrap_or_default()
                    .replace("{src}", &source.display().to_string())
                    .replace("{dest}", &dest.display().to_string());
                exec::run(command, None).await
            } else {
                debug!(src = %source.display(), "icon already in bundle format; copying");
                copy_file(source, dest).await
            }
        }));
    }

    {
        let plist = info_plist(&cfg.app);
        let path = contents.join("Info.plist");
        tasks.push(Task::new("write Info.plist", move || async move {
            tokio::fs::write(&path, plist)
                .await
                .with_context(|| format!("writing plist at {}", path.display()))?;
            Ok(())
        }));
    }

    if let Some(tool) = &cfg.tool {
        tasks.push(bundle_tool_task(tool, resources.join(&tool.name)));
    }

    Ok(tasks)
}

fn info_plist(app: &AppSection) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleExecutable</key>
	<string>{binary}.sh</string>
	<key>CFBundleIconFile</key>
	<string>icon.icns</string>
	<key>CFBundleIdentifier</key>
	<string>{identifier}</string>
	<key>NSHighResolutionCapable</key>
	<true/>
	<key>NSSupportsAutomaticGraphicsSwitching</key>
	<true/>
</dict>
</plist>
"#,
        binary = app.binary,
        identifier = app.identifier,
    )
}
