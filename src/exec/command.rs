// src/exec/command.rs

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

/// Run a command line under the platform shell, capturing output.
///
/// On a non-zero exit the captured output is folded into the error, so the
/// aggregated run error carries the compiler/tool diagnostics instead of a
/// bare exit code.
pub async fn run(line: String, dir: Option<PathBuf>) -> Result<()> {
    info!(cmd = %line, dir = ?dir, "running command");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&line);
        c
    };

    if let Some(dir) = &dir {
        cmd.current_dir(dir);
    }

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .with_context(|| format!("spawning '{line}'"))?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        bail!("'{line}' exited with code {code}: {}", captured.trim());
    }

    debug!(cmd = %line, "command succeeded");
    Ok(())
}
