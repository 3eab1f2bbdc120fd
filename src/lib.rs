// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod digest;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod task;

use std::path::PathBuf;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use engine::{RunReport, Runner};
pub use task::Task;

use crate::cli::CliArgs;
use crate::pipeline::Platform;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - pipeline task-set assembly for the target platform
/// - Ctrl-C handling (cooperative cancellation)
/// - the runner
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = config::load_config(&config_path)?;

    // --icon overrides the configured source but keeps any convert command.
    if let Some(icon) = args.icon {
        let convert = cfg.icon.as_ref().and_then(|icon| icon.convert.clone());
        cfg.icon = Some(config::IconSection {
            source: icon.into(),
            convert,
        });
        config::validate(&cfg)?;
    }

    let Some(platform) = args.platform.map(Platform::from).or_else(Platform::host) else {
        bail!("host platform is not a packaging target; pass --platform");
    };

    let dist = PathBuf::from(&args.dist);
    let tasks = pipeline::tasks_for(platform, &cfg, &dist)?;

    if args.dry_run {
        print!("{}", pipeline::render_plan(&tasks)?);
        return Ok(());
    }

    // Ctrl-C → stop starting tasks; in-flight ones finish.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {err}");
                return;
            }
            cancel.cancel();
        });
    }

    let runner = Runner::new(tasks)?.with_cancellation(cancel);
    let report = runner.run().await?;

    info!(
        succeeded = report.succeeded.len(),
        skipped = report.skipped.len(),
        cancelled = report.cancelled.len(),
        dist = %dist.display(),
        "packaging finished"
    );
    Ok(())
}
