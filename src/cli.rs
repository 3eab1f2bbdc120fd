// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::pipeline::Platform;

/// Command-line arguments for `packdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "packdag",
    version,
    about = "Package the configured application for a target platform.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Packdag.toml")]
    pub config: String,

    /// Output directory for the packaged artifacts.
    #[arg(long, value_name = "DIR", default_value = "dist")]
    pub dist: String,

    /// Target platform. Defaults to the host platform.
    #[arg(long, value_enum, value_name = "PLATFORM")]
    pub platform: Option<PlatformArg>,

    /// Override the configured icon file (.png or .icns).
    #[arg(long, value_name = "PATH")]
    pub icon: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PACKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the execution plan without running any task.
    #[arg(long)]
    pub dry_run: bool,
}

/// Target platform as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum PlatformArg {
    Macos,
    Windows,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Macos => Platform::MacOs,
            PlatformArg::Windows => Platform::Windows,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
