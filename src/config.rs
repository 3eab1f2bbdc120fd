// src/config.rs

//! Pipeline configuration loaded from `Packdag.toml`.
//!
//! Describes the application being packaged, not the orchestration core:
//! which commands build the UI and the binary, where artifacts land, and
//! which optional extras (resource embedding, icon, bundled external tool)
//! the pipeline should include.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub app: AppSection,
    pub ui: UiSection,
    pub build: BuildSection,
    #[serde(default)]
    pub embed: Option<EmbedSection>,
    #[serde(default)]
    pub icon: Option<IconSection>,
    #[serde(default)]
    pub tool: Option<ToolSection>,
}

/// Identity of the packaged application.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Display name; also names the macOS bundle (`<name>.app`).
    pub name: String,
    /// Reverse-DNS bundle identifier.
    pub identifier: String,
    /// Name of the executable inside the bundle / dist folder.
    pub binary: String,
}

/// UI asset compilation, gated on the digest of its sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiSection {
    /// Root of the UI sources.
    pub dir: PathBuf,
    /// Build command, run inside `dir` (e.g. "yarn build").
    pub build: String,
    /// Glob patterns excluded from the change digest (build outputs,
    /// dependency folders).
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Binary compilation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Compile command, run from the project root.
    pub command: String,
    /// Path of the produced executable, copied into the bundle.
    pub artifact: PathBuf,
}

/// Optional post-compile resource embedding step.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedSection {
    pub command: String,
}

/// Optional application icon.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IconSection {
    /// Path to a `.png` or `.icns` file.
    pub source: PathBuf,
    /// Conversion command for `.png` sources; `{src}` and `{dest}` are
    /// replaced with the source and destination paths.
    #[serde(default)]
    pub convert: Option<String>,
}

/// Optional external tool bundled next to the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSection {
    /// Name of the bundled executable (e.g. "ffmpeg").
    pub name: String,
    /// Local path or `http(s)://` URL of a static build.
    pub source: String,
}

impl IconSection {
    pub fn is_png(&self) -> bool {
        self.source
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    }
}

impl ToolSection {
    pub fn is_url(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Semantic validation beyond what serde can express.
pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.app.name.trim().is_empty() {
        bail!("[app].name must not be empty");
    }
    if cfg.app.binary.trim().is_empty() {
        bail!("[app].binary must not be empty");
    }
    if cfg.ui.build.trim().is_empty() {
        bail!("[ui].build must not be empty");
    }
    if cfg.build.command.trim().is_empty() {
        bail!("[build].command must not be empty");
    }

    if let Some(icon) = &cfg.icon {
        let ext = icon
            .source
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("png") => {
                if icon.convert.is_none() {
                    bail!(
                        "[icon].source is a .png but no [icon].convert command is configured"
                    );
                }
            }
            Some("icns") | Some("ico") => {}
            _ => bail!(
                "icon must be .png, .icns or .ico: {}",
                icon.source.display()
            ),
        }
    }

    if let Some(tool) = &cfg.tool {
        if tool.name.trim().is_empty() {
            bail!("[tool].name must not be empty");
        }
        if tool.source.trim().is_empty() {
            bail!("[tool].source must not be empty");
        }
    }

    Ok(())
}
