// src/digest/store.rs

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Directory holding the digest file, relative to the store root.
pub const DIGEST_DIR: &str = ".packdag";

/// Relative path (from the store root) to the digests file.
///
/// The file format is a simple line-based mapping:
///
/// ```text
/// tracked_unit_1 <whitespace> hex_digest_1
/// tracked_unit_2 <whitespace> hex_digest_2
/// ```
pub const DIGEST_FILE_PATH: &str = ".packdag/digests";

/// Abstract storage for one digest per tracked unit.
pub trait DigestStore: Send {
    /// Stored digest for a tracked unit, if any.
    fn load(&self, unit: &str) -> Result<Option<String>>;
    fn save(&mut self, unit: &str, digest: &str) -> Result<()>;
}

/// Stores digests in `<root>/.packdag/digests`.
#[derive(Debug, Clone)]
pub struct FileDigestStore {
    root: PathBuf,
}

impl FileDigestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DigestStore for FileDigestStore {
    fn load(&self, unit: &str) -> Result<Option<String>> {
        let map = load_all(&self.root)?;
        Ok(map.get(unit).cloned())
    }

    fn save(&mut self, unit: &str, digest: &str) -> Result<()> {
        let mut map = load_all(&self.root)?;
        map.insert(unit.to_string(), digest.to_string());
        save_all(&self.root, &map)?;
        info!(unit = %unit, digest = %digest, "stored digest (file)");
        Ok(())
    }
}

/// Stores digests in memory only (lost when dropped); used in tests.
#[derive(Debug, Default)]
pub struct MemoryDigestStore {
    map: HashMap<String, String>,
}

impl MemoryDigestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigestStore for MemoryDigestStore {
    fn load(&self, unit: &str) -> Result<Option<String>> {
        Ok(self.map.get(unit).cloned())
    }

    fn save(&mut self, unit: &str, digest: &str) -> Result<()> {
        self.map.insert(unit.to_string(), digest.to_string());
        info!(unit = %unit, digest = %digest, "stored digest (memory)");
        Ok(())
    }
}

/// Load all stored digests from `<root>/.packdag/digests`.
fn load_all(root: &Path) -> Result<HashMap<String, String>> {
    let path = root.join(DIGEST_FILE_PATH);

    if !path.exists() {
        return Ok(HashMap::new());
    }

    let file =
        File::open(&path).with_context(|| format!("opening digest file at {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Units may contain whitespace ("compile ui"); the digest never
        // does, so split at the last whitespace run.
        if let Some((unit, digest)) = trimmed.rsplit_once(char::is_whitespace) {
            map.insert(unit.trim().to_string(), digest.to_string());
        }
    }

    Ok(map)
}

/// Persist all digests to `<root>/.packdag/digests`.
fn save_all(root: &Path, map: &HashMap<String, String>) -> Result<()> {
    let path = root.join(DIGEST_FILE_PATH);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating digest directory at {}", parent.display()))?;
    }

    let file = File::create(&path)
        .with_context(|| format!("creating digest file at {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for (unit, digest) in map.iter() {
        writeln!(writer, "{unit} {digest}")?;
    }

    writer.flush()?;
    Ok(())
}
