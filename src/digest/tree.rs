// src/digest/tree.rs

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::digest::store::DIGEST_DIR;

/// Content digest of a file tree.
///
/// Directories contribute nothing; every regular file under the root
/// contributes its full content. Entries are ordered by a two-level path
/// comparator (case-insensitive primary key, original case-sensitive
/// tie-break) before hashing, so the digest is independent of filesystem
/// enumeration order and of case-folding differences between filesystems.
/// Any unreadable file aborts the whole computation: a digest is
/// all-or-nothing, never partial.
#[derive(Debug, Clone)]
pub struct TreeDigest {
    root: PathBuf,
    exclude: Option<GlobSet>,
}

impl TreeDigest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: None,
        }
    }

    /// Exclude files whose root-relative path matches any of the given glob
    /// patterns.
    pub fn exclude<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern.as_ref())
                .with_context(|| format!("invalid exclude pattern '{}'", pattern.as_ref()))?;
            builder.add(glob);
        }
        self.exclude = Some(builder.build()?);
        Ok(self)
    }

    /// Compute the digest, reading every discovered file concurrently.
    pub async fn compute(&self) -> Result<String> {
        let paths = self.discover()?;

        // One read per discovered file, all joined before sorting/hashing.
        let mut reads = Vec::with_capacity(paths.len());
        for rel in paths {
            let abs = self.root.join(&rel);
            reads.push(tokio::spawn(async move {
                let content = tokio::fs::read(&abs)
                    .await
                    .with_context(|| format!("reading {} for digest", abs.display()))?;
                Ok::<_, anyhow::Error>((rel, content))
            }));
        }

        let mut entries = Vec::with_capacity(reads.len());
        for read in reads {
            let entry = read.await.context("digest read task panicked")??;
            entries.push(entry);
        }

        entries.sort_by(|a, b| path_order(&a.0, &b.0));

        let mut hasher = Hasher::new();
        for (rel, content) in &entries {
            debug!(path = %rel.display(), bytes = content.len(), "hashing file");
            hasher.update(content);
        }

        let digest = hasher.finalize().to_hex().to_string();
        debug!(digest = %digest, files = entries.len(), "computed tree digest");
        Ok(digest)
    }

    /// Enumerate every regular file under the root, as root-relative paths.
    ///
    /// The digest store's own directory is always skipped: a store rooted
    /// inside the tree it tracks must not invalidate that tree.
    fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != std::ffi::OsStr::new(DIGEST_DIR));

        for entry in walker {
            let entry =
                entry.with_context(|| format!("walking {} for digest", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();
            if let Some(exclude) = &self.exclude {
                if exclude.is_match(&rel) {
                    debug!(path = %rel.display(), "excluded from digest");
                    continue;
                }
            }
            found.push(rel);
        }

        Ok(found)
    }
}

/// Digest of every file under `root`, with no exclusions.
pub async fn hash_tree(root: impl Into<PathBuf>) -> Result<String> {
    TreeDigest::new(root).compute().await
}

/// Order paths case-insensitively (lowercased character by character),
/// breaking ties with the original case-sensitive ordering when the
/// lowercased forms are equal.
fn path_order(a: &Path, b: &Path) -> Ordering {
    let (sa, sb) = (a.to_string_lossy(), b.to_string_lossy());

    for (ca, cb) in sa.chars().zip(sb.chars()) {
        match ca.to_lowercase().cmp(cb.to_lowercase()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        if ca != cb {
            return ca.cmp(&cb);
        }
    }

    sa.len().cmp(&sb.len())
}
