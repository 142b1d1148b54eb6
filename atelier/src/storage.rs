//! Flat-directory file store with defensive name handling.
//!
//! The store treats a single directory (the storage root) as its entire
//! namespace. Every operation goes through the same two-layer containment
//! check before touching the filesystem:
//!
//! 1. a lexical escape check on the raw client-supplied name - any `..`
//!    segment that would climb above the root rejects the request outright,
//!    before any existence check;
//! 2. the name is reduced to its sanitized basename, joined under the root,
//!    and the joined path is independently re-verified to be prefixed by
//!    the root.
//!
//! Basename-stripping alone is insufficient against certain encoded inputs,
//! so the prefix check is a required second gate, not a redundant one.

use crate::errors::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Process-wide sequence number folded into generated upload names so that
/// two uploads of the same original name in the same millisecond still get
/// distinct stored names.
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Result of storing an uploaded file.
#[derive(Debug)]
pub struct StoredUpload {
    /// Generated name the file was stored under
    pub filename: String,
    /// Full path of the stored file inside the storage root
    pub path: PathBuf,
}

/// File persistence against a single flat storage directory.
///
/// Holds no in-memory copy of file contents across requests; the directory
/// exclusively owns the bytes. Concurrent writes to the same sanitized name
/// race at the filesystem level with last-write-wins semantics.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce a client-supplied name to its sanitized basename: the final
    /// segment after splitting on both separator styles, with empty and
    /// dot segments discarded. Returns `None` when nothing usable remains.
    pub fn sanitize(name: &str) -> Option<&str> {
        name.split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .next_back()
    }

    /// Whether the raw name, resolved lexically against the root, would
    /// escape it. `a/../b.txt` stays inside; `../b.txt` does not.
    fn escapes_root(name: &str) -> bool {
        let mut depth: i64 = 0;
        for part in name.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    depth -= 1;
                    if depth < 0 {
                        return true;
                    }
                }
                _ => depth += 1,
            }
        }
        false
    }

    /// Run both containment gates and resolve the name to a path under the
    /// storage root. Fails with `AccessDenied` before any filesystem access
    /// when either gate rejects the name.
    fn resolve(&self, name: &str) -> Result<(PathBuf, String)> {
        if Self::escapes_root(name) {
            return Err(Error::AccessDenied);
        }

        let base = Self::sanitize(name).ok_or(Error::AccessDenied)?;
        let path = self.root.join(base);

        // Second gate: the joined path must still be prefixed by the root.
        if !path.starts_with(&self.root) {
            return Err(Error::AccessDenied);
        }

        Ok((path, base.to_string()))
    }

    /// Read the named file's full contents as UTF-8 text.
    pub async fn read(&self, name: &str) -> Result<String> {
        let (path, base) = self.resolve(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::FileNotFound { name: base }),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `content` to the named file, creating the storage root if
    /// absent and overwriting any existing file of that name. Returns the
    /// sanitized name actually used.
    pub async fn write(&self, name: &str, content: &str) -> Result<String> {
        let (path, base) = self.resolve(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, content).await?;
        debug!(filename = %base, bytes = content.len(), "Wrote file");
        Ok(base)
    }

    /// Open the named file for streaming, returning the handle and the
    /// sanitized name. Fails with `FileNotFound` if it does not exist.
    pub async fn open(&self, name: &str) -> Result<(tokio::fs::File, String)> {
        let (path, base) = self.resolve(name)?;
        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok((file, base)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::FileNotFound { name: base }),
            Err(e) => Err(e.into()),
        }
    }

    /// Store uploaded bytes under a generated name: a monotonic
    /// disambiguator concatenated with the sanitized original basename.
    /// Always produces a name distinct from any prior upload in this
    /// process.
    pub async fn store_upload(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload> {
        if Self::escapes_root(original_name) {
            return Err(Error::AccessDenied);
        }
        let base = Self::sanitize(original_name).ok_or(Error::NoFileUploaded)?;

        let stamp = chrono::Utc::now().timestamp_millis();
        let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
        let filename = format!("{stamp}-{seq}-{base}");

        let path = self.root.join(&filename);
        if !path.starts_with(&self.root) {
            return Err(Error::AccessDenied);
        }

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        debug!(filename = %filename, bytes = bytes.len(), "Stored upload");

        Ok(StoredUpload { filename, path })
    }

    /// Names of the entries directly inside the storage root, without
    /// recursion or metadata. An absent root is an empty store, not an
    /// error.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}
