//! The in-memory ordered key index for the lobos S3 gateway.
//!
//! Built once by a recursive filesystem walk at startup, then mutated
//! in-place by the PUT/DELETE handlers. Backed by a `BTreeMap` so keys
//! stay lexicographically sorted, which the listing engine relies on.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

/// What kind of filesystem entry an index entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    File,
    Dir,
}

/// A single key index entry: the metadata the gateway needs without
/// touching the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
    pub size: u64,
    pub mtime: u64,
    pub kind: Kind,
}

impl Object {
    #[must_use]
    pub fn file(size: u64, mtime: u64) -> Self {
        Self { size, mtime, kind: Kind::File }
    }

    #[must_use]
    pub fn dir(mtime: u64) -> Self {
        Self { size: 0, mtime, kind: Kind::Dir }
    }
}

/// Read-only view over the index, held for the duration of a listing or
/// lookup. Dropping it releases the read lock.
pub struct IndexView<'a> {
    guard: parking_lot::RwLockReadGuard<'a, BTreeMap<String, Object>>,
}

impl Deref for IndexView<'_> {
    type Target = BTreeMap<String, Object>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// The ordered key → metadata map, shared read/write across reactors.
///
/// The original implementation this was ported from accessed an
/// unsynchronized `std::map` from multiple threads; this version wraps it
/// in a single reader/writer lock, read-locked for listing and lookup,
/// write-locked for insert and erase.
pub struct KeyIndex {
    map: RwLock<BTreeMap<String, Object>>,
}

impl KeyIndex {
    /// Recursively walk `root` and build an index of every file and
    /// directory beneath it. Symlinks and other special files are skipped
    /// silently. Keys are paths relative to `root` with no leading `/`.
    ///
    /// Any I/O error during the walk is propagated; the caller treats this
    /// as fatal.
    #[allow(unused_assignments)]
    pub fn build_from_fs(root: &Path) -> std::io::Result<Self> {
        let started = std::time::Instant::now();
        let mut map = BTreeMap::new();
        let mut build_in_progress = true;
        walk(root, root, &mut map)?;
        build_in_progress = false;
        tracing::debug!(items = map.len(), elapsed = ?started.elapsed(), "key index built");
        Ok(Self { map: RwLock::new(map) })
    }

    /// An empty index, used when `--enable-lobos-index` is not passed and
    /// the filesystem-backed path is taken instead. Not normally consulted.
    #[must_use]
    pub fn empty() -> Self {
        Self { map: RwLock::new(BTreeMap::new()) }
    }

    /// Insert or overwrite an entry.
    pub fn add_entry(&self, key: impl Into<String>, object: Object) {
        self.map.write().insert(key.into(), object);
    }

    /// Remove a single entry. Missing key is a no-op.
    pub fn remove(&self, key: &str) {
        self.map.write().remove(key);
    }

    /// Look up a single entry.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Object> {
        self.map.read().get(key).copied()
    }

    /// Acquire a read view for listing (`lower_bound(prefix)` + forward
    /// iteration is expressed as `view.range(prefix..)`).
    #[must_use]
    pub fn view(&self) -> IndexView<'_> {
        IndexView { guard: self.map.read() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

fn walk(root: &Path, dir: &Path, map: &mut BTreeMap<String, Object>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        let kind = if file_type.is_dir() {
            Kind::Dir
        } else if file_type.is_file() {
            Kind::File
        } else {
            continue;
        };

        let metadata = entry.metadata()?;
        let mtime = mtime_secs(&metadata);
        let size = if kind == Kind::File { metadata.len() } else { 0 };

        let key = path
            .strip_prefix(root)
            .expect("walked path is under root")
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");

        map.insert(key, Object { size, mtime, kind });

        if kind == Kind::Dir {
            walk(root, &path, map)?;
        }
    }
    Ok(())
}

/// Extract a file's modification time as seconds since the epoch, falling
/// back to 0 if unavailable.
#[must_use]
pub fn mtime_secs(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

/// Current time in seconds since the epoch, used to stamp PUT mutations.
#[must_use]
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
