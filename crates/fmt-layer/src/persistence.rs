//! Persistence Adapter
//!
//! A snapshot stores the last computed element list of a document so it can be replayed the next
//! time an editor opens, before the live computation finishes. Snapshots are a pure cache: any
//! decoding problem, version change or content change means "recompute".
//!
//! # Layout
//!
//! All integers are little endian.
//!
//! ```text
//! u32  version            (SNAPSHOT_VERSION)
//! u64  content fingerprint
//! u32  record count
//! [record; count]:
//!     u8   kind   (ElementKind tag)
//!     u32  offset
//!     u32  length
//! ```

use std::collections::HashMap;
use std::fs;
use std::hash::Hasher;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHasher;
use tracing::{debug, warn};

use crate::element::{ElementKind, VisualElement};
use crate::error::SnapshotError;

/// Layout version written into every snapshot. Bump when the layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 8 + 4;
const RECORD_LEN: usize = 1 + 4 + 4;

/// Fingerprint of a document's text, used to reject snapshots of different content.
pub fn content_fingerprint(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(text.as_bytes());
    hasher.write_usize(text.len());
    hasher.finish()
}

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// [`content_fingerprint`] of the text the elements were computed for.
    pub fingerprint: u64,
    /// The elements, in emission order.
    pub elements: Vec<VisualElement>,
}

impl Snapshot {
    /// Snapshot `elements` computed for `text`.
    pub fn new(text: &str, elements: Vec<VisualElement>) -> Self {
        Self {
            fingerprint: content_fingerprint(text),
            elements,
        }
    }

    /// Whether this snapshot was computed for `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.fingerprint == content_fingerprint(text)
    }

    /// Encode into the binary layout.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut out = Vec::with_capacity(HEADER_LEN + RECORD_LEN * self.elements.len());
        out.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        out.extend_from_slice(&self.fingerprint.to_le_bytes());
        out.extend_from_slice(&to_u32(self.elements.len())?.to_le_bytes());

        for element in &self.elements {
            let (kind, offset, length) = element.into_parts();
            out.push(kind.tag());
            out.extend_from_slice(&to_u32(offset)?.to_le_bytes());
            out.extend_from_slice(&to_u32(length)?.to_le_bytes());
        }

        Ok(out)
    }

    /// Decode from the binary layout.
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let mut reader = Reader { bytes, pos: 0 };

        let version = reader.u32()?;
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let fingerprint = reader.u64()?;
        let count = reader.u32()? as usize;

        // Cap the preallocation by what the input can actually hold.
        let mut elements = Vec::with_capacity(count.min(bytes.len() / RECORD_LEN));
        for index in 0..count {
            let tag = reader.u8()?;
            let kind = ElementKind::from_tag(tag).ok_or(SnapshotError::UnknownKind { tag, index })?;
            let offset = reader.u32()? as usize;
            let length = reader.u32()? as usize;
            elements.push(VisualElement::from_parts(kind, offset, length));
        }

        let trailing = bytes.len() - reader.pos;
        if trailing > 0 {
            return Err(SnapshotError::TrailingBytes(trailing));
        }

        Ok(Self {
            fingerprint,
            elements,
        })
    }
}

fn to_u32(value: usize) -> Result<u32, SnapshotError> {
    u32::try_from(value).map_err(|_| SnapshotError::ValueOutOfRange(value))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(SnapshotError::Truncated(self.pos))?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, SnapshotError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn u64(&mut self) -> Result<u64, SnapshotError> {
        Ok(u64::from_le_bytes(self.take()?))
    }
}

/// Backing store for encoded snapshots, keyed by document.
pub trait SnapshotStorage: Send {
    /// Load the encoded snapshot stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError>;

    /// Store an encoded snapshot under `key`, replacing any previous one.
    fn store(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SnapshotError>;

    /// Drop the snapshot stored under `key`.
    fn remove(&mut self, key: &str) -> Result<(), SnapshotError>;
}

/// In-memory snapshot storage.
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySnapshotStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStorage for MemorySnapshotStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SnapshotError> {
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SnapshotError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Snapshot storage with one file per document under a directory.
///
/// File names are derived from a hash of the key, so keys may be arbitrary paths or URIs.
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    dir: PathBuf,
}

impl FileSnapshotStorage {
    /// Use `dir` for snapshot files. The directory is created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{:016x}.fmtlayer", content_fingerprint(key)))
    }
}

impl SnapshotStorage for FileSnapshotStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        debug!(key, path = %path.display(), bytes = bytes.len(), "storing snapshot");
        fs::write(path, bytes)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SnapshotError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Load and decode the snapshot for `key`, accepting it only if it matches `text`.
///
/// Every failure is a cache miss; decode and storage errors are logged.
pub fn restore_snapshot(
    storage: &dyn SnapshotStorage,
    key: &str,
    text: &str,
) -> Option<Vec<VisualElement>> {
    let bytes = match storage.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, %err, "failed to load snapshot");
            return None;
        }
    };

    match Snapshot::decode(&bytes) {
        Ok(snapshot) if snapshot.matches(text) => Some(snapshot.elements),
        Ok(_) => {
            debug!(key, "snapshot is for different content");
            None
        }
        Err(err) => {
            warn!(key, %err, "discarding unreadable snapshot");
            None
        }
    }
}

/// Encode and store `elements` computed for `text` under `key`.
pub fn save_snapshot(
    storage: &mut dyn SnapshotStorage,
    key: &str,
    text: &str,
    elements: &[VisualElement],
) -> Result<(), SnapshotError> {
    let bytes = Snapshot::new(text, elements.to_vec()).encode()?;
    storage.store(key, bytes)
}
