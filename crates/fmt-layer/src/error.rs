//! Error types of the formatting layer.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while encoding, decoding or storing element snapshots.
pub enum SnapshotError {
    #[error("unsupported snapshot version {found} (expected {expected})")]
    /// The snapshot was written with a different layout version.
    UnsupportedVersion {
        /// Version found in the header.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },

    #[error("snapshot truncated at byte {0}")]
    /// The input ended in the middle of a field.
    Truncated(usize),

    #[error("unknown element kind tag {tag} in record {index}")]
    /// A record carried a kind tag that does not map to a visual element.
    UnknownKind {
        /// The raw tag byte.
        tag: u8,
        /// Zero-based record index.
        index: usize,
    },

    #[error("{0} trailing bytes after the last record")]
    /// Extra bytes followed the declared records.
    TrailingBytes(usize),

    #[error("value {0} does not fit the snapshot encoding")]
    /// An offset or length exceeded the 32-bit field width.
    ValueOutOfRange(usize),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
/// Errors produced while comparing original and reformatted text.
pub enum DetectError {
    #[error(
        "non-whitespace difference at original offset {original_offset}, formatted offset {formatted_offset}"
    )]
    /// The formatter changed something other than whitespace.
    NonWhitespaceChange {
        /// Char offset in the original text.
        original_offset: usize,
        /// Char offset in the formatted text.
        formatted_offset: usize,
    },
}

#[derive(Debug, Error)]
/// Errors produced while loading [`LayerConfig`](crate::config::LayerConfig).
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    /// The configuration was not valid JSON for the expected shape.
    Json(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {message}")]
    /// A field parsed but holds an unusable value.
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Human readable reason.
        message: String,
    },
}

#[derive(Debug, Error)]
/// Any error surfaced by the formatting layer.
pub enum LayerError {
    #[error(transparent)]
    /// Snapshot codec or storage failure.
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    /// Whitespace diff failure.
    Detect(#[from] DetectError),

    #[error(transparent)]
    /// Configuration failure.
    Config(#[from] ConfigError),
}
