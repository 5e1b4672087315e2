//! Error types for ROOT file reading and writing.

use thiserror::Error;

/// Result alias used throughout `tnp-root`.
pub type Result<T> = std::result::Result<T, RootError>;

/// Errors produced while reading or writing ROOT files.
#[derive(Debug, Error)]
pub enum RootError {
    /// Underlying filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic or is too short.
    #[error("not a ROOT file (bad magic or truncated header)")]
    BadMagic,

    /// A read ran past the end of the available bytes.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Read position.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compressed block could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Streamed object bytes do not match the expected layout.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No key with the requested name exists in the directory.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A path component names a key that is not a directory.
    #[error("'{name}' is not a directory (class: {class_name})")]
    NotADirectory {
        /// Key name.
        name: String,
        /// Stored class name.
        class_name: String,
    },

    /// The object class has no streamer implementation here.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),
}
