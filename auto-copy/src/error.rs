//! Error types for the mirror.

use thiserror::Error;

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while loading config, watching or mirroring.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Path exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Destination directory is missing or not a directory.
    #[error("destination is not a directory: {0}")]
    DestinationMissing(String),

    /// Mirror target is the source file itself.
    #[error("source and destination are the same file: {0}")]
    SameFile(String),

    /// Event path has no final component to mirror.
    #[error("path has no file name: {0}")]
    MissingFileName(String),

    /// The event source failed and watching cannot continue.
    #[error("watch failed: {0}")]
    WatchFatal(String),

    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The event channel closed while the watcher was still running.
    #[error("channel error: event source disconnected")]
    ChannelClosed,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MirrorError {
    /// Whether this error means the process cannot start with the given config.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::DirectoryNotFound(_)
                | Self::NotADirectory(_)
                | Self::Serialization(_)
        )
    }
}
