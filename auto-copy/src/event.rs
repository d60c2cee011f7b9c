//! File events delivered by the event source.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use serde::{Deserialize, Serialize};

/// A single file system change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEvent {
    /// The kind of event.
    pub kind: FileEventKind,

    /// Path to the affected file or directory.
    pub path: PathBuf,

    /// Whether the affected entry is a directory.
    pub is_directory: bool,

    /// When the event was received.
    pub timestamp: DateTime<Utc>,
}

impl FileEvent {
    /// Create a new file event for a non-directory path.
    pub fn new(kind: FileEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            is_directory: false,
            timestamp: Utc::now(),
        }
    }

    /// Mark whether the event concerns a directory.
    pub fn with_directory(mut self, is_directory: bool) -> Self {
        self.is_directory = is_directory;
        self
    }

    /// Split a notify event into one event per affected path.
    ///
    /// A rename reported with both ends yields a single `Moved` event for the
    /// new location, since that is the file that exists to be copied. The
    /// "from" half of a rename becomes `Deleted` once the old path is gone.
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let folder = matches!(
            event.kind,
            notify::EventKind::Create(CreateKind::Folder)
                | notify::EventKind::Remove(RemoveKind::Folder)
        );
        let renamed_from = matches!(
            event.kind,
            notify::EventKind::Modify(ModifyKind::Name(RenameMode::From))
        );
        let kind = FileEventKind::from(event.kind);

        let paths = match event.kind {
            notify::EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                event.paths.into_iter().last().into_iter().collect()
            }
            _ => event.paths,
        };

        paths
            .into_iter()
            .map(|path| {
                let is_directory = folder || path.is_dir();
                // Moved out of the tree: the old name is gone from the source.
                let kind = if renamed_from && !path.exists() {
                    FileEventKind::Deleted
                } else {
                    kind.clone()
                };
                Self::new(kind, path).with_directory(is_directory)
            })
            .collect()
    }
}

/// Kind of file event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEventKind {
    /// File was created.
    Created,

    /// File contents or metadata changed.
    Modified,

    /// File was deleted.
    Deleted,

    /// File was renamed or moved into place.
    Moved,

    /// Anything else, labelled with the backend's description.
    Other(String),
}

impl From<notify::EventKind> for FileEventKind {
    fn from(kind: notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => Self::Created,
            notify::EventKind::Modify(modify_kind) => match modify_kind {
                ModifyKind::Name(RenameMode::From) => Self::Other("renamed_from".to_string()),
                ModifyKind::Name(_) => Self::Moved,
                _ => Self::Modified,
            },
            notify::EventKind::Remove(_) => Self::Deleted,
            notify::EventKind::Access(_) => Self::Other("accessed".to_string()),
            notify::EventKind::Any => Self::Other("any".to_string()),
            notify::EventKind::Other => Self::Other("other".to_string()),
        }
    }
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("Created"),
            Self::Modified => f.write_str("Modified"),
            Self::Deleted => f.write_str("Deleted"),
            Self::Moved => f.write_str("Moved"),
            Self::Other(label) => write!(f, "Other: {label}"),
        }
    }
}
