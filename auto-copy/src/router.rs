//! Routing of file events to mirror actions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::event::{FileEvent, FileEventKind};

/// What handling a single event did.
///
/// Destination lists hold the configured directories, in config order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The event concerned a directory and was dropped.
    SkippedDirectory,

    /// The path matched the ignore list.
    Ignored,

    /// The file was copied into each destination that accepted it.
    Copied {
        copied: Vec<PathBuf>,
        failed: Vec<PathBuf>,
    },

    /// The file was removed from each destination that had it.
    Removed {
        removed: Vec<PathBuf>,
        missing: Vec<PathBuf>,
        failed: Vec<PathBuf>,
    },

    /// The event kind has no mirror action.
    Unhandled,
}

impl RouteOutcome {
    /// Whether any destination was changed on disk.
    pub fn mutated(&self) -> bool {
        match self {
            Self::Copied { copied, .. } => !copied.is_empty(),
            Self::Removed { removed, .. } => !removed.is_empty(),
            _ => false,
        }
    }
}

enum Removal {
    Removed,
    Missing,
}

/// Applies file events to every configured destination.
#[derive(Debug, Clone)]
pub struct EventRouter {
    config: Arc<MirrorConfig>,
}

impl EventRouter {
    /// Create a router over a loaded config.
    pub fn new(config: Arc<MirrorConfig>) -> Self {
        Self { config }
    }

    /// The config this router mirrors with.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Handle one event. Per-destination failures are logged, never returned.
    pub fn handle(&self, event: &FileEvent) -> RouteOutcome {
        if event.is_directory {
            debug!("Skipping directory event: {}", event.path.display());
            return RouteOutcome::SkippedDirectory;
        }

        info!("{}: {}", event.kind, event.path.display());

        if self.config.is_ignored(&event.path) {
            debug!("Ignored: {}", event.path.display());
            return RouteOutcome::Ignored;
        }

        match event.kind {
            FileEventKind::Created | FileEventKind::Modified | FileEventKind::Moved => {
                self.copy_to_all(&event.path)
            }
            FileEventKind::Deleted => self.remove_from_all(&event.path),
            FileEventKind::Other(_) => RouteOutcome::Unhandled,
        }
    }

    fn copy_to_all(&self, source: &Path) -> RouteOutcome {
        let mut copied = Vec::new();
        let mut failed = Vec::new();

        for destination in &self.config.copy_to {
            match copy_into(source, destination) {
                Ok(target) => {
                    debug!("Copied {} to {}", source.display(), target.display());
                    copied.push(destination.clone());
                }
                Err(e) => {
                    warn!(
                        "Failed to copy {} to {}: {e}",
                        source.display(),
                        destination.display()
                    );
                    failed.push(destination.clone());
                }
            }
        }

        RouteOutcome::Copied { copied, failed }
    }

    fn remove_from_all(&self, source: &Path) -> RouteOutcome {
        let mut removed = Vec::new();
        let mut missing = Vec::new();
        let mut failed = Vec::new();

        for destination in &self.config.copy_to {
            match remove_from(source, destination) {
                Ok(Removal::Removed) => removed.push(destination.clone()),
                Ok(Removal::Missing) => {
                    info!(
                        "File not found: {}",
                        mirrored_path(source, destination)
                            .unwrap_or_else(|_| destination.clone())
                            .display()
                    );
                    missing.push(destination.clone());
                }
                Err(e) => {
                    warn!(
                        "Failed to remove {} from {}: {e}",
                        source.display(),
                        destination.display()
                    );
                    failed.push(destination.clone());
                }
            }
        }

        RouteOutcome::Removed {
            removed,
            missing,
            failed,
        }
    }
}

/// Path of `source`'s mirror inside `destination`.
fn mirrored_path(source: &Path, destination: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| MirrorError::MissingFileName(source.display().to_string()))?;
    Ok(destination.join(name))
}

fn copy_into(source: &Path, destination: &Path) -> Result<PathBuf> {
    if !destination.is_dir() {
        return Err(MirrorError::DestinationMissing(
            destination.display().to_string(),
        ));
    }

    let target = mirrored_path(source, destination)?;
    if is_same_file(source, &target)? {
        return Err(MirrorError::SameFile(target.display().to_string()));
    }

    fs::copy(source, &target)?;
    Ok(target)
}

/// Copying a file onto itself truncates it.
fn is_same_file(source: &Path, target: &Path) -> Result<bool> {
    if !target.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(source)? == fs::canonicalize(target)?)
}

fn remove_from(source: &Path, destination: &Path) -> Result<Removal> {
    let target = mirrored_path(source, destination)?;
    match fs::remove_file(&target) {
        Ok(()) => Ok(Removal::Removed),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::Missing),
        Err(e) => Err(e.into()),
    }
}
