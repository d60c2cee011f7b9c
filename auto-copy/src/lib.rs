//! # Auto Copy
//!
//! Mirrors file changes from one watched directory into a set of destination
//! directories. Created, modified and moved files are copied into every
//! destination; deleted files are removed from them. Paths containing any
//! ignore-list substring are left alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Auto Copy                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  MirrorConfig ──► MirrorWatcher ──► FileEvent                  │
//! │       │                │                │                       │
//! │       ▼                ▼                ▼                       │
//! │  ignore list      notify backend    EventRouter ──► copyTo[]   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod router;
pub mod watcher;

pub use config::{ConfigLoad, DEFAULT_CONFIG_FILE, MirrorConfig};
pub use error::{MirrorError, Result};
pub use event::{FileEvent, FileEventKind};
pub use router::{EventRouter, RouteOutcome};
pub use watcher::MirrorWatcher;
