//! Watcher lifecycle and the run loop that feeds the router.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::event::FileEvent;
use crate::router::EventRouter;

/// Capacity of the channel between the notify backend and the run loop.
const EVENT_CHANNEL_CAPACITY: usize = 1000;

type NotifyResult = std::result::Result<notify::Event, notify::Error>;

/// Watches one directory tree and mirrors its file changes.
pub struct MirrorWatcher {
    /// Root of the watched tree.
    target_dir: PathBuf,

    /// Handler applied to every event.
    router: EventRouter,

    /// Internal notify watcher, present while running.
    watcher: Option<RecommendedWatcher>,

    /// Results forwarded from the notify callback.
    event_rx: Option<mpsc::Receiver<NotifyResult>>,
}

impl MirrorWatcher {
    /// Create a watcher for `target_dir` that routes through `router`.
    pub fn new(target_dir: impl Into<PathBuf>, router: EventRouter) -> Self {
        Self {
            target_dir: target_dir.into(),
            router,
            watcher: None,
            event_rx: None,
        }
    }

    /// Create a watcher for the config's tracked folder.
    pub fn from_config(config: Arc<MirrorConfig>) -> Self {
        let target_dir = config.folder_to_track.clone();
        Self::new(target_dir, EventRouter::new(config))
    }

    /// The watched directory.
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Begin recursive monitoring of the target directory.
    pub fn start(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(()); // Already running
        }

        if !self.target_dir.exists() {
            return Err(MirrorError::DirectoryNotFound(
                self.target_dir.display().to_string(),
            ));
        }

        if !self.target_dir.is_dir() {
            return Err(MirrorError::NotADirectory(
                self.target_dir.display().to_string(),
            ));
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: NotifyResult| {
            // The receiver is gone once the run loop has finished.
            if event_tx.blocking_send(res).is_err() {
                debug!("Dropping event received after shutdown");
            }
        })?;
        watcher.watch(&self.target_dir, RecursiveMode::Recursive)?;

        self.watcher = Some(watcher);
        self.event_rx = Some(event_rx);
        info!("Started watching {}", self.target_dir.display());

        Ok(())
    }

    /// Stop the event source. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch(&self.target_dir) {
                debug!("Unwatch failed for {}: {e}", self.target_dir.display());
            }
            info!("Stopped watching {}", self.target_dir.display());
        }
        self.event_rx = None;
    }

    /// Check if the watcher is running.
    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Mirror events until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("KeyboardInterrupt, stopping script"),
                Err(e) => error!("Failed to listen for interrupt: {e}"),
            }
        })
        .await
    }

    /// Mirror events until `shutdown` completes or the event source fails.
    ///
    /// Events are handled one at a time; the watcher is stopped before this
    /// returns, and no handler is running at that point.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.start()?;
        let mut event_rx = self.event_rx.take().ok_or(MirrorError::ChannelClosed)?;

        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => break Ok(()),
                received = event_rx.recv() => match received {
                    Some(Ok(event)) => Self::dispatch(self.router.clone(), event).await,
                    Some(Err(e)) if !self.is_fatal(&e) => {
                        warn!("Watch error: {e}");
                    }
                    Some(Err(e)) => {
                        error!("Exception: {e}");
                        break Err(MirrorError::WatchFatal(e.to_string()));
                    }
                    None => break Err(MirrorError::ChannelClosed),
                },
            }
        };

        self.stop();
        result
    }

    /// Run the router over one notify event on the blocking pool.
    async fn dispatch(router: EventRouter, event: notify::Event) {
        let events = FileEvent::from_notify(event);
        if events.is_empty() {
            return;
        }

        let handled = tokio::task::spawn_blocking(move || {
            for event in &events {
                debug!("Received {} at {}", event.kind, event.timestamp);
                router.handle(event);
            }
        })
        .await;

        if let Err(e) = handled {
            error!("Event handler failed: {e}");
        }
    }

    /// Paths that vanish between notification and watch setup are expected;
    /// anything else, or losing the root itself, ends the watch.
    fn is_fatal(&self, err: &notify::Error) -> bool {
        if !self.target_dir.is_dir() {
            return true;
        }

        match &err.kind {
            notify::ErrorKind::PathNotFound | notify::ErrorKind::WatchNotFound => false,
            notify::ErrorKind::Io(e) => e.kind() != io::ErrorKind::NotFound,
            _ => true,
        }
    }
}

impl Drop for MirrorWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
