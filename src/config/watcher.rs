//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ObserverConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ObserverConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ObserverConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped. Once the update
    /// receiver is gone, change events are ignored.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let forwarder = ReloadForwarder::new(self.path.clone(), self.update_tx);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| forwarder.on_event(res),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Turns file events into reloaded configs on the update channel.
struct ReloadForwarder {
    path: PathBuf,
    tx: mpsc::UnboundedSender<ObserverConfig>,
    closed: AtomicBool,
}

impl ReloadForwarder {
    fn new(path: PathBuf, tx: mpsc::UnboundedSender<ObserverConfig>) -> Self {
        Self {
            path,
            tx,
            closed: AtomicBool::new(false),
        }
    }

    fn on_event(&self, res: notify::Result<Event>) {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                return;
            }
        };
        if !(event.kind.is_modify() || event.kind.is_create()) || self.is_closed() {
            return;
        }

        if let Some(config) = reload(&self.path) {
            if self.tx.send(config).is_err() {
                tracing::debug!(path = ?self.path, "Config receiver dropped; ignoring further changes");
                self.closed.store(true, Ordering::Release);
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Load the file again; `None` (with an error logged) if it is unusable.
fn reload(path: &Path) -> Option<ObserverConfig> {
    tracing::info!("Config file change detected, reloading...");
    match load_config(path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
            None
        }
    }
}
