//! Keymap file watcher for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use flightdeck_core::{JsonFileStore, Keymap, SettingsStore};
use notify::Watcher;
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, error, info, warn};

const RELOAD_SETTLE_DELAY: Duration = Duration::from_millis(100);

pub struct KeymapWatcher {
    _thread: std::thread::JoinHandle<()>,
}

/// Watch `path` and send the freshly loaded keymap (or `None` once removed)
/// after every change.
pub fn spawn_keymap_watcher(
    path: PathBuf,
    tx: tokio_mpsc::UnboundedSender<Option<Keymap>>,
) -> KeymapWatcher {
    let thread = std::thread::spawn(move || {
        if let Err(e) = watch_keymap_file(&path, &tx) {
            error!("Keymap watcher error: {e:#}");
        }
    });
    KeymapWatcher { _thread: thread }
}

fn is_keymap_event(event: &notify::Event, path: &Path) -> bool {
    matches!(
        event.kind,
        notify::EventKind::Modify(_) | notify::EventKind::Create(_) | notify::EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == path.file_name())
}

fn watch_keymap_file(path: &Path, tx: &tokio_mpsc::UnboundedSender<Option<Keymap>>) -> Result<()> {
    let parent = path
        .parent()
        .context("keymap path has no parent directory")?
        .to_owned();
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("creating {}", parent.display()))?;

    let (changed_tx, changed_rx) = mpsc::channel::<()>();
    let watched = path.to_owned();
    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| match result {
            Ok(event) if is_keymap_event(&event, &watched) => {
                let _ = changed_tx.send(());
            }
            Ok(_) => {}
            Err(e) => error!("Watcher error: {e}"),
        })?;

    watcher.watch(&parent, notify::RecursiveMode::NonRecursive)?;
    info!("Watching keymap file: {:?}", path);

    let store = JsonFileStore::new(path);

    while changed_rx.recv().is_ok() {
        // Editors write in several steps; coalesce them into one reload
        std::thread::sleep(RELOAD_SETTLE_DELAY);
        while changed_rx.try_recv().is_ok() {}

        match store.load() {
            Ok(keymap) => {
                debug!("Keymap file changed, reloading");
                if tx.send(keymap).is_err() {
                    debug!("Keymap receiver dropped, stopping watcher");
                    break;
                }
            }
            Err(e) => warn!("Ignoring unreadable keymap file: {e}"),
        }
    }

    Ok(())
}
