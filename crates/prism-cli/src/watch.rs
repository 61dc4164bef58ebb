//! Re-check shader sources whenever they change on disk

use crate::check::{Mode, check_file, print_report};
use crate::config::Settings;
use anyhow::{Result, anyhow};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebouncedEvent, new_debouncer};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};
use std::time::Duration;

/// Extensions picked up when a directory is watched
const SOURCE_EXTENSIONS: &[&str] = &["wgsl", "prism"];

#[derive(Debug, Clone)]
pub enum WatchEvent {
    Modified(PathBuf),
    Error(String),
}

/// Debounced watcher over shader files and directories
pub struct SourceWatcher {
    debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    receiver: Receiver<WatchEvent>,
    watched_paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl SourceWatcher {
    pub fn new(debounce: Duration) -> Result<Self> {
        let (tx, rx) = channel();
        let watched_paths = Arc::new(Mutex::new(Vec::new()));
        let watched_paths_clone = Arc::clone(&watched_paths);

        let debouncer = new_debouncer(
            debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    let watched = watched_paths_clone.lock();
                    for event in events {
                        if is_relevant(&event.path, &watched) {
                            let _ = tx.send(WatchEvent::Modified(event.path));
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(format!("Watch error: {:?}", e)));
                }
            },
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {:?}", e))?;

        Ok(Self {
            debouncer,
            receiver: rx,
            watched_paths,
        })
    }

    /// Watch a file, or every shader source directly inside a directory
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        {
            let mut watched = self.watched_paths.lock();
            if !watched.contains(&canonical) {
                watched.push(canonical.clone());
            }
        }

        self.debouncer
            .watcher()
            .watch(&canonical, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {}: {}", canonical.display(), e))?;

        tracing::info!("Watching: {}", canonical.display());
        Ok(())
    }

    /// Blocks until the next event; `None` once the watcher is gone
    pub fn recv(&self) -> Option<WatchEvent> {
        self.receiver.recv().ok()
    }
}

/// An exact watched file, or a source file inside a watched directory
fn is_relevant(path: &Path, watched: &[PathBuf]) -> bool {
    if watched.iter().any(|p| p == path) {
        return true;
    }
    let is_source = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e));
    is_source && watched.iter().any(|p| path.starts_with(p))
}

/// Check `paths` once, then again after every change until interrupted
pub fn run_watch(
    paths: &[PathBuf],
    mode: Mode,
    settings: &Settings,
    debounce: Duration,
) -> Result<()> {
    let mut watcher = SourceWatcher::new(debounce)?;
    for path in paths {
        if !path.exists() {
            anyhow::bail!("Path not found: {}", path.display());
        }
        watcher.watch(path)?;
        if path.is_file() {
            print_report(&check_file(path, mode, settings));
        }
    }
    println!("Press Ctrl+C to stop\n");

    while let Some(event) = watcher.recv() {
        match event {
            WatchEvent::Modified(path) => {
                if path.exists() {
                    print_report(&check_file(&path, mode, settings));
                } else {
                    println!("removed {}", path.display());
                }
            }
            WatchEvent::Error(message) => eprintln!("{}", message),
        }
    }
    Ok(())
}
