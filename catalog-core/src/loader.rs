//! Background Reference Loader
//!
//! Fetches the taxonomy catalog and the supplier list off the caller's
//! thread so the form can be shown before reference data arrives. Each fetch
//! runs once; results are collected by polling, the same way the form
//! consumes any other event.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::catalog::TaxonomyCatalog;
use crate::suppliers::{self, Supplier};

/// Where reference data comes from
pub trait ReferenceSource: Send + Sync + 'static {
    fn fetch_taxonomy(&self) -> Result<TaxonomyCatalog>;

    fn fetch_suppliers(&self) -> Result<Vec<Supplier>>;
}

/// Reads both documents from local JSON files
#[derive(Debug, Clone)]
pub struct FileSource {
    pub taxonomy_path: PathBuf,
    pub suppliers_path: PathBuf,
}

impl FileSource {
    pub fn new(taxonomy_path: impl Into<PathBuf>, suppliers_path: impl Into<PathBuf>) -> Self {
        Self {
            taxonomy_path: taxonomy_path.into(),
            suppliers_path: suppliers_path.into(),
        }
    }
}

impl ReferenceSource for FileSource {
    fn fetch_taxonomy(&self) -> Result<TaxonomyCatalog> {
        TaxonomyCatalog::load(&self.taxonomy_path)
    }

    fn fetch_suppliers(&self) -> Result<Vec<Supplier>> {
        suppliers::load_suppliers(&self.suppliers_path)
    }
}

/// A finished fetch; errors are carried as display strings
#[derive(Debug, Clone)]
pub enum LoadEvent {
    Taxonomy(Result<TaxonomyCatalog, String>),
    Suppliers(Result<Vec<Supplier>, String>),
}

/// Runs the two one-shot fetches on background threads
pub struct ReferenceLoader {
    handles: Vec<JoinHandle<()>>,
    event_rx: mpsc::Receiver<LoadEvent>,
    outstanding: usize,
}

impl ReferenceLoader {
    /// Starts both fetches immediately
    pub fn start<S: ReferenceSource>(source: S) -> Self {
        let source = Arc::new(source);
        let (event_tx, event_rx) = mpsc::channel();

        let taxonomy_source = Arc::clone(&source);
        let taxonomy_tx = event_tx.clone();
        let taxonomy_handle = thread::spawn(move || {
            let result = taxonomy_source
                .fetch_taxonomy()
                .map_err(|e| format!("{:#}", e));
            // Receiver gone means the form was closed; nothing to do
            let _ = taxonomy_tx.send(LoadEvent::Taxonomy(result));
        });

        let suppliers_handle = thread::spawn(move || {
            let result = source.fetch_suppliers().map_err(|e| format!("{:#}", e));
            let _ = event_tx.send(LoadEvent::Suppliers(result));
        });

        Self {
            handles: vec![taxonomy_handle, suppliers_handle],
            event_rx,
            outstanding: 2,
        }
    }

    /// Whether any fetch has not reported yet
    pub fn is_pending(&self) -> bool {
        self.outstanding > 0
    }

    /// Try to receive a finished fetch without blocking
    pub fn try_recv(&mut self) -> Option<LoadEvent> {
        let event = self.event_rx.try_recv().ok()?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(event)
    }

    /// Receive all finished fetches without blocking
    pub fn recv_all(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait up to `timeout` for every outstanding fetch
    pub fn wait_all(&mut self, timeout: Duration) -> Vec<LoadEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();

        while self.is_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.outstanding -= 1;
                    events.push(event);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    // A fetch thread died without reporting
                    self.outstanding = 0;
                    break;
                }
            }
        }

        events
    }
}

impl Drop for ReferenceLoader {
    fn drop(&mut self) {
        // Fetches are never cancelled; only join threads that already finished
        for handle in self.handles.drain(..) {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}
