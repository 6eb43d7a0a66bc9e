use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::form::ProductPayload;
use crate::identifier::Identifier;

/// Receives assembled products; retry policy, if any, lives here
pub trait SubmissionTarget {
    fn submit(&self, payload: ProductPayload) -> Result<SubmittedRecord>;
}

/// A product accepted by a submission target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedRecord {
    pub id: Uuid,
    /// Final identifier: the manual value or a generated one
    pub sku: String,
    pub submitted_at: DateTime<Utc>,
    pub payload: ProductPayload,
}

/// Contents of the outbox file
#[derive(Debug, Serialize, Deserialize)]
pub struct OutboxStore {
    pub records: Vec<SubmittedRecord>,
    #[serde(default = "default_next_sku_number")]
    pub next_sku_number: u32,
}

/// Default value for next_sku_number
fn default_next_sku_number() -> u32 {
    1
}

impl OutboxStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_sku_number: 1,
        }
    }

    /// Gets the next generated SKU and advances the counter
    pub fn next_generated_sku(&mut self) -> String {
        let sku = format!("SKU-{:05}", self.next_sku_number);
        self.next_sku_number += 1;
        sku
    }

    /// Whether a record already uses this SKU
    pub fn has_sku(&self, sku: &str) -> bool {
        self.records.iter().any(|r| r.sku == sku)
    }

    /// Resolves the identifier and appends the record
    pub fn accept(&mut self, payload: ProductPayload) -> Result<SubmittedRecord> {
        let sku = match &payload.sku {
            Identifier::Manual(value) => {
                if self.has_sku(value) {
                    anyhow::bail!("Duplicate SKU: {}", value);
                }
                value.clone()
            }
            Identifier::Auto => {
                let mut sku = self.next_generated_sku();
                // Skip numbers already taken by manually assigned SKUs
                while self.has_sku(&sku) {
                    sku = self.next_generated_sku();
                }
                sku
            }
        };

        let record = SubmittedRecord {
            id: Uuid::new_v4(),
            sku,
            submitted_at: Utc::now(),
            payload,
        };
        self.records.push(record.clone());
        Ok(record)
    }
}

impl Default for OutboxStore {
    fn default() -> Self {
        Self::new()
    }
}

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(100);

/// Opens `path` and holds an exclusive `fs2` lock on it, polling until
/// `timeout` runs out. The lock lives as long as the returned handle.
fn lock_exclusive(path: &Path, timeout: Duration) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to create lock file: {:?}", path))?;

    let deadline = Instant::now() + timeout;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(file),
            Err(e) if e.kind() == ErrorKind::WouldBlock && Instant::now() < deadline => {
                thread::sleep(LOCK_RETRY);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                anyhow::bail!("Timed out after {:?} waiting for lock {:?}", timeout, path)
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to acquire lock on {:?}", path))
            }
        }
    }
}

/// Stores submitted products in a YAML file, with file locking so that
/// several form sessions can submit to the same outbox
pub struct Outbox {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl Outbox {
    /// Creates a new Outbox instance
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let lock_file_path = file_path.with_extension("yaml.lock");
        Self {
            file_path,
            lock_file_path,
        }
    }

    /// Returns the path to the outbox file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn acquire_write_lock(&self) -> Result<File> {
        lock_exclusive(&self.lock_file_path, LOCK_TIMEOUT)
            .with_context(|| format!("Outbox {:?} is busy", self.file_path))
    }

    fn read_store(&self) -> Result<OutboxStore> {
        if !self.file_path.exists() {
            return Ok(OutboxStore::new());
        }

        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open file: {:?}", self.file_path))?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse YAML from {:?}", self.file_path))
    }

    /// Loads all submitted records
    pub fn load(&self) -> Result<OutboxStore> {
        let _lock = self.acquire_write_lock()?;
        self.read_store()
    }

    /// Perform an update with the lock held: reload, apply, save
    pub fn update_atomically<F, T>(&self, update_fn: F) -> Result<T>
    where
        F: FnOnce(&mut OutboxStore) -> Result<T>,
    {
        let mut lock_file = self.acquire_write_lock()?;

        // Lock holder info, for debugging stuck locks
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            Utc::now().to_rfc3339()
        );

        let mut store = self.read_store()?;
        let result = update_fn(&mut store)?;

        let yaml = serde_yaml::to_string(&store)?;
        fs::write(&self.file_path, yaml)
            .with_context(|| format!("Failed to write outbox {:?}", self.file_path))?;

        // Lock is released when lock_file is dropped
        Ok(result)
    }
}

impl SubmissionTarget for Outbox {
    fn submit(&self, payload: ProductPayload) -> Result<SubmittedRecord> {
        self.update_atomically(|store| store.accept(payload))
    }
}
