pub mod models;
pub mod queries;
pub mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{error, info};

pub use models::Data;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format: {0}")]
    Format(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Process-wide store. Every access holds the one lock for its whole
/// duration, so callers never observe a half-applied operation.
pub struct Database {
    data: Mutex<Data>,
    snapshot_path: Option<PathBuf>,
}

impl Database {
    /// Open a store backed by a JSON snapshot, loading it if present.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let data = match snapshot::read(path)? {
            Some(data) => data,
            None => {
                info!("No snapshot at {}, starting empty", path.display());
                Data::empty(chrono::Utc::now().timestamp())
            }
        };

        Ok(Self {
            data: Mutex::new(data),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            data: Mutex::new(Data::empty(chrono::Utc::now().timestamp())),
            snapshot_path: None,
        }
    }

    pub fn read<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Data) -> Result<T, E>,
        E: From<DbError>,
    {
        let data = self.lock()?;
        f(&data)
    }

    /// Run a mutation and snapshot the result if it succeeded.
    pub fn write<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Data) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut data = self.lock()?;
        let out = f(&mut data)?;
        self.persist(&data)?;
        Ok(out)
    }

    /// Like `write`, but the closure reports whether it changed anything;
    /// the snapshot is only rewritten when it did.
    pub fn update<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Data) -> Result<(T, bool), E>,
        E: From<DbError>,
    {
        let mut data = self.lock()?;
        let (out, changed) = f(&mut data)?;
        if changed {
            self.persist(&data)?;
        }
        Ok(out)
    }

    /// Copy of the whole store.
    pub fn load(&self) -> Result<Data, DbError> {
        Ok(self.lock()?.clone())
    }

    pub fn replace(&self, next: Data) -> Result<(), DbError> {
        let mut data = self.lock()?;
        *data = next;
        self.persist(&data)
    }

    pub fn reset(&self, now: i64) -> Result<(), DbError> {
        self.replace(Data::empty(now))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Data>, DbError> {
        self.data.lock().map_err(|_| DbError::Poisoned)
    }

    fn persist(&self, data: &Data) -> Result<(), DbError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        snapshot::write(path, data).inspect_err(|e| {
            error!("Failed to write snapshot {}: {}", path.display(), e);
        })
    }
}
