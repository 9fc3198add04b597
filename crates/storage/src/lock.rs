// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed run lock
//!
//! One record per account/operation at `accounts/<key>/locks/<op>.lock`. The
//! read-decide-write sequence is serialized across processes by an `fs2`
//! advisory lock on a sidecar `<op>.guard` file; the record itself is what
//! other holders see.

use crate::json::{sanitize_key, write_atomic, StorageError};
use fs2::FileExt;
use refill_core::{Clock, HolderId, IdGen, LockConfig, LockDecision, RunLockRecord};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Hands out run locks under a data directory
#[derive(Clone)]
pub struct FileRunLock<C: Clock, I: IdGen> {
    root: PathBuf,
    config: LockConfig,
    clock: C,
    ids: I,
    host: String,
}

impl<C: Clock, I: IdGen> FileRunLock<C, I> {
    pub fn new(data_dir: impl Into<PathBuf>, config: LockConfig, clock: C, ids: I) -> Self {
        Self {
            root: data_dir.into().join("accounts"),
            config,
            clock,
            ids,
            host: local_host(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Try to take the lock for `operation` on `account_id`.
    ///
    /// `Ok(None)` means another live holder has it. A stale record is
    /// overridden.
    pub fn try_acquire(
        &self,
        account_id: &str,
        operation: &str,
    ) -> Result<Option<RunLockGuard>, StorageError> {
        let dir = self.root.join(sanitize_key(account_id)).join("locks");
        fs::create_dir_all(&dir)?;
        let paths = LockPaths::new(&dir, operation);

        let _guard = GuardFile::lock(&paths.guard)?;
        let now = self.clock.now();
        let existing = read_record(&paths.record);

        match LockDecision::decide(existing, &self.config, now) {
            LockDecision::Denied { current } => {
                tracing::debug!(
                    account = account_id,
                    operation,
                    holder = %current.holder_id,
                    host = %current.host,
                    since = %current.start_time,
                    "run lock busy"
                );
                return Ok(None);
            }
            LockDecision::Reclaim { previous } => {
                tracing::warn!(
                    account = account_id,
                    operation,
                    holder = %previous.holder_id,
                    host = %previous.host,
                    since = %previous.start_time,
                    "reclaiming stale run lock"
                );
            }
            LockDecision::Acquire => {}
        }

        let record = RunLockRecord {
            holder_id: HolderId::new(self.ids.next()),
            start_time: now,
            operation: operation.to_string(),
            host: self.host.clone(),
        };
        write_atomic(&paths.record, &serde_json::to_vec_pretty(&record)?)?;
        tracing::debug!(account = account_id, operation, holder = %record.holder_id, "run lock acquired");

        Ok(Some(RunLockGuard {
            paths,
            holder: record.holder_id,
            released: false,
        }))
    }
}

/// Held run lock. Released on drop if still owned.
#[derive(Debug)]
pub struct RunLockGuard {
    paths: LockPaths,
    holder: HolderId,
    released: bool,
}

impl RunLockGuard {
    pub fn holder(&self) -> &HolderId {
        &self.holder
    }

    /// Release explicitly, reporting errors
    pub fn release(mut self) -> Result<(), StorageError> {
        self.released = true;
        remove_if_held(&self.paths, &self.holder)
    }
}

impl Drop for RunLockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_if_held(&self.paths, &self.holder) {
            tracing::warn!(
                path = %self.paths.record.display(),
                error = %e,
                "failed to release run lock"
            );
        }
    }
}

#[derive(Debug, Clone)]
struct LockPaths {
    record: PathBuf,
    guard: PathBuf,
}

impl LockPaths {
    fn new(dir: &Path, operation: &str) -> Self {
        let name = sanitize_key(operation);
        Self {
            record: dir.join(format!("{}.lock", name)),
            guard: dir.join(format!("{}.guard", name)),
        }
    }
}

/// Exclusive advisory lock on the sidecar file, held for its lifetime
struct GuardFile(File);

impl GuardFile {
    fn lock(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self(file))
    }
}

impl Drop for GuardFile {
    fn drop(&mut self) {
        let _ = self.0.unlock();
    }
}

/// An unreadable record is treated as absent
fn read_record(path: &Path) -> Option<RunLockRecord> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable run lock, ignoring");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt run lock, ignoring");
            None
        }
    }
}

fn remove_if_held(paths: &LockPaths, holder: &HolderId) -> Result<(), StorageError> {
    let _guard = GuardFile::lock(&paths.guard)?;
    match read_record(&paths.record) {
        Some(record) if &record.holder_id == holder => {
            fs::remove_file(&paths.record)?;
            tracing::debug!(holder = %holder, "run lock released");
        }
        Some(record) => {
            tracing::warn!(
                holder = %holder,
                current = %record.holder_id,
                "run lock taken over by another holder, leaving it"
            );
        }
        None => {}
    }
    Ok(())
}

fn local_host() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
