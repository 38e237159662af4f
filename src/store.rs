//! Client-side state store.
//!
//! Two tiers with different lifetimes: the durable tier (a JSON file under
//! the user data directory) holds the most recent successful result across
//! restarts; the session tier (in-memory) holds the current job identity for
//! the lifetime of the process. Repeated submissions are last-write-wins,
//! since only the most recent result is ever meaningful.

use crate::model::{Job, ResultPayload};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

const CACHE_FILE: &str = "last_result.json";

/// On-disk shape of the durable cache.
#[derive(Debug, Serialize, Deserialize)]
struct CachedResult {
    saved_at: String,
    payload: ResultPayload,
}

/// Explicit owner of all client-side persistence, passed by reference to the
/// components that need it. Read failures degrade to "nothing cached";
/// clearing is idempotent.
pub trait StateStore: Send + Sync {
    /// Overwrite the cached last result.
    fn save_last_result(&self, payload: &ResultPayload) -> Result<()>;
    /// Most recent cached result, if any. Unreadable caches are logged and
    /// treated as absent.
    fn load_last_result(&self) -> Option<ResultPayload>;
    fn clear_last_result(&self);
    /// Location of the durable cache, when the store is file-backed.
    fn cache_path(&self) -> Option<PathBuf>;
    /// Persist the current job identity. Only called after a successful
    /// identity fetch.
    fn set_job(&self, job: Job);
    fn job(&self) -> Option<Job>;
    /// Discard the stored identity. Hiding the job badge always implies this.
    fn clear_job(&self);
}

/// File-backed store used by the real application.
pub struct FsStore {
    dir: PathBuf,
    session_job: Mutex<Option<Job>>,
}

impl FsStore {
    pub fn new() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("no user data directory available")?
            .join("seqjob");
        Ok(Self::with_dir(dir))
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self {
            dir,
            session_job: Mutex::new(None),
        }
    }

    fn file(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }
}

impl StateStore for FsStore {
    fn save_last_result(&self, payload: &ResultPayload) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create {}", self.dir.display()))?;
        let cached = CachedResult {
            saved_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            payload: payload.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&cached).context("encode cached result")?;
        std::fs::write(self.file(), bytes)
            .with_context(|| format!("write {}", self.file().display()))
    }

    fn load_last_result(&self) -> Option<ResultPayload> {
        let path = self.file();
        if !path.exists() {
            return None;
        }
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("unreadable result cache {}: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_slice::<CachedResult>(&bytes) {
            Ok(cached) => Some(cached.payload),
            Err(e) => {
                log::warn!("malformed result cache {}: {e}", path.display());
                None
            }
        }
    }

    fn clear_last_result(&self) {
        let _ = std::fs::remove_file(self.file());
    }

    fn cache_path(&self) -> Option<PathBuf> {
        Some(self.file())
    }

    fn set_job(&self, job: Job) {
        *self.session_job.lock().unwrap() = Some(job);
    }

    fn job(&self) -> Option<Job> {
        self.session_job.lock().unwrap().clone()
    }

    fn clear_job(&self) {
        *self.session_job.lock().unwrap() = None;
    }
}

/// In-memory fake with the same semantics, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemStore {
    last: Mutex<Option<ResultPayload>>,
    job: Mutex<Option<Job>>,
}

#[cfg(test)]
impl StateStore for MemStore {
    fn save_last_result(&self, payload: &ResultPayload) -> Result<()> {
        *self.last.lock().unwrap() = Some(payload.clone());
        Ok(())
    }

    fn load_last_result(&self) -> Option<ResultPayload> {
        self.last.lock().unwrap().clone()
    }

    fn clear_last_result(&self) {
        *self.last.lock().unwrap() = None;
    }

    fn cache_path(&self) -> Option<PathBuf> {
        None
    }

    fn set_job(&self, job: Job) {
        *self.job.lock().unwrap() = Some(job);
    }

    fn job(&self) -> Option<Job> {
        self.job.lock().unwrap().clone()
    }

    fn clear_job(&self) {
        *self.job.lock().unwrap() = None;
    }
}
