//! # Session Registry
//!
//! Holds one counting session per pool while analysts are counting.
//!
//! ## Thread Safety
//! Sessions live behind `Arc<Mutex<_>>`. Cloning the registry shares the
//! same sessions, so several request handlers can work on it at once
//! while each mutation runs under the lock.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   open(pool) ──► with_session_mut(add / count / tag) ──► finalize(pool) │
//! │       │                       │                               │         │
//! │       │                       ▼                               ▼         │
//! │       │              with_session (read only)       rows to storage,    │
//! │       │                                             session removed     │
//! │       ▼                                                                 │
//! │   discard(pool) ──► session dropped without saving                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use palyno_core::{AnalysisRow, CountingSession, PoolId, ValidationConfig};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{LabError, LabResult};

/// Shared map of open counting sessions keyed by pool.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<PoolId, CountingSession>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session for a pool.
    ///
    /// A pool can only have one session in progress.
    pub fn open(&self, pool_id: PoolId) -> LabResult<Uuid> {
        let mut sessions = self.lock()?;
        if sessions.contains_key(&pool_id) {
            return Err(LabError::SessionAlreadyOpen(pool_id));
        }

        let session = CountingSession::new(pool_id);
        let id = session.id();
        sessions.insert(pool_id, session);

        debug!(pool_id, session_id = %id, "Counting session opened");
        Ok(id)
    }

    /// Executes a function with read access to a pool's session.
    ///
    /// ## Usage
    /// ```rust
    /// # use palyno_lab::SessionRegistry;
    /// let registry = SessionRegistry::new();
    /// registry.open(4).unwrap();
    /// let total = registry.with_session(4, |s| s.total_grains()).unwrap();
    /// assert_eq!(total, 0);
    /// ```
    pub fn with_session<F, R>(&self, pool_id: PoolId, f: F) -> LabResult<R>
    where
        F: FnOnce(&CountingSession) -> R,
    {
        let sessions = self.lock()?;
        let session = sessions
            .get(&pool_id)
            .ok_or(LabError::SessionNotFound(pool_id))?;
        Ok(f(session))
    }

    /// Executes a function with write access to a pool's session.
    pub fn with_session_mut<F, R>(&self, pool_id: PoolId, f: F) -> LabResult<R>
    where
        F: FnOnce(&mut CountingSession) -> R,
    {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&pool_id)
            .ok_or(LabError::SessionNotFound(pool_id))?;
        Ok(f(session))
    }

    /// Finalizes a pool's session and closes it.
    ///
    /// When validation fails the session stays open with its counts.
    pub fn finalize(&self, pool_id: PoolId, config: &ValidationConfig) -> LabResult<Vec<AnalysisRow>> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&pool_id)
            .ok_or(LabError::SessionNotFound(pool_id))?;

        let rows = session.finalize(config)?;
        sessions.remove(&pool_id);

        info!(pool_id, rows = rows.len(), "Counting session closed");
        Ok(rows)
    }

    /// Drops a pool's session without saving. Returns whether one was open.
    pub fn discard(&self, pool_id: PoolId) -> LabResult<bool> {
        let removed = self.lock()?.remove(&pool_id).is_some();
        if removed {
            debug!(pool_id, "Counting session discarded");
        }
        Ok(removed)
    }

    /// Pools with a session in progress, in ascending order.
    pub fn open_pools(&self) -> LabResult<Vec<PoolId>> {
        let mut pools: Vec<PoolId> = self.lock()?.keys().copied().collect();
        pools.sort_unstable();
        Ok(pools)
    }

    fn lock(&self) -> LabResult<MutexGuard<'_, HashMap<PoolId, CountingSession>>> {
        self.sessions.lock().map_err(|_| LabError::LockPoisoned)
    }
}
