//! # Level Store
//!
//! The process-wide holder of the current security level.
//!
//! A `LevelStore` is a cheap handle: clones share the same level. It is
//! created once at startup and handed to the gate and to anything that
//! displays the level. Login results may be delivered from any runtime
//! worker, so every read and write goes through one mutex and each
//! transition is a single critical section.
//!
//! The store never persists anything; the level lives for the process.

use crate::SecurityLevel;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, mutable current security level.
#[derive(Debug, Clone, Default)]
pub struct LevelStore {
    current: Arc<Mutex<SecurityLevel>>,
}

impl LevelStore {
    /// Create a store starting at `initial`.
    #[must_use]
    pub fn new(initial: SecurityLevel) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
        }
    }

    // A panic while holding the lock cannot leave a half-written enum behind.
    fn lock(&self) -> MutexGuard<'_, SecurityLevel> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the current level.
    #[must_use]
    pub fn get(&self) -> SecurityLevel {
        *self.lock()
    }

    /// Replace the current level.
    pub fn set(&self, level: SecurityLevel) {
        *self.lock() = level;
    }

    /// Set the level to `level` and return the level it replaced.
    pub fn promote(&self, level: SecurityLevel) -> SecurityLevel {
        std::mem::replace(&mut *self.lock(), level)
    }

    /// Check whether two handles share the same underlying level.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.current, &other.current)
    }
}
