//! In-memory doubles for the external seams.
//!
//! Used by the test suite and handy for host prototypes that want the
//! full controller stack without a network.

use sb_prefs::error::{PrefsError, Result};
use sb_prefs::remote::{PreferenceTransport, UserPreferences};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// A preference transport backed by a shared in-memory map. Clones share
/// the same store, so several sessions can talk to "the same server".
/// Optionally fails the first N calls to exercise retry paths.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    store: Arc<Mutex<HashMap<String, UserPreferences>>>,
    failures: Arc<AtomicU32>,
    calls: Arc<AtomicU32>,
}

impl MemoryTransport {
    /// A transport that fails its first `failures` calls with a transport
    /// error, then recovers.
    pub fn failing(failures: u32) -> Self {
        Self {
            failures: Arc::new(AtomicU32::new(failures)),
            ..Self::default()
        }
    }

    /// Total calls observed (saves and loads).
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn maybe_fail(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PrefsError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

impl PreferenceTransport for MemoryTransport {
    async fn save(&self, prefs: &UserPreferences) -> Result<UserPreferences> {
        self.maybe_fail()?;
        self.store
            .lock()
            .unwrap()
            .insert(prefs.user_id.clone(), prefs.clone());
        Ok(prefs.clone())
    }

    async fn load(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        self.maybe_fail()?;
        Ok(self.store.lock().unwrap().get(user_id).cloned())
    }
}
