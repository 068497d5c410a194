//! The never-throwing persistence facade.
//!
//! Combines the remote store and the local slots: authenticated sessions
//! round-trip the toolbar position through the remote preference store
//! and fall back to the local slot when the remote is unreachable;
//! unauthenticated sessions use the local slot only. Every failure is
//! absorbed here — callers get a boolean or an absent value, never an
//! error, and the in-memory dock state stays authoritative throughout.

use crate::local::LocalSlots;
use crate::remote::{PreferenceTransport, RemoteStore};
use sb_editor::dock::DockPosition;

pub struct PreferencesAdapter<T> {
    remote: RemoteStore<T>,
    local: LocalSlots,
}

impl<T: PreferenceTransport> PreferencesAdapter<T> {
    pub fn new(remote: RemoteStore<T>, local: LocalSlots) -> Self {
        Self { remote, local }
    }

    /// Persist a toolbar position. With a user id the remote store is
    /// tried first (with its own retries); on total remote failure the
    /// position still lands in the local slot. Returns whether any
    /// channel accepted the value.
    pub async fn save(&self, position: DockPosition, user_id: Option<&str>) -> bool {
        if let Some(uid) = user_id {
            match self.remote.save(uid, position).await {
                Ok(_) => return true,
                Err(e) => {
                    log::warn!("remote preference save failed, falling back to local: {e}");
                }
            }
        }
        self.local.save_toolbar_position(position)
    }

    /// Load the stored toolbar position, remote first for authenticated
    /// sessions. Absent everywhere (or all channels failing) is None —
    /// callers fall back to the default edge.
    pub async fn load(&self, user_id: Option<&str>) -> Option<DockPosition> {
        if let Some(uid) = user_id {
            match self.remote.load(uid).await {
                Ok(Some(prefs)) => return Some(prefs.toolbar_position),
                Ok(None) => {
                    log::debug!("no remote preference for {uid}, checking local slot");
                }
                Err(e) => {
                    log::warn!("remote preference load failed, falling back to local: {e}");
                }
            }
        }
        self.local.load_toolbar_position()
    }

    pub fn local(&self) -> &LocalSlots {
        &self.local
    }
}
