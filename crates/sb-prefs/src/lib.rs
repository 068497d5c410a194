pub mod adapter;
pub mod autosave;
pub mod error;
pub mod local;
pub mod remote;

pub use adapter::PreferencesAdapter;
pub use autosave::{DEFAULT_DEBOUNCE, DocumentAutosave};
pub use error::PrefsError;
pub use local::{ARROWS_SLOT, DOCUMENT_SLOT, LocalSlots, PersistedDocument, TOOLBAR_POSITION_SLOT};
pub use remote::{PreferenceTransport, RemoteStore, RetryPolicy, UserPreferences, now_ms};
