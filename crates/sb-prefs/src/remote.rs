//! Remote preference store client.
//!
//! The wire transport is a trait seam so hosts can plug in whatever HTTP
//! stack they run on (and tests can plug in a scripted fake). The client
//! wraps the transport with bounded retries and exponential backoff; a
//! "no preference yet" answer is a valid empty result that short-circuits
//! the remaining attempts.

use crate::error::{PrefsError, Result};
use sb_editor::dock::DockPosition;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The preference record round-tripped through `POST /preferences` and
/// `GET /preferences?userId=...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub user_id: String,
    pub toolbar_position: DockPosition,
    /// Milliseconds since the Unix epoch.
    pub updated_at: u64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Wire seam to the remote preference store.
///
/// `load` returning `Ok(None)` means the remote answered 404 — the user
/// has no stored preference yet, which is not a failure.
pub trait PreferenceTransport {
    fn save(
        &self,
        prefs: &UserPreferences,
    ) -> impl std::future::Future<Output = Result<UserPreferences>> + Send;

    fn load(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserPreferences>>> + Send;
}

/// Bounded retry with exponential backoff: `base_delay`, doubling after
/// each failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based: the delay after the
    /// first failure is the base delay).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Retrying client over a [`PreferenceTransport`].
pub struct RemoteStore<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: PreferenceTransport> RemoteStore<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Persist a toolbar position for a user. Retries transient failures
    /// up to the policy bound before reporting exhaustion.
    pub async fn save(&self, user_id: &str, position: DockPosition) -> Result<UserPreferences> {
        let prefs = UserPreferences {
            user_id: user_id.to_string(),
            toolbar_position: position,
            updated_at: now_ms(),
        };

        let mut last: Option<PrefsError> = None;
        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay(attempt - 1)).await;
            }
            match self.transport.save(&prefs).await {
                Ok(saved) => return Ok(saved),
                Err(e) => {
                    log::warn!(
                        "preference save attempt {}/{} failed: {e}",
                        attempt + 1,
                        self.policy.max_attempts
                    );
                    last = Some(e);
                }
            }
        }
        Err(PrefsError::Exhausted {
            attempts: self.policy.max_attempts,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// Fetch a user's stored preference. `Ok(None)` (no preference yet)
    /// is returned immediately without burning the remaining attempts.
    pub async fn load(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        let mut last: Option<PrefsError> = None;
        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.delay(attempt - 1)).await;
            }
            match self.transport.load(user_id).await {
                Ok(found) => return Ok(found),
                Err(e) => {
                    log::warn!(
                        "preference load attempt {}/{} failed: {e}",
                        attempt + 1,
                        self.policy.max_attempts
                    );
                    last = Some(e);
                }
            }
        }
        Err(PrefsError::Exhausted {
            attempts: self.policy.max_attempts,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted in-memory transport: fails the first `failures` calls,
    /// then behaves as a plain store.
    pub struct FlakyTransport {
        store: Mutex<HashMap<String, UserPreferences>>,
        failures: AtomicU32,
        pub calls: AtomicU32,
    }

    impl FlakyTransport {
        pub fn reliable() -> Self {
            Self::failing(0)
        }

        pub fn failing(failures: u32) -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
                failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
            }
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

    impl PreferenceTransport for FlakyTransport {
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

    /// Millisecond-scale policy so retry tests do not sleep for real.
    pub fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }
}
