use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::auth::{AuthError, AuthRequest, Authenticator};
use crate::identity::Identity;

/// Authenticator that ignores the request and returns a canned outcome.
///
/// Lets router and guard tests run without building proxy headers.
#[derive(Debug)]
pub struct StaticAuthenticator {
    outcome: Mutex<Option<Identity>>,
    calls: AtomicUsize,
}

impl StaticAuthenticator {
    /// Always publish `identity`.
    pub fn returning(identity: Identity) -> Self {
        Self {
            outcome: Mutex::new(Some(identity)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with [`AuthError::NotAuthenticated`].
    pub fn rejecting() -> Self {
        Self {
            outcome: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Swap the canned outcome. `None` means reject.
    pub fn set_identity(&self, identity: Option<Identity>) {
        *self.outcome() = identity;
    }

    // Recovers the outcome from a poisoned lock.
    fn outcome(&self) -> MutexGuard<'_, Option<Identity>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of requests seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome().clone().ok_or(AuthError::NotAuthenticated)
    }

    fn method_name(&self) -> &'static str {
        "static"
    }
}
