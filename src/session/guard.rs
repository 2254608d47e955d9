use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::session::Identity;
use crate::token::TokenStore;

/// Sink for the forced-navigation side effect. Production wires this to the
/// host shell; tests substitute a recorder.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Terminal-failure sink for the renewal coordinator. Clearing the store,
/// dropping the cached identity and redirecting happen at most once per
/// failure burst.
pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    identity: Mutex<Option<Identity>>,
    signed_in: AtomicBool,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            identity: Mutex::new(None),
            signed_in: AtomicBool::new(false),
        }
    }

    /// Re-arms the guard after a successful login or a restored session.
    pub fn activate(&self, identity: Option<Identity>) {
        *self.identity.lock().expect("identity lock") = identity;
        self.signed_in.store(true, Ordering::SeqCst);
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.lock().expect("identity lock").clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    /// Clears credential and identity without the redirect side effect.
    /// Returns whether there was anything to tear down: an armed guard or a
    /// stored credential, whichever came first.
    pub fn sign_out(&self) -> bool {
        let was_armed = self.signed_in.swap(false, Ordering::SeqCst);
        let had_credential = self.store.get().is_some();
        if !was_armed && !had_credential {
            return false;
        }
        self.store.clear();
        self.identity.lock().expect("identity lock").take();
        true
    }

    /// Idempotent: the first call in a burst clears everything and redirects,
    /// whether or not the guard was ever armed; repeat calls while logged out
    /// are no-ops.
    pub fn terminate(&self) {
        if self.sign_out() {
            info!("session.terminated");
            self.navigator.redirect_to_login();
        }
    }
}
