use std::fmt;
use std::sync::Mutex;

/// Opaque bearer string. No expiry metadata is held client-side; expiry is
/// discovered only by a rejected call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}

/// Synchronous from the coordinator's perspective: no suspension.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential);
    fn clear(&self);
}

#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<Credential> {
        self.slot.lock().expect("token store lock").clone()
    }

    fn set(&self, credential: Credential) {
        *self.slot.lock().expect("token store lock") = Some(credential);
    }

    fn clear(&self) {
        self.slot.lock().expect("token store lock").take();
    }
}
