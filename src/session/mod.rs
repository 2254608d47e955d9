mod guard;

pub use guard::{Navigator, SessionGuard};

use serde::{Deserialize, Serialize};

/// Server-reported account details cached beside the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("anonymous")
    }
}
