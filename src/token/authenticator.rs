use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::warn;

use crate::token::store::{Credential, TokenStore};
use crate::transport::RequestDescriptor;

/// Attaches the current credential to outgoing requests. Absence of a
/// credential is not an error here; the server rejects if it cares.
#[derive(Clone)]
pub struct RequestAuthenticator {
    store: Arc<dyn TokenStore>,
}

impl RequestAuthenticator {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn attach(&self, request: &mut RequestDescriptor) {
        if let Some(credential) = self.store.get() {
            Self::set_bearer(request, &credential);
        }
    }

    pub(crate) fn set_bearer(request: &mut RequestDescriptor, credential: &Credential) {
        match HeaderValue::from_str(&format!("Bearer {}", credential.as_str())) {
            Ok(value) => {
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!(url = %request.url, "credential is not a valid header value"),
        }
    }
}
