use std::sync::{Arc, Mutex};

use jiff::Timestamp;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::Error;
use crate::renewal::RenewalCoordinator;
use crate::routing::NavigationAuthGate;
use crate::session::{Identity, Navigator, SessionGuard};
use crate::token::{Credential, MemoryTokenStore, RequestAuthenticator, TokenStore};
use crate::transport::{HttpTransport, RequestDescriptor, Transport, TransportResponse};

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LoginResponse {
    success: bool,
    token: Option<String>,
    user: Option<Identity>,
    expires_in: Option<u64>,
}

/// Ties the session pieces together: every outgoing request passes through the
/// authenticator, the transport, and then the renewal coordinator's
/// interception before its outcome reaches application code.
pub struct SessionClient {
    config: Config,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    authenticator: RequestAuthenticator,
    coordinator: Arc<RenewalCoordinator>,
    guard: Arc<SessionGuard>,
    signed_in_at: Mutex<Option<Timestamp>>,
}

impl SessionClient {
    pub fn new(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self, Error> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        Ok(Self::with_transport(
            config,
            navigator,
            transport,
            Arc::new(MemoryTokenStore::new()),
        ))
    }

    /// Injection point for tests and alternative transports or stores.
    pub fn with_transport(
        config: Config,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let guard = Arc::new(SessionGuard::new(Arc::clone(&store), navigator));
        let coordinator = Arc::new(RenewalCoordinator::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            Arc::clone(&guard),
            config.renew_url(),
        ));
        Self {
            authenticator: RequestAuthenticator::new(Arc::clone(&store)),
            transport,
            store,
            coordinator,
            guard,
            config,
            signed_in_at: Mutex::new(None),
        }
    }

    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    pub fn guard(&self) -> Arc<SessionGuard> {
        Arc::clone(&self.guard)
    }

    pub fn gate(&self) -> NavigationAuthGate {
        NavigationAuthGate::new(Arc::clone(&self.store))
    }

    pub fn signed_in_at(&self) -> Option<Timestamp> {
        *self.signed_in_at.lock().expect("signed_in_at lock")
    }

    /// Exchanges credentials for a bearer token, caching it and the reported
    /// identity and re-arming the session guard.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, Error> {
        let request = RequestDescriptor::new(Method::POST, self.config.login_url())
            .json(json!({ "email": email, "password": password }));
        let response = self.transport.send(&request).await?;
        let status = response.status;
        if !status.is_success() {
            warn!(status = %status, "login rejected");
            return Err(Error::LoginRejected(status, response.body));
        }
        let parsed: LoginResponse = response.json()?;
        if !parsed.success {
            warn!("login response did not report success");
            return Err(Error::LoginRejected(
                status,
                "login response did not report success".into(),
            ));
        }
        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::LoginRejected(status, "login response carried no token".into()))?;
        self.store.set(Credential::new(token));
        let identity = parsed.user.unwrap_or_default();
        self.guard.activate(Some(identity.clone()));
        let now = Timestamp::now();
        *self.signed_in_at.lock().expect("signed_in_at lock") = Some(now);
        info!(
            user = %identity.display_name(),
            expires_in = ?parsed.expires_in,
            at = %now,
            "login.success"
        );
        Ok(identity)
    }

    /// Server-side logout is best effort; local state always clears, without
    /// the forced-redirect side effect.
    pub async fn logout(&self) {
        let mut request = RequestDescriptor::new(Method::POST, self.config.logout_url());
        self.authenticator.attach(&mut request);
        match self.transport.send(&request).await {
            Ok(response) if response.status.is_success() => {
                info!("logout acknowledged by server")
            }
            Ok(response) => {
                warn!(status = %response.status, "server refused logout; clearing locally anyway")
            }
            Err(err) => {
                warn!(error = %err, "logout request failed; clearing locally anyway")
            }
        }
        self.guard.sign_out();
        self.signed_in_at.lock().expect("signed_in_at lock").take();
    }

    /// Re-enters the signed-in state from a previously stored credential,
    /// without a network call. Returns whether a session was restored.
    pub fn restore(&self, identity: Option<Identity>) -> bool {
        if self.store.get().is_none() {
            debug!("restore skipped; no stored credential");
            return false;
        }
        self.guard.activate(identity);
        true
    }

    /// Generic dispatch: attach the current credential, send, and let the
    /// coordinator intercept unauthorized responses before they propagate.
    pub async fn dispatch(
        &self,
        mut request: RequestDescriptor,
    ) -> Result<TransportResponse, Error> {
        self.authenticator.attach(&mut request);
        let response = self.transport.send(&request).await?;
        self.coordinator.intercept(request, response).await
    }

    pub async fn get(&self, path: &str) -> Result<TransportResponse, Error> {
        self.dispatch(RequestDescriptor::new(Method::GET, self.config.api_url(path)))
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<TransportResponse, Error> {
        self.dispatch(RequestDescriptor::new(Method::POST, self.config.api_url(path)).json(body))
            .await
    }
}
