use std::sync::{Arc, Mutex};

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tokio::sync::oneshot;
use tracing::warn;

use crate::errors::Error;
use crate::session::SessionGuard;
use crate::telemetry::renewal::RenewalTelemetry;
use crate::token::{Credential, RequestAuthenticator, TokenStore};
use crate::transport::{RequestDescriptor, Transport, TransportResponse};

#[derive(Deserialize)]
struct RenewalResponse {
    token: String,
}

type WaiterSlot = oneshot::Sender<Result<Credential, Error>>;

/// Single-flight state. The waiter queue lives inside the `Renewing` variant
/// so the state check and the enqueue are one critical section.
enum RenewalState {
    Idle,
    Renewing { waiters: Vec<WaiterSlot> },
}

/// Intercepts unauthorized responses and coordinates credential renewal:
/// the first qualifying failure issues exactly one renewal exchange, every
/// concurrent failure joins the waiter queue, and all of them settle together
/// when the exchange does.
pub struct RenewalCoordinator {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    guard: Arc<SessionGuard>,
    renew_url: String,
    state: Mutex<RenewalState>,
}

impl RenewalCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        guard: Arc<SessionGuard>,
        renew_url: String,
    ) -> Self {
        Self {
            transport,
            store,
            guard,
            renew_url,
            state: Mutex::new(RenewalState::Idle),
        }
    }

    /// The single status class that signals an expired or invalid credential.
    pub fn qualifies(status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED
    }

    fn targets_renewal(&self, request: &RequestDescriptor) -> bool {
        request.url == self.renew_url
    }

    /// Entry point for the dispatch layer once a response has arrived.
    /// Anything outside the unauthorized class passes through untouched.
    pub async fn intercept(
        &self,
        request: RequestDescriptor,
        response: TransportResponse,
    ) -> Result<TransportResponse, Error> {
        if !Self::qualifies(response.status) {
            return Ok(response);
        }
        self.handle_unauthorized(request, response.status).await
    }

    async fn handle_unauthorized(
        &self,
        request: RequestDescriptor,
        status: StatusCode,
    ) -> Result<TransportResponse, Error> {
        // A failure on the renewal endpoint itself means the ambient session
        // is gone; renewing in response would loop forever.
        if self.targets_renewal(&request) {
            warn!(url = %request.url, "renewal endpoint rejected the ambient session");
            self.guard.terminate();
            return Err(Error::RenewalFailed(format!(
                "renewal endpoint returned {status}"
            )));
        }
        if request.already_retried {
            warn!(url = %request.url, "request unauthorized again after renewal");
            self.guard.terminate();
            return Err(Error::AlreadyRetried(status));
        }

        // State check and waiter push share one lock acquisition with no await
        // inside it: a renewal observed in flight is joined, never repeated.
        let waiter = {
            let mut state = self.state.lock().expect("renewal state lock");
            match &mut *state {
                RenewalState::Renewing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                RenewalState::Idle => {
                    *state = RenewalState::Renewing { waiters: Vec::new() };
                    None
                }
            }
        };

        match waiter {
            Some(rx) => self.wait_and_replay(request, rx).await,
            None => self.renew_and_replay(request).await,
        }
    }

    /// Trigger path: issue the one renewal exchange, then settle the queue as
    /// a group before replaying the trigger itself.
    async fn renew_and_replay(
        &self,
        request: RequestDescriptor,
    ) -> Result<TransportResponse, Error> {
        let telemetry = RenewalTelemetry::new(request.url.clone());
        telemetry.emit_start();
        match self.renew().await {
            Ok(credential) => {
                // Persist before anyone replays so no caller can observe the
                // stale credential from here on.
                self.store.set(credential.clone());
                let waiters = self.settle();
                telemetry.emit_success(waiters.len());
                for waiter in waiters {
                    let _ = waiter.send(Ok(credential.clone()));
                }
                self.replay(request, &credential).await
            }
            Err(err) => {
                let waiters = self.settle();
                telemetry.emit_failure(&err, waiters.len());
                let reason = match err {
                    Error::RenewalFailed(reason) => reason,
                    other => other.to_string(),
                };
                for waiter in waiters {
                    let _ = waiter.send(Err(Error::RenewalFailed(reason.clone())));
                }
                self.guard.terminate();
                Err(Error::RenewalFailed(reason))
            }
        }
    }

    /// Waiter path: park on the in-flight exchange, then replay with whatever
    /// credential it delivered.
    async fn wait_and_replay(
        &self,
        request: RequestDescriptor,
        rx: oneshot::Receiver<Result<Credential, Error>>,
    ) -> Result<TransportResponse, Error> {
        let credential = rx
            .await
            .map_err(|_| Error::RenewalFailed("renewal settled without notifying waiters".into()))??;
        self.replay(request, &credential).await
    }

    /// One replay per request. A replay that comes back unauthorized again is
    /// terminal; it never starts a second renewal.
    async fn replay(
        &self,
        mut request: RequestDescriptor,
        credential: &Credential,
    ) -> Result<TransportResponse, Error> {
        request.already_retried = true;
        RequestAuthenticator::set_bearer(&mut request, credential);
        let response = self.transport.send(&request).await?;
        if Self::qualifies(response.status) {
            warn!(url = %request.url, "replay unauthorized after renewal");
            self.guard.terminate();
            return Err(Error::AlreadyRetried(response.status));
        }
        Ok(response)
    }

    /// Returns the state to `Idle` and hands back the drained queue. Waiters
    /// settle as a group; arrivals after this point start a fresh renewal.
    fn settle(&self) -> Vec<WaiterSlot> {
        let mut state = self.state.lock().expect("renewal state lock");
        match std::mem::replace(&mut *state, RenewalState::Idle) {
            RenewalState::Renewing { waiters } => waiters,
            RenewalState::Idle => Vec::new(),
        }
    }

    /// The exchange goes straight at the transport, never through intercept,
    /// so its own failure cannot re-enter the renewal path. Single attempt;
    /// no backoff.
    async fn renew(&self) -> Result<Credential, Error> {
        let exchange = RequestDescriptor::new(Method::POST, self.renew_url.clone());
        let response = self.transport.send(&exchange).await?;
        if !response.status.is_success() {
            return Err(Error::RenewalFailed(format!(
                "renewal exchange returned {}",
                response.status
            )));
        }
        let parsed: RenewalResponse = response.json()?;
        if parsed.token.is_empty() {
            return Err(Error::RenewalFailed("renewal response carried no token".into()));
        }
        Ok(Credential::new(parsed.token))
    }
}
