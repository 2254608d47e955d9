mod client;
mod config;
mod errors;
mod renewal;
mod routing;
mod session;
mod telemetry;
mod token;
mod transport;

pub use client::SessionClient;
pub use config::{Config, ConfigLocation};
pub use errors::Error;
pub use renewal::RenewalCoordinator;
pub use routing::{NavigationAuthGate, RouteDecision, RouteTarget, decide};
pub use session::{Identity, Navigator, SessionGuard};
pub use token::{Credential, MemoryTokenStore, RequestAuthenticator, TokenStore};
pub use transport::{HttpTransport, RequestDescriptor, Transport, TransportResponse};

#[cfg(test)]
mod tests;
