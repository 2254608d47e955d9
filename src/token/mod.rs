mod authenticator;
mod store;

pub use authenticator::RequestAuthenticator;
pub use store::{Credential, MemoryTokenStore, TokenStore};
