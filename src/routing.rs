use std::sync::Arc;

use tracing::debug;

use crate::token::TokenStore;

/// Where a transition wants to go, plus the route-table facts about it.
#[derive(Clone, Debug)]
pub struct RouteTarget {
    pub path: String,
    pub requires_auth: bool,
    pub is_login: bool,
}

impl RouteTarget {
    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: true,
            is_login: false,
        }
    }

    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: false,
            is_login: false,
        }
    }

    pub fn login(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: false,
            is_login: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    /// Carries the originally requested path so login can restore it.
    RedirectToLogin { resume: String },
    RedirectToHome,
}

/// Route rules alone: no store access, no network, no mutation.
pub fn decide(target: &RouteTarget, authenticated: bool) -> RouteDecision {
    if target.requires_auth && !authenticated {
        return RouteDecision::RedirectToLogin {
            resume: target.path.clone(),
        };
    }
    if target.is_login && authenticated {
        return RouteDecision::RedirectToHome;
    }
    RouteDecision::Proceed
}

/// Couples the pure rules to whatever the token store currently reports.
/// Runs before each route transition; never touches the network.
pub struct NavigationAuthGate {
    store: Arc<dyn TokenStore>,
}

impl NavigationAuthGate {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn check(&self, target: &RouteTarget) -> RouteDecision {
        let decision = decide(target, self.store.get().is_some());
        debug!(path = %target.path, decision = ?decision, "route.decision");
        decision
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{NavigationAuthGate, RouteDecision, RouteTarget, decide};
    use crate::token::{Credential, MemoryTokenStore, TokenStore};

    #[test]
    fn protected_route_redirects_and_preserves_resume_path() {
        let decision = decide(&RouteTarget::protected("/community/write"), false);
        assert_eq!(
            decision,
            RouteDecision::RedirectToLogin {
                resume: "/community/write".into()
            }
        );
    }

    #[test]
    fn login_page_while_authenticated_goes_home() {
        assert_eq!(
            decide(&RouteTarget::login("/login"), true),
            RouteDecision::RedirectToHome
        );
    }

    #[test]
    fn public_routes_proceed_either_way() {
        assert_eq!(
            decide(&RouteTarget::public("/about"), false),
            RouteDecision::Proceed
        );
        assert_eq!(
            decide(&RouteTarget::public("/about"), true),
            RouteDecision::Proceed
        );
    }

    #[test]
    fn login_page_while_unauthenticated_proceeds() {
        assert_eq!(
            decide(&RouteTarget::login("/login"), false),
            RouteDecision::Proceed
        );
    }

    #[test]
    fn gate_consults_the_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let gate = NavigationAuthGate::new(store.clone());
        let target = RouteTarget::protected("/");

        assert!(matches!(
            gate.check(&target),
            RouteDecision::RedirectToLogin { .. }
        ));

        store.set(Credential::new("tok-1"));
        assert_eq!(gate.check(&target), RouteDecision::Proceed);
    }
}
