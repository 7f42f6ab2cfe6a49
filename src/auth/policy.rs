//! Static route access policy
//!
//! Decides per `(method, path)` whether a request needs a bearer token.
//! Anything not listed is protected.

/// One entry of the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    pub method: &'static str,
    pub path: &'static str,
    pub auth_required: bool,
}

impl RouteRule {
    const fn public(method: &'static str, path: &'static str) -> Self {
        Self {
            method,
            path,
            auth_required: false,
        }
    }

    const fn protected(method: &'static str, path: &'static str) -> Self {
        Self {
            method,
            path,
            auth_required: true,
        }
    }

    fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

/// Every route the service knows about
pub static ROUTE_TABLE: &[RouteRule] = &[
    // System
    RouteRule::public("GET", "/health"),
    RouteRule::public("GET", "/docs"),
    RouteRule::public("GET", "/openapi.json"),
    RouteRule::protected("GET", "/ping"),
    // Auth flows
    RouteRule::public("POST", "/auth/login"),
    RouteRule::public("POST", "/auth/register"),
    RouteRule::public("POST", "/auth/refresh"),
    // Users
    RouteRule::protected("GET", "/users/me"),
];

/// Read-only view over a route table
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    rules: &'static [RouteRule],
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(ROUTE_TABLE)
    }
}

impl RoutePolicy {
    pub fn new(rules: &'static [RouteRule]) -> Self {
        Self { rules }
    }

    /// Whether `(method, path)` needs authentication.
    ///
    /// Exact, case-sensitive match on both parts. Unknown routes, wrong
    /// methods on known paths, and trailing-slash variants are all protected.
    pub fn requires_auth(&self, method: &str, path: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(true, |rule| rule.auth_required)
    }
}
