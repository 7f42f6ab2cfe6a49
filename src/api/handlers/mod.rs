pub mod system;
pub mod users;

pub use system::*;
pub use users::*;

use crate::auth::jwt::TokenService;
use crate::auth::password::PasswordHasher;
use crate::auth::policy::RoutePolicy;
use crate::auth::store::UserStore;
use crate::db::manager::DatabaseManager;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state for handlers.
///
/// Built once at startup; nothing in it is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub user_store: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub route_policy: RoutePolicy,
    /// Upper bound on each user store call made by the auth flows
    pub lookup_timeout: Duration,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseManager>,
        user_store: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            db,
            user_store,
            tokens,
            hasher,
            route_policy: RoutePolicy::default(),
            lookup_timeout,
        }
    }
}
