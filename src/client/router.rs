use serde::Serialize;
use tracing::debug;

use super::auth::AuthProvider;
use super::session::SessionStore;

/// Client views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Dashboard,
    Transactions,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Transactions => "/transactions",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Map a path to its view. `/` lands on the dashboard; unknown paths have no view.
    pub fn resolve(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "" | "/dashboard" => Some(Route::Dashboard),
            "/login" => Some(Route::Login),
            "/transactions" => Some(Route::Transactions),
            _ => None,
        }
    }
}

/// Outcome of a guarded navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed(Route),
    Redirect(Route),
}

impl Navigation {
    /// The view that ends up displayed
    pub fn route(&self) -> Route {
        match self {
            Navigation::Proceed(route) | Navigation::Redirect(route) => *route,
        }
    }
}

/// Gate a navigation on the session state.
///
/// An auth-required target with no signed-in user first tries to restore a
/// provider session; if that fails the user is sent to the login view. A
/// signed-in user asking for the login view is sent to the dashboard.
pub async fn guard<P: AuthProvider>(store: &mut SessionStore<P>, to: Route) -> Navigation {
    if to.requires_auth() && !store.is_authenticated() {
        store.restore_session().await;
        if !store.is_authenticated() {
            debug!("Redirecting {} to login", to.path());
            return Navigation::Redirect(Route::Login);
        }
    }

    if to == Route::Login && store.is_authenticated() {
        debug!("Already signed in, redirecting to dashboard");
        return Navigation::Redirect(Route::Dashboard);
    }

    Navigation::Proceed(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::session::tests::FakeProvider;
    use std::sync::atomic::Ordering;

    #[test]
    fn resolves_paths() {
        assert_eq!(Route::resolve("/"), Some(Route::Dashboard));
        assert_eq!(Route::resolve("/transactions/"), Some(Route::Transactions));
        assert_eq!(Route::resolve("/login?next=/dashboard"), Some(Route::Login));
        assert_eq!(Route::resolve("/settings"), None);
    }

    #[tokio::test]
    async fn unauthenticated_without_session_goes_to_login() {
        let mut store = SessionStore::new(FakeProvider::default(), "http://localhost:5173");
        for route in [Route::Dashboard, Route::Transactions] {
            assert_eq!(guard(&mut store, route).await, Navigation::Redirect(Route::Login));
        }
    }

    #[tokio::test]
    async fn restorable_session_proceeds() {
        let mut store = SessionStore::new(FakeProvider::with_user(None, None), "http://localhost:5173");
        assert_eq!(
            guard(&mut store, Route::Transactions).await,
            Navigation::Proceed(Route::Transactions)
        );
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn authenticated_users_skip_login() {
        let mut store = SessionStore::new(FakeProvider::with_user(None, None), "http://localhost:5173");
        store.restore_session().await;
        assert_eq!(guard(&mut store, Route::Login).await, Navigation::Redirect(Route::Dashboard));
    }

    #[tokio::test]
    async fn login_view_is_open_when_signed_out() {
        let mut store = SessionStore::new(FakeProvider::with_user(None, None), "http://localhost:5173");
        assert_eq!(guard(&mut store, Route::Login).await, Navigation::Proceed(Route::Login));
        // Only auth-required targets trigger a restore
        assert_eq!(store.provider().session_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn signed_in_navigation_does_not_hit_provider() {
        let mut store = SessionStore::new(FakeProvider::with_user(None, None), "http://localhost:5173");
        guard(&mut store, Route::Dashboard).await;
        guard(&mut store, Route::Transactions).await;
        assert_eq!(store.provider().session_lookups.load(Ordering::SeqCst), 1);
    }
}
