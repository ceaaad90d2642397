use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::auth::{AuthError, AuthProvider, OAuthProvider, OAuthResponse, ProviderUser};
use super::router::Route;

/// The signed-in user as the client shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl From<&ProviderUser> for User {
    fn from(user: &ProviderUser) -> Self {
        let email = user.email.clone().unwrap_or_default();
        Self {
            id: user.id.clone(),
            display_name: user
                .user_metadata
                .full_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| email.clone()),
            avatar_url: user.user_metadata.avatar_url.clone().unwrap_or_default(),
            email,
        }
    }
}

/// Client-side auth state: the current user and whether they are signed in.
/// Sign-in, sign-out and session restore are delegated to the provider.
pub struct SessionStore<P> {
    provider: P,
    app_origin: String,
    user: Option<User>,
    is_authenticated: bool,
}

impl<P: AuthProvider> SessionStore<P> {
    pub fn new(provider: P, app_origin: impl Into<String>) -> Self {
        Self {
            provider,
            app_origin: app_origin.into().trim_end_matches('/').to_string(),
            user: None,
            is_authenticated: false,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Where the provider sends the user after a successful sign-in
    pub fn redirect_url(&self) -> String {
        format!("{}{}", self.app_origin, Route::Dashboard.path())
    }

    /// Start the Google OAuth redirect
    pub async fn login_with_google(&self) -> Result<OAuthResponse, AuthError> {
        self.provider
            .sign_in_with_oauth(OAuthProvider::Google, &self.redirect_url())
            .await
            .map_err(|e| {
                error!("Login failed: {}", e);
                e
            })
    }

    /// Record the user once a redirect has completed
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
        self.is_authenticated = true;
    }

    /// Sign out with the provider. Local state is cleared whether or not the
    /// provider call succeeds; an `Err` only means the provider may still hold
    /// the session.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        let result = self.provider.sign_out().await;
        self.user = None;
        self.is_authenticated = false;

        if let Err(e) = &result {
            warn!("Provider sign-out failed, local session cleared anyway: {}", e);
        }
        result
    }

    /// Adopt an existing provider session if there is one. Errors are logged
    /// and leave the store signed out.
    pub async fn restore_session(&mut self) {
        match self.provider.get_session().await {
            Ok(Some(session)) => {
                self.set_user(User::from(&session.user));
            }
            Ok(None) => {}
            Err(e) => error!("Failed to restore session: {}", e),
        }
    }
}
