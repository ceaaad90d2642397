use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the identity provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    #[error("Invalid auth URL: {0}")]
    InvalidUrl(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Session format error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

/// Result of starting an OAuth sign-in: where to send the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthResponse {
    pub provider: OAuthProvider,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// User record as the identity provider reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: ProviderUser,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// The identity side of the hosted datastore, as seen by the client
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Begin an OAuth sign-in that returns to `redirect_to` once complete
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<OAuthResponse, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The provider's current session, if any
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_user_tolerates_missing_metadata() {
        let user: ProviderUser = serde_json::from_value(json!({ "id": "u1", "aud": "authenticated" })).unwrap();
        assert_eq!(user.email, None);
        assert_eq!(user.user_metadata, UserMetadata::default());
    }

    #[test]
    fn sessions_without_expiry_never_expire() {
        let session = Session {
            access_token: "t".into(),
            refresh_token: None,
            expires_at: None,
            user: ProviderUser {
                id: "u1".into(),
                email: None,
                user_metadata: UserMetadata::default(),
            },
        };
        assert!(!session.is_expired(i64::MAX));
        assert!(Session { expires_at: Some(100), ..session }.is_expired(100));
    }
}
