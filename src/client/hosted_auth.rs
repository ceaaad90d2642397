use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use super::auth::{AuthError, AuthProvider, OAuthProvider, OAuthResponse, ProviderUser, Session};

/// Stored provider session. This file is the only client-side persistence.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Token grant as returned by `/auth/v1/token`
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the hosted auth service (`/auth/v1`)
#[derive(Debug, Clone)]
pub struct HostedAuth {
    client: reqwest::Client,
    auth_url: Url,
    anon_key: String,
    storage: SessionFile,
}

impl HostedAuth {
    pub fn new(base_url: &str, anon_key: &str, storage: SessionFile) -> Result<Self, AuthError> {
        let mut auth_url = Url::parse(base_url).map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
        let path = format!("{}/auth/v1/", auth_url.path().trim_end_matches('/'));
        auth_url.set_path(&path);

        Ok(Self {
            client: reqwest::Client::new(),
            auth_url,
            anon_key: anon_key.to_string(),
            storage,
        })
    }

    pub fn storage(&self) -> &SessionFile {
        &self.storage
    }

    fn endpoint(&self, name: &str) -> Result<Url, AuthError> {
        self.auth_url.join(name).map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.anon_key)
    }

    /// Build the provider authorize URL
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<Url, AuthError> {
        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(url)
    }

    /// Finish an implicit-grant redirect: read the tokens from the callback
    /// URL fragment, look up the user and store the session.
    pub async fn exchange_redirect(&self, callback_url: &str) -> Result<Session, AuthError> {
        let tokens = parse_callback(callback_url, Utc::now().timestamp())?;
        let user = self.fetch_user(&tokens.access_token).await?;

        let session = Session { user, ..tokens };
        self.storage.save(&session)?;
        info!("Signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));
        Ok(session)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<ProviderUser, AuthError> {
        let response = self
            .with_key(self.client.get(self.endpoint("user")?))
            .bearer_auth(access_token)
            .send()
            .await?;
        Ok(check(response).await?.json::<ProviderUser>().await?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let response = self
            .with_key(self.client.post(url))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let grant: TokenGrant = check(response).await?.json().await?;

        let now = Utc::now().timestamp();
        Ok(Session {
            expires_at: grant.expires_at.or(grant.expires_in.map(|secs| now + secs)),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.or_else(|| Some(refresh_token.to_string())),
            user: grant.user,
        })
    }
}

/// Read tokens from a callback like `https://app/dashboard#access_token=..&expires_in=3600&refresh_token=..`.
/// The returned session carries a placeholder user.
fn parse_callback(callback_url: &str, now: i64) -> Result<Session, AuthError> {
    let url = Url::parse(callback_url).map_err(|e| AuthError::InvalidCallback(e.to_string()))?;
    let fragment = url
        .fragment()
        .ok_or_else(|| AuthError::InvalidCallback("callback URL has no fragment".into()))?;

    let mut access_token = None;
    let mut refresh_token = None;
    let mut expires_in = None;
    let mut expires_at = None;
    let mut error = None;

    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" => access_token = Some(value.into_owned()),
            "refresh_token" => refresh_token = Some(value.into_owned()),
            "expires_in" => expires_in = value.parse::<i64>().ok(),
            "expires_at" => expires_at = value.parse::<i64>().ok(),
            "error_description" => error = Some(value.into_owned()),
            "error" if error.is_none() => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(message) = error {
        return Err(AuthError::InvalidCallback(message));
    }
    let access_token = access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidCallback("missing access_token".into()))?;

    Ok(Session {
        access_token,
        refresh_token,
        expires_at: expires_at.or(expires_in.map(|secs| now + secs)),
        user: ProviderUser {
            id: String::new(),
            email: None,
            user_metadata: Default::default(),
        },
    })
}

async fn check(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(provider_error(status, &body))
}

fn provider_error(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
        .unwrap_or_else(|| body.trim().to_string());
    AuthError::Provider {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AuthProvider for HostedAuth {
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<OAuthResponse, AuthError> {
        let url = self.authorize_url(provider, redirect_to)?;
        Ok(OAuthResponse {
            provider,
            url: url.into(),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.storage.load();
        // The stored session is dropped no matter how the provider answers
        self.storage.clear()?;

        let Some(session) = session? else {
            return Ok(());
        };
        let response = self
            .with_key(self.client.post(self.endpoint("logout")?))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.storage.load()? else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now().timestamp()) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            debug!("Stored session expired and cannot be refreshed");
            self.storage.clear()?;
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(renewed) => {
                self.storage.save(&renewed)?;
                Ok(Some(renewed))
            }
            Err(AuthError::Provider { status, message }) if status < 500 => {
                warn!("Session refresh rejected ({}): {}", status, message);
                self.storage.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
