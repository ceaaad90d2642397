use std::fs;
use std::path::PathBuf;

use crate::client::{HostedAuth, SessionFile, SessionStore};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/transactions";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:5173";

/// Where the CLI keeps the provider session
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FINTRACK_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("fintrack").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_file() -> anyhow::Result<SessionFile> {
    Ok(SessionFile::new(get_config_dir()?.join("session.json")))
}

/// Identity provider settings, read from the environment
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub url: String,
    pub anon_key: String,
    pub app_origin: String,
}

impl AuthSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("SUPABASE_URL").map_err(|_| anyhow::anyhow!("SUPABASE_URL is not set"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .or_else(|_| std::env::var("SUPABASE_KEY"))
            .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY is not set"))?;
        let app_origin = std::env::var("FINTRACK_APP_ORIGIN").unwrap_or_else(|_| DEFAULT_APP_ORIGIN.to_string());
        Ok(Self { url, anon_key, app_origin })
    }
}

/// Session store backed by the hosted identity provider
pub fn session_store() -> anyhow::Result<SessionStore<HostedAuth>> {
    let settings = AuthSettings::from_env()?;
    let provider = HostedAuth::new(&settings.url, &settings.anon_key, session_file()?)?;
    Ok(SessionStore::new(provider, settings.app_origin))
}
