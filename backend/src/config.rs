use std::env;
use thiserror::Error;

pub const DEFAULT_LOGIN_SERVER: &str = "https://login.salesforce.com";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// Permissions requested from the user during Facebook login.
pub const FACEBOOK_SCOPE: &str = "user_likes,user_photos,user_photo_video_tags";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub facebook_app_id: String,
    pub facebook_secret: String,
    pub force_client_id: String,
    pub force_client_secret: String,
    pub force_username: String,
    pub force_password: String,
    pub login_server: String,
    pub base_url: String,
    pub cache_ttl_secs: u64,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let cache_ttl_secs = match env::var("CACHE_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("CACHE_TTL_SECS", raw))?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            facebook_app_id: required("FACEBOOK_APP_ID")?,
            facebook_secret: required("FACEBOOK_SECRET")?,
            force_client_id: required("CLIENT_ID")?,
            force_client_secret: required("CLIENT_SECRET")?,
            force_username: required("USERNAME")?,
            force_password: required("PASSWORD")?,
            login_server: env::var("LOGIN_SERVER")
                .unwrap_or_else(|_| DEFAULT_LOGIN_SERVER.to_string()),
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            cache_ttl_secs,
        })
    }
}
