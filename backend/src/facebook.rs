use reqwest::{Client as ReqwestClient, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::FACEBOOK_SCOPE;

const DIALOG_URL: &str = "https://www.facebook.com/dialog/oauth";
const GRAPH_URL: &str = "https://graph.facebook.com";

#[derive(Debug, Error)]
pub enum FacebookError {
    // The Graph API rejected the user token; the session must restart.
    #[error("Facebook session expired")]
    SessionExpired,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected Facebook response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookUser {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

// Dialog URL, code-for-token exchange, and `me` lookups.
pub struct FacebookClient {
    http: ReqwestClient,
    app_id: String,
    app_secret: String,
    redirect_uri: String,
}

impl FacebookClient {
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            http: ReqwestClient::new(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn authorize_url(&self) -> String {
        let url = Url::parse_with_params(
            DIALOG_URL,
            &[
                ("client_id", self.app_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", FACEBOOK_SCOPE),
                ("display", "page"),
            ],
        )
        .expect("static dialog URL is valid");
        url.into()
    }

    pub async fn exchange_code(&self, code: &str) -> Result<String, FacebookError> {
        debug!("Exchanging Facebook authorization code for a token");
        let response = self
            .http
            .get(format!("{GRAPH_URL}/oauth/access_token"))
            .query(&[
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FacebookError::UnexpectedResponse(format!(
                "code exchange failed with {}: {}",
                status, body
            )));
        }

        let token: AccessTokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    pub async fn fetch_me(&self, access_token: &str) -> Result<FacebookUser, FacebookError> {
        let response = self
            .http
            .get(format!("{GRAPH_URL}/me"))
            .query(&[("access_token", access_token)])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => {
                Err(FacebookError::SessionExpired)
            }
            status if status.is_success() => Ok(response.json().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(FacebookError::UnexpectedResponse(format!(
                    "me lookup failed with {}: {}",
                    status, body
                )))
            }
        }
    }
}
