use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use shared::models::Charity;
use thiserror::Error;
use tracing::debug;

pub const API_VERSION: &str = "v24.0";

const CHARITY_QUERY: &str = "SELECT Id, Name, Logo_URL__c, URL__c FROM Charity__c ORDER BY Name";

#[derive(Debug, Error)]
pub enum ForceError {
    // HTTP 401: the cached credential must be evicted regardless of TTL.
    #[error("Force.com rejected the access token")]
    AuthExpired,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected Force.com response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCredential {
    pub access_token: String,
    pub instance_url: String,
}

#[async_trait]
pub trait TokenGranter: Send + Sync {
    async fn password_grant(&self) -> Result<ServiceCredential, ForceError>;
}

#[async_trait]
pub trait CharitySource: Send + Sync {
    async fn fetch_charities(
        &self,
        credential: &ServiceCredential,
    ) -> Result<Vec<Charity>, ForceError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    records: Vec<CharityRecord>,
}

#[derive(Deserialize)]
struct CharityRecord {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Logo_URL__c")]
    logo_url: Option<String>,
    #[serde(rename = "URL__c")]
    detail_url: Option<String>,
}

impl From<CharityRecord> for Charity {
    fn from(record: CharityRecord) -> Self {
        Charity {
            id: record.id,
            name: record.name,
            logo_url: record.logo_url,
            detail_url: record.detail_url,
        }
    }
}

pub struct ForceClient {
    http: ReqwestClient,
    login_server: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
}

impl ForceClient {
    pub fn new(
        login_server: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            http: ReqwestClient::new(),
            login_server: login_server.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl TokenGranter for ForceClient {
    async fn password_grant(&self) -> Result<ServiceCredential, ForceError> {
        let url = format!("{}/services/oauth2/token", self.login_server);
        debug!("Requesting Force.com token from {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("username", &self.username),
                ("password", &self.password),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForceError::UnexpectedResponse(format!(
                "token grant failed with {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(ServiceCredential {
            access_token: token.access_token,
            instance_url: token.instance_url,
        })
    }
}

#[async_trait]
impl CharitySource for ForceClient {
    async fn fetch_charities(
        &self,
        credential: &ServiceCredential,
    ) -> Result<Vec<Charity>, ForceError> {
        let url = format!(
            "{}/services/data/{}/query/",
            credential.instance_url, API_VERSION
        );
        debug!("Querying Force.com for charities");

        let response = self
            .http
            .get(&url)
            .query(&[("q", CHARITY_QUERY)])
            .header("Authorization", format!("OAuth {}", credential.access_token))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ForceError::AuthExpired);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForceError::UnexpectedResponse(format!(
                "charity query failed with {}: {}",
                status, body
            )));
        }

        let query: QueryResponse = response.json().await?;
        Ok(query.records.into_iter().map(Charity::from).collect())
    }
}
