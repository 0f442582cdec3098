//! Remote Stremio account API client

use crate::core::addon::AddonEntry;
use crate::core::service::ServiceError;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, error};

/// Stremio API endpoints
pub mod endpoints {
    pub const LOGIN: &str = "login";
    pub const REGISTER: &str = "register";
    pub const LOGOUT: &str = "logout";
    pub const ADDON_COLLECTION_GET: &str = "addonCollectionGet";
    pub const ADDON_COLLECTION_SET: &str = "addonCollectionSet";
}

/// Session key returned by a successful Stremio login
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keys are credentials; keep them out of logs.
impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthKey(..)")
    }
}

/// Operations against a remote Stremio account
#[async_trait::async_trait]
pub trait AccountApi: Send + Sync {
    /// Log in, returning the account's auth key
    async fn login(&self, email: &str, password: &str) -> Result<AuthKey, ServiceError>;

    /// Register a new account
    async fn register(&self, email: &str, password: &str) -> Result<(), ServiceError>;

    /// Read the account's current addon collection
    async fn get_collection(&self, auth_key: &AuthKey) -> Result<Vec<AddonEntry>, ServiceError>;

    /// Replace the account's whole addon collection
    async fn set_collection(
        &self,
        auth_key: &AuthKey,
        addons: &[AddonEntry],
    ) -> Result<(), ServiceError>;

    /// Invalidate the auth key
    async fn logout(&self, auth_key: &AuthKey) -> Result<(), ServiceError>;
}

/// Envelope every Stremio API reply is wrapped in
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl ApiEnvelope {
    fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|err| match err {
            Value::String(msg) => msg.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
            other => other.to_string(),
        })
    }
}

/// HTTP implementation of [`AccountApi`] for the Stremio API
pub struct StremioAccountClient {
    client: Client,
    base_url: String,
}

impl StremioAccountClient {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        url::Url::parse(base_url).map_err(|e| {
            ServiceError::Config(format!("Invalid Stremio API URL '{}': {}", base_url, e))
        })?;

        let client = Client::builder()
            .user_agent(concat!("stremio-addon-manager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn request(&self, endpoint: &str, body: Value) -> Result<ApiEnvelope, ServiceError> {
        let url = self.endpoint_url(endpoint);
        debug!("Making Stremio API request to {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .header(header::ACCEPT, "*/*")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| {
                error!("Stremio API request to {} failed: {}", endpoint, e);
                ServiceError::Fetch(format!("Stremio API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Stremio API error from {}: {}", endpoint, status);
            return Err(ServiceError::Fetch(format!(
                "Stremio API error: {}",
                status.as_u16()
            )));
        }

        let envelope: ApiEnvelope = response.json().await.map_err(|e| {
            ServiceError::Fetch(format!("Invalid Stremio API response from {}: {}", endpoint, e))
        })?;

        debug!(
            "Stremio API response from {} (error: {})",
            endpoint,
            envelope.error.is_some()
        );
        Ok(envelope)
    }
}

#[async_trait::async_trait]
impl AccountApi for StremioAccountClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthKey, ServiceError> {
        let envelope = self
            .request(
                endpoints::LOGIN,
                json!({
                    "type": "Login",
                    "email": email,
                    "password": password,
                    "facebook": false
                }),
            )
            .await?;

        envelope
            .result
            .as_ref()
            .and_then(|r| r.get("authKey"))
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(AuthKey::new)
            .ok_or_else(|| ServiceError::InvalidCredentials(email.to_string()))
    }

    async fn register(&self, email: &str, password: &str) -> Result<(), ServiceError> {
        let envelope = self
            .request(
                endpoints::REGISTER,
                json!({
                    "type": "Register",
                    "email": email,
                    "password": password,
                    "gdpr": true,
                    "facebook": false
                }),
            )
            .await?;

        match envelope.error_message() {
            Some(message) => Err(ServiceError::Registration(message)),
            None => Ok(()),
        }
    }

    async fn get_collection(&self, auth_key: &AuthKey) -> Result<Vec<AddonEntry>, ServiceError> {
        let envelope = self
            .request(
                endpoints::ADDON_COLLECTION_GET,
                json!({
                    "type": "AddonCollectionGet",
                    "authKey": auth_key.as_str(),
                    "update": true
                }),
            )
            .await?;

        if let Some(message) = envelope.error_message() {
            return Err(ServiceError::Fetch(message));
        }

        let addons = envelope
            .result
            .and_then(|mut r| r.get_mut("addons").map(Value::take))
            .unwrap_or(Value::Array(Vec::new()));

        serde_json::from_value(addons)
            .map_err(|e| ServiceError::Fetch(format!("Invalid addon collection: {}", e)))
    }

    async fn set_collection(
        &self,
        auth_key: &AuthKey,
        addons: &[AddonEntry],
    ) -> Result<(), ServiceError> {
        let envelope = self
            .request(
                endpoints::ADDON_COLLECTION_SET,
                json!({
                    "type": "AddonCollectionSet",
                    "authKey": auth_key.as_str(),
                    "addons": addons
                }),
            )
            .await?;

        match envelope.error_message() {
            Some(message) => Err(ServiceError::Fetch(format!(
                "Stremio rejected addon collection: {}",
                message
            ))),
            None => Ok(()),
        }
    }

    async fn logout(&self, auth_key: &AuthKey) -> Result<(), ServiceError> {
        self.request(
            endpoints::LOGOUT,
            json!({
                "type": "Logout",
                "authKey": auth_key.as_str()
            }),
        )
        .await
        .map(|_| ())
    }
}
