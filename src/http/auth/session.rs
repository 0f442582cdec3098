//! Signed session tokens and server-side session state

use crate::core::account::AuthKey;
use crate::core::service::AdminConfig;
use crate::http::errors::{HttpError, HttpResult};
use crate::http::models::{Claims, StremioUser};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "addon_manager_session";

const ISSUER: &str = "stremio-addon-manager";

/// Opaque id of a server-side session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stremio login cached on a session
#[derive(Debug, Clone)]
pub struct StremioSession {
    pub auth_key: AuthKey,
    pub user: StremioUser,
}

/// State held for one browser session
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub admin: bool,
    pub stremio: Option<StremioSession>,
}

struct StoredSession {
    data: SessionData,
    expires_at: u64,
}

/// Resolved session attached to every request by the session middleware
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub id: Option<SessionId>,
    pub data: SessionData,
}

impl SessionContext {
    pub fn is_admin(&self) -> bool {
        self.data.admin
    }
}

/// Issues and validates session tokens, and owns session state
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    sessions: RwLock<HashMap<SessionId, StoredSession>>,
}

impl SessionManager {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::from_secs(ttl_seconds),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(&config.session_secret, config.session_ttl_secs)
    }

    fn now_secs() -> HttpResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|_| HttpError::InternalServerError("Time went backwards".to_string()))
    }

    fn generate_token(&self, id: &SessionId, now: u64) -> HttpResult<String> {
        let claims = Claims {
            sub: id.as_str().to_string(),
            exp: (now + self.ttl.as_secs()) as usize,
            iat: now as usize,
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| HttpError::InternalServerError("Failed to generate token".to_string()))
    }

    /// Validate and decode a session token
    pub fn validate_token(&self, token: &str) -> HttpResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| HttpError::Unauthorized("Invalid token".to_string()))?;

        Ok(token_data.claims)
    }

    /// Look up the live session a token refers to
    pub async fn resolve(&self, token: &str) -> Option<SessionContext> {
        let claims = self.validate_token(token).ok()?;
        let id = SessionId(claims.sub);
        let now = Self::now_secs().ok()?;

        let sessions = self.sessions.read().await;
        let stored = sessions.get(&id).filter(|s| s.expires_at > now)?;
        Some(SessionContext {
            id: Some(id),
            data: stored.data.clone(),
        })
    }

    /// Replace `previous` with a fresh session whose data is `data`.
    ///
    /// Returns the signed token for the new session.
    pub async fn rotate(
        &self,
        previous: Option<&SessionId>,
        data: SessionData,
    ) -> HttpResult<String> {
        let now = Self::now_secs()?;
        let id = SessionId::generate();
        let token = self.generate_token(&id, now)?;

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        if let Some(previous) = previous {
            sessions.remove(previous);
        }
        sessions.insert(
            id,
            StoredSession {
                data,
                expires_at: now + self.ttl.as_secs(),
            },
        );
        debug!("Session issued ({} live)", sessions.len());

        Ok(token)
    }

    pub async fn destroy(&self, id: &SessionId) {
        self.sessions.write().await.remove(id);
    }

    /// `Set-Cookie` value carrying `token`
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
            SESSION_COOKIE,
            token,
            self.ttl.as_secs()
        )
    }

    /// `Set-Cookie` value removing the session cookie
    pub fn clear_cookie() -> String {
        format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", SESSION_COOKIE)
    }
}
