//! HTTP request/response models

use crate::core::addon_registry::ImportSummary;
use crate::core::sync::SyncReport;
use crate::core::user_registry::UserSummary;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Plain `{success, message?}` acknowledgement
#[derive(Debug, Serialize, Clone)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Admin login request
#[derive(Debug, Deserialize, Clone)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Stremio email/password pair
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CredentialsRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Add addon request
#[derive(Debug, Deserialize, Clone)]
pub struct AddAddonRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Bulk import body: either a bare array or `{ "addons": [...] }`
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum ImportRequest {
    Entries(Vec<Value>),
    Wrapped { addons: Vec<Value> },
}

impl ImportRequest {
    pub fn into_values(self) -> Vec<Value> {
        match self {
            ImportRequest::Entries(values) | ImportRequest::Wrapped { addons: values } => values,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ImportResponse {
    pub success: bool,
    pub results: ImportSummary,
}

/// Session view returned by `GET /api/auth/status`
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub is_authenticated: bool,
    pub stremio_connected: bool,
    pub stremio_user: Option<StremioUser>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StremioUser {
    pub email: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
}

pub type UserListResponse = Vec<UserSummary>;

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // session id
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
    pub iss: String, // issuer
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_request_accepts_both_shapes() {
        let bare: ImportRequest = serde_json::from_value(json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(bare.into_values().len(), 2);

        let wrapped: ImportRequest =
            serde_json::from_value(json!({"addons": [{"a": 1}]})).unwrap();
        assert_eq!(wrapped.into_values().len(), 1);
    }

    #[test]
    fn test_credentials_validation() {
        let bad = CredentialsRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_auth_status_is_camel_case() {
        let status = AuthStatusResponse {
            is_authenticated: true,
            stremio_connected: false,
            stremio_user: None,
        };
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["isAuthenticated"], true);
        assert_eq!(json["stremioConnected"], false);
        assert!(json["stremioUser"].is_null());
    }
}
