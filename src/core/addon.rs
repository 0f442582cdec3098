//! Addon descriptors: manifests, collection entries and their flags

use crate::core::service::ServiceError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Fields every manifest must carry as non-empty strings
pub const REQUIRED_MANIFEST_FIELDS: [&str; 3] = ["id", "name", "version"];

/// Transport name recorded for addons added over HTTP
pub const HTTP_TRANSPORT: &str = "http";

/// An addon manifest.
///
/// Only `id`, `name` and `version` are interpreted; every other field is kept
/// verbatim so the manifest can be handed back to Stremio unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Build a manifest from an arbitrary JSON value, validating required fields
    pub fn from_value(value: Value) -> Result<Self, ServiceError> {
        match value {
            Value::Object(map) => {
                let manifest = Self(map);
                manifest.validate()?;
                Ok(manifest)
            }
            _ => Err(ServiceError::Validation(
                "Manifest must be a JSON object".to_string(),
            )),
        }
    }

    /// Check that all required fields are present and non-empty
    pub fn validate(&self) -> Result<(), ServiceError> {
        for field in REQUIRED_MANIFEST_FIELDS {
            let present = self
                .0
                .get(field)
                .and_then(Value::as_str)
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);
            if !present {
                return Err(ServiceError::Validation(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        self.str_field("id")
    }

    pub fn name(&self) -> &str {
        self.str_field("name")
    }

    pub fn version(&self) -> &str {
        self.str_field("version")
    }

    fn str_field(&self, field: &str) -> &str {
        self.0.get(field).and_then(Value::as_str).unwrap_or_default()
    }
}

/// Flags Stremio uses to render and protect collection entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonFlags {
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub protected: bool,
}

impl AddonFlags {
    /// Flags for operator-curated addons
    pub const fn local() -> Self {
        Self {
            official: false,
            protected: false,
        }
    }
}

/// One entry of an addon collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonEntry {
    pub manifest: Manifest,
    pub transport_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<AddonFlags>,
}

impl AddonEntry {
    /// Create an entry for a manifest served over HTTP
    pub fn http(manifest: Manifest, transport_url: impl Into<String>) -> Self {
        Self {
            manifest,
            transport_url: transport_url.into(),
            transport_name: Some(HTTP_TRANSPORT.to_string()),
            flags: None,
        }
    }

    pub fn id(&self) -> &str {
        self.manifest.id()
    }

    /// True when both entries share a manifest id or a transport URL
    pub fn conflicts_with(&self, other: &AddonEntry) -> bool {
        self.id() == other.id() || self.transport_url == other.transport_url
    }

    /// Copy of this entry carrying the given flags
    pub fn with_flags(mut self, flags: AddonFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn is_protected(&self) -> bool {
        self.flags.map(|f| f.protected).unwrap_or(false)
    }
}

/// Parse and validate a transport URL (http or https only)
pub fn parse_transport_url(raw: &str) -> Result<url::Url, ServiceError> {
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| ServiceError::Validation(format!("Invalid manifest URL '{}': {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ServiceError::Validation(format!(
            "Unsupported URL scheme '{}' in '{}'",
            scheme, raw
        ))),
    }
}

/// The Stremio local-files addon, always first in any pushed collection
pub static LOCAL_ADDON: Lazy<AddonEntry> = Lazy::new(|| {
    let manifest = json!({
        "id": "org.stremio.local",
        "version": "1.10.0",
        "name": "Local Files (without catalog support)",
        "description": "Local add-on to find playable files: .torrent, .mp4, .mkv and .avi",
        "types": ["movie", "series", "other"],
        "resources": [
            {
                "name": "meta",
                "types": ["other"],
                "idPrefixes": ["local:", "bt:"]
            },
            {
                "name": "stream",
                "types": ["movie", "series"],
                "idPrefixes": ["tt"]
            }
        ]
    });
    let map = match manifest {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    AddonEntry {
        manifest: Manifest(map),
        transport_url: "http://127.0.0.1:11470/local-addon/manifest.json".to_string(),
        transport_name: None,
        flags: Some(AddonFlags {
            official: true,
            protected: true,
        }),
    }
});
