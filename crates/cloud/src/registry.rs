//! Cloud registry client
//!
//! Talks to the Firestore REST API: register this device in the shared
//! `phones` collection, PATCH `lastSeen` heartbeats, and list registered
//! phones for the diagnostic command.

use crate::wire::{
    error_message, fields_body, FieldValue, ListDocumentsResponse, WireDocument,
};
use chrono::{DateTime, Utc};
use phonebase_core::{DeviceInfo, Error, Result};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Default Firestore REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Collection holding one document per registered device
const PHONES_COLLECTION: &str = "phones";

/// Request timeout for registry calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the Firestore REST API (overridable for tests)
    pub base_url: String,
    /// Firebase project ID
    pub project: String,
    /// Web API key, sent as the `key` query parameter
    pub api_key: String,
}

impl RegistryConfig {
    /// Config against the production Firestore endpoint
    pub fn new(project: impl Into<String>, api_key: impl Into<String>) -> Self {
        RegistryConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            project: project.into(),
            api_key: api_key.into(),
        }
    }
}

/// A successful registration
#[derive(Debug, Clone)]
pub struct RegisteredPhone {
    /// Registry-assigned document ID for this device
    pub phone_id: String,
    /// The device info that was registered
    pub device: DeviceInfo,
}

/// One phone document from the registry, decoded leniently
#[derive(Debug, Clone)]
pub struct PhoneRecord {
    /// Document ID
    pub phone_id: String,
    /// Owning user (userId, falling back to userEmail)
    pub user_id: Option<String>,
    /// Device name
    pub device_name: Option<String>,
    /// Device model string
    pub model: Option<String>,
    /// Reported LAN IP
    pub ip: Option<String>,
    /// Last heartbeat
    pub last_seen: Option<DateTime<Utc>>,
}

impl PhoneRecord {
    fn from_wire(doc: &WireDocument) -> Self {
        PhoneRecord {
            phone_id: doc.doc_id().unwrap_or("unknown").to_string(),
            user_id: doc
                .get_str("userId")
                .or_else(|| doc.get_str("userEmail"))
                .map(str::to_string),
            device_name: doc.get_str("deviceName").map(str::to_string),
            model: doc.get_str("model").map(str::to_string),
            ip: doc.get_str("ip").map(str::to_string),
            last_seen: doc.get_timestamp("lastSeen"),
        }
    }
}

/// HTTP client for the cloud registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    /// Build a client; fails only if the TLS backend cannot initialize
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::CloudUnreachable(e.to_string()))?;
        Ok(RegistryClient { http, config })
    }

    /// URL of the phones collection
    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.config.base_url, self.config.project, PHONES_COLLECTION
        )
    }

    /// URL of one phone document
    fn document_url(&self, phone_id: &str) -> String {
        format!("{}/{}", self.collection_url(), phone_id)
    }

    /// Register this device, returning the registry-assigned phone ID
    pub async fn register(
        &self,
        username: &str,
        device: &DeviceInfo,
    ) -> Result<RegisteredPhone> {
        let now = Utc::now();
        let mut fields = BTreeMap::new();
        fields.insert("userId".to_string(), FieldValue::from(username));
        fields.insert("username".to_string(), FieldValue::from(username));
        fields.insert(
            "deviceName".to_string(),
            FieldValue::from(device.device_name.as_str()),
        );
        fields.insert("model".to_string(), FieldValue::from(device.model.as_str()));
        fields.insert("ip".to_string(), FieldValue::from(device.ip.as_str()));
        fields.insert("os".to_string(), FieldValue::from(device.os.as_str()));
        fields.insert("lastSeen".to_string(), FieldValue::from(now));
        fields.insert("connectedAt".to_string(), FieldValue::from(now));

        let url = format!("{}?key={}", self.collection_url(), self.config.api_key);
        let response = self
            .http
            .post(&url)
            .json(&fields_body(&fields))
            .send()
            .await
            .map_err(|e| Error::CloudUnreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::CloudUnreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Cloud {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        let doc: WireDocument = serde_json::from_str(&body)?;
        let phone_id = doc
            .doc_id()
            .ok_or_else(|| Error::Serialization("registry response missing document name".into()))?
            .to_string();

        info!(phone_id = %phone_id, user = username, "registered device");
        Ok(RegisteredPhone {
            phone_id,
            device: device.clone(),
        })
    }

    /// Update this device's `lastSeen` timestamp
    ///
    /// Uses `updateMask.fieldPaths=lastSeen` so only that field changes.
    pub async fn heartbeat(&self, phone_id: &str) -> Result<()> {
        let mut fields = BTreeMap::new();
        fields.insert("lastSeen".to_string(), FieldValue::from(Utc::now()));

        let url = format!(
            "{}?updateMask.fieldPaths=lastSeen&key={}",
            self.document_url(phone_id),
            self.config.api_key
        );
        let response = self
            .http
            .patch(&url)
            .json(&fields_body(&fields))
            .send()
            .await
            .map_err(|e| Error::CloudUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Cloud {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        debug!(phone_id = %phone_id, "heartbeat sent");
        Ok(())
    }

    /// List all registered phones
    pub async fn list_phones(&self) -> Result<Vec<PhoneRecord>> {
        let url = format!("{}?key={}", self.collection_url(), self.config.api_key);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::CloudUnreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::CloudUnreachable(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Cloud {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        let list: ListDocumentsResponse = serde_json::from_str(&body)?;
        Ok(list.documents.iter().map(PhoneRecord::from_wire).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RegistryClient {
        let config = RegistryConfig {
            base_url: "http://localhost:9999/v1".to_string(),
            project: "test-project".to_string(),
            api_key: "test-key".to_string(),
        };
        RegistryClient::new(config).unwrap()
    }

    #[test]
    fn test_collection_url() {
        let client = test_client();
        assert_eq!(
            client.collection_url(),
            "http://localhost:9999/v1/projects/test-project/databases/(default)/documents/phones"
        );
    }

    #[test]
    fn test_document_url() {
        let client = test_client();
        assert!(client.document_url("abc").ends_with("/phones/abc"));
    }

    #[test]
    fn test_phone_record_from_wire_lenient() {
        let doc: WireDocument = serde_json::from_value(serde_json::json!({
            "name": "projects/p/databases/(default)/documents/phones/p1",
            "fields": {
                "userEmail": {"stringValue": "a@b.c"},
                "deviceName": {"stringValue": "pixel"}
            }
        }))
        .unwrap();
        let record = PhoneRecord::from_wire(&doc);
        assert_eq!(record.phone_id, "p1");
        // userId absent, falls back to userEmail
        assert_eq!(record.user_id.as_deref(), Some("a@b.c"));
        assert_eq!(record.device_name.as_deref(), Some("pixel"));
        assert!(record.model.is_none());
        assert!(record.last_seen.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_cloud_unreachable() {
        let client = test_client();
        let err = client.list_phones().await.unwrap_err();
        assert!(matches!(err, Error::CloudUnreachable(_)));
    }
}
