//! Shared call context.
//!
//! A `Connection` bundles the transport, the credentials and the base URLs of one
//! account. Components clone it freely; the transport is shared behind an `Arc`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{ClientConfig, Credentials};
use crate::error::{DevOpsError, DevOpsResult};
use crate::transport::{ApiUrl, Method, Transport};

/// API versions per sub-resource.
pub mod api_version {
    /// Projects, teams, repositories, identities and licensing.
    pub const CORE: &str = "1.0";

    /// Project properties.
    pub const PROPERTIES: &str = "4.0-preview";

    /// Repository import requests.
    pub const IMPORT: &str = "3.0-preview";

    /// Service endpoints.
    pub const ENDPOINTS: &str = "3.0-preview.1";
}

/// Transport, credentials and base URLs for one account.
#[derive(Clone)]
pub struct Connection {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    account: String,
    instance_url: String,
    collection_url: String,
}

impl Connection {
    /// Create a connection from validated configuration.
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> DevOpsResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            credentials: config.credentials()?,
            account: config.account.clone(),
            instance_url: config.instance_url(),
            collection_url: config.collection_url(),
        })
    }

    /// Account name.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// URL builder rooted at the instance (used for project properties).
    pub fn instance(&self) -> DevOpsResult<ApiUrl> {
        Ok(ApiUrl::parse(&self.instance_url)?)
    }

    /// URL builder rooted at the project collection.
    pub fn collection(&self) -> DevOpsResult<ApiUrl> {
        Ok(ApiUrl::parse(&self.collection_url)?)
    }

    /// Perform a call and return the raw JSON.
    pub async fn send(&self, method: Method, url: &str, body: Option<Value>) -> DevOpsResult<Value> {
        let value = self
            .transport
            .call(method, url, &self.credentials, body.as_ref())
            .await?;
        Ok(value)
    }

    /// GET and decode.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> DevOpsResult<T> {
        let value = self.send(Method::Get, url, None).await?;
        decode(value)
    }

    /// Send a serializable body and decode the response.
    pub async fn send_json<B, T>(&self, method: Method, url: &str, body: &B) -> DevOpsResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| DevOpsError::InvalidResponse(e.to_string()))?;
        let value = self.send(method, url, Some(body)).await?;
        decode(value)
    }
}

/// Decode a JSON value into a response type.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> DevOpsResult<T> {
    serde_json::from_value(value).map_err(|e| DevOpsError::InvalidResponse(e.to_string()))
}

/// Extract a string field from a loosely shaped response.
pub(crate) fn string_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Like [`string_field`] but the field must be present.
pub(crate) fn required_string_field(value: &Value, field: &str) -> DevOpsResult<String> {
    string_field(value, field)
        .ok_or_else(|| DevOpsError::InvalidResponse(format!("response has no `{}` field", field)))
}
