//! Delivery request model.
//!
//! A [`DeliveryRequest`] is an immutable description of one outbound API call
//! plus a mutable retry counter. Requests are serializable so the dispatcher
//! can snapshot its queue to stable storage and survive process restarts.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::constants::{API_FORMAT, API_VERSION};
use crate::errors::{BeaconError, Result};

/// Supported outbound operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMethod::Get => write!(f, "GET"),
            RequestMethod::Post => write!(f, "POST"),
            RequestMethod::Put => write!(f, "PUT"),
        }
    }
}

/// One pending outbound API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRequest {
    /// Stable identity used to remove this request from the live queue
    pub id: String,
    pub method: RequestMethod,
    /// Absolute URL of the call
    pub url: String,
    pub auth_token: Option<String>,
    /// Opaque serialized payload; sent as the body for POST/PUT, appended as
    /// a query string for GET
    pub body: Option<serde_json::Value>,
    /// Number of failed attempts so far; increments by exactly 1 per failure
    pub retry_count: u32,
}

impl DeliveryRequest {
    /// Create a request targeting an absolute URL.
    pub fn new(
        method: RequestMethod,
        url: impl Into<String>,
        auth_token: Option<String>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            method,
            url: url.into(),
            auth_token,
            body,
            retry_count: 0,
        }
    }

    /// Create a request targeting a resource path on the vendor API.
    ///
    /// The full URL is composed as `{endpoint}/{version}/{path}.{format}`.
    pub fn from_path(
        method: RequestMethod,
        endpoint: &str,
        path: &str,
        auth_token: Option<String>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self::new(method, url_from_path(endpoint, path), auth_token, body)
    }

    /// Record one failed attempt.
    pub fn increment_retries(&mut self) {
        self.retry_count += 1;
    }

    /// Whether the request is still within the retry budget.
    pub fn can_retry(&self, max_retries: u32) -> bool {
        self.retry_count < max_retries
    }

    /// Final URL for the transport layer.
    ///
    /// For GET requests with a JSON-object body, the body's entries are
    /// appended as query parameters; any other body shape leaves the URL
    /// untouched. POST/PUT URLs are returned as-is (the body travels as the
    /// request payload).
    pub fn effective_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| BeaconError::InvalidInput(format!("invalid URL {}: {e}", self.url)))?;

        if self.method == RequestMethod::Get {
            if let Some(serde_json::Value::Object(params)) = &self.body {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in params {
                    match value {
                        serde_json::Value::String(s) => pairs.append_pair(key, s),
                        other => pairs.append_pair(key, &other.to_string()),
                    };
                }
            }
        }

        Ok(url)
    }
}

/// Compose the full vendor API URL from a resource path.
pub fn url_from_path(endpoint: &str, path: &str) -> String {
    format!("{}/{}/{}.{}", endpoint.trim_end_matches('/'), API_VERSION, path, API_FORMAT)
}
