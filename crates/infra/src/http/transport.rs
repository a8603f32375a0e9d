//! Reqwest-based transport for delivery requests.
//!
//! Builds the transport-level operation from a [`DeliveryRequest`]: GET
//! bodies travel as a URL query string, POST/PUT bodies as the JSON payload.
//! Every attempt runs under the fixed per-request timeout; responses are
//! decoded as a JSON object, the first element of a JSON array, or an empty
//! object, and any status >= 300 is classified as a failure carrying the
//! decoded body as error detail.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::RequestTransport;
use beacon_domain::{BeaconError, DeliveryRequest, DispatcherConfig, RequestMethod};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, warn};

/// SDK identification headers, sent alongside the auth token
const SDK_VERSION_HEADER: &str = "Beacon-SDK-Version";
const SDK_ENV_HEADER: &str = "Beacon-SDK-Env";

/// Transport that executes delivery requests over HTTPS.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
    sdk_version: String,
    environment: String,
}

impl HttpTransport {
    /// Build a transport from the dispatcher configuration.
    ///
    /// # Errors
    ///
    /// Returns `BeaconError::Config` if the underlying client cannot be
    /// constructed.
    pub fn new(config: &DispatcherConfig) -> Result<Self, BeaconError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        // Accept-Encoding (gzip, deflate) and response decompression are
        // negotiated by the client's enabled codec features; setting the
        // header by hand would disable the automatic decompression.
        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .user_agent(format!(
                "Beacon/{} ({})",
                config.sdk_version, config.environment
            ))
            .build()
            .map_err(|e| BeaconError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: config.request_timeout,
            sdk_version: config.sdk_version.clone(),
            environment: config.environment.clone(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> BeaconError {
        if err.is_timeout() {
            BeaconError::Timeout(self.timeout)
        } else {
            BeaconError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl RequestTransport for HttpTransport {
    async fn execute(
        &self,
        request: &DeliveryRequest,
    ) -> Result<serde_json::Value, BeaconError> {
        let url = request.effective_url()?;
        let method = match request.method {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
        };

        debug!(%method, %url, "Executing delivery request");

        let mut builder = self.client.request(method, url);

        if matches!(request.method, RequestMethod::Post | RequestMethod::Put) {
            builder =
                builder.header(CONTENT_TYPE, "application/json; charset=utf-8");
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        if let Some(token) = &request.auth_token {
            builder = builder
                .header(AUTHORIZATION, format!("Token {token}"))
                .header(SDK_VERSION_HEADER, &self.sdk_version)
                .header(SDK_ENV_HEADER, &self.environment);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let raw = response.text().await.map_err(|e| self.classify(e))?;
        let body = decode_body(&raw);

        if status >= StatusCode::MULTIPLE_CHOICES {
            warn!(status = status.as_u16(), "Server reported delivery failure");
            return Err(BeaconError::Server { status: status.as_u16(), body });
        }

        Ok(body)
    }
}

/// Decode a response body as a JSON object.
///
/// Accepts a bare object or the first element of an array; anything else
/// (including invalid JSON) degrades to an empty object.
fn decode_body(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        Ok(serde_json::Value::Array(mut items)) if !items.is_empty() && items[0].is_object() => {
            items.swap_remove(0)
        }
        _ => serde_json::Value::Object(serde_json::Map::new()),
    }
}
