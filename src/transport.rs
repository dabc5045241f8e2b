use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use crate::endpoint::{mask_api_key, mask_url_key};
use crate::ProbeError;

/// A completed HTTP exchange with a success status.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub status: u16,
    pub content_type: String,
    pub text: String,
    pub json: Option<Value>,
}

impl Exchange {
    /// Non-success statuses become [`ProbeError::Http`] carrying the raw body.
    pub fn classify(status: u16, content_type: String, text: String) -> Result<Exchange, ProbeError> {
        let json = match serde_json::from_str::<Value>(&text) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(error = %e, len = text.len(), "response body is not JSON");
                None
            }
        };
        if !(200..300).contains(&status) {
            tracing::warn!(status, content_type = %content_type, "request failed");
            return Err(ProbeError::Http {
                status,
                content_type,
                body: text,
            });
        }
        Ok(Exchange {
            status,
            content_type,
            text,
            json,
        })
    }

    /// A 2xx reply whose body does not parse is still a fault.
    pub fn into_json(self) -> Result<Value, ProbeError> {
        match self.json {
            Some(v) => Ok(v),
            None => Err(ProbeError::NotJson {
                content_type: self.content_type,
                body: self.text,
            }),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<Exchange, ProbeError>;
}

pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(level = "debug", skip_all, fields(url = %mask_url_key(url)))]
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<Exchange, ProbeError> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            let lowered = name.to_ascii_lowercase();
            if lowered.contains("auth") || lowered.contains("key") {
                tracing::debug!(header = %name, value = %mask_api_key(value), "request header");
            } else {
                tracing::debug!(header = %name, value = %value, "request header");
            }
            request = request.header(*name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await?;
        tracing::debug!(status, content_type = %content_type, len = text.len(), "response received");

        Exchange::classify(status, content_type, text)
    }
}
