use crate::config::ApodConfig;
use crate::error::EtlError;
use crate::types::RawApod;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Client for the APOD endpoint. One GET per call, no retries.
#[derive(Clone)]
pub struct ApodApi {
    client: reqwest::Client,
    url: Url,
    api_key: String,
}

impl ApodApi {
    /// Build the HTTP client from configuration.
    pub fn new(cfg: &ApodConfig) -> Result<Self, EtlError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("apod-etl/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs));
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let client = builder.build()?;
        Ok(Self::with_client(client, cfg.url.clone(), cfg.api_key.clone()))
    }

    pub fn with_client(client: reqwest::Client, url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url,
            api_key: api_key.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch today's APOD payload.
    ///
    /// Non-2xx responses surface as `UpstreamStatus`; a body that is not a JSON
    /// object surfaces as `Decode`.
    pub async fn fetch(&self) -> Result<RawApod, EtlError> {
        if self.api_key.trim().is_empty() {
            return Err(EtlError::MissingApiKey);
        }

        let resp = self
            .client
            .get(self.url.clone())
            .query(&[("api_key", self.api_key.as_str())])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            error!(url = %self.url, %status, "APOD request rejected");
            return Err(EtlError::UpstreamStatus(status));
        }

        let body: Value = resp.json().await?;
        debug!(payload = %body, "APOD payload received");
        match body {
            Value::Object(map) => {
                info!(url = %self.url, fields = map.len(), "APOD payload fetched");
                Ok(map)
            }
            other => Err(EtlError::Decode(format!(
                "expected JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
