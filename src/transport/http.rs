//! Blocking HTTP transport to the chassis web service

use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::logging::log_call;
use crate::rpc::request::RequestEnvelope;
use crate::rpc::response::is_json_rpc_error;

use super::Transport;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = config.endpoint()?;
        let client = Client::builder().build()?;

        Ok(Self::with_client(endpoint, client))
    }

    /// Reuses a caller-built client, e.g. one with a custom timeout.
    pub fn with_client(endpoint: Url, client: Client) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn call(&mut self, envelope: &RequestEnvelope) -> Result<Value, ClientError> {
        let body = envelope.to_wire()?;
        let started_at = Instant::now();

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        let parsed: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(ClientError::HttpStatus {
                    status: status.as_u16(),
                    body: text,
                })
            }
            Err(err) => return Err(ClientError::Parse(err)),
        };

        log_call(envelope, started_at, is_json_rpc_error(&parsed));

        Ok(parsed)
    }

    fn transport_type(&self) -> &'static str {
        "http"
    }
}
