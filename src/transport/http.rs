use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::config::TransportSettings;
use crate::errors::TransportError;
use crate::transport::Transport;

const OCTET_STREAM: &str = "application/octet-stream";

/// Byte exchange over HTTP: one POST per call, raw bodies both ways.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_settings(settings: &TransportSettings) -> Result<Self, TransportError> {
        Self::new(settings.endpoint(), settings.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn send_bytes(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, bytes = request.len(), "POST record");
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(request.to_vec())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}
