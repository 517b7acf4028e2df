//! Delivery of flushed aggregates to the remote collector.

use crate::aggregate::Aggregate;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default bound on a single delivery attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Variants wrapping another error keep it as the `source()` only; use
/// [`TransportError::cause_chain`] to render the whole chain.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),
    #[error("failed to encode payload")]
    Encode(#[from] serde_json::Error),
    #[error("request failed")]
    Request(#[source] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
}

impl TransportError {
    /// This error and every underlying cause, e.g.
    /// `request failed: error sending request ...: tcp connect error: Connection refused`
    pub fn cause_chain(self) -> String {
        format!("{:#}", anyhow::Error::from(self))
    }
}

/// A one-shot, at-most-once sink for a finished window.
///
/// Implementations report failure but never retry; the caller drops the
/// aggregate either way.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, aggregate: Aggregate) -> Result<(), TransportError>;

    /// Where deliveries go, for log lines
    fn target(&self) -> &str;
}

/// Serialize an aggregate to the collector's JSON body
pub fn encode(aggregate: &Aggregate) -> Result<Vec<u8>, TransportError> {
    Ok(serde_json::to_vec(aggregate)?)
}

/// POSTs JSON to `http://<host>:<port>/metric`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn deliver(&self, aggregate: Aggregate) -> Result<(), TransportError> {
        let body = encode(&aggregate)?;
        debug!(endpoint = %self.endpoint, payload = %String::from_utf8_lossy(&body), "posting window");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }
        Ok(())
    }

    fn target(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{CPU_PERCENT, CPU_TEMP_C};

    #[test]
    fn encodes_count_and_value() {
        let mut agg = Aggregate::new();
        agg.add(CPU_PERCENT, 60.0);
        agg.add(CPU_PERCENT, 70.0);
        agg.add(CPU_PERCENT, 65.0);

        let body = encode(&agg).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"{"system.cpu.percent":{"count":3,"value":195.0}}"#
        );
    }

    #[test]
    fn absent_metrics_are_omitted() {
        let mut agg = Aggregate::new();
        agg.add(CPU_PERCENT, 1.0);

        let json: serde_json::Value = serde_json::from_slice(&encode(&agg).unwrap()).unwrap();
        assert!(json.get(CPU_TEMP_C).is_none());
    }

    #[test]
    fn cause_chain_includes_underlying_error() {
        let cause = serde_json::from_str::<u8>("x").unwrap_err();
        let cause_text = cause.to_string();

        let rendered = TransportError::Encode(cause).cause_chain();
        assert_eq!(rendered, format!("failed to encode payload: {cause_text}"));
    }

    #[test]
    fn status_error_names_the_code() {
        let err = TransportError::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "unexpected status: 503 Service Unavailable");
    }
}
