use std::time::Instant;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use thiserror::Error;

use crate::{
    domain::{request::Request, response::Response},
    utilities::{
        request::{convert_http_method, sends_body},
        response::build_response,
    },
};

/// The request never produced an http answer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
    #[error("{0}")]
    Other(String),
}

/// Executes finalized requests. HTTP error statuses are answers, not errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<Response, TransportError>;
}

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, input: &Request) -> Result<Response, TransportError> {
        info!("Submitting request: {} {}", input.method, input.url);

        let mut headers = HeaderMap::new();
        for h in &input.headers {
            let header_name = HeaderName::from_bytes(h.key.as_bytes())
                .map_err(|_| TransportError::InvalidHeader(h.key.clone()))?;
            let header_value = HeaderValue::from_str(&h.value)
                .map_err(|_| TransportError::InvalidHeader(h.key.clone()))?;
            headers.append(header_name, header_value);
        }
        let query: Vec<(&str, &str)> = input
            .params
            .into_iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
            .collect();

        let mut req = self
            .client
            .request(convert_http_method(input.method), &input.url)
            .headers(headers);
        if !query.is_empty() {
            req = req.query(&query);
        }
        if sends_body(input.method, &input.body) {
            req = req.body(input.body.clone());
        }

        let started = Instant::now();
        let res = req.send().await?;
        let status = res.status();
        let res_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let res_bytes = res.bytes().await?;
        let time_ms = started.elapsed().as_millis() as u64;
        debug!(
            "{} {} answered {} ({} bytes, {}ms)",
            input.method,
            input.url,
            status,
            res_bytes.len(),
            time_ms
        );

        Ok(build_response(&res_type, status, &res_bytes, time_ms))
    }
}
