use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

use crate::data::FormPayload;

/// A fully prepared mutation, ready to hit the wire.
#[derive(Debug, Clone)]
pub struct MutationRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub payload: FormPayload,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("server answered {status}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid mutation url {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// HTTP capability used by the mutation client. Runs on worker threads.
pub trait Transport: Send + Sync {
    fn post(&self, request: &MutationRequest) -> Result<String, TransportError>;
}

pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    /// Builds a client sharing `jar` with the credential provider. No timeout
    /// is configured beyond reqwest's own default.
    pub fn new(jar: Arc<Jar>) -> Result<Self> {
        let http = HttpClient::builder()
            .cookie_provider(jar)
            .build()
            .context("transport: build http client")?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &MutationRequest) -> Result<String, TransportError> {
        let resp = self
            .http
            .post(request.url.clone())
            .headers(request.headers.clone())
            .form(request.payload.fields())
            .send()?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.text()?)
        } else {
            let body = resp.text().unwrap_or_default();
            Err(TransportError::Status { status, body })
        }
    }
}
