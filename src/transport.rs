use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::Error;

/// Everything needed to issue, and later replay, one outbound request.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    /// One-shot flag: a request is renewal-retried at most once.
    pub already_retried: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            already_retried: false,
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TransportResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(Error::from)
    }
}

/// Issues a request and reports back status plus body. The coordinator only
/// ever inspects the status class and the target URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, Error>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Cookies carry the ambient long-lived session reference the renewal
    /// exchange relies on.
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, Error> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}
