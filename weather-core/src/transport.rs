use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::BoxError;

/// Status and raw body of a completed HTTP exchange. An absent body is
/// represented as an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one GET. Implementations must not retry: an error means no
/// response was obtained.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, BoxError>;
}

/// Production transport backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, BoxError> {
        let res = self.http.get(url.clone()).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;

        Ok(HttpResponse { status, body: body.to_vec() })
    }
}
