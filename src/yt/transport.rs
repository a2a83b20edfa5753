//! The HTTP seam. [`YoutubeApi`](super::client::YoutubeApi) only needs
//! something that can perform a GET and hand back a status and body.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// A GET request: base url plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The full url with every parameter percent-encoded.
    pub fn full_url(&self) -> String {
        self.render(|_| false)
    }

    /// The url for logs: the API key is replaced.
    pub fn redacted_url(&self) -> String {
        self.render(|name| name == "key")
    }

    fn render(&self, redact: impl Fn(&str) -> bool) -> String {
        let mut url = self.url.clone();
        for (i, (k, v)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(k));
            url.push('=');
            if redact(k) {
                url.push_str("REDACTED");
            } else {
                url.push_str(&urlencoding::encode(v));
            }
        }
        url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns whatever status the server answered with.
/// Only network-level failures are errors; non-2xx statuses are not.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let resp = self.client.get(request.full_url()).send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
