//! [`HttpTransport`] backed by `reqwest`'s blocking client.

use reqwest::blocking::Client;
use tracing::debug;

use super::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Default transport for the free-function API.
///
/// Timeouts are taken per request from [`HttpRequest::timeout`], so one
/// client serves both backends with their own limits.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().build().map_err(map_err)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client (proxies, custom roots, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = ?request.method, url = %request.url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().map_err(map_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(map_err)?;
        Ok(HttpResponse { status, body })
    }
}

fn map_err(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}
