//! # HTTP Transport
//!
//! The seam between request construction and the network.
//!
//! ```text
//! ┌──────────────┐  HttpRequest   ┌──────────────────┐   HTTPS   ┌─────────────┐
//! │  FnsClient   │ ─────────────► │  HttpTransport   │ ────────► │ tax service │
//! │ (client.rs)  │ ◄───────────── │ ReqwestTransport │ ◄──────── │             │
//! └──────────────┘  HttpResponse  │ or a test double │           └─────────────┘
//!                                 └──────────────────┘
//! ```
//!
//! A transport returns a response for every status code; deciding what a
//! status means is the client's job. Bodies are read to the end before
//! `send` returns.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{FnsError, FnsResult};

// =============================================================================
// Request / Response
// =============================================================================

/// Basic-auth credentials. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A fully-built outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<BasicAuth>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A `GET` with no headers.
    pub fn get(url: Url) -> Self {
        HttpRequest {
            method: Method::GET,
            url,
            headers: Vec::new(),
            basic_auth: None,
            body: None,
        }
    }

    /// A `POST` carrying `payload` as UTF-8 JSON.
    pub fn post_json<B: Serialize>(url: Url, payload: &B) -> FnsResult<Self> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| FnsError::Transport(format!("cannot encode request body: {}", e)))?;

        Ok(HttpRequest {
            method: Method::POST,
            url,
            headers: vec![(
                "Content-Type".to_string(),
                "application/json; charset=UTF-8".to_string(),
            )],
            basic_auth: None,
            body: Some(body),
        })
    }

    /// Appends a header. Empty values are sent as-is.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches basic-auth credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// First value of a header, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First decoded value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// A response with its body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Sends one request and returns its response, whatever the status.
///
/// Errors are reserved for requests that never produced a response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> FnsResult<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> FnsResult<HttpResponse> {
        (**self).send(request).await
    }
}

// =============================================================================
// Reqwest Transport
// =============================================================================

/// Production transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with the configured connect and request timeouts.
    pub fn new(config: &ClientConfig) -> FnsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> FnsResult<HttpResponse> {
        let mut builder = self.client.request(request.method, request.url);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        if let Some(auth) = request.basic_auth {
            builder = builder.basic_auth(auth.username, Some(auth.password));
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
