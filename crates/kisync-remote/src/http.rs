//! Request/response transport.
//!
//! The client only needs to send a request and read status plus body back,
//! so the network sits behind [`Transport`]. [`HttpTransport`] is the reqwest
//! implementation; tests substitute an in-memory one.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub const fn get(url: String) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Parse`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RemoteError> {
        serde_json::from_str(&self.body).map_err(|e| RemoteError::Parse(e.to_string()))
    }

    /// Turn an unexpected status into [`RemoteError::Api`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Api`] unless `status` equals `expected`.
    pub fn expect_status(self, expected: u16) -> Result<Self, RemoteError> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(RemoteError::Api {
                status: self.status,
                message: self.body,
            })
        }
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations report transport failures as errors; any HTTP status,
/// success or not, is a response.
pub trait Transport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, RemoteError>> + Send;
}

impl<T: Transport + Sync> Transport for &T {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, RemoteError>> + Send {
        (**self).send(request)
    }
}

/// reqwest settings for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("kisync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Token-authenticated reqwest transport.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a client that sends `Authorization: Token <token>` on every
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidToken`] if the token is not a valid
    /// header value and [`RemoteError::Http`] if the client cannot be built.
    pub fn new(token: &str, options: &TransportOptions) -> Result<Self, RemoteError> {
        let mut auth = HeaderValue::from_str(&format!("Token {token}"))
            .map_err(|_| RemoteError::InvalidToken)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RemoteError> {
        let builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
            Method::Put => self.http.put(&request.url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(ApiResponse { status, body })
    }
}
