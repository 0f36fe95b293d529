//! Scripted in-memory transport for tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::error::RemoteError;
use crate::http::{ApiRequest, ApiResponse, Method, Transport};

/// Answers requests from a fixed `(method, url)` table and records every
/// request it sees. Unrouted requests get a 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, url: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (method, url.to_string()),
                ApiResponse {
                    status,
                    body: body.to_string(),
                },
            );
    }

    pub fn respond_json(&self, method: Method, url: &str, status: u16, body: Value) {
        self.respond(method, url, status, &body.to_string());
    }

    /// Every request sent so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests sent so far with `method`.
    #[must_use]
    pub fn sent(&self, method: Method) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method)
            .collect()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RemoteError> {
        let response = self
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(request.method, request.url.clone()))
            .cloned()
            .unwrap_or_else(|| ApiResponse {
                status: 404,
                body: "{\"detail\":\"Not found.\"}".to_string(),
            });
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        Ok(response)
    }
}
