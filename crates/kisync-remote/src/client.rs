//! Directory-style access to the remote API: paginated lists, single-record
//! filters, create and update.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RemoteError;
use crate::http::{ApiRequest, Method, Transport};
use crate::records::Page;

/// Query parameters as `(name, value)` pairs, sent in order.
pub type Params<'a> = [(&'a str, String)];

/// Client for one remote instance.
pub struct RemoteClient<T> {
    api_root: String,
    transport: T,
}

/// Records gathered by following a list endpoint's `next` links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<R> {
    pub records: Vec<R>,
    /// `false` when a page answered with a non-success status and the
    /// remaining pages were not fetched.
    pub complete: bool,
}

impl<R> Listing<R> {
    /// The one record of the listing, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] when the listing holds more than one
    /// record.
    pub fn into_single(mut self, endpoint: &str) -> Result<Option<R>, RemoteError> {
        match self.records.len() {
            0 | 1 => Ok(self.records.pop()),
            count => {
                tracing::error!(endpoint, count, "filter matched too many records");
                Err(RemoteError::Conflict {
                    endpoint: endpoint.to_string(),
                    count,
                })
            }
        }
    }
}

/// `host[:port]` of `base_url`, the key credentials are stored under.
///
/// # Errors
///
/// Returns [`RemoteError::InvalidUrl`] if `base_url` does not parse or has no
/// host.
pub fn host_key(base_url: &str) -> Result<String, RemoteError> {
    let invalid = |reason: &str| RemoteError::InvalidUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };
    let parsed = reqwest::Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    let host = parsed.host_str().ok_or_else(|| invalid("missing host"))?;
    Ok(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

impl<T: Transport> RemoteClient<T> {
    /// Address the API of the instance at `base_url`. Any path on
    /// `base_url` is ignored; endpoints live under `/api/`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if `base_url` is not an absolute
    /// URL with a host.
    pub fn new(base_url: &str, transport: T) -> Result<Self, RemoteError> {
        let host = host_key(base_url)?;
        let scheme = base_url
            .split_once("://")
            .map_or("https", |(scheme, _)| scheme)
            .to_ascii_lowercase();
        Ok(Self {
            api_root: format!("{scheme}://{host}/api/"),
            transport,
        })
    }

    /// `<api root><endpoint>/?<params>`.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str, params: &Params<'_>) -> String {
        let mut url = format!("{}{endpoint}/", self.api_root);
        for (i, (name, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// `<api root><endpoint>/<id>/`.
    #[must_use]
    pub fn object_url(&self, endpoint: &str, id: &str) -> String {
        format!("{}{endpoint}/{id}/", self.api_root)
    }

    /// Fetch every page of `endpoint`, following `next` links, in server
    /// order.
    ///
    /// A non-success status stops the listing; the pages collected so far
    /// come back with `complete` unset. This is logged, not raised.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] on transport failure and
    /// [`RemoteError::Parse`] if a page is not a valid list response.
    pub async fn list_pages<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params<'_>,
    ) -> Result<Listing<R>, RemoteError> {
        let mut records = Vec::new();
        let mut next = Some(self.endpoint_url(endpoint, params));

        while let Some(url) = next.take() {
            tracing::debug!(%url, "fetching page");
            let resp = self.transport.send(ApiRequest::get(url.clone())).await?;
            if !resp.is_success() {
                tracing::error!(
                    %url,
                    status = resp.status,
                    body = %resp.body,
                    collected = records.len(),
                    "list request failed; returning partial results"
                );
                return Ok(Listing {
                    records,
                    complete: false,
                });
            }
            let page: Page<R> = resp.json()?;
            records.extend(page.results);
            next = page.next;
        }

        Ok(Listing {
            records,
            complete: true,
        })
    }

    /// Like [`list_pages`](Self::list_pages), dropping the completeness flag.
    ///
    /// # Errors
    ///
    /// See [`list_pages`](Self::list_pages).
    pub async fn list_paginated<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params<'_>,
    ) -> Result<Vec<R>, RemoteError> {
        Ok(self.list_pages(endpoint, params).await?.records)
    }

    /// Fetch the one record matching `params`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] when more than one record matches,
    /// plus anything [`list_pages`](Self::list_pages) returns.
    pub async fn fetch_single<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params<'_>,
    ) -> Result<Option<R>, RemoteError> {
        self.list_pages(endpoint, params).await?.into_single(endpoint)
    }

    /// GET an absolute record URL. Any failure reads as absent.
    pub async fn fetch_by_url<R: DeserializeOwned>(&self, url: &str) -> Option<R> {
        let resp = match self.transport.send(ApiRequest::get(url.to_string())).await {
            Ok(resp) => resp,
            Err(error) => {
                tracing::warn!(url, %error, "fetch failed");
                return None;
            }
        };
        if !resp.is_success() {
            tracing::debug!(url, status = resp.status, "record not available");
            return None;
        }
        resp.json()
            .inspect_err(|error| tracing::warn!(url, %error, "unreadable record"))
            .ok()
    }

    /// POST a new record; the API must answer 201.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Api`] with status and body for any other
    /// status, and [`RemoteError::Http`] on transport failure.
    pub async fn create(&self, endpoint: &str, payload: &Value) -> Result<(), RemoteError> {
        let url = self.endpoint_url(endpoint, &[]);
        tracing::debug!(%url, %payload, "creating record");
        self.transport
            .send(ApiRequest {
                method: Method::Post,
                url,
                body: Some(payload.clone()),
            })
            .await?
            .expect_status(201)?;
        Ok(())
    }

    /// PUT a full record to `endpoint/id/`; the API must answer 200.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Api`] with status and body for any other
    /// status, and [`RemoteError::Http`] on transport failure.
    pub async fn update(
        &self,
        endpoint: &str,
        id: &str,
        payload: &Value,
    ) -> Result<(), RemoteError> {
        let url = self.object_url(endpoint, id);
        tracing::debug!(%url, %payload, "updating record");
        self.transport
            .send(ApiRequest {
                method: Method::Put,
                url,
                body: Some(payload.clone()),
            })
            .await?
            .expect_status(200)?;
        Ok(())
    }
}
