//! # kisync-remote
//!
//! Client for the test-reporting service's REST API.
//!
//! The service exposes list endpoints returning `{results, next}` pages,
//! filterable by equality query parameters. Records are identified by a
//! server-assigned `id` and a canonical `url`. Everything here goes through a
//! [`Transport`] so the reconciliation logic never depends on reqwest
//! directly.

mod client;
mod error;
mod http;
pub mod records;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::{Listing, Params, RemoteClient, host_key};
pub use error::RemoteError;
pub use http::{ApiRequest, ApiResponse, HttpTransport, Method, Transport, TransportOptions};
pub use records::{Record, RemoteEnvironment, RemoteProject, record_id};
