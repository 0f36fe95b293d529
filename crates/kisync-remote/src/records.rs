//! Remote record shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of a list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Page<R> {
    pub results: Vec<R>,
    #[serde(default)]
    pub next: Option<String>,
}

/// A remote project (`api/projects/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProject {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub slug: String,
}

/// A remote environment (`api/environments/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEnvironment {
    pub id: u64,
    pub url: String,
    pub slug: String,
    /// URL of the owning project.
    #[serde(default)]
    pub project: Option<String>,
}

/// A record kept as raw JSON so fields this tool does not manage survive an
/// update.
pub type Record = Map<String, Value>;

/// The `id` of a raw record rendered for use in a URL path.
#[must_use]
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
